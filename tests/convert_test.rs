//! End-to-end conversion tests over synthesized .docx packages

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use cjkfont::{ConversionReport, ConvertError, ConvertOptions, convert};
use cjkfont::xml::{self, XmlElement};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn document_part(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
    )
}

fn header_part(blocks: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:hdr xmlns:w="{W_NS}">{blocks}</w:hdr>"#
    )
}

fn write_docx(path: &Path, parts: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, data) in parts {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn simple_docx(path: &Path, body: &str) {
    write_docx(
        path,
        &[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("word/document.xml", &document_part(body)),
        ],
    );
}

fn read_part(path: &Path, name: &str) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut data = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut data)
        .unwrap();
    data
}

fn body_paragraph_runs(path: &Path) -> Vec<Vec<RunView>> {
    let part = read_part(path, "word/document.xml");
    let tree = xml::parse(&part).unwrap();
    let body = tree.root.child("w:body").unwrap();
    body.child_elements()
        .filter(|e| e.name == "w:p")
        .map(|p| {
            p.child_elements()
                .filter(|e| e.name == "w:r")
                .map(RunView::from_run)
                .collect()
        })
        .collect()
}

#[derive(Debug, PartialEq)]
struct RunView {
    text: String,
    east_asia: Option<String>,
    ascii: Option<String>,
}

impl RunView {
    fn from_run(run: &XmlElement) -> Self {
        let text = run
            .child_elements()
            .filter(|e| e.name == "w:t")
            .map(|t| t.text())
            .collect();
        let rfonts = run.child("w:rPr").and_then(|rpr| rpr.child("w:rFonts"));
        RunView {
            text,
            east_asia: rfonts
                .and_then(|f| f.attr("w:eastAsia"))
                .map(str::to_string),
            ascii: rfonts.and_then(|f| f.attr("w:ascii")).map(str::to_string),
        }
    }
}

fn convert_with_font(input: &Path, font: &str) -> Result<ConversionReport, ConvertError> {
    let options = ConvertOptions {
        font_name: font.to_string(),
        output: None,
    };
    convert(input, &options)
}

#[test]
fn mixed_run_splits_into_latin_and_cjk_runs() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("mixed.docx");
    simple_docx(
        &input,
        r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Arial"/></w:rPr><w:t>Hello世界</w:t></w:r></w:p>"#,
    );

    let report = convert_with_font(&input, "SimSun").unwrap();
    assert_eq!(report.output_path, dir.path().join("mixed_modified.docx"));
    assert_eq!(report.runs_split, 1);
    assert_eq!(report.runs_updated, 1);

    let paragraphs = body_paragraph_runs(&report.output_path);
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(
        paragraphs[0],
        vec![
            RunView {
                text: "Hello".to_string(),
                east_asia: None,
                ascii: Some("Arial".to_string()),
            },
            RunView {
                text: "世界".to_string(),
                east_asia: Some("SimSun".to_string()),
                ascii: Some("Arial".to_string()),
            },
        ]
    );
}

#[test]
fn fully_cjk_run_stays_one_run() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("cjk.docx");
    simple_docx(&input, r#"<w:p><w:r><w:t>世界你好</w:t></w:r></w:p>"#);

    let report = convert_with_font(&input, "FangSong").unwrap();
    assert_eq!(report.runs_split, 0);
    assert_eq!(report.runs_updated, 1);

    let paragraphs = body_paragraph_runs(&report.output_path);
    assert_eq!(
        paragraphs[0],
        vec![RunView {
            text: "世界你好".to_string(),
            east_asia: Some("FangSong".to_string()),
            ascii: None,
        }]
    );
}

#[test]
fn non_cjk_document_round_trips_untouched() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("latin.docx");
    let body =
        r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Georgia" w:hAnsi="Georgia"/><w:b/></w:rPr><w:t>Hello</w:t></w:r></w:p>"#;
    simple_docx(&input, body);

    let report = convert_with_font(&input, "SimSun").unwrap();
    assert_eq!(report.runs_updated, 0);
    assert_eq!(report.runs_split, 0);

    // The body part is semantically identical: same tree, no new slots.
    let before = xml::parse(&document_part(body)).unwrap();
    let after = xml::parse(&read_part(&report.output_path, "word/document.xml")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn run_nested_two_tables_deep_is_converted() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("nested.docx");
    simple_docx(
        &input,
        "<w:tbl><w:tr><w:tc>\
         <w:p><w:r><w:t>outer</w:t></w:r></w:p>\
         <w:tbl><w:tr><w:tc>\
           <w:tbl><w:tr><w:tc><w:p><w:r><w:t>深层文字</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
           <w:p/>\
         </w:tc></w:tr></w:tbl>\
         </w:tc></w:tr></w:tbl>",
    );

    let report = convert_with_font(&input, "SimHei").unwrap();
    assert_eq!(report.runs_updated, 1);

    let part = read_part(&report.output_path, "word/document.xml");
    assert!(part.contains(r#"w:eastAsia="SimHei""#), "{part}");
    assert!(part.contains("深层文字"));
}

#[test]
fn missing_input_fails_with_not_found_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.docx");

    let err = convert_with_font(&input, "SimSun").unwrap_err();
    assert!(matches!(err, ConvertError::NotFound { .. }), "{err:?}");

    // No output file may appear at any path.
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(entries.is_empty(), "directory should be empty: {entries:?}");
}

#[test]
fn invalid_package_is_rejected() {
    let dir = TempDir::new().unwrap();

    // Not a zip at all.
    let garbage = dir.path().join("garbage.docx");
    std::fs::write(&garbage, b"this is not a zip").unwrap();
    let err = convert_with_font(&garbage, "SimSun").unwrap_err();
    assert!(matches!(err, ConvertError::InvalidFormat { .. }), "{err:?}");

    // A zip, but without word/document.xml.
    let empty = dir.path().join("empty.docx");
    write_docx(&empty, &[("[Content_Types].xml", CONTENT_TYPES)]);
    let err = convert_with_font(&empty, "SimSun").unwrap_err();
    assert!(matches!(err, ConvertError::InvalidFormat { .. }), "{err:?}");

    // Wrong extension.
    let wrong = dir.path().join("doc.txt");
    std::fs::write(&wrong, b"text").unwrap();
    let err = convert_with_font(&wrong, "SimSun").unwrap_err();
    assert!(matches!(err, ConvertError::InvalidFormat { .. }), "{err:?}");

    // No *_modified output was produced for any of them.
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        let name = entry.unwrap().file_name().to_string_lossy().into_owned();
        assert!(!name.contains("_modified"), "unexpected output {name}");
    }
}

#[test]
fn malformed_table_row_aborts_without_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.docx");
    simple_docx(&input, "<w:tbl><w:tr><w:trPr/></w:tr></w:tbl>");

    let err = convert_with_font(&input, "SimSun").unwrap_err();
    match err {
        ConvertError::MalformedStructure { part, .. } => {
            assert_eq!(part, "word/document.xml");
        }
        other => panic!("expected MalformedStructure, got {other:?}"),
    }
    assert!(!dir.path().join("broken_modified.docx").exists());
}

#[test]
fn headers_and_footers_are_converted_too() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("sections.docx");
    write_docx(
        &input,
        &[
            ("[Content_Types].xml", CONTENT_TYPES),
            (
                "word/document.xml",
                &document_part(r#"<w:p><w:r><w:t>正文</w:t></w:r></w:p>"#),
            ),
            (
                "word/header1.xml",
                &header_part(r#"<w:p><w:r><w:t>页眉Header</w:t></w:r></w:p>"#),
            ),
            (
                "word/footer1.xml",
                &header_part(
                    "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>页脚</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
                ),
            ),
            ("word/styles.xml", "<w:styles/>"),
        ],
    );

    let report = convert_with_font(&input, "KaiTi").unwrap();
    // Body run + footer run in place, header run split into two pieces.
    assert_eq!(report.runs_split, 1);
    assert_eq!(report.runs_updated, 3);

    for part in ["word/header1.xml", "word/footer1.xml", "word/document.xml"] {
        let data = read_part(&report.output_path, part);
        assert!(data.contains(r#"w:eastAsia="KaiTi""#), "{part}: {data}");
    }
    // Untouched parts keep their original bytes.
    assert_eq!(read_part(&report.output_path, "word/styles.xml"), "<w:styles/>");
}

#[test]
fn textbox_content_is_converted() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("shapes.docx");
    simple_docx(
        &input,
        "<w:p><w:r><w:pict><v:shape><v:textbox><w:txbxContent>\
         <w:p><w:r><w:t>框内文字</w:t></w:r></w:p>\
         </w:txbxContent></v:textbox></v:shape></w:pict></w:r></w:p>",
    );

    let report = convert_with_font(&input, "SimSun").unwrap();
    assert_eq!(report.runs_updated, 1);

    let part = read_part(&report.output_path, "word/document.xml");
    assert!(part.contains("框内文字"));
    assert!(part.contains(r#"w:eastAsia="SimSun""#), "{part}");
}

#[test]
fn converting_twice_with_same_font_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("once.docx");
    simple_docx(
        &input,
        r#"<w:p><w:r><w:t>Mixed content 混合内容 here</w:t></w:r></w:p>"#,
    );

    let first = convert_with_font(&input, "FangSong").unwrap();
    let first_bytes = read_part(&first.output_path, "word/document.xml");

    let second = convert_with_font(&first.output_path, "FangSong").unwrap();
    assert_eq!(second.runs_split, 0, "no further splitting on second pass");
    let second_bytes = read_part(&second.output_path, "word/document.xml");
    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn explicit_output_path_is_used_and_overwritten() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.docx");
    let output = dir.path().join("converted.docx");
    simple_docx(&input, r#"<w:p><w:r><w:t>文</w:t></w:r></w:p>"#);

    std::fs::write(&output, b"stale").unwrap();
    let options = ConvertOptions {
        font_name: "SimSun".to_string(),
        output: Some(output.clone()),
    };
    let report = convert(&input, &options).unwrap();
    assert_eq!(report.output_path, output);

    // Overwritten with a valid package, no prompt, no temp files left.
    let part = read_part(&output, "word/document.xml");
    assert!(part.contains(r#"w:eastAsia="SimSun""#));
    let names: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(names.len(), 2, "only input and output remain: {names:?}");
}

#[test]
fn default_font_is_fangsong() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("default.docx");
    simple_docx(&input, r#"<w:p><w:r><w:t>默认</w:t></w:r></w:p>"#);

    let report = convert(&input, &ConvertOptions::default()).unwrap();
    let part = read_part(&report.output_path, "word/document.xml");
    assert!(part.contains(r#"w:eastAsia="FangSong""#), "{part}");
}
