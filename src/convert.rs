//! Conversion orchestration
//!
//! Ties the pieces together: open the package, walk every paragraph of
//! every text-bearing part, split each run into CJK / non-CJK spans, apply
//! the East Asian font to the CJK side, and save the result. The whole
//! conversion is one synchronous in-memory pass; it either completes and
//! writes the output or fails without producing a file.

use std::path::{Path, PathBuf};

use crate::document::fonts::{RUN, RUN_PROPS, east_asia_font, set_east_asia_font};
use crate::document::package::{DocxPackage, default_output_path};
use crate::document::walker;
use crate::error::ConvertError;
use crate::script::{contains_cjk, split_spans};
use crate::xml::{self, XmlElement, XmlNode};

/// Default East Asian font, matching the tool's traditional default.
pub const DEFAULT_FONT: &str = "FangSong";

const TEXT: &str = "w:t";
const XML_SPACE: &str = "xml:space";

/// Conversion parameters.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// East Asian font name applied to CJK text.
    pub font_name: String,
    /// Output path; `<stem>_modified.<ext>` beside the input when `None`.
    pub output: Option<PathBuf>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            font_name: DEFAULT_FONT.to_string(),
            output: None,
        }
    }
}

/// What a completed conversion did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    /// Where the converted document was written.
    pub output_path: PathBuf,
    /// Runs whose East Asian font slot was actually changed. Re-converting
    /// an already-converted document with the same font reports zero.
    pub runs_updated: usize,
    /// Runs that had to be split into CJK and non-CJK pieces.
    pub runs_split: usize,
}

#[derive(Default)]
struct Stats {
    runs_updated: usize,
    runs_split: usize,
}

/// Converts one document: every CJK character in `input` is assigned
/// `options.font_name` as its East Asian font, everything else is left
/// untouched, and the result is written to the output path.
pub fn convert(input: &Path, options: &ConvertOptions) -> Result<ConversionReport, ConvertError> {
    let mut package = DocxPackage::open(input)?;
    let mut stats = Stats::default();

    for part_name in package.text_part_names() {
        let Some(bytes) = package.part(&part_name) else {
            continue;
        };
        let text = String::from_utf8_lossy(bytes).into_owned();
        let mut tree = xml::parse(&text).map_err(|e| ConvertError::InvalidFormat {
            path: input.to_path_buf(),
            reason: format!("cannot parse {part_name}: {e}"),
        })?;

        let blocks = block_container(&mut tree.root, &part_name)?;
        walker::visit_paragraphs(blocks, &part_name, &mut |paragraph| {
            process_paragraph(paragraph, &options.font_name, &mut stats);
        })?;

        let data = xml::serialize(&tree).map_err(|e| ConvertError::InvalidFormat {
            path: input.to_path_buf(),
            reason: format!("cannot rebuild {part_name}: {e}"),
        })?;
        package.replace_part(&part_name, data);
    }

    let output_path = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));
    package.save(&output_path)?;

    Ok(ConversionReport {
        output_path,
        runs_updated: stats.runs_updated,
        runs_split: stats.runs_split,
    })
}

/// The element whose children form the part's block list: `w:body` for the
/// main document, the root itself (`w:hdr` / `w:ftr`) for headers and
/// footers.
fn block_container<'a>(
    root: &'a mut XmlElement,
    part_name: &str,
) -> Result<&'a mut XmlElement, ConvertError> {
    if part_name != "word/document.xml" {
        return Ok(root);
    }
    root.child_mut("w:body")
        .ok_or_else(|| ConvertError::MalformedStructure {
            part: part_name.to_string(),
            reason: "missing w:body element".to_string(),
        })
}

/// Rewrites one paragraph's run list. The replacement list is collected
/// first and spliced in at the end, so the paragraph is never mutated while
/// its children are being iterated.
fn process_paragraph(paragraph: &mut XmlElement, font_name: &str, stats: &mut Stats) {
    let mut rebuilt: Vec<XmlNode> = Vec::with_capacity(paragraph.children.len());

    for node in std::mem::take(&mut paragraph.children) {
        match node {
            XmlNode::Element(run) if run.name == RUN => {
                process_run(run, font_name, stats, &mut rebuilt);
            }
            other => rebuilt.push(other),
        }
    }

    paragraph.children = rebuilt;
}

fn process_run(mut run: XmlElement, font_name: &str, stats: &mut Stats, out: &mut Vec<XmlNode>) {
    let text = run_text(&run);
    let spans = split_spans(&text);

    // Zero or one span: nothing to split. Mutating the existing element in
    // place keeps run-level metadata this tool does not model (revision
    // marks, comment anchors) intact.
    if spans.len() <= 1 {
        if contains_cjk(&text) {
            apply_font(&mut run, font_name, stats);
        }
        out.push(XmlNode::Element(run));
        return;
    }

    // Runs carrying tabs, breaks or drawings between their text pieces
    // cannot be partitioned without reordering content. Fall back to
    // whole-run application, which still renders every CJK character in the
    // requested font.
    if !is_splittable(&run) {
        apply_font(&mut run, font_name, stats);
        out.push(XmlNode::Element(run));
        return;
    }

    stats.runs_split += 1;
    let spans: Vec<(String, bool)> = spans
        .into_iter()
        .map(|span| (span.text.to_string(), span.cjk))
        .collect();

    for (span_text, cjk) in spans {
        let mut piece = XmlElement::new(RUN);
        piece.attributes = run.attributes.clone();
        if let Some(rpr) = run.child(RUN_PROPS) {
            piece.children.push(XmlNode::Element(rpr.clone()));
        }
        piece
            .children
            .push(XmlNode::Element(text_element(&span_text)));
        if cjk {
            apply_font(&mut piece, font_name, stats);
        }
        out.push(XmlNode::Element(piece));
    }
}

/// Sets the run's East Asian font, counting it as updated only when the
/// slot was not already the target font.
fn apply_font(run: &mut XmlElement, font_name: &str, stats: &mut Stats) {
    if east_asia_font(run) != Some(font_name) {
        stats.runs_updated += 1;
    }
    set_east_asia_font(run, font_name);
}

/// Concatenated text of the run's direct `w:t` children.
fn run_text(run: &XmlElement) -> String {
    run.child_elements()
        .filter(|e| e.name == TEXT)
        .map(|e| e.text())
        .collect()
}

/// A run can be split only when all of its content is plain text: every
/// child other than the property element is a `w:t` holding nothing but
/// text nodes.
fn is_splittable(run: &XmlElement) -> bool {
    run.children.iter().all(|node| match node {
        XmlNode::Element(e) if e.name == RUN_PROPS => true,
        XmlNode::Element(e) if e.name == TEXT => e
            .children
            .iter()
            .all(|child| matches!(child, XmlNode::Text(_) | XmlNode::CData(_))),
        _ => false,
    })
}

fn text_element(text: &str) -> XmlElement {
    let mut elem = XmlElement::new(TEXT);
    // Word drops leading/trailing whitespace unless told to preserve it.
    if text.trim() != text {
        elem.set_attr(XML_SPACE, "preserve");
    }
    elem.children.push(XmlNode::Text(text.to_string()));
    elem
}
