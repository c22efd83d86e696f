//! .docx package I/O
//!
//! A .docx file is a zip archive of XML parts. The package is read fully
//! into memory, selected parts are swapped out by the converter, and the
//! whole archive is rebuilt on save — every part the converter does not
//! touch is written back with its original bytes. Saving goes through a
//! temporary file in the destination directory that is renamed into place,
//! so a failed conversion never leaves a half-written output behind.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::ConvertError;

/// Parts whose paragraphs receive font rewriting: the main body plus every
/// header and footer. Text boxes are nested inside these parts rather than
/// stored as parts of their own.
static TEXT_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^word/(?:document|header\d+|footer\d+)\.xml$").expect("valid part pattern")
});

const MAIN_PART: &str = "word/document.xml";

struct Part {
    name: String,
    data: Vec<u8>,
}

/// An opened .docx package: all parts, in archive order.
pub(crate) struct DocxPackage {
    parts: Vec<Part>,
}

impl DocxPackage {
    /// Opens and validates a package.
    ///
    /// A missing or unreadable path is `NotFound`; anything that is not a
    /// well-formed Word package (wrong extension, broken archive, missing
    /// `word/document.xml`) is `InvalidFormat`.
    pub(crate) fn open(path: &Path) -> Result<Self, ConvertError> {
        if !path.exists() {
            return Err(ConvertError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        if !extension.eq_ignore_ascii_case("docx") {
            return Err(ConvertError::InvalidFormat {
                path: path.to_path_buf(),
                reason: format!(
                    "expected a .docx file, got .{extension} \
                     (.doc, .xlsx and other formats are not supported)"
                ),
            });
        }

        let file = File::open(path).map_err(|_| ConvertError::NotFound {
            path: path.to_path_buf(),
        })?;
        let mut archive = ZipArchive::new(file).map_err(|e| ConvertError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("not a readable zip archive: {e}"),
        })?;

        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| ConvertError::InvalidFormat {
                path: path.to_path_buf(),
                reason: format!("corrupt archive entry: {e}"),
            })?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut data)
                .map_err(|e| ConvertError::InvalidFormat {
                    path: path.to_path_buf(),
                    reason: format!("cannot read part {name}: {e}"),
                })?;
            parts.push(Part { name, data });
        }

        let package = DocxPackage { parts };
        if package.find(MAIN_PART).is_none() {
            let reason = if package.find("xl/workbook.xml").is_some() {
                "this appears to be an Excel file (.xlsx); \
                 only Word documents (.docx) are supported"
                    .to_string()
            } else {
                format!("missing {MAIN_PART}; the file may be corrupted")
            };
            return Err(ConvertError::InvalidFormat {
                path: path.to_path_buf(),
                reason,
            });
        }

        Ok(package)
    }

    /// Names of the text-bearing parts present in this package, in archive
    /// order.
    pub(crate) fn text_part_names(&self) -> Vec<String> {
        self.parts
            .iter()
            .filter(|part| TEXT_PART.is_match(&part.name))
            .map(|part| part.name.clone())
            .collect()
    }

    /// Raw bytes of a part.
    pub(crate) fn part(&self, name: &str) -> Option<&[u8]> {
        self.find(name).map(|index| self.parts[index].data.as_slice())
    }

    /// Replaces a part's bytes. The part must already exist.
    pub(crate) fn replace_part(&mut self, name: &str, data: Vec<u8>) {
        if let Some(index) = self.find(name) {
            self.parts[index].data = data;
        }
    }

    /// Writes the package to `path` atomically: the archive is built in a
    /// temporary file beside the destination and renamed into place only
    /// once it is complete. An existing file at `path` is overwritten.
    pub(crate) fn save(&self, path: &Path) -> Result<(), ConvertError> {
        let write_error = |source: std::io::Error| ConvertError::WriteError {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;

        {
            let mut zip = ZipWriter::new(tmp.as_file_mut());
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            for part in &self.parts {
                zip.start_file(part.name.as_str(), options)
                    .map_err(|e| write_error(std::io::Error::other(e)))?;
                zip.write_all(&part.data).map_err(write_error)?;
            }
            zip.finish()
                .map_err(|e| write_error(std::io::Error::other(e)))?;
        }

        tmp.persist(path).map_err(|e| write_error(e.error))?;
        Ok(())
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.parts.iter().position(|part| part.name == name)
    }
}

/// Default output location: `<stem>_modified.<ext>` beside the input, the
/// same convention the conversion has always used.
pub(crate) fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = input
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("docx");
    input.with_file_name(format!("{stem}_modified.{extension}"))
}
