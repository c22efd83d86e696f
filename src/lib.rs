//! cjkfont: set the East Asian font for CJK text in .docx files
//!
//! This library rewrites run-level font metadata inside a Word document so
//! that every CJK character is rendered with a chosen East Asian font
//! (`w:eastAsia` in WordprocessingML terms) while Latin text and all other
//! formatting stay exactly as they were. It covers body paragraphs, tables
//! (nested without limit), headers, footers, and text boxes.

pub mod convert;
pub mod document;
pub mod error;
pub mod script;
pub mod xml;

// Re-export the commonly used surface
pub use convert::{ConversionReport, ConvertOptions, DEFAULT_FONT, convert};
pub use error::ConvertError;
