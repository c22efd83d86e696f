//! Document package handling
//!
//! This module owns everything that touches the .docx package itself:
//! opening and saving the zip container, traversing text-bearing
//! containers, and rewriting run font properties.

pub(crate) mod fonts;
pub(crate) mod package;
pub(crate) mod walker;
