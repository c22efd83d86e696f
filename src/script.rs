//! CJK script classification and run-text splitting
//!
//! This module decides which characters should receive the East Asian font
//! and partitions run text into maximal CJK / non-CJK spans. Classification
//! is purely code-point based (Unicode block ranges), not language-aware.

/// Returns true if the character belongs to one of the CJK Unicode blocks
/// that should be rendered with the East Asian font.
///
/// The range table is the single source of truth for "Chinese character"
/// throughout the crate.
pub fn is_cjk(c: char) -> bool {
    matches!(
        u32::from(c),
        0x3000..=0x303F       // CJK Symbols and Punctuation (。、…《》【】)
            | 0x3400..=0x4DBF // CJK Extension A
            | 0x4E00..=0x9FFF // CJK Unified Ideographs (main block)
            | 0xF900..=0xFAFF // CJK Compatibility Ideographs
            | 0xFE30..=0xFE4F // CJK Compatibility Forms
            | 0xFF00..=0xFFEF // Halfwidth and Fullwidth Forms (，。！？：；)
            | 0x20000..=0x2A6DF // CJK Extension B
            | 0x2A700..=0x2B73F // CJK Extension C
            | 0x2B740..=0x2B81F // CJK Extension D
            | 0x2B820..=0x2CEAF // CJK Extension E
            | 0x2CEB0..=0x2EBEF // CJK Extension F
            | 0x2F800..=0x2FA1F // CJK Compatibility Supplement
    )
}

/// Returns true if `text` contains at least one CJK character.
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// A maximal span of run text whose characters share one classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<'a> {
    pub text: &'a str,
    pub cjk: bool,
}

/// Splits run text into maximal homogeneous spans, in original order.
///
/// Concatenating the spans reproduces the input exactly; every span is
/// non-empty and entirely CJK or entirely non-CJK. Empty input yields an
/// empty vector.
pub fn split_spans(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (idx, ch) in text.char_indices() {
        let cjk = is_cjk(ch);
        match current {
            Some(flag) if flag != cjk => {
                spans.push(Span {
                    text: &text[start..idx],
                    cjk: flag,
                });
                start = idx;
                current = Some(cjk);
            }
            Some(_) => {}
            None => current = Some(cjk),
        }
    }

    if let Some(flag) = current {
        spans.push(Span {
            text: &text[start..],
            cjk: flag,
        });
    }

    spans
}
