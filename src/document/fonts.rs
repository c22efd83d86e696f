//! East Asian font slot surgery on run properties
//!
//! A run's fonts live on the `w:rFonts` element inside `w:rPr`: `w:ascii`
//! and `w:hAnsi` govern Latin text, `w:eastAsia` governs CJK text, and the
//! slots are independent. Setting `w:eastAsia` therefore changes how CJK
//! characters render without touching anything else in the run.

use crate::xml::{XmlElement, XmlNode};

pub(crate) const RUN: &str = "w:r";
pub(crate) const RUN_PROPS: &str = "w:rPr";
pub(crate) const RUN_FONTS: &str = "w:rFonts";
pub(crate) const EAST_ASIA: &str = "w:eastAsia";

/// Sets the East Asian font of a `w:r` element, creating `w:rPr` and
/// `w:rFonts` if the run has none. Every other property and attribute is
/// left exactly as it was, and repeated application is a no-op.
pub(crate) fn set_east_asia_font(run: &mut XmlElement, font_name: &str) {
    let rpr = ensure_first_child(run, RUN_PROPS);
    let rfonts = ensure_first_child(rpr, RUN_FONTS);
    rfonts.set_attr(EAST_ASIA, font_name);
}

/// Returns the run's existing East Asian font, if any.
pub(crate) fn east_asia_font(run: &XmlElement) -> Option<&str> {
    run.child(RUN_PROPS)?.child(RUN_FONTS)?.attr(EAST_ASIA)
}

/// Finds the named child element, inserting an empty one at position 0 if
/// missing. `w:rPr` must precede run content and `w:rFonts` must lead the
/// property list, so new elements always go first.
fn ensure_first_child<'a>(parent: &'a mut XmlElement, name: &str) -> &'a mut XmlElement {
    let pos = parent
        .children
        .iter()
        .position(|node| matches!(node, XmlNode::Element(e) if e.name == name));
    let pos = match pos {
        Some(pos) => pos,
        None => {
            parent
                .children
                .insert(0, XmlNode::Element(XmlElement::new(name)));
            0
        }
    };
    match &mut parent.children[pos] {
        XmlNode::Element(e) => e,
        _ => unreachable!("position() matched an element node"),
    }
}
