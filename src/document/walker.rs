//! Traversal of text-bearing containers within one XML part
//!
//! WordprocessingML nests text in a small, closed set of containers: block
//! lists hold paragraphs and tables, table cells hold block lists again
//! (tables nest without limit), and text boxes carry their own block list
//! inside `w:txbxContent` — reachable through a paragraph's run subtree for
//! both VML (`w:pict`) and DrawingML (`wps:txbx`) embeddings. The walker
//! visits every paragraph of a part in document order and leaves mutation
//! entirely to the visitor; it only fails when the structure itself makes a
//! complete traversal impossible.

use crate::error::ConvertError;
use crate::xml::{XmlElement, XmlNode};

const PARAGRAPH: &str = "w:p";
const TABLE: &str = "w:tbl";
const TABLE_ROW: &str = "w:tr";
const TABLE_CELL: &str = "w:tc";
const TEXTBOX_CONTENT: &str = "w:txbxContent";

/// Visits every paragraph reachable from `container`'s block list, in
/// document order: body blocks first, recursing depth-first into tables and
/// into any text-box bodies embedded in a paragraph's runs.
///
/// `part` names the package part for error context. The visitor receives
/// each `w:p` element; its direct `w:r` children are the paragraph's run
/// sequence.
pub(crate) fn visit_paragraphs<F>(
    container: &mut XmlElement,
    part: &str,
    visit: &mut F,
) -> Result<(), ConvertError>
where
    F: FnMut(&mut XmlElement),
{
    visit_blocks(&mut container.children, part, visit)
}

/// One pass over a block list (document body, header/footer body, table
/// cell, or text-box body). Elements that are neither paragraphs nor tables
/// (section properties, bookmarks, content controls) are left alone.
fn visit_blocks<F>(
    blocks: &mut [XmlNode],
    part: &str,
    visit: &mut F,
) -> Result<(), ConvertError>
where
    F: FnMut(&mut XmlElement),
{
    for node in blocks.iter_mut() {
        let XmlNode::Element(elem) = node else {
            continue;
        };
        match elem.name.as_str() {
            PARAGRAPH => visit_paragraph(elem, part, visit)?,
            TABLE => visit_table(elem, part, visit)?,
            _ => {}
        }
    }
    Ok(())
}

fn visit_paragraph<F>(
    paragraph: &mut XmlElement,
    part: &str,
    visit: &mut F,
) -> Result<(), ConvertError>
where
    F: FnMut(&mut XmlElement),
{
    visit(paragraph);
    // Text boxes live inside the paragraph's drawing/pict runs; their
    // bodies are full block lists of their own.
    visit_textboxes(&mut paragraph.children, part, visit)
}

fn visit_table<F>(
    table: &mut XmlElement,
    part: &str,
    visit: &mut F,
) -> Result<(), ConvertError>
where
    F: FnMut(&mut XmlElement),
{
    let mut row_index = 0usize;
    for node in table.children.iter_mut() {
        let XmlNode::Element(row) = node else {
            continue;
        };
        if row.name != TABLE_ROW {
            // w:tblPr, w:tblGrid and friends carry no text.
            continue;
        }
        row_index += 1;

        let mut cells = 0usize;
        for cell_node in row.children.iter_mut() {
            let XmlNode::Element(cell) = cell_node else {
                continue;
            };
            if cell.name != TABLE_CELL {
                continue;
            }
            cells += 1;
            visit_blocks(&mut cell.children, part, visit)?;
        }

        if cells == 0 {
            return Err(ConvertError::MalformedStructure {
                part: part.to_string(),
                reason: format!("table row {row_index} has no cells"),
            });
        }
    }
    Ok(())
}

/// Depth-first search of a paragraph's subtree for `w:txbxContent`
/// elements. Each one found is treated as a fresh block list (and is not
/// descended into twice — its own paragraphs repeat the search for nested
/// text boxes).
fn visit_textboxes<F>(
    nodes: &mut [XmlNode],
    part: &str,
    visit: &mut F,
) -> Result<(), ConvertError>
where
    F: FnMut(&mut XmlElement),
{
    for node in nodes.iter_mut() {
        let XmlNode::Element(elem) = node else {
            continue;
        };
        if elem.name == TEXTBOX_CONTENT {
            visit_blocks(&mut elem.children, part, visit)?;
        } else {
            visit_textboxes(&mut elem.children, part, visit)?;
        }
    }
    Ok(())
}
