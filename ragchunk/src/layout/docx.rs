use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};

use crate::error::{ExtractError, ExtractResult};

/// A body-level DOCX element in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum DocxBlock {
    /// Row-major cell texts.
    Table(Vec<Vec<String>>),
    Paragraph(String),
}

pub fn read_docx_blocks(bytes: &[u8]) -> ExtractResult<Vec<DocxBlock>> {
    let docx = docx_rs::read_docx(bytes).map_err(ExtractError::corrupt)?;
    let blocks = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => {
                Some(DocxBlock::Paragraph(paragraph_text(paragraph)))
            }
            DocumentChild::Table(table) => Some(DocxBlock::Table(table_cells(table))),
            _ => None,
        })
        .collect();
    Ok(blocks)
}

pub(crate) fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_children(&paragraph.children, &mut text);
    text
}

fn push_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for item in &run.children {
                    match item {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_children(&link.children, text),
            _ => {}
        }
    }
}

// docx-rs models rows and cells as enums; any future non-cell variant is skipped.
#[allow(unreachable_patterns)]
fn table_cells(table: &Table) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .filter_map(|child| match child {
            TableChild::TableRow(row) => Some(row),
            _ => None,
        })
        .map(|row| {
            row.cells
                .iter()
                .filter_map(|child| match child {
                    TableRowChild::TableCell(cell) => Some(cell),
                    _ => None,
                })
                .map(|cell| {
                    cell.children
                        .iter()
                        .filter_map(|content| match content {
                            TableCellContent::Paragraph(paragraph) => {
                                Some(paragraph_text(paragraph))
                            }
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .collect()
        })
        .collect()
}
