//! DOCX table rendering as Markdown pipe-tables.

/// Drops each cell whose text repeats the cell immediately before it.
///
/// Merged cells surface as repeated text, so this collapses them. The
/// comparison starts from an empty string, which also drops leading and
/// consecutive empty cells.
pub fn dedup_row_cells(row: &[String]) -> Vec<String> {
    let mut kept = Vec::with_capacity(row.len());
    let mut last = "";
    for cell in row {
        if cell.as_str() == last {
            continue;
        }
        last = cell.as_str();
        kept.push(cell.clone());
    }
    kept
}

/// Renders rows as a pipe-table; `None` when no row survives deduplication.
pub fn render_table(rows: &[Vec<String>]) -> Option<String> {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| dedup_row_cells(row))
        .filter(|row| !row.is_empty())
        .collect();
    let header = rows.first()?;

    let mut markdown = String::new();
    for (idx, row) in rows.iter().enumerate() {
        markdown.push('|');
        for cell in row {
            markdown.push(' ');
            markdown.push_str(&cell_text(cell));
            markdown.push_str(" |");
        }
        markdown.push('\n');
        if idx == 0 {
            markdown.push('|');
            markdown.push_str(&" --- |".repeat(header.len()));
            markdown.push('\n');
        }
    }
    Some(markdown)
}

/// Cell text on one line with pipes escaped.
fn cell_text(cell: &str) -> String {
    cell.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}
