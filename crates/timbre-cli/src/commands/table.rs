use comfy_table::{presets::ASCII_MARKDOWN, Table};

/// Render rows under a header as a plain-text table, one line per row.
pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN).set_header(headers.to_vec());
    for row in rows {
        table.add_row(row.clone());
    }
    format!("{table}\n")
}
