//! Tabular preview of comma-separated text.

use crate::core::html::escape_text;

pub const MAX_PREVIEW_ROWS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePreview {
    pub headers: Vec<String>,
    /// At most `max_rows` data rows.
    pub rows: Vec<Vec<String>>,
    /// Data rows in the source, including those not kept.
    pub total_rows: usize,
}

impl TablePreview {
    /// First line is the header. Cells are split on `,` and trimmed; quoting
    /// is not interpreted.
    pub fn parse(text: &str, max_rows: usize) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::default();
        }
        let mut lines = text.lines();
        let headers = lines.next().map(split_cells).unwrap_or_default();
        let mut rows = Vec::new();
        let mut total_rows = 0;
        for line in lines {
            total_rows += 1;
            if rows.len() < max_rows {
                rows.push(split_cells(line));
            }
        }
        Self {
            headers,
            rows,
            total_rows,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.total_rows > self.rows.len()
    }

    pub fn truncation_note(&self) -> Option<String> {
        self.is_truncated().then(|| {
            format!(
                "Showing first {} of {} rows. Download to see all data.",
                self.rows.len(),
                self.total_rows
            )
        })
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<table class=\"csv-table\"><thead><tr>");
        for header in &self.headers {
            html.push_str(&format!("<th>{}</th>", escape_text(header)));
        }
        html.push_str("</tr></thead><tbody>");
        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", escape_text(cell)));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        if let Some(note) = self.truncation_note() {
            html.push_str(&format!("<p><em>{note}</em></p>"));
        }
        html
    }
}

fn split_cells(line: &str) -> Vec<String> {
    line.split(',').map(|cell| cell.trim().to_owned()).collect()
}
