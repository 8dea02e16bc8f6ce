//! Fixed-width table rendering for chat replies.
//!
//! Each line is wrapped in backticks so Slack renders it as an inline code
//! span; alignment comes from padding alone.

/// A table column: header text and fixed display width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub width: usize,
}

impl Column {
    #[must_use]
    pub const fn new(header: &'static str, width: usize) -> Self {
        Self { header, width }
    }
}

/// Node table layout.
pub const NODE_COLUMNS: [Column; 4] = [
    Column::new("NAME", 55),
    Column::new("INTERNAL-IP", 15),
    Column::new("AGE", 7),
    Column::new("VERSION", 10),
];

/// Pod table layout.
pub const POD_COLUMNS: [Column; 5] = [
    Column::new("NAME", 55),
    Column::new("STATUS", 10),
    Column::new("AGE", 7),
    Column::new("POD IP", 15),
    Column::new("NODE", 20),
];

/// Something that renders as one table row.
pub trait TableRow {
    /// Cell values in column order.
    fn cells(&self) -> Vec<String>;
}

/// Left-justify `value` to `width`. Wider values are kept whole.
#[must_use]
pub fn pad_cell(value: &str, width: usize) -> String {
    format!("{value:<width$}")
}

fn render_line<'a>(columns: &[Column], values: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("`");
    for (column, value) in columns.iter().zip(values) {
        line.push_str(&pad_cell(value, column.width));
    }
    line.push('`');
    line
}

/// Render a header line plus one line per row, joined by newlines.
///
/// An empty `rows` slice yields only the header line. Missing trailing cells
/// render as empty padded fields; extra cells are ignored.
#[must_use]
pub fn format_table<R: TableRow>(columns: &[Column], rows: &[R]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_line(columns, columns.iter().map(|c| c.header)));

    for row in rows {
        let cells = row.cells();
        let values = cells
            .iter()
            .map(String::as_str)
            .chain(std::iter::repeat(""));
        lines.push(render_line(columns, values));
    }

    lines.join("\n")
}
