//! Tabular wire format
//!
//! Every line, header included, is a ` | `-separated list of cells closed
//! by the `EOL` sentinel cell and a newline. Fields never contain raw
//! newlines or unescaped pipes, so one line is always one row.

use std::fmt;

use serde::Serialize;

use crate::models::config::OutputConfig;

pub const DELIMITER: &str = " | ";
pub const SENTINEL: &str = "EOL";

/// Unescaped cells of one data row
pub type Row = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TableKind {
    Locations,
    DocumentSymbols,
    Children,
    IncomingCalls,
    OutgoingCalls,
    Supertypes,
    Subtypes,
    Hover,
}

impl TableKind {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Locations => &["URI", "RANGE", "PREVIEW"],
            Self::DocumentSymbols => &[
                "NAME",
                "KIND",
                "RANGE",
                "SELECTION",
                "PARENT",
                "HOVER_INFO",
            ],
            Self::Children => &["NAME", "KIND", "DEPTH", "RANGE", "SELECTION", "PARENT"],
            Self::IncomingCalls => &[
                "FROM_NAME",
                "FROM_KIND",
                "FROM_URI",
                "FROM_RANGE",
                "CALL_SITES",
            ],
            Self::OutgoingCalls => &["TO_NAME", "TO_KIND", "TO_URI", "TO_RANGE", "CALL_SITES"],
            Self::Supertypes => &[
                "SUPER_NAME",
                "SUPER_KIND",
                "SUPER_URI",
                "SUPER_RANGE",
                "DETAIL",
            ],
            Self::Subtypes => &["SUB_NAME", "SUB_KIND", "SUB_URI", "SUB_RANGE", "DETAIL"],
            Self::Hover => &["NAME", "RANGE", "HOVER_INFO"],
        }
    }

    pub fn header(self) -> String {
        terminate(self.columns().join(DELIMITER))
    }
}

/// An encoded table; immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResult {
    pub kind: TableKind,
    pub header: String,
    pub rows: Vec<String>,
    pub truncated: bool,
    pub original_row_count: usize,
}

impl TableResult {
    /// Header-only table
    pub fn empty(kind: TableKind) -> Self {
        Self {
            kind,
            header: kind.header(),
            rows: Vec::new(),
            truncated: false,
            original_row_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header and rows, each line closed by `\n`
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(
            self.header.len() + 1 + self.rows.iter().map(|r| r.len() + 1).sum::<usize>(),
        );
        for line in std::iter::once(&self.header).chain(&self.rows) {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for TableResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Row encoder bound to the configured output limits
#[derive(Debug, Clone)]
pub struct TableCodec {
    field_char_cap: usize,
    max_rows: usize,
    sampling_ceiling: usize,
    sample_size: usize,
}

impl Default for TableCodec {
    fn default() -> Self {
        Self::new(&OutputConfig::default())
    }
}

impl TableCodec {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            field_char_cap: config.field_char_cap,
            max_rows: config.max_rows,
            sampling_ceiling: config.sampling_ceiling,
            sample_size: config.sample_size,
        }
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Cap to `field_char_cap` chars, then escape backslashes, line breaks and pipes
    pub fn escape_field(&self, field: &str) -> String {
        let capped: String = field.chars().take(self.field_char_cap).collect();
        escape(&capped)
    }

    pub fn encode_row<S: AsRef<str>>(&self, fields: &[S]) -> String {
        let cells: Vec<String> = fields
            .iter()
            .map(|f| self.escape_field(f.as_ref()))
            .collect();
        terminate(cells.join(DELIMITER))
    }

    pub fn encode<I>(&self, kind: TableKind, rows: I) -> TableResult
    where
        I: IntoIterator<Item = Row>,
    {
        let rows: Vec<String> = rows.into_iter().map(|r| self.encode_row(&r)).collect();
        TableResult {
            kind,
            header: kind.header(),
            original_row_count: rows.len(),
            rows,
            truncated: false,
        }
    }

    /// Encode and truncate to the configured row ceiling
    pub fn encode_bounded<I>(&self, kind: TableKind, rows: I) -> TableResult
    where
        I: IntoIterator<Item = Row>,
    {
        truncate(self.encode(kind, rows), self.max_rows)
    }

    /// How many of `total` rows survive encoding
    pub fn visible_rows(&self, total: usize, sampled: bool) -> usize {
        if sampled && total > self.sampling_ceiling {
            self.sample_size.min(total)
        } else {
            total.min(self.max_rows)
        }
    }

    /// Encode a reference list, sampling when it is too large to be useful.
    ///
    /// A sampled table keeps `sample_size` rows plus one explanatory row and
    /// skips the regular truncation pass.
    pub fn encode_sampled(&self, kind: TableKind, rows: Vec<Row>) -> TableResult {
        let total = rows.len();
        if total <= self.sampling_ceiling {
            return self.encode_bounded(kind, rows);
        }

        let kept = self.sample_size.min(total);
        let mut table = self.encode(kind, rows.into_iter().take(kept));
        // Not subject to the field cap
        let notice = format!(
            "{} results found, showing the first {}. Narrow the query \
             (a more specific symbol, or a definition lookup) to see the rest",
            total, kept
        );
        table.rows.push(terminate(escape(&notice)));
        table.truncated = true;
        table.original_row_count = total;
        table
    }
}

/// Keep at most `max_rows` data rows, appending one synthetic row when rows
/// were dropped.
///
/// An already truncated table is cut again from its surviving rows; when
/// those already fit, it is returned unchanged.
pub fn truncate(table: TableResult, max_rows: usize) -> TableResult {
    let fits = if table.truncated {
        table.rows.len().saturating_sub(1) <= max_rows
    } else {
        table.original_row_count <= max_rows
    };
    if fits {
        return table;
    }

    let total = table.original_row_count;
    let hidden = total - max_rows;
    let mut rows = table.rows;
    rows.truncate(max_rows);
    rows.push(terminate(format!(
        "{} rows truncated out of {} total",
        hidden, total
    )));

    TableResult {
        rows,
        truncated: true,
        ..table
    }
}

/// Count data rows in rendered table text (header excluded)
pub fn count_rows(text: &str) -> usize {
    let suffix = format!("{}{}", DELIMITER, SENTINEL);
    text.lines()
        .filter(|line| line.ends_with(&suffix))
        .count()
        .saturating_sub(1)
}

fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

fn terminate(mut line: String) -> String {
    line.push_str(DELIMITER);
    line.push_str(SENTINEL);
    line
}
