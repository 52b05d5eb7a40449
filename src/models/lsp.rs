//! LSP Common Types
//!
//! Position, range and location vocabulary shared by the façade, the
//! provider trait and the table codec. All coordinates are zero-based.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ============================================================================
// Core LSP Types
// ============================================================================

/// Position within a document (0-indexed, LSP standard)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

/// Range within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Shorthand for `Range::new(Position::new(..), Position::new(..))`
    pub fn from_coords(start_line: u32, start_char: u32, end_line: u32, end_char: u32) -> Self {
        Self {
            start: Position::new(start_line, start_char),
            end: Position::new(end_line, end_char),
        }
    }

    /// Convert a single position to a range
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Inclusive containment check (the end position counts as inside)
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Size key used to pick the innermost of several enclosing ranges.
    ///
    /// Compares line span first, then character span on the boundary lines.
    pub fn extent(&self) -> (u32, i64) {
        let lines = self.end.line.saturating_sub(self.start.line);
        let chars = i64::from(self.end.character) - i64::from(self.start.character);
        (lines, chars)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A location returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}

impl Location {
    pub fn new(uri: impl Into<String>, range: Range) -> Self {
        Self {
            uri: uri.into(),
            range,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uri, self.range)
    }
}

/// Hover text for a position, with the span it describes when known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HoverInfo {
    pub contents: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

impl HoverInfo {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            range: None,
        }
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }
}

// ============================================================================
// URI helpers
// ============================================================================

pub fn path_to_uri(path: &Path) -> String {
    let abs_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };

    let path_str = abs_path.to_string_lossy();
    let encoded: String = path_str
        .chars()
        .map(|c| match c {
            '/' | '.' | '-' | '_' | '~' => c.to_string(),
            c if c.is_ascii_alphanumeric() => c.to_string(),
            c => {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf)
                    .bytes()
                    .map(|b| format!("%{:02X}", b))
                    .collect()
            }
        })
        .collect();

    format!("file://{encoded}")
}

/// Accepts both `file://` URIs and bare paths
pub fn uri_to_path(uri: &str) -> PathBuf {
    let path = match uri.strip_prefix("file://") {
        Some(p) => p,
        None => return PathBuf::from(uri),
    };

    // Windows: file:///C:/path → C:/path (strip leading /)
    #[cfg(windows)]
    let path = path.strip_prefix('/').unwrap_or(path);

    PathBuf::from(percent_decode(path))
}

/// Normalize caller input into a `file://` URI
pub fn normalize_uri(input: &str) -> String {
    if input.contains("://") {
        input.to_string()
    } else {
        path_to_uri(Path::new(input))
    }
}

fn percent_decode(input: &str) -> String {
    let mut result = Vec::with_capacity(input.len());
    let mut bytes = input.bytes();

    while let Some(byte) = bytes.next() {
        if byte == b'%' {
            let high = bytes.next().and_then(hex_value);
            let low = bytes.next().and_then(hex_value);
            if let (Some(h), Some(l)) = (high, low) {
                result.push((h << 4) | l);
                continue;
            }
        }
        result.push(byte);
    }

    String::from_utf8_lossy(&result).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = Range::from_coords(2, 4, 2, 7);
        assert!(range.contains(Position::new(2, 4)));
        assert!(range.contains(Position::new(2, 7)));
        assert!(!range.contains(Position::new(2, 8)));
        assert!(!range.contains(Position::new(1, 5)));
    }

    #[test]
    fn test_range_extent_orders_by_lines_first() {
        let wide = Range::from_coords(0, 0, 10, 0);
        let narrow = Range::from_coords(3, 0, 4, 80);
        assert!(narrow.extent() < wide.extent());
    }

    #[test]
    fn test_range_display() {
        assert_eq!(Range::from_coords(1, 2, 3, 4).to_string(), "1:2-3:4");
    }

    #[test]
    fn test_uri_roundtrip_with_spaces() {
        let path = PathBuf::from("/path with spaces/file.rs");
        let uri = path_to_uri(&path);
        assert!(uri.contains("%20"));
        assert_eq!(uri_to_path(&uri), path);
    }

    #[test]
    fn test_uri_to_path_accepts_bare_path() {
        assert_eq!(uri_to_path("/tmp/a.rs"), PathBuf::from("/tmp/a.rs"));
    }

    #[test]
    fn test_normalize_uri_keeps_existing_scheme() {
        assert_eq!(normalize_uri("file:///a/b.rs"), "file:///a/b.rs");
        assert!(normalize_uri("/a/b.rs").starts_with("file:///a/b.rs"));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("hello%20world"), "hello%20world".replace("%20", " "));
        assert_eq!(percent_decode("normal"), "normal");
    }
}
