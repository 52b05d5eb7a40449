//! Symbol reference parsing for CLI commands
//!
//! Accepted forms (positions are zero-based, as in LSP):
//!
//! - `src/lib.rs:10:4`       position
//! - `src/lib.rs#parse`      name
//! - `src/lib.rs:10:4#parse` name, with the position as a hint
//! - a JSON request object in either the nested or the flat shape

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::models::LookupRequest;
use crate::models::lsp::{normalize_uri, path_to_uri};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    pub file: PathBuf,
    pub line: Option<u32>,
    pub character: Option<u32>,
    pub name: Option<String>,
}

impl ParsedReference {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("Reference cannot be empty");
        }

        let (location, name) = match input.rsplit_once('#') {
            Some((location, name)) => {
                let name = name.trim();
                if name.is_empty() {
                    bail!("Symbol name after '#' cannot be empty\nExample: src/lib.rs#parse");
                }
                (location, Some(name.to_string()))
            }
            None => (input, None),
        };

        match Self::split_path_and_position(location)? {
            Some((file, rest)) => {
                let (line, character) = Self::parse_position(rest)?;
                Ok(Self {
                    file: PathBuf::from(file),
                    line: Some(line),
                    character: Some(character),
                    name,
                })
            }
            None if name.is_some() => Ok(Self {
                file: PathBuf::from(location),
                line: None,
                character: None,
                name,
            }),
            None => bail!(
                "Invalid reference. Expected file:line:character or file#name\nExample: src/main.rs:9:4"
            ),
        }
    }

    /// Split at the first `:` that starts a number, skipping a drive letter
    fn split_path_and_position(input: &str) -> Result<Option<(&str, &str)>> {
        let bytes = input.as_bytes();
        let is_windows = bytes.len() > 2
            && bytes.get(1) == Some(&b':')
            && bytes.first().is_some_and(u8::is_ascii_alphabetic);
        let search_start = if is_windows { 2 } else { 0 };

        for (byte_idx, ch) in input[search_start..].char_indices() {
            if ch != ':' {
                continue;
            }
            let split = search_start + byte_idx;
            match input[split + 1..].chars().next() {
                Some(c) if c.is_ascii_digit() => {
                    return Ok(Some((&input[..split], &input[split + 1..])));
                }
                Some('-') => bail!(
                    "Invalid position: negative values not allowed. Positions are zero-based.\nExample: src/main.rs:9:4"
                ),
                _ => {}
            }
        }
        Ok(None)
    }

    fn parse_position(rest: &str) -> Result<(u32, u32)> {
        let Some((line, character)) = rest.split_once(':') else {
            bail!(
                "Missing character in '{}'. Expected line:character (zero-based)\nExample: src/main.rs:9:4",
                rest
            );
        };

        let line: u32 = line.parse().map_err(|_| {
            anyhow::anyhow!("Invalid line '{}': must be a non-negative integer", line)
        })?;
        let character: u32 = character.parse().map_err(|_| {
            anyhow::anyhow!(
                "Invalid character '{}': must be a non-negative integer",
                character
            )
        })?;

        Ok((line, character))
    }

    /// Resolve the file against `root` and build the façade request
    pub fn into_request(self, root: &Path) -> Result<LookupRequest> {
        let file = if self.file.is_absolute() {
            self.file
        } else {
            root.join(&self.file)
        };
        let canonical = file
            .canonicalize()
            .with_context(|| format!("File not found: {}", file.display()))?;

        Ok(LookupRequest {
            uri: path_to_uri(&canonical),
            line: self.line,
            character: self.character,
            name: self.name,
        })
    }
}

/// Parse a CLI reference or a JSON request object into a request
pub fn parse_request(input: &str, root: &Path) -> Result<LookupRequest> {
    let trimmed = input.trim();
    if trimmed.starts_with('{') {
        let value: serde_json::Value =
            serde_json::from_str(trimmed).context("Request is not valid JSON")?;
        let mut request = LookupRequest::from_json(value)?;
        request.uri = normalize_uri(&request.uri);
        return Ok(request);
    }
    ParsedReference::parse(input)?.into_request(root)
}

/// Resolve a bare file argument into a document uri
pub fn parse_document(input: &str, root: &Path) -> Result<String> {
    let input = input.trim();
    if input.contains("://") {
        return Ok(input.to_string());
    }
    let path = root.join(input);
    let canonical = path
        .canonicalize()
        .with_context(|| format!("File not found: {}", path.display()))?;
    Ok(path_to_uri(&canonical))
}
