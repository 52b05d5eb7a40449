//! Source context around a location

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::provider::CodeProvider;
use crate::infra::timeout::TimeoutGuard;
use crate::models::Location;

pub struct PreviewExtractor {
    provider: Arc<dyn CodeProvider>,
    guard: TimeoutGuard,
}

impl PreviewExtractor {
    pub fn new(provider: Arc<dyn CodeProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            guard: TimeoutGuard::new(timeout),
        }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.guard = self.guard.with_cancel(token);
        self
    }

    /// Up to three lines centred on `line`; empty on any failure
    pub async fn preview(&self, uri: &str, line: u32) -> String {
        match self.document(uri).await {
            Some(text) => context_lines(&text, line),
            None => String::new(),
        }
    }

    /// Previews for the first `limit` locations, reading each document once.
    /// Locations past `limit` get an empty preview.
    pub async fn previews(&self, locations: &[Location], limit: usize) -> Vec<String> {
        let mut documents: HashMap<&str, Option<String>> = HashMap::new();
        let mut out = Vec::with_capacity(locations.len());

        for (i, loc) in locations.iter().enumerate() {
            if i >= limit {
                out.push(String::new());
                continue;
            }
            if !documents.contains_key(loc.uri.as_str()) {
                let text = self.document(&loc.uri).await;
                documents.insert(loc.uri.as_str(), text);
            }
            let preview = documents
                .get(loc.uri.as_str())
                .and_then(|text| text.as_deref())
                .map(|text| context_lines(text, loc.range.start.line))
                .unwrap_or_default();
            out.push(preview);
        }

        out
    }

    /// The identifier touching `character` on `line`, if any
    pub async fn word_at(&self, uri: &str, line: u32, character: u32) -> Option<String> {
        let text = self.document(uri).await?;
        let line_text = text.lines().nth(line as usize)?;
        identifier_at(line_text, character)
    }

    async fn document(&self, uri: &str) -> Option<String> {
        match self.guard.race(self.provider.read_document(uri)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                debug!("Preview read of {} failed: {}", uri, e);
                None
            }
            Err(e) => {
                debug!("Preview read of {} gave up: {}", uri, e);
                None
            }
        }
    }
}

/// Lines `line - 1 ..= line + 1` of `text`, clipped to the document
pub fn context_lines(text: &str, line: u32) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let line = line as usize;
    if line >= lines.len() {
        return String::new();
    }

    let start = line.saturating_sub(1);
    let end = (line + 1).min(lines.len() - 1);
    lines[start..=end].join("\n")
}

fn identifier_at(line: &str, character: u32) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let is_ident = |c: &char| c.is_alphanumeric() || *c == '_';

    let mut idx = (character as usize).min(chars.len());
    // Cursor just past the end of a word
    if chars.get(idx).is_none_or(|c| !is_ident(c)) && idx > 0 && is_ident(&chars[idx - 1]) {
        idx -= 1;
    }
    if !chars.get(idx).is_some_and(is_ident) {
        return None;
    }

    let start = chars[..idx]
        .iter()
        .rposition(|c| !is_ident(c))
        .map_or(0, |p| p + 1);
    let end = chars[idx..]
        .iter()
        .position(|c| !is_ident(c))
        .map_or(chars.len(), |p| idx + p);
    Some(chars[start..end].iter().collect())
}
