//! Lookup request model
//!
//! Callers reference a symbol either by zero-based position or by name.
//! Two inbound shapes exist (LSP-style nested and agent-style flat); both
//! are folded into [`LookupRequest`] at the boundary and validated into a
//! [`LookupTarget`] before any provider call.

use serde::{Deserialize, Serialize};

use super::lsp::Position;
use super::symbol::Symbol;
use crate::error::FacadeError;

/// A loose, caller-supplied reference to a symbol in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Validated form of a [`LookupRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTarget {
    Position(Position),
    /// Name lookup; `hint` is the optional position supplied alongside
    Name { name: String, hint: Option<Position> },
}

impl LookupRequest {
    pub fn at(uri: impl Into<String>, line: u32, character: u32) -> Self {
        Self {
            uri: uri.into(),
            line: Some(line),
            character: Some(character),
            name: None,
        }
    }

    pub fn named(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_hint(mut self, line: u32, character: u32) -> Self {
        self.line = Some(line);
        self.character = Some(character);
        self
    }

    fn position(&self) -> Option<Position> {
        match (self.line, self.character) {
            (Some(line), Some(character)) => Some(Position::new(line, character)),
            _ => None,
        }
    }

    /// Validate and classify the request
    pub fn target(&self) -> Result<LookupTarget, FacadeError> {
        if self.uri.trim().is_empty() {
            return Err(FacadeError::MalformedInput(
                "Request is missing a document uri".to_string(),
            ));
        }

        // Blank means absent; otherwise the name is matched verbatim
        let name = self.name.as_deref().filter(|n| !n.trim().is_empty());

        match (name, self.position()) {
            (Some(name), hint) => Ok(LookupTarget::Name {
                name: name.to_string(),
                hint,
            }),
            (None, Some(pos)) => Ok(LookupTarget::Position(pos)),
            (None, None) => Err(FacadeError::MalformedInput(
                "Provide either both line and character, or a non-empty symbol name".to_string(),
            )),
        }
    }

    /// Parse either inbound shape from JSON
    pub fn from_json(value: serde_json::Value) -> Result<Self, FacadeError> {
        serde_json::from_value::<WireLookupRequest>(value)
            .map(Self::from)
            .map_err(|e| FacadeError::MalformedInput(format!("Unrecognized request shape: {}", e)))
    }
}

/// Outcome of resolving a [`LookupRequest`].
///
/// `symbol` is `None` exactly when `error` is set; `alternatives` is only
/// present when two or more symbols matched by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatorResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<Symbol>,
    pub is_unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<Symbol>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LocatorResult {
    pub fn found(symbol: Symbol) -> Self {
        Self {
            symbol: Some(symbol),
            is_unique: true,
            alternatives: None,
            error: None,
        }
    }

    /// First match is canonical; the rest become alternatives
    pub fn from_matches(mut matches: Vec<Symbol>) -> Option<Self> {
        if matches.is_empty() {
            return None;
        }
        let canonical = matches.remove(0);
        if matches.is_empty() {
            return Some(Self::found(canonical));
        }
        Some(Self {
            symbol: Some(canonical),
            is_unique: false,
            alternatives: Some(matches),
            error: None,
        })
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            symbol: None,
            is_unique: false,
            alternatives: None,
            error: Some(error.into()),
        }
    }

    pub fn alternative_count(&self) -> usize {
        self.alternatives.as_ref().map_or(0, Vec::len)
    }
}

/// Inbound request shapes.
///
/// Variants have disjoint required fields (`textDocument` + `position`
/// versus `uri`), so the untagged match is unambiguous.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireLookupRequest {
    Nested(NestedLookup),
    Flat(FlatLookup),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextDocumentRef {
    pub uri: String,
}

/// `{ textDocument: { uri }, position: { line, character }, symbolName? }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedLookup {
    pub text_document: TextDocumentRef,
    pub position: Position,
    #[serde(default)]
    pub symbol_name: Option<String>,
}

/// `{ uri, line?, character?, symbolName? | name? }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatLookup {
    pub uri: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub character: Option<u32>,
    #[serde(default, alias = "name")]
    pub symbol_name: Option<String>,
}

impl From<WireLookupRequest> for LookupRequest {
    fn from(wire: WireLookupRequest) -> Self {
        match wire {
            WireLookupRequest::Nested(n) => Self {
                uri: n.text_document.uri,
                line: Some(n.position.line),
                character: Some(n.position.character),
                name: n.symbol_name,
            },
            WireLookupRequest::Flat(f) => Self {
                uri: f.uri,
                line: f.line,
                character: f.character,
                name: f.symbol_name,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_position_target() {
        let req = LookupRequest::at("file:///a.rs", 3, 7);
        assert_eq!(req.target().unwrap(), LookupTarget::Position(Position::new(3, 7)));
    }

    #[test]
    fn test_name_takes_precedence_over_position() {
        let req = LookupRequest::named("file:///a.rs", "foo").with_hint(1, 2);
        assert_eq!(
            req.target().unwrap(),
            LookupTarget::Name {
                name: "foo".to_string(),
                hint: Some(Position::new(1, 2)),
            }
        );
    }

    #[test]
    fn test_blank_name_falls_back_to_position() {
        let req = LookupRequest {
            name: Some("   ".to_string()),
            ..LookupRequest::at("file:///a.rs", 0, 0)
        };
        assert!(matches!(req.target().unwrap(), LookupTarget::Position(_)));
    }

    #[test]
    fn test_name_is_kept_verbatim() {
        let req = LookupRequest::named("file:///a.rs", " foo ");
        assert_eq!(
            req.target().unwrap(),
            LookupTarget::Name {
                name: " foo ".to_string(),
                hint: None,
            }
        );
    }

    #[test]
    fn test_missing_reference_is_malformed() {
        let req = LookupRequest {
            uri: "file:///a.rs".to_string(),
            line: Some(4),
            ..Default::default()
        };
        assert!(matches!(req.target(), Err(FacadeError::MalformedInput(_))));
    }

    #[test]
    fn test_missing_uri_is_malformed() {
        let req = LookupRequest::named("", "foo");
        assert!(matches!(req.target(), Err(FacadeError::MalformedInput(_))));
    }

    #[test]
    fn test_nested_shape() {
        let req = LookupRequest::from_json(json!({
            "textDocument": { "uri": "file:///x.ts" },
            "position": { "line": 4, "character": 2 }
        }))
        .unwrap();
        assert_eq!(req, LookupRequest::at("file:///x.ts", 4, 2));
    }

    #[test]
    fn test_flat_shape_with_symbol_name() {
        let req = LookupRequest::from_json(json!({
            "uri": "file:///x.ts",
            "symbolName": "render"
        }))
        .unwrap();
        assert_eq!(req.name.as_deref(), Some("render"));
        assert_eq!(req.line, None);
    }

    #[test]
    fn test_flat_shape_accepts_name_alias() {
        let req =
            LookupRequest::from_json(json!({ "uri": "file:///x.ts", "name": "Foo" })).unwrap();
        assert_eq!(req.name.as_deref(), Some("Foo"));
    }

    #[test]
    fn test_locator_result_from_matches() {
        use crate::models::{Range, SymbolKind};

        let sym = |line| {
            Symbol::new(
                "foo",
                SymbolKind::Function,
                Range::from_coords(line, 0, line + 2, 1),
                Range::from_coords(line, 3, line, 6),
            )
        };

        assert!(LocatorResult::from_matches(vec![]).is_none());

        let single = LocatorResult::from_matches(vec![sym(1)]).unwrap();
        assert!(single.is_unique);
        assert!(single.alternatives.is_none());

        let many = LocatorResult::from_matches(vec![sym(2), sym(9), sym(14)]).unwrap();
        assert!(!many.is_unique);
        assert_eq!(many.symbol.as_ref().unwrap().range.start.line, 2);
        assert_eq!(many.alternative_count(), 2);
    }

    #[test]
    fn test_failed_result_serializes_without_symbol() {
        let value = serde_json::to_value(LocatorResult::failed("nope")).unwrap();
        assert_eq!(value["error"], "nope");
        assert_eq!(value["isUnique"], false);
        assert!(value.get("symbol").is_none());
    }

    #[test]
    fn test_unknown_shape_is_malformed() {
        let err = LookupRequest::from_json(json!({ "path": "x.ts" })).unwrap_err();
        assert!(matches!(err, FacadeError::MalformedInput(_)));
    }
}
