//! Hierarchy model
//!
//! Call and type hierarchies are expanded exactly one level around a root.
//! The root is a [`HierarchyNode`]; everything on the far side of an
//! [`Edge`] is a bare [`HierarchyItem`], which has no edge lists at all.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::lsp::Range;
use super::symbol::{Symbol, SymbolKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyKind {
    Call,
    Type,
}

impl fmt::Display for HierarchyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => f.write_str("call"),
            Self::Type => f.write_str("type"),
        }
    }
}

/// Provider-native hierarchy entry.
///
/// Serializes in the LSP `CallHierarchyItem`/`TypeHierarchyItem` shape so it
/// can be echoed back verbatim on follow-up requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyItem {
    pub name: String,
    pub kind: SymbolKind,
    pub uri: String,
    pub range: Range,
    pub selection_range: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Opaque provider state preserved between prepare and expand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// One edge of a traversal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub counterpart: HierarchyItem,
    pub call_sites: Vec<Range>,
}

impl Edge {
    pub fn new(counterpart: HierarchyItem, call_sites: Vec<Range>) -> Self {
        Self {
            counterpart,
            call_sites,
        }
    }
}

/// The expanded root of a traversal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    pub item: HierarchyItem,
    pub edges_in: Vec<Edge>,
    pub edges_out: Vec<Edge>,
}

/// Outcome of a depth-one traversal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyResult {
    pub kind: HierarchyKind,
    pub root: Option<HierarchyItem>,
    pub incoming: Vec<Edge>,
    pub outgoing: Vec<Edge>,
}

impl HierarchyResult {
    pub fn empty(kind: HierarchyKind) -> Self {
        Self {
            kind,
            root: None,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty() && self.outgoing.is_empty()
    }

    pub fn into_node(self) -> Option<HierarchyNode> {
        let item = self.root?;
        Some(HierarchyNode {
            item,
            edges_in: self.incoming,
            edges_out: self.outgoing,
        })
    }
}

/// How far below a symbol the children walk descends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChildDepth {
    Limited(u32),
    All,
}

impl ChildDepth {
    pub const MAX_LIMITED: u32 = 3;

    /// Whether nodes at `depth` (1 = direct children) are collected
    pub fn allows(self, depth: u32) -> bool {
        match self {
            Self::Limited(max) => depth <= max,
            Self::All => true,
        }
    }
}

impl Default for ChildDepth {
    fn default() -> Self {
        Self::Limited(1)
    }
}

impl FromStr for ChildDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match s.parse::<u32>() {
            Ok(n) if (1..=Self::MAX_LIMITED).contains(&n) => Ok(Self::Limited(n)),
            _ => Err(format!(
                "Invalid depth '{}': expected 1, 2, 3 or \"all\"",
                s
            )),
        }
    }
}

impl TryFrom<String> for ChildDepth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChildDepth> for String {
    fn from(depth: ChildDepth) -> Self {
        depth.to_string()
    }
}

impl fmt::Display for ChildDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{}", n),
            Self::All => f.write_str("all"),
        }
    }
}

/// A descendant collected by the children walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NestedSymbol<'a> {
    pub symbol: &'a Symbol,
    /// 1 for direct children
    pub depth: u32,
    pub parent: &'a str,
}
