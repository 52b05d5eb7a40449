//! Symbol model definitions
//!
//! Core types for representing a document's symbol tree.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::lsp::{Position, Range};

/// A named, ranged entity in a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub range: Range,
    pub selection_range: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Symbol>,
}

impl Symbol {
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        range: Range,
        selection_range: Range,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            range,
            selection_range,
            detail: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Symbol>) -> Self {
        self.children = children;
        self
    }

    /// Position used when querying the provider about this symbol
    pub fn anchor(&self) -> Position {
        self.selection_range.start
    }

    /// Pre-order walk over a forest, yielding each symbol with its parent
    pub fn walk<'a>(symbols: &'a [Symbol]) -> Vec<(&'a Symbol, Option<&'a Symbol>)> {
        fn visit<'a>(
            symbols: &'a [Symbol],
            parent: Option<&'a Symbol>,
            out: &mut Vec<(&'a Symbol, Option<&'a Symbol>)>,
        ) {
            for sym in symbols {
                out.push((sym, parent));
                visit(&sym.children, Some(sym), out);
            }
        }

        let mut out = Vec::new();
        visit(symbols, None, &mut out);
        out
    }

    /// Depth-first pre-order flatten of a forest
    pub fn flatten(symbols: &[Symbol]) -> Vec<&Symbol> {
        Self::walk(symbols).into_iter().map(|(s, _)| s).collect()
    }
}

/// Symbol kind, serialized as the LSP integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum SymbolKind {
    File,
    Module,
    Namespace,
    Package,
    Class,
    Method,
    Property,
    Field,
    Constructor,
    Enum,
    Interface,
    Function,
    Variable,
    Constant,
    String,
    Number,
    Boolean,
    Array,
    Object,
    Key,
    Null,
    EnumMember,
    Struct,
    Event,
    Operator,
    TypeParameter,
}

impl SymbolKind {
    /// Convert from LSP SymbolKind number
    pub fn from_lsp(kind: u32) -> Self {
        match kind {
            1 => Self::File,
            2 => Self::Module,
            3 => Self::Namespace,
            4 => Self::Package,
            5 => Self::Class,
            6 => Self::Method,
            7 => Self::Property,
            8 => Self::Field,
            9 => Self::Constructor,
            10 => Self::Enum,
            11 => Self::Interface,
            12 => Self::Function,
            13 => Self::Variable,
            14 => Self::Constant,
            15 => Self::String,
            16 => Self::Number,
            17 => Self::Boolean,
            18 => Self::Array,
            19 => Self::Object,
            20 => Self::Key,
            21 => Self::Null,
            22 => Self::EnumMember,
            23 => Self::Struct,
            24 => Self::Event,
            25 => Self::Operator,
            26 => Self::TypeParameter,
            _ => Self::Variable, // Default fallback
        }
    }

    /// Convert to LSP SymbolKind number
    pub fn to_lsp(self) -> u32 {
        match self {
            Self::File => 1,
            Self::Module => 2,
            Self::Namespace => 3,
            Self::Package => 4,
            Self::Class => 5,
            Self::Method => 6,
            Self::Property => 7,
            Self::Field => 8,
            Self::Constructor => 9,
            Self::Enum => 10,
            Self::Interface => 11,
            Self::Function => 12,
            Self::Variable => 13,
            Self::Constant => 14,
            Self::String => 15,
            Self::Number => 16,
            Self::Boolean => 17,
            Self::Array => 18,
            Self::Object => 19,
            Self::Key => 20,
            Self::Null => 21,
            Self::EnumMember => 22,
            Self::Struct => 23,
            Self::Event => 24,
            Self::Operator => 25,
            Self::TypeParameter => 26,
        }
    }
}

impl From<u32> for SymbolKind {
    fn from(kind: u32) -> Self {
        Self::from_lsp(kind)
    }
}

impl From<SymbolKind> for u32 {
    fn from(kind: SymbolKind) -> Self {
        kind.to_lsp()
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::File => "file",
            Self::Module => "module",
            Self::Namespace => "namespace",
            Self::Package => "package",
            Self::Class => "class",
            Self::Method => "method",
            Self::Property => "property",
            Self::Field => "field",
            Self::Constructor => "constructor",
            Self::Enum => "enum",
            Self::Interface => "interface",
            Self::Function => "function",
            Self::Variable => "variable",
            Self::Constant => "constant",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Key => "key",
            Self::Null => "null",
            Self::EnumMember => "enum_member",
            Self::Struct => "struct",
            Self::Event => "event",
            Self::Operator => "operator",
            Self::TypeParameter => "type_parameter",
        };
        write!(f, "{}", s)
    }
}

/// Languages with a known default language server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Cpp,
    Go,
    Java,
    Kotlin,
    CSharp,
    TypeScript,
    JavaScript,
    Python,
    Ruby,
    PHP,
    Lua,
    #[default]
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Self::Rust,
            "c" | "cpp" | "cc" | "cxx" | "h" | "hpp" | "hxx" => Self::Cpp,
            "go" => Self::Go,
            "java" => Self::Java,
            "kt" | "kts" => Self::Kotlin,
            "cs" => Self::CSharp,
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "py" | "pyi" => Self::Python,
            "rb" | "rake" | "gemspec" => Self::Ruby,
            "php" => Self::PHP,
            "lua" => Self::Lua,
            _ => Self::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// LSP `languageId` used in `textDocument/didOpen`
    pub fn lsp_id(&self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Cpp => "cpp",
            Self::Go => "go",
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::CSharp => "csharp",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Ruby => "ruby",
            Self::PHP => "php",
            Self::Lua => "lua",
            Self::Unknown => "plaintext",
        }
    }

    pub fn all() -> &'static [Language] {
        &[
            Self::Rust,
            Self::Cpp,
            Self::Go,
            Self::Java,
            Self::Kotlin,
            Self::CSharp,
            Self::TypeScript,
            Self::JavaScript,
            Self::Python,
            Self::Ruby,
            Self::PHP,
            Self::Lua,
        ]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lsp_id())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|lang| lang.lsp_id() == lower)
            .or_else(|| match lower.as_str() {
                "c" | "c++" => Some(Self::Cpp),
                "c#" | "cs" => Some(Self::CSharp),
                "ts" => Some(Self::TypeScript),
                "js" => Some(Self::JavaScript),
                "py" => Some(Self::Python),
                _ => None,
            })
            .ok_or_else(|| format!("Unknown language: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str, line: u32) -> Symbol {
        Symbol::new(
            name,
            SymbolKind::Function,
            Range::from_coords(line, 0, line + 1, 0),
            Range::from_coords(line, 3, line, 3 + name.len() as u32),
        )
    }

    #[test]
    fn test_flatten_is_preorder() {
        let tree = vec![
            sym("a", 0)
                .with_children(vec![sym("b", 1).with_children(vec![sym("c", 2)])]),
            sym("d", 5),
        ];
        let names: Vec<_> = Symbol::flatten(&tree)
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_walk_reports_parent() {
        let tree = vec![sym("outer", 0).with_children(vec![sym("inner", 1)])];
        let walked = Symbol::walk(&tree);
        assert!(walked[0].1.is_none());
        assert_eq!(walked[1].1.map(|p| p.name.as_str()), Some("outer"));
    }

    #[test]
    fn test_symbol_kind_lsp_conversion() {
        assert_eq!(SymbolKind::from_lsp(5), SymbolKind::Class);
        assert_eq!(SymbolKind::from_lsp(12), SymbolKind::Function);
        assert_eq!(SymbolKind::from_lsp(99), SymbolKind::Variable);
        assert_eq!(SymbolKind::Class.to_lsp(), 5);
    }

    #[test]
    fn test_symbol_kind_serializes_as_integer() {
        let json = serde_json::to_string(&SymbolKind::Method).unwrap();
        assert_eq!(json, "6");
        let kind: SymbolKind = serde_json::from_str("23").unwrap();
        assert_eq!(kind, SymbolKind::Struct);
    }

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("ts"), Language::TypeScript);
        assert_eq!(Language::from_extension("txt"), Language::Unknown);
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("Rust".parse::<Language>(), Ok(Language::Rust));
        assert_eq!("py".parse::<Language>(), Ok(Language::Python));
        assert!("cobol".parse::<Language>().is_err());
    }
}
