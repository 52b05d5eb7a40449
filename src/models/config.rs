//! Configuration model for symlens
//!
//! Every field carries a serde default so partial files are valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::hierarchy::ChildDepth;
use super::symbol::Language;

/// symlens configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SymlensConfig {
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub children: ChildrenConfig,

    #[serde(default)]
    pub lsp: LspConfig,
}

/// Per-operation provider deadlines, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "defaults::call_prepare_ms")]
    pub call_prepare: u64,

    #[serde(default = "defaults::call_branch_ms")]
    pub call_branch: u64,

    #[serde(default = "defaults::type_prepare_ms")]
    pub type_prepare: u64,

    #[serde(default = "defaults::type_branch_ms")]
    pub type_branch: u64,

    #[serde(default = "defaults::references_ms")]
    pub references: u64,

    #[serde(default = "defaults::definition_ms")]
    pub definition: u64,

    #[serde(default = "defaults::symbols_ms")]
    pub symbols: u64,

    #[serde(default = "defaults::hover_ms")]
    pub hover: u64,

    #[serde(default = "defaults::preview_ms")]
    pub preview: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            call_prepare: defaults::call_prepare_ms(),
            call_branch: defaults::call_branch_ms(),
            type_prepare: defaults::type_prepare_ms(),
            type_branch: defaults::type_branch_ms(),
            references: defaults::references_ms(),
            definition: defaults::definition_ms(),
            symbols: defaults::symbols_ms(),
            hover: defaults::hover_ms(),
            preview: defaults::preview_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn call_prepare(&self) -> Duration {
        Duration::from_millis(self.call_prepare)
    }

    pub fn call_branch(&self) -> Duration {
        Duration::from_millis(self.call_branch)
    }

    pub fn type_prepare(&self) -> Duration {
        Duration::from_millis(self.type_prepare)
    }

    pub fn type_branch(&self) -> Duration {
        Duration::from_millis(self.type_branch)
    }

    pub fn references(&self) -> Duration {
        Duration::from_millis(self.references)
    }

    pub fn definition(&self) -> Duration {
        Duration::from_millis(self.definition)
    }

    pub fn symbols(&self) -> Duration {
        Duration::from_millis(self.symbols)
    }

    pub fn hover(&self) -> Duration {
        Duration::from_millis(self.hover)
    }

    pub fn preview(&self) -> Duration {
        Duration::from_millis(self.preview)
    }

    /// Upper bound used for raw JSON-RPC requests
    pub fn longest(&self) -> Duration {
        [
            self.call_prepare,
            self.call_branch,
            self.type_prepare,
            self.type_branch,
            self.references,
            self.definition,
            self.symbols,
            self.hover,
            self.preview,
        ]
        .into_iter()
        .max()
        .map(Duration::from_millis)
        .unwrap_or_default()
    }
}

/// Table output limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Data rows kept before the truncation row is appended
    #[serde(default = "defaults::max_rows")]
    pub max_rows: usize,

    /// Reference counts above this are sampled instead of listed
    #[serde(default = "defaults::sampling_ceiling")]
    pub sampling_ceiling: usize,

    #[serde(default = "defaults::sample_size")]
    pub sample_size: usize,

    /// Hard cap on characters per field
    #[serde(default = "defaults::field_char_cap")]
    pub field_char_cap: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_rows: defaults::max_rows(),
            sampling_ceiling: defaults::sampling_ceiling(),
            sample_size: defaults::sample_size(),
            field_char_cap: defaults::field_char_cap(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChildrenConfig {
    #[serde(default)]
    pub default_depth: ChildDepth,
}

/// Language server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LspConfig {
    #[serde(default)]
    pub servers: LspServerCommands,
}

/// Language server command overrides, e.g. `rust = "rust-analyzer"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LspServerCommands {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rust: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kotlin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csharp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typescript: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub javascript: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruby: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub php: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lua: Option<String>,
}

impl LspServerCommands {
    pub fn command_for(&self, language: Language) -> Option<&str> {
        let cmd = match language {
            Language::Rust => &self.rust,
            Language::Cpp => &self.cpp,
            Language::Go => &self.go,
            Language::Java => &self.java,
            Language::Kotlin => &self.kotlin,
            Language::CSharp => &self.csharp,
            Language::TypeScript => &self.typescript,
            Language::JavaScript => &self.javascript,
            Language::Python => &self.python,
            Language::Ruby => &self.ruby,
            Language::PHP => &self.php,
            Language::Lua => &self.lua,
            Language::Unknown => return None,
        };
        cmd.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

mod defaults {
    // Timeouts (ms)
    pub fn call_prepare_ms() -> u64 {
        2_000
    }
    pub fn call_branch_ms() -> u64 {
        10_000
    }
    pub fn type_prepare_ms() -> u64 {
        10_000
    }
    pub fn type_branch_ms() -> u64 {
        10_000
    }
    pub fn references_ms() -> u64 {
        30_000
    }
    pub fn definition_ms() -> u64 {
        10_000
    }
    pub fn symbols_ms() -> u64 {
        10_000
    }
    pub fn hover_ms() -> u64 {
        2_000
    }
    pub fn preview_ms() -> u64 {
        2_000
    }

    // Output
    pub fn max_rows() -> usize {
        200
    }
    pub fn sampling_ceiling() -> usize {
        500
    }
    pub fn sample_size() -> usize {
        5
    }
    pub fn field_char_cap() -> usize {
        200
    }
}
