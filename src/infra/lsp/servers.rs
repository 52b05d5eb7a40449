//! Language server launch commands
//!
//! Built-in defaults per language, overridable from `[lsp.servers]`.

use std::time::Duration;

use crate::error::LspError;
use crate::models::config::LspServerCommands;
use crate::models::symbol::Language;

/// How long `initialize` may take, by how heavy the server is to boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerTier {
    /// rust-analyzer, clangd, gopls
    Fast,
    /// intelephense, ruby-lsp, lua-language-server
    Standard,
    /// pyright, typescript-language-server, jdtls, kotlin
    Slow,
}

impl ServerTier {
    pub fn init_timeout(self) -> Duration {
        match self {
            Self::Fast => Duration::from_secs(15),
            Self::Standard => Duration::from_secs(45),
            Self::Slow => Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ServerSpec {
    pub name: &'static str,
    pub command: &'static str,
    pub args: &'static [&'static str],
    pub install_hint: &'static str,
    pub tier: ServerTier,
}

/// Built-in server for `language`
pub fn default_server(language: Language) -> Option<ServerSpec> {
    let spec = match language {
        Language::Rust => ServerSpec {
            name: "rust-analyzer",
            command: "rust-analyzer",
            args: &[],
            install_hint: "rustup component add rust-analyzer",
            tier: ServerTier::Fast,
        },
        Language::Cpp => ServerSpec {
            name: "clangd",
            command: "clangd",
            args: &["--background-index"],
            install_hint: "apt install clangd (or brew install llvm)",
            tier: ServerTier::Fast,
        },
        Language::Go => ServerSpec {
            name: "gopls",
            command: "gopls",
            args: &["serve"],
            install_hint: "go install golang.org/x/tools/gopls@latest",
            tier: ServerTier::Fast,
        },
        Language::Java => ServerSpec {
            name: "jdtls",
            command: "jdtls",
            args: &[],
            install_hint: "brew install jdtls",
            tier: ServerTier::Slow,
        },
        Language::Kotlin => ServerSpec {
            name: "kotlin-lsp",
            command: "kotlin-lsp",
            args: &["--stdio"],
            install_hint: "brew install JetBrains/utils/kotlin-lsp",
            tier: ServerTier::Slow,
        },
        Language::CSharp => ServerSpec {
            name: "csharp-ls",
            command: "csharp-ls",
            args: &[],
            install_hint: "dotnet tool install --global csharp-ls",
            tier: ServerTier::Slow,
        },
        Language::TypeScript | Language::JavaScript => ServerSpec {
            name: "typescript-language-server",
            command: "typescript-language-server",
            args: &["--stdio"],
            install_hint: "npm install -g typescript-language-server typescript",
            tier: ServerTier::Slow,
        },
        Language::Python => ServerSpec {
            name: "pyright",
            command: "pyright-langserver",
            args: &["--stdio"],
            install_hint: "npm install -g pyright",
            tier: ServerTier::Slow,
        },
        Language::Ruby => ServerSpec {
            name: "ruby-lsp",
            command: "ruby-lsp",
            args: &[],
            install_hint: "gem install ruby-lsp",
            tier: ServerTier::Standard,
        },
        Language::PHP => ServerSpec {
            name: "intelephense",
            command: "intelephense",
            args: &["--stdio"],
            install_hint: "npm install -g intelephense",
            tier: ServerTier::Standard,
        },
        Language::Lua => ServerSpec {
            name: "lua-language-server",
            command: "lua-language-server",
            args: &[],
            install_hint: "brew install lua-language-server",
            tier: ServerTier::Standard,
        },
        Language::Unknown => return None,
    };
    Some(spec)
}

/// A resolved program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub install_hint: String,
    pub init_timeout: Duration,
}

/// Pick the configured override for `language`, else the built-in server
pub fn resolve_command(
    language: Language,
    overrides: &LspServerCommands,
) -> Result<ServerCommand, LspError> {
    let spec = default_server(language);

    if let Some(custom) = overrides.command_for(language) {
        let mut parts = custom.split_whitespace().map(str::to_string);
        if let Some(program) = parts.next() {
            return Ok(ServerCommand {
                name: program.clone(),
                program,
                args: parts.collect(),
                install_hint: format!("check the [lsp.servers] {} entry", language),
                init_timeout: spec
                    .map(|s| s.tier.init_timeout())
                    .unwrap_or(ServerTier::Slow.init_timeout()),
            });
        }
    }

    let spec = spec.ok_or_else(|| LspError::UnsupportedLanguage(language.to_string()))?;
    Ok(ServerCommand {
        name: spec.name.to_string(),
        program: spec.command.to_string(),
        args: spec.args.iter().map(|a| a.to_string()).collect(),
        install_hint: spec.install_hint.to_string(),
        init_timeout: spec.tier.init_timeout(),
    })
}
