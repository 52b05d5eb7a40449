//! Application container for symlens

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cli::{OutputContext, OutputFormat};
use crate::models::config::SymlensConfig;
use crate::services::config::{ConfigService, DefaultConfigService};
use crate::services::{LspProvider, SymbolFacade};

pub struct App {
    root: PathBuf,
    pub(crate) output: OutputContext,
    pub(crate) config_service: Arc<dyn ConfigService>,
    pub(crate) facade: SymbolFacade,
    provider: Arc<LspProvider>,
}

impl App {
    pub async fn new(root: Option<PathBuf>, format: OutputFormat) -> anyhow::Result<Self> {
        let root = match root {
            Some(root) => root.canonicalize()?,
            None => std::env::current_dir()?,
        };

        tracing::debug!("Initializing symlens at {:?}", root);

        let output = OutputContext::new(root.clone(), format);
        let config_service = Arc::new(DefaultConfigService::new(&root));
        let config = match config_service.load(false).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring configuration: {}", e);
                SymlensConfig::default()
            }
        };

        let provider = Arc::new(LspProvider::new(
            root.clone(),
            config.lsp.servers.clone(),
            config.timeouts.longest(),
        ));

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("Interrupted, cancelling in-flight requests");
                on_interrupt.cancel();
            }
        });

        let facade = SymbolFacade::new(provider.clone(), &config).with_cancel(cancel);

        Ok(Self {
            root,
            output,
            config_service,
            facade,
            provider,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stop every language server started by this process
    pub async fn shutdown(&self) {
        self.provider.shutdown().await;
    }
}
