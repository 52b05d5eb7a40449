//! Language server lifecycle
//!
//! One client per language, started on first use and shared afterwards.
//! Concurrent first requests wait for a single start instead of racing to
//! spawn duplicate servers. The start runs on its own task, so a caller
//! that gives up early never strands the entry or the server process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, RwLock};

use super::client::LspClient;
use super::servers::resolve_command;
use crate::error::LspError;
use crate::models::config::LspServerCommands;
use crate::models::symbol::Language;

enum ClientState {
    Initializing(Arc<Notify>),
    Ready(Arc<LspClient>),
}

type ClientMap = Arc<RwLock<HashMap<Language, ClientState>>>;

pub struct LspManager {
    root: PathBuf,
    servers: LspServerCommands,
    request_timeout: Duration,
    clients: ClientMap,
}

impl LspManager {
    pub fn new(root: PathBuf, servers: LspServerCommands, request_timeout: Duration) -> Self {
        Self {
            root,
            servers,
            request_timeout,
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get or start the client for `language`.
    ///
    /// A dead client is dropped here and replaced by a fresh start; the
    /// request that found it dead is not re-issued.
    pub async fn get_client(&self, language: Language) -> Result<Arc<LspClient>, LspError> {
        loop {
            // Phase 1: snapshot under the read lock
            let (ready, pending) = {
                let clients = self.clients.read().await;
                match clients.get(&language) {
                    Some(ClientState::Ready(client)) => (Some(Arc::clone(client)), None),
                    Some(ClientState::Initializing(notify)) => (None, Some(Arc::clone(notify))),
                    None => (None, None),
                }
            };

            // Phase 2: live client
            if let Some(client) = ready {
                if !client.is_terminated() {
                    return Ok(client);
                }
                tracing::warn!("{} language server died, restarting", language);
                let mut clients = self.clients.write().await;
                if matches!(
                    clients.get(&language),
                    Some(ClientState::Ready(c)) if Arc::ptr_eq(c, &client)
                ) {
                    clients.remove(&language);
                }
                continue;
            }

            // Phase 3: someone else is starting it
            if let Some(notify) = pending {
                let notified = notify.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.is_initializing(language).await {
                    notified.await;
                }
                continue;
            }

            // Phase 4: start it ourselves
            let notify = Arc::new(Notify::new());
            {
                let mut clients = self.clients.write().await;
                if clients.contains_key(&language) {
                    continue;
                }
                clients.insert(language, ClientState::Initializing(Arc::clone(&notify)));
            }

            let start = tokio::spawn(Self::start_and_publish(
                Arc::clone(&self.clients),
                language,
                self.servers.clone(),
                self.root.clone(),
                self.request_timeout,
                notify,
            ));

            return match start.await {
                Ok(result) => result,
                Err(e) => Err(LspError::ServerStart(format!(
                    "{} start task failed: {}",
                    language, e
                ))),
            };
        }
    }

    /// Start the server and record the outcome, then wake every waiter
    async fn start_and_publish(
        clients: ClientMap,
        language: Language,
        servers: LspServerCommands,
        root: PathBuf,
        request_timeout: Duration,
        notify: Arc<Notify>,
    ) -> Result<Arc<LspClient>, LspError> {
        let result = match resolve_command(language, &servers) {
            Ok(command) => LspClient::spawn(language, &command, &root, request_timeout).await,
            Err(e) => Err(e),
        };

        let mut map = clients.write().await;
        match &result {
            Ok(client) => {
                map.insert(language, ClientState::Ready(Arc::clone(client)));
            }
            Err(e) => {
                tracing::debug!("{} language server failed to start: {}", language, e);
                map.remove(&language);
            }
        }
        drop(map);
        notify.notify_waiters();

        result
    }

    async fn is_initializing(&self, language: Language) -> bool {
        matches!(
            self.clients.read().await.get(&language),
            Some(ClientState::Initializing(_))
        )
    }

    pub async fn shutdown_all(&self) {
        let running: Vec<Arc<LspClient>> = {
            let mut clients = self.clients.write().await;
            clients
                .drain()
                .filter_map(|(_, state)| match state {
                    ClientState::Ready(client) => Some(client),
                    ClientState::Initializing(_) => None,
                })
                .collect()
        };

        for client in running {
            client.shutdown().await;
            tracing::info!("{} language server stopped", client.language());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(servers: LspServerCommands) -> (tempfile::TempDir, LspManager) {
        let dir = tempfile::tempdir().unwrap();
        let manager = LspManager::new(dir.path().to_path_buf(), servers, Duration::from_secs(5));
        (dir, manager)
    }

    #[tokio::test]
    async fn test_unknown_language_is_unsupported() {
        let (_dir, manager) = manager(LspServerCommands::default());
        let err = manager.get_client(Language::Unknown).await.err().unwrap();
        assert!(matches!(err, LspError::UnsupportedLanguage(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_reports_not_installed_each_call() {
        let (_dir, manager) = manager(LspServerCommands {
            rust: Some("symlens-test-no-such-server --stdio".to_string()),
            ..Default::default()
        });

        for _ in 0..2 {
            let err = manager.get_client(Language::Rust).await.err().unwrap();
            assert!(matches!(err, LspError::ServerNotInstalled { .. }));
        }
        assert!(manager.clients.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_start_still_settles() {
        // `sleep` never answers initialize and exits after a second
        let (_dir, manager) = manager(LspServerCommands {
            python: Some("sleep 1".to_string()),
            ..Default::default()
        });

        let gave_up = tokio::time::timeout(
            Duration::from_millis(200),
            manager.get_client(Language::Python),
        )
        .await;
        assert!(gave_up.is_err());
        assert!(manager.is_initializing(Language::Python).await);

        let settled = tokio::time::timeout(Duration::from_secs(20), async {
            while manager.is_initializing(Language::Python).await {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        })
        .await;
        assert!(settled.is_ok(), "start never recorded its outcome");
        assert!(manager.clients.read().await.is_empty());

        // The language is usable again: the next caller gets an answer
        let next = tokio::time::timeout(
            Duration::from_secs(20),
            manager.get_client(Language::Python),
        )
        .await;
        assert!(matches!(next, Ok(Err(_))));
    }

    #[tokio::test]
    async fn test_waiters_wake_when_start_fails() {
        let (_dir, manager) = manager(LspServerCommands {
            python: Some("sleep 1".to_string()),
            ..Default::default()
        });

        let (first, second) = tokio::time::timeout(Duration::from_secs(20), async {
            tokio::join!(
                manager.get_client(Language::Python),
                manager.get_client(Language::Python)
            )
        })
        .await
        .unwrap();
        assert!(first.is_err());
        assert!(second.is_err());
    }
}
