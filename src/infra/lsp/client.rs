//! Language server client
//!
//! One client per server process. Requests are multiplexed by JSON-RPC id;
//! a background task reads frames and completes the matching waiter.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock, oneshot};
use tokio::time::timeout;

use super::protocol::{
    ClientInfo, InitializeParams, InitializeResult, LogMessageParams, Message, MessageType,
    Notification, Request, RequestId, Response, ResponseError, ServerCapabilities, error_codes,
};
use super::servers::ServerCommand;
use super::transport::{FramedReader, write_message};
use crate::error::LspError;
use crate::models::lsp::path_to_uri;
use crate::models::symbol::Language;

type PendingRequest = oneshot::Sender<Response>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

#[derive(Debug)]
struct DocumentState {
    version: i32,
    content_hash: u64,
}

/// Cancels a request on the server if its waiter is dropped early
struct InflightRequest {
    id: u64,
    client: Arc<LspClient>,
    settled: bool,
}

impl Drop for InflightRequest {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let id = self.id;
        let client = Arc::clone(&self.client);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                client.cancel_request(id).await;
            });
        }
    }
}

pub struct LspClient {
    language: Language,
    process: Mutex<Option<Child>>,
    writer: Mutex<Option<BoxedWriter>>,
    next_id: AtomicU64,
    pending: RwLock<HashMap<u64, PendingRequest>>,
    documents: RwLock<HashMap<String, DocumentState>>,
    capabilities: RwLock<Option<ServerCapabilities>>,
    request_timeout: Duration,
    terminated: AtomicBool,
    shutting_down: AtomicBool,
}

impl LspClient {
    /// Launch `command` in `root` and complete the initialize handshake
    pub async fn spawn(
        language: Language,
        command: &ServerCommand,
        root: &Path,
        request_timeout: Duration,
    ) -> Result<Arc<Self>, LspError> {
        tracing::info!(
            "Starting {} language server: {} {:?}",
            language,
            command.program,
            command.args
        );

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => LspError::ServerNotInstalled {
                    name: command.name.clone(),
                    install_hint: command.install_hint.clone(),
                },
                _ => LspError::ServerStart(format!("{}: {}", command.program, e)),
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LspError::ServerStart("Failed to get stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LspError::ServerStart("Failed to get stdout".to_string()))?;

        let client = Self::connect(language, stdout, stdin, request_timeout);
        *client.process.lock().await = Some(child);

        if let Err(e) = client.initialize(root, command.init_timeout).await {
            client.abort_start().await;
            return Err(e);
        }
        tracing::info!("{} language server ready", language);
        Ok(client)
    }

    /// Attach to an already-open byte stream pair and start the reader task
    pub fn connect<R, W>(
        language: Language,
        reader: R,
        writer: W,
        request_timeout: Duration,
    ) -> Arc<Self>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let client = Arc::new(Self {
            language,
            process: Mutex::new(None),
            writer: Mutex::new(Some(Box::new(writer))),
            next_id: AtomicU64::new(1),
            pending: RwLock::new(HashMap::new()),
            documents: RwLock::new(HashMap::new()),
            capabilities: RwLock::new(None),
            request_timeout,
            terminated: AtomicBool::new(false),
            shutting_down: AtomicBool::new(false),
        });

        let reader_client = Arc::clone(&client);
        tokio::spawn(async move {
            reader_client
                .read_loop(FramedReader::new(BufReader::new(reader)))
                .await;
        });

        client
    }

    pub async fn initialize(
        self: &Arc<Self>,
        root: &Path,
        deadline: Duration,
    ) -> Result<(), LspError> {
        let params = InitializeParams {
            process_id: Some(std::process::id()),
            root_uri: Some(path_to_uri(root)),
            capabilities: Self::client_capabilities(),
            client_info: Some(ClientInfo {
                name: "symlens".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        };

        let result: InitializeResult = self
            .request_within("initialize", Some(serde_json::to_value(params)?), deadline)
            .await?;

        if let Some(info) = &result.server_info {
            tracing::debug!(
                "{} server: {} {}",
                self.language,
                info.name,
                info.version.as_deref().unwrap_or("")
            );
        }
        *self.capabilities.write().await = Some(result.capabilities);

        self.notify("initialized", Some(json!({}))).await
    }

    /// Only the features the provider issues requests for
    fn client_capabilities() -> Value {
        let link = json!({ "linkSupport": true });
        json!({
            "general": { "positionEncodings": ["utf-16"] },
            "window": { "workDoneProgress": false },
            "textDocument": {
                "synchronization": { "didSave": false },
                "hover": { "contentFormat": ["markdown", "plaintext"] },
                "declaration": link,
                "definition": link,
                "typeDefinition": link,
                "implementation": link,
                "references": {},
                "documentSymbol": {
                    "symbolKind": { "valueSet": (1..=26).collect::<Vec<_>>() },
                    "hierarchicalDocumentSymbolSupport": true
                },
                "callHierarchy": {},
                "typeHierarchy": {}
            },
            "workspace": { "configuration": true, "workspaceFolders": false }
        })
    }

    /// Send a request and wait up to the client's request timeout
    pub async fn request<T: DeserializeOwned>(
        self: &Arc<Self>,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, LspError> {
        self.request_within(method, params, self.request_timeout).await
    }

    async fn request_within<T: DeserializeOwned>(
        self: &Arc<Self>,
        method: &str,
        params: Option<Value>,
        deadline: Duration,
    ) -> Result<T, LspError> {
        if self.terminated.load(Ordering::Acquire) {
            return Err(LspError::ServerTerminated {
                language: self.language,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.write().await.insert(id, tx);

        let mut inflight = InflightRequest {
            id,
            client: Arc::clone(self),
            settled: false,
        };

        tracing::trace!("{} LSP request {}: {}", self.language, id, method);
        self.write(&Request::new(id, method, params)).await?;

        let outcome = timeout(deadline, rx).await;
        inflight.settled = true;

        match outcome {
            Ok(Ok(response)) => match response.into_result() {
                Ok(result) => {
                    serde_json::from_value(result).map_err(|e| LspError::Protocol(e.to_string()))
                }
                Err(err) if err.code == error_codes::SERVER_TERMINATED => {
                    Err(LspError::ServerTerminated {
                        language: self.language,
                    })
                }
                Err(err) => Err(err.into()),
            },
            Ok(Err(_)) => Err(LspError::RequestCancelled),
            Err(_) => {
                self.cancel_request(id).await;
                Err(LspError::Timeout(format!(
                    "{} '{}' timed out after {}ms",
                    self.language,
                    method,
                    deadline.as_millis()
                )))
            }
        }
    }

    async fn cancel_request(&self, id: u64) {
        if self.pending.write().await.remove(&id).is_some() {
            let _ = self.notify("$/cancelRequest", Some(json!({ "id": id }))).await;
        }
    }

    /// Send a notification (no response expected)
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), LspError> {
        self.write(&Notification::new(method, params)).await
    }

    async fn write<T: serde::Serialize>(&self, message: &T) -> Result<(), LspError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(LspError::NotConnected)?;
        write_message(writer, message).await?;
        Ok(())
    }

    async fn read_loop<R>(self: Arc<Self>, mut reader: FramedReader<R>)
    where
        R: tokio::io::AsyncBufRead + Unpin,
    {
        loop {
            match reader.read_message().await {
                Ok(message) => self.handle_message(message).await,
                Err(e) => {
                    if !self.shutting_down.load(Ordering::Acquire) {
                        tracing::warn!("{} LSP read error: {}", self.language, e);
                    }
                    self.terminated.store(true, Ordering::Release);
                    self.fail_pending(
                        error_codes::SERVER_TERMINATED,
                        format!("{} language server terminated", self.language),
                    )
                    .await;
                    break;
                }
            }
        }
    }

    async fn fail_pending(&self, code: i32, reason: String) {
        let mut pending = self.pending.write().await;
        if !pending.is_empty() {
            tracing::debug!("Failing {} pending requests: {}", pending.len(), reason);
        }
        for (id, sender) in pending.drain() {
            let _ = sender.send(Response::failure(
                RequestId::Number(id),
                ResponseError::new(code, reason.clone()),
            ));
        }
    }

    async fn handle_message(&self, message: Message) {
        match message {
            Message::Response(response) => {
                let Some(id) = response.id.as_ref().and_then(RequestId::as_number) else {
                    tracing::debug!("Dropping response without usable id");
                    return;
                };
                match self.pending.write().await.remove(&id) {
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => tracing::debug!("Response for unknown request {} (timed out?)", id),
                }
            }
            Message::Request(request) => self.handle_server_request(request).await,
            Message::Notification(notification) => match notification.method.as_str() {
                "window/logMessage" | "window/showMessage" => {
                    if let Some(params) = notification
                        .params
                        .and_then(|p| serde_json::from_value::<LogMessageParams>(p).ok())
                    {
                        self.log_server_message(&params);
                    }
                }
                method => tracing::trace!("Unhandled notification: {}", method),
            },
        }
    }

    fn log_server_message(&self, params: &LogMessageParams) {
        match params.kind {
            MessageType::Error => tracing::warn!("LSP {}: {}", self.language, params.message),
            MessageType::Warning | MessageType::Info => {
                tracing::debug!("LSP {}: {}", self.language, params.message)
            }
            MessageType::Log | MessageType::Debug => {
                tracing::trace!("LSP {}: {}", self.language, params.message)
            }
        }
    }

    async fn handle_server_request(&self, request: Request) {
        let response = match request.method.as_str() {
            "workspace/configuration" => {
                let items = request
                    .params
                    .as_ref()
                    .and_then(|p| p.get("items"))
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len);
                Response::success(request.id, Value::Array(vec![json!({}); items]))
            }
            "client/registerCapability"
            | "client/unregisterCapability"
            | "window/workDoneProgress/create" => Response::success(request.id, Value::Null),
            method => {
                tracing::debug!("Unhandled server request: {}", method);
                Response::failure(
                    request.id,
                    ResponseError::new(
                        error_codes::METHOD_NOT_FOUND,
                        format!("Method not found: {}", method),
                    ),
                )
            }
        };

        if let Err(e) = self.write(&response).await {
            tracing::debug!("Failed to answer server request: {}", e);
        }
    }

    /// Open the document, or push new content if it changed since last sync
    pub async fn sync_document(&self, uri: &str, content: &str) -> Result<(), LspError> {
        let hash = crate::infra::hash_content(content);
        let mut documents = self.documents.write().await;

        match documents.get_mut(uri) {
            Some(state) if state.content_hash == hash => Ok(()),
            Some(state) => {
                state.version += 1;
                state.content_hash = hash;
                self.notify(
                    "textDocument/didChange",
                    Some(json!({
                        "textDocument": { "uri": uri, "version": state.version },
                        "contentChanges": [{ "text": content }]
                    })),
                )
                .await
            }
            None => {
                self.notify(
                    "textDocument/didOpen",
                    Some(json!({
                        "textDocument": {
                            "uri": uri,
                            "languageId": self.language.lsp_id(),
                            "version": 1,
                            "text": content
                        }
                    })),
                )
                .await?;
                documents.insert(
                    uri.to_string(),
                    DocumentState {
                        version: 1,
                        content_hash: hash,
                    },
                );
                Ok(())
            }
        }
    }

    /// Whether the server advertised the provider selected by `pick`
    pub async fn supports(&self, pick: impl FnOnce(&ServerCapabilities) -> &Option<Value>) -> bool {
        match self.capabilities.read().await.as_ref() {
            Some(caps) => ServerCapabilities::supports(pick(caps)),
            // Unknown capabilities: let the server answer for itself
            None => true,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// shutdown request, exit notification, then wait and kill
    /// Kill a server that never finished initializing; the reader task
    /// would otherwise keep it alive
    async fn abort_start(&self) {
        self.shutting_down.store(true, Ordering::Release);
        self.writer.lock().await.take();
        if let Some(mut child) = self.process.lock().await.take() {
            let _ = child.kill().await;
        }
    }

    pub async fn shutdown(self: &Arc<Self>) {
        self.shutting_down.store(true, Ordering::Release);

        if !self.is_terminated()
            && self
                .request_within::<Value>("shutdown", None, Duration::from_secs(2))
                .await
                .is_ok()
        {
            let _ = self.notify("exit", None).await;
        }

        self.writer.lock().await.take();

        if let Some(mut child) = self.process.lock().await.take() {
            match timeout(Duration::from_secs(5), child.wait()).await {
                Ok(Ok(status)) => {
                    tracing::debug!("{} language server exited: {}", self.language, status)
                }
                Ok(Err(e)) => {
                    tracing::debug!("{} language server wait error: {}", self.language, e)
                }
                Err(_) => {
                    tracing::warn!("{} language server did not exit, killing", self.language);
                    let _ = child.kill().await;
                }
            }
        }

        self.fail_pending(error_codes::REQUEST_CANCELLED, "Server shutdown".to_string())
            .await;
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        if let Ok(mut process) = self.process.try_lock()
            && let Some(child) = process.as_mut()
        {
            let _ = child.start_kill();
        }
    }
}
