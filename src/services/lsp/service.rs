use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::converters::{
    convert_hierarchy_item, convert_hover, convert_incoming, convert_locations, convert_outgoing,
    convert_symbols,
};
use crate::error::LspError;
use crate::infra::lsp::protocol::{
    CallHierarchyIncomingCall, CallHierarchyOutgoingCall, DocumentSymbolResponse, Hover,
    LocationResponse, LspHierarchyItem, ServerCapabilities, TextDocumentIdentifier,
    TextDocumentPositionParams, error_codes,
};
use crate::infra::lsp::{LspClient, LspManager};
use crate::models::config::LspServerCommands;
use crate::models::lsp::uri_to_path;
use crate::models::{Edge, HierarchyItem, HoverInfo, Language, Location, Position, Symbol};
use crate::services::provider::{CodeProvider, LocationQuery};

/// [`CodeProvider`] over one language server per language
pub struct LspProvider {
    manager: Arc<LspManager>,
}

impl LspProvider {
    pub fn new(root: PathBuf, servers: LspServerCommands, request_timeout: Duration) -> Self {
        Self {
            manager: Arc::new(LspManager::new(root, servers, request_timeout)),
        }
    }

    pub async fn shutdown(&self) {
        self.manager.shutdown_all().await;
    }

    fn language_for(path: &Path) -> Result<Language, LspError> {
        let language = Language::from_path(path);
        if language == Language::Unknown {
            return Err(LspError::UnsupportedLanguage(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            ));
        }
        Ok(language)
    }

    /// Run `op` with the document at `uri` open and current on its server.
    /// A failure is returned as is; the request is never re-issued.
    async fn with_document<F, Fut, T>(&self, uri: &str, op: F) -> Result<T, LspError>
    where
        F: FnOnce(Arc<LspClient>) -> Fut,
        Fut: std::future::Future<Output = Result<T, LspError>>,
    {
        let path = uri_to_path(uri);
        let language = Self::language_for(&path)?;
        let content = tokio::fs::read_to_string(&path).await?;

        let client = self.manager.get_client(language).await?;
        client.sync_document(uri, &content).await?;
        op(client).await
    }

    /// Requests that carry an item from a previous prepare
    async fn with_item<F, Fut, T>(&self, item: &HierarchyItem, op: F) -> Result<T, LspError>
    where
        F: FnOnce(Arc<LspClient>, Value) -> Fut,
        Fut: std::future::Future<Output = Result<T, LspError>>,
    {
        let params = json!({ "item": serde_json::to_value(item)? });
        self.with_document(&item.uri, |client| op(client, params)).await
    }
}

async fn ensure_supported(
    client: &LspClient,
    feature: &str,
    pick: impl FnOnce(&ServerCapabilities) -> &Option<Value>,
) -> Result<(), LspError> {
    if client.supports(pick).await {
        return Ok(());
    }
    Err(LspError::server_error_friendly(
        error_codes::METHOD_NOT_FOUND,
        format!("Unhandled method {}", feature),
    ))
}

#[async_trait]
impl CodeProvider for LspProvider {
    async fn document_symbols(&self, uri: &str) -> Result<Vec<Symbol>, LspError> {
        self.with_document(uri, |client| async move {
            let params = json!({ "textDocument": TextDocumentIdentifier::new(uri) });
            let response: Option<DocumentSymbolResponse> = client
                .request("textDocument/documentSymbol", Some(params))
                .await?;
            Ok(convert_symbols(response))
        })
        .await
    }

    async fn read_document(&self, uri: &str) -> Result<String, LspError> {
        Ok(tokio::fs::read_to_string(uri_to_path(uri)).await?)
    }

    async fn locations(
        &self,
        query: LocationQuery,
        uri: &str,
        position: Position,
    ) -> Result<Vec<Location>, LspError> {
        self.with_document(uri, |client| async move {
            let mut params = serde_json::to_value(TextDocumentPositionParams::new(uri, position))?;
            if query == LocationQuery::References {
                params["context"] = json!({ "includeDeclaration": true });
            }
            let response: Option<LocationResponse> =
                client.request(query.method(), Some(params)).await?;
            Ok(convert_locations(response))
        })
        .await
    }

    async fn hover(&self, uri: &str, position: Position) -> Result<Option<HoverInfo>, LspError> {
        self.with_document(uri, |client| async move {
            let params = serde_json::to_value(TextDocumentPositionParams::new(uri, position))?;
            let response: Option<Hover> = client.request("textDocument/hover", Some(params)).await?;
            Ok(convert_hover(response))
        })
        .await
    }

    async fn prepare_call_hierarchy(
        &self,
        uri: &str,
        position: Position,
    ) -> Result<Vec<HierarchyItem>, LspError> {
        self.with_document(uri, |client| async move {
            ensure_supported(&client, "textDocument/prepareCallHierarchy", |c| {
                &c.call_hierarchy_provider
            })
            .await?;
            let params = serde_json::to_value(TextDocumentPositionParams::new(uri, position))?;
            let items: Option<Vec<LspHierarchyItem>> = client
                .request("textDocument/prepareCallHierarchy", Some(params))
                .await?;
            Ok(items
                .unwrap_or_default()
                .into_iter()
                .map(convert_hierarchy_item)
                .collect())
        })
        .await
    }

    async fn incoming_calls(&self, item: &HierarchyItem) -> Result<Vec<Edge>, LspError> {
        self.with_item(item, |client, params| async move {
            let calls: Option<Vec<CallHierarchyIncomingCall>> = client
                .request("callHierarchy/incomingCalls", Some(params))
                .await?;
            Ok(calls
                .unwrap_or_default()
                .into_iter()
                .map(convert_incoming)
                .collect())
        })
        .await
    }

    async fn outgoing_calls(&self, item: &HierarchyItem) -> Result<Vec<Edge>, LspError> {
        self.with_item(item, |client, params| async move {
            let calls: Option<Vec<CallHierarchyOutgoingCall>> = client
                .request("callHierarchy/outgoingCalls", Some(params))
                .await?;
            Ok(calls
                .unwrap_or_default()
                .into_iter()
                .map(convert_outgoing)
                .collect())
        })
        .await
    }

    async fn prepare_type_hierarchy(
        &self,
        uri: &str,
        position: Position,
    ) -> Result<Vec<HierarchyItem>, LspError> {
        self.with_document(uri, |client| async move {
            ensure_supported(&client, "textDocument/prepareTypeHierarchy", |c| {
                &c.type_hierarchy_provider
            })
            .await?;
            let params = serde_json::to_value(TextDocumentPositionParams::new(uri, position))?;
            let items: Option<Vec<LspHierarchyItem>> = client
                .request("textDocument/prepareTypeHierarchy", Some(params))
                .await?;
            Ok(items
                .unwrap_or_default()
                .into_iter()
                .map(convert_hierarchy_item)
                .collect())
        })
        .await
    }

    async fn supertypes(&self, item: &HierarchyItem) -> Result<Vec<HierarchyItem>, LspError> {
        self.with_item(item, |client, params| async move {
            let items: Option<Vec<LspHierarchyItem>> = client
                .request("typeHierarchy/supertypes", Some(params))
                .await?;
            Ok(items
                .unwrap_or_default()
                .into_iter()
                .map(convert_hierarchy_item)
                .collect())
        })
        .await
    }

    async fn subtypes(&self, item: &HierarchyItem) -> Result<Vec<HierarchyItem>, LspError> {
        self.with_item(item, |client, params| async move {
            let items: Option<Vec<LspHierarchyItem>> = client
                .request("typeHierarchy/subtypes", Some(params))
                .await?;
            Ok(items
                .unwrap_or_default()
                .into_iter()
                .map(convert_hierarchy_item)
                .collect())
        })
        .await
    }
}
