//! Conversions from LSP payloads to symlens models

use crate::infra::lsp::protocol::{
    CallHierarchyIncomingCall, CallHierarchyOutgoingCall, DocumentSymbol, DocumentSymbolResponse,
    Hover, LocationResponse, LspHierarchyItem, SymbolInformation,
};
use crate::models::{Edge, HierarchyItem, HoverInfo, Location, Symbol, SymbolKind};

pub(super) fn convert_symbols(response: Option<DocumentSymbolResponse>) -> Vec<Symbol> {
    match response {
        Some(DocumentSymbolResponse::Nested(symbols)) => {
            symbols.into_iter().map(convert_document_symbol).collect()
        }
        Some(DocumentSymbolResponse::Flat(symbols)) => {
            symbols.into_iter().map(convert_symbol_information).collect()
        }
        None => Vec::new(),
    }
}

fn convert_document_symbol(symbol: DocumentSymbol) -> Symbol {
    let children = symbol
        .children
        .unwrap_or_default()
        .into_iter()
        .map(convert_document_symbol)
        .collect();

    Symbol {
        name: symbol.name,
        kind: SymbolKind::from_lsp(symbol.kind),
        range: symbol.range,
        selection_range: symbol.selection_range,
        detail: symbol.detail.filter(|d| !d.is_empty()),
        children,
    }
}

/// Flat symbols carry one range; it stands in for the selection range too
fn convert_symbol_information(symbol: SymbolInformation) -> Symbol {
    let range = symbol.location.range;
    Symbol::new(symbol.name, SymbolKind::from_lsp(symbol.kind), range, range)
}

pub(super) fn convert_locations(response: Option<LocationResponse>) -> Vec<Location> {
    match response {
        Some(LocationResponse::Links(links)) => links
            .into_iter()
            .map(|l| Location::new(l.target_uri, l.target_selection_range))
            .collect(),
        Some(LocationResponse::Many(locations)) => locations
            .into_iter()
            .map(|l| Location::new(l.uri, l.range))
            .collect(),
        Some(LocationResponse::Link(l)) => {
            vec![Location::new(l.target_uri, l.target_selection_range)]
        }
        Some(LocationResponse::Single(l)) => vec![Location::new(l.uri, l.range)],
        None => Vec::new(),
    }
}

pub(super) fn convert_hover(hover: Option<Hover>) -> Option<HoverInfo> {
    let hover = hover?;
    let text = hover.contents.to_text();
    if text.trim().is_empty() {
        return None;
    }
    Some(HoverInfo {
        contents: text.trim().to_string(),
        range: hover.range,
    })
}

pub(super) fn convert_hierarchy_item(item: LspHierarchyItem) -> HierarchyItem {
    HierarchyItem {
        name: item.name,
        kind: SymbolKind::from_lsp(item.kind),
        uri: item.uri,
        range: item.range,
        selection_range: item.selection_range,
        detail: item.detail,
        data: item.data,
    }
}

pub(super) fn convert_incoming(call: CallHierarchyIncomingCall) -> Edge {
    Edge::new(convert_hierarchy_item(call.from), call.from_ranges)
}

pub(super) fn convert_outgoing(call: CallHierarchyOutgoingCall) -> Edge {
    Edge::new(convert_hierarchy_item(call.to), call.from_ranges)
}
