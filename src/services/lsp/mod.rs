//! Language-server-backed provider

mod converters;
mod service;

pub use service::LspProvider;
