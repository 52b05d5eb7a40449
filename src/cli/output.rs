//! Output formatting for CLI commands

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;

use crate::infra::table::TableResult;
use crate::services::HierarchyTables;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Delimited rows, one per line
    #[default]
    Table,
    /// The table wrapped in a JSON envelope
    Json,
}

/// Single place every command prints through
#[derive(Debug, Clone)]
pub struct OutputContext {
    root: PathBuf,
    format: OutputFormat,
}

impl OutputContext {
    pub fn new(root: PathBuf, format: OutputFormat) -> Self {
        Self { root, format }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert an absolute path to relative (if within project root)
    pub fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string())
    }

    pub fn print_table(&self, table: &TableResult) {
        match self.format {
            OutputFormat::Table => print!("{}", table.render()),
            OutputFormat::Json => self.print_success(table),
        }
    }

    pub fn print_tables(&self, tables: &HierarchyTables) {
        match self.format {
            OutputFormat::Table => print!("{}", tables.render()),
            OutputFormat::Json => self.print_success(tables),
        }
    }

    pub fn print_success<T: Serialize>(&self, data: T) {
        let response = serde_json::json!({
            "success": true,
            "data": data
        });
        print_json(&response);
    }

    /// Print a successful response with flat structure (data fields at top level)
    pub fn print_success_flat<T: Serialize>(&self, data: T) {
        let mut response = serde_json::to_value(data).unwrap_or(serde_json::json!({}));
        if let Some(obj) = response.as_object_mut() {
            obj.insert("success".to_string(), serde_json::json!(true));
        }
        print_json(&response);
    }

    pub fn print_error(&self, message: &str) {
        let response = serde_json::json!({
            "success": false,
            "error": message
        });
        print_json(&response);
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}
