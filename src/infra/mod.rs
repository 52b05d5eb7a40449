//! Infrastructure layer for symlens
//!
//! Low-level building blocks: the language server connection, the table
//! wire format and deadline racing.

pub mod lsp;
pub mod table;
pub mod timeout;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash document content to skip redundant didChange notifications
#[inline]
pub fn hash_content(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}
