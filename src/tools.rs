//! The developer tools: slug scanner, bulk creation and the tool directory.
//!
//! Each tool keeps its core logic in a `process_*` function over the store
//! traits, with a thin axum handler on top.

pub mod bulk_create;
pub mod registry;
pub mod slug_scanner;
