//! Category domain types

use serde::{Deserialize, Serialize};

/// A prompt category produced by the categorization step of a job
///
/// Each category groups the expanded queries sent to one LLM provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// LLM provider the category's queries are sent to (e.g. "openai")
    pub provider: String,
    pub order_index: i32,
    /// Number of queries associated with this category
    #[serde(default)]
    pub query_count: u32,
}
