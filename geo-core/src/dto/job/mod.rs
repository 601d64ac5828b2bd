//! Job DTOs

use serde::{Deserialize, Serialize};

use crate::domain::category::Category;

/// Response body of the job categories endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryList {
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl CategoryList {
    /// Categories in display order
    pub fn into_sorted(self) -> Vec<Category> {
        let mut categories = self.categories;
        categories.sort_by_key(|c| c.order_index);
        categories
    }
}
