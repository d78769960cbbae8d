// Category models
// Wire shape for `/categories` plus the dropdown shapes the wizard renders.

use serde::{Deserialize, Serialize};

/// One entry in the category hierarchy as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Depth is exactly 1 in the wizard's consumption path: only top-level
    /// categories carry children, and children never do.
    #[serde(default)]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Second-tier entry of a dropdown option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryOption {
    pub label: String,
    pub value: String,
}

/// One option of the two-tier category select control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub label: String,
    pub value: String,
    pub subcategories: Vec<SubcategoryOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_node_decodes_without_optional_fields() {
        let node: CategoryNode =
            serde_json::from_str(r#"{"id": "cat-1", "name": "Electronics"}"#).unwrap();
        assert_eq!(node.id, "cat-1");
        assert!(node.description.is_none());
        assert!(node.parent_id.is_none());
        assert!(node.children.is_empty());
        assert!(node.is_top_level());
    }

    #[test]
    fn subcategory_carries_parent_id() {
        let node: CategoryNode = serde_json::from_str(
            r#"{"id": "cat-9", "name": "Cameras", "parent_id": "cat-1"}"#,
        )
        .unwrap();
        assert!(!node.is_top_level());
        assert_eq!(node.parent_id.as_deref(), Some("cat-1"));
    }
}
