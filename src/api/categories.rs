// Category resource

use async_trait::async_trait;
use log::info;

use super::client::ApiClient;
use crate::error::WizardError;
use crate::models::category::CategoryNode;
use crate::utils::validation::validate_resource_id;

/// Category collaborator. Production uses the HTTP implementation; tests
/// inject in-memory fakes.
#[async_trait]
pub trait CategoryApi: Send + Sync {
    /// Active categories under the given parent; `None` means top level.
    async fn list(&self, parent_id: Option<&str>) -> Result<Vec<CategoryNode>, WizardError>;
}

pub struct HttpCategoryApi {
    client: ApiClient,
}

impl HttpCategoryApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CategoryApi for HttpCategoryApi {
    async fn list(&self, parent_id: Option<&str>) -> Result<Vec<CategoryNode>, WizardError> {
        // The backend filters top-level rows with the literal `parent_id=null`.
        let parent = match parent_id {
            Some(id) => validate_resource_id(id)
                .map_err(|e| WizardError::Fetch(e.to_string()))?
                .to_string(),
            None => "null".to_string(),
        };

        let nodes: Vec<CategoryNode> = self
            .client
            .get_data(
                "categories",
                &[
                    ("parent_id", parent),
                    ("status", "active".to_string()),
                ],
            )
            .await
            .map_err(|e| {
                log::warn!("[PHASE: category_load] Category fetch failed: {}", e);
                WizardError::Fetch("Could not load categories. Please try again.".to_string())
            })?;

        info!(
            "[PHASE: category_load] Loaded {} categories (parent: {})",
            nodes.len(),
            parent_id.unwrap_or("top-level")
        );
        Ok(nodes)
    }
}
