// Listing resource

use async_trait::async_trait;
use log::info;

use super::client::ApiClient;
use crate::error::WizardError;
use crate::models::record::ListingRecord;
use crate::utils::validation::validate_resource_id;

/// Listing collaborator: the full CRUD surface of `/listings`. Production
/// uses the HTTP implementation; tests inject in-memory fakes.
#[async_trait]
pub trait ListingApi: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<ListingRecord, WizardError>;
    async fn create(&self, record: &ListingRecord) -> Result<ListingRecord, WizardError>;
    async fn update(&self, id: &str, record: &ListingRecord)
        -> Result<ListingRecord, WizardError>;
    async fn delete(&self, id: &str) -> Result<(), WizardError>;
}

pub struct HttpListingApi {
    client: ApiClient,
}

impl HttpListingApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    // Ids are interpolated into the URL path; reject anything that is not
    // a plain opaque id before it gets near the request line. The caller
    // wraps the message in the error class of its operation.
    fn listing_path(id: &str) -> Result<String, String> {
        let id = validate_resource_id(id).map_err(|e| e.to_string())?;
        Ok(format!("listings/{}", id))
    }
}

#[async_trait]
impl ListingApi for HttpListingApi {
    async fn fetch(&self, id: &str) -> Result<ListingRecord, WizardError> {
        let path = Self::listing_path(id).map_err(WizardError::Fetch)?;
        let record: ListingRecord = self.client.get_data(&path, &[]).await.map_err(|e| {
            log::warn!("[PHASE: record_load] Fetch of listing {} failed: {}", id, e);
            WizardError::Fetch("Failed to load the listing. Please try again.".to_string())
        })?;

        info!("[PHASE: record_load] Loaded listing {}", id);
        Ok(record)
    }

    async fn create(&self, record: &ListingRecord) -> Result<ListingRecord, WizardError> {
        let created: ListingRecord =
            self.client.post_data("listings", record).await.map_err(|e| {
                log::warn!("[PHASE: submission] [STEP: create] Create failed: {}", e);
                WizardError::Submission(
                    "The listing could not be created. Please try again.".to_string(),
                )
            })?;

        info!(
            "[PHASE: submission] [STEP: create] Created listing {}",
            created.id.as_deref().unwrap_or("<no id>")
        );
        Ok(created)
    }

    async fn update(
        &self,
        id: &str,
        record: &ListingRecord,
    ) -> Result<ListingRecord, WizardError> {
        let path = Self::listing_path(id).map_err(WizardError::Submission)?;
        let updated: ListingRecord =
            self.client.put_data(&path, record).await.map_err(|e| {
                log::warn!(
                    "[PHASE: submission] [STEP: update] Update of listing {} failed: {}",
                    id,
                    e
                );
                WizardError::Submission(
                    "The listing could not be updated. Please try again.".to_string(),
                )
            })?;

        info!("[PHASE: submission] [STEP: update] Updated listing {}", id);
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), WizardError> {
        let path = Self::listing_path(id).map_err(WizardError::Submission)?;
        self.client.delete(&path).await.map_err(|e| {
            log::warn!(
                "[PHASE: submission] [STEP: delete] Delete of listing {} failed: {}",
                id,
                e
            );
            WizardError::Submission(
                "The listing could not be deleted. Please try again.".to_string(),
            )
        })?;

        info!("[PHASE: submission] [STEP: delete] Deleted listing {}", id);
        Ok(())
    }
}
