// Category hierarchy resolver
// Fetches categories from the backend and shapes the two-level tree the
// wizard's category select consumes. Fetch failures degrade to an empty
// list plus a host-pollable notice; the wizard never crashes over missing
// dropdown options.

use futures::future::join_all;
use log::{info, warn};
use std::sync::Mutex;

use crate::api::CategoryApi;
use crate::models::category::{CategoryNode, CategoryOption, SubcategoryOption};

pub struct CategoryResolver<A: CategoryApi> {
    api: A,
    // One-slot mailbox for the latest user-visible notice. A library cannot
    // toast; the host drains this after each resolver call.
    notice: Mutex<Option<String>>,
}

impl<A: CategoryApi> CategoryResolver<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            notice: Mutex::new(None),
        }
    }

    /// Takes the pending user-visible notice, if any.
    pub fn take_notice(&self) -> Option<String> {
        self.notice.lock().ok().and_then(|mut slot| slot.take())
    }

    fn post_notice(&self, message: &str) {
        if let Ok(mut slot) = self.notice.lock() {
            *slot = Some(message.to_string());
        }
    }

    /// Active top-level categories, name ascending (case-insensitive).
    pub async fn top_level(&self) -> Vec<CategoryNode> {
        match self.api.list(None).await {
            Ok(mut nodes) => {
                sort_by_name(&mut nodes);
                nodes
            }
            Err(e) => {
                warn!("[PHASE: category_load] Top-level fetch degraded to empty: {}", e);
                self.post_notice("Could not load categories. Please try again.");
                Vec::new()
            }
        }
    }

    /// Active subcategories of one parent, name ascending. An absent parent
    /// id short-circuits to an empty list without a request.
    pub async fn subcategories(&self, parent_id: Option<&str>) -> Vec<CategoryNode> {
        let parent_id = match parent_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Vec::new(),
        };

        match self.api.list(Some(parent_id)).await {
            Ok(mut nodes) => {
                sort_by_name(&mut nodes);
                nodes
            }
            Err(e) => {
                warn!(
                    "[PHASE: category_load] Subcategory fetch for {} degraded to empty: {}",
                    parent_id, e
                );
                self.post_notice("Could not load subcategories. Please try again.");
                Vec::new()
            }
        }
    }

    /// The full two-tier tree shaped for a dropdown control: top-level
    /// categories first, then one subcategory fetch per category.
    pub async fn hierarchy_for_dropdown(&self) -> Vec<CategoryOption> {
        let parents = self.top_level().await;
        if parents.is_empty() {
            return Vec::new();
        }

        let children = join_all(
            parents
                .iter()
                .map(|parent| self.subcategories(Some(&parent.id))),
        )
        .await;

        let options: Vec<CategoryOption> = parents
            .into_iter()
            .zip(children)
            .map(|(parent, subs)| CategoryOption {
                label: parent.name,
                value: parent.id,
                subcategories: subs
                    .into_iter()
                    .map(|sub| SubcategoryOption {
                        label: sub.name,
                        value: sub.id,
                    })
                    .collect(),
            })
            .collect();

        info!(
            "[PHASE: category_load] Assembled dropdown with {} categories",
            options.len()
        );
        options
    }
}

fn sort_by_name(nodes: &mut [CategoryNode]) {
    nodes.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}
