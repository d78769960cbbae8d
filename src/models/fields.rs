// Wizard form data
//
// The draft holds every field exactly the way a form input would: free-text
// inputs (including price and dates) stay strings. Typing and renaming to
// the persistence shape happen in the normalizer, never here.

use serde::{Deserialize, Serialize};

use crate::utils::validation::is_blank;

/// Billing period for the listed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricePeriod {
    #[default]
    Day,
    Week,
    Month,
}

/// Cancellation policy offered to renters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationPolicy {
    #[default]
    Flexible,
    Moderate,
    Strict,
    NonRefundable,
}

/// Moderation/visibility state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Pending,
    Inactive,
}

/// One specification row ({key, value}); array order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecPair {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl SpecPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Both sides blank. Ignored by step validation and stripped before
    /// submission.
    pub fn is_empty(&self) -> bool {
        is_blank(&self.key) && is_blank(&self.value)
    }

    /// Exactly one side filled. Blocks the Details step from advancing.
    pub fn is_partial(&self) -> bool {
        is_blank(&self.key) != is_blank(&self.value)
    }

    /// Both sides filled; survives submission.
    pub fn is_complete(&self) -> bool {
        !is_blank(&self.key) && !is_blank(&self.value)
    }
}

/// Identifies one draft field for the wizard's `set_field` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Category,
    Subcategory,
    Brand,
    Condition,
    Description,
    Specifications,
    Price,
    PricePeriod,
    Deposit,
    MinDuration,
    AvailableFrom,
    AvailableTo,
    Location,
    Delivery,
    Shipping,
    Images,
    Video,
    RentalTerms,
    AcceptDeposit,
    Cancellation,
    Notes,
    IsFeatured,
    Status,
}

/// Value payload for `set_field`, matching the shape each field holds in the
/// draft. A payload of the wrong shape is logged and ignored by the wizard.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Specs(Vec<SpecPair>),
    Images(Vec<String>),
    Period(PricePeriod),
    Policy(CancellationPolicy),
    State(ListingStatus),
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Flag(v)
    }
}

impl From<Vec<SpecPair>> for FieldValue {
    fn from(v: Vec<SpecPair>) -> Self {
        FieldValue::Specs(v)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        FieldValue::Images(v)
    }
}

impl From<PricePeriod> for FieldValue {
    fn from(v: PricePeriod) -> Self {
        FieldValue::Period(v)
    }
}

impl From<CancellationPolicy> for FieldValue {
    fn from(v: CancellationPolicy) -> Self {
        FieldValue::Policy(v)
    }
}

impl From<ListingStatus> for FieldValue {
    fn from(v: ListingStatus) -> Self {
        FieldValue::State(v)
    }
}

/// The wizard's single source of truth while composing a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub category: String,
    pub subcategory: String,
    pub brand: String,
    pub condition: String,
    pub description: String,
    pub specifications: Vec<SpecPair>,
    pub price: String,
    pub price_period: PricePeriod,
    pub deposit: String,
    pub min_duration: String,
    pub available_from: String,
    pub available_to: String,
    pub location: String,
    pub delivery: bool,
    pub shipping: String,
    pub images: Vec<String>,
    pub video: String,
    pub rental_terms: String,
    pub accept_deposit: bool,
    pub cancellation: CancellationPolicy,
    pub notes: String,
    pub is_featured: bool,
    pub status: ListingStatus,
}

impl Default for ListingDraft {
    /// Create-mode defaults. `from_persistence` of an empty record must
    /// produce exactly this draft, so any change here is a wire-behavior
    /// change too.
    fn default() -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            subcategory: String::new(),
            brand: String::new(),
            condition: String::new(),
            description: String::new(),
            // The form shows one editable specification row from the start.
            specifications: vec![SpecPair::default()],
            price: String::new(),
            price_period: PricePeriod::Day,
            deposit: String::new(),
            min_duration: "1".to_string(),
            available_from: String::new(),
            available_to: String::new(),
            location: String::new(),
            delivery: false,
            shipping: String::new(),
            images: Vec::new(),
            video: String::new(),
            rental_terms: String::new(),
            accept_deposit: false,
            cancellation: CancellationPolicy::Flexible,
            notes: String::new(),
            is_featured: false,
            status: ListingStatus::Active,
        }
    }
}

impl ListingDraft {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_pair_classification() {
        assert!(SpecPair::new("", "").is_empty());
        assert!(SpecPair::new("  ", " ").is_empty());
        assert!(SpecPair::new("Color", "").is_partial());
        assert!(SpecPair::new("", "Red").is_partial());
        assert!(SpecPair::new("Color", "Red").is_complete());
        assert!(!SpecPair::new("Color", "Red").is_partial());
    }

    #[test]
    fn fresh_draft_uses_create_mode_defaults() {
        let draft = ListingDraft::new();
        assert_eq!(draft.min_duration, "1");
        assert_eq!(draft.price_period, PricePeriod::Day);
        assert_eq!(draft.cancellation, CancellationPolicy::Flexible);
        assert_eq!(draft.status, ListingStatus::Active);
        assert_eq!(
            draft.specifications,
            vec![SpecPair::default()],
            "fresh drafts start with one empty specification row"
        );
        assert!(draft.images.is_empty());
        assert!(!draft.delivery && !draft.accept_deposit && !draft.is_featured);
    }

    #[test]
    fn enums_use_persistence_wire_names() {
        assert_eq!(
            serde_json::to_string(&PricePeriod::Week).unwrap(),
            "\"week\""
        );
        assert_eq!(
            serde_json::to_string(&CancellationPolicy::NonRefundable).unwrap(),
            "\"non_refundable\""
        );
        assert_eq!(
            serde_json::to_string(&ListingStatus::Pending).unwrap(),
            "\"pending\""
        );
        let parsed: PricePeriod = serde_json::from_str("\"month\"").unwrap();
        assert_eq!(parsed, PricePeriod::Month);
    }
}
