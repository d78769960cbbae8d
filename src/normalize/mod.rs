// Form data normalizer
// Pure, stateless mapping between the wizard draft (camel-ish field names,
// everything a string the way a form input holds it) and the persistence
// record (snake_case, typed numerics, structured arrays). No I/O here.

use log::warn;

use crate::error::WizardError;
use crate::models::fields::ListingDraft;
use crate::models::record::ListingRecord;
use crate::utils::validation::{
    is_blank, is_canonical_date, min_duration_or_default, money_or_zero, parse_money,
};

/// Build the persistence payload from the accumulated draft.
///
/// Price is the only field that can fail here: it is required and must be
/// numeric. Deposit and shipping coerce to 0 when blank or invalid;
/// min_duration falls back to 1. Specification pairs survive only when both
/// trimmed sides are non-empty; empty date strings persist as null.
pub fn to_persistence(draft: &ListingDraft) -> Result<ListingRecord, WizardError> {
    let price = parse_money(&draft.price)
        .map_err(|_| WizardError::Validation("Please enter a valid price.".to_string()))?;

    for (name, raw) in [
        ("availableFrom", &draft.available_from),
        ("availableTo", &draft.available_to),
    ] {
        if !is_blank(raw) && !is_canonical_date(raw) {
            warn!(
                "[PHASE: submission] [STEP: normalize] Non-canonical {} date: '{}'",
                name,
                raw.trim()
            );
        }
    }

    Ok(ListingRecord {
        id: None,
        title: draft.title.clone(),
        category_id: draft.category.clone(),
        subcategory_id: draft.subcategory.clone(),
        brand: draft.brand.clone(),
        condition: draft.condition.clone(),
        description: draft.description.clone(),
        specifications: draft
            .specifications
            .iter()
            .filter(|pair| pair.is_complete())
            .cloned()
            .collect(),
        price: Some(price),
        price_period: draft.price_period,
        deposit: Some(money_or_zero(&draft.deposit)),
        min_duration: min_duration_or_default(&draft.min_duration),
        available_from: date_or_none(&draft.available_from),
        available_to: date_or_none(&draft.available_to),
        location: draft.location.clone(),
        delivery: draft.delivery,
        shipping: Some(money_or_zero(&draft.shipping)),
        images: draft.images.clone(),
        video: draft.video.clone(),
        rental_terms: draft.rental_terms.clone(),
        accept_deposit: draft.accept_deposit,
        cancellation: draft.cancellation,
        notes: draft.notes.clone(),
        is_featured: draft.is_featured,
        status: draft.status,
    })
}

/// Rebuild a draft from a fetched record. Infallible: the record's flexible
/// deserializers have already absorbed legacy shapes, and every missing field
/// degrades to the same default a fresh create-mode draft uses.
pub fn from_persistence(record: &ListingRecord) -> ListingDraft {
    ListingDraft {
        title: record.title.clone(),
        category: record.category_id.clone(),
        subcategory: record.subcategory_id.clone(),
        brand: record.brand.clone(),
        condition: record.condition.clone(),
        description: record.description.clone(),
        specifications: if record.specifications.is_empty() {
            ListingDraft::default().specifications
        } else {
            record.specifications.clone()
        },
        price: money_string(record.price),
        price_period: record.price_period,
        deposit: money_string(record.deposit),
        min_duration: record.min_duration.to_string(),
        available_from: date_only(record.available_from.as_deref()),
        available_to: date_only(record.available_to.as_deref()),
        location: record.location.clone(),
        delivery: record.delivery,
        shipping: money_string(record.shipping),
        images: record.images.clone(),
        video: record.video.clone(),
        rental_terms: record.rental_terms.clone(),
        accept_deposit: record.accept_deposit,
        cancellation: record.cancellation,
        notes: record.notes.clone(),
        is_featured: record.is_featured,
        status: record.status,
    }
}

fn date_or_none(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Truncate a stored date to the date-only portion a date input accepts.
/// "2025-01-05T00:00:00Z" becomes "2025-01-05"; absent dates become "".
fn date_only(stored: Option<&str>) -> String {
    match stored {
        Some(s) => s.split('T').next().unwrap_or("").to_string(),
        None => String::new(),
    }
}

/// Render a stored amount back into form-input text. `{}` formatting keeps
/// whole amounts whole ("100", not "100.0"), which is what the round-trip
/// law needs for canonical input.
fn money_string(stored: Option<f64>) -> String {
    match stored {
        Some(v) => format!("{}", v),
        None => String::new(),
    }
}
