// Persistence record models
// Wire shape used by the listings backend: snake_case names, typed numerics,
// structured arrays. Legacy rows sometimes carry `images`/`specifications`
// as JSON-encoded strings and booleans as 0/1; the deserializers here are
// the single place that tolerance lives. Downstream code only ever sees the
// typed shape.

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::fields::{CancellationPolicy, ListingStatus, PricePeriod, SpecPair};
use crate::error::WizardError;

// =========================
// Generic wrapper (every backend resource responds with `{ "data": ... }`)
// =========================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

// =========================
// Listing record
// =========================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub subcategory_id: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_spec_rows", deserialize_with = "de_specifications")]
    pub specifications: Vec<SpecPair>,
    #[serde(default, deserialize_with = "de_money")]
    pub price: Option<f64>,
    #[serde(default)]
    pub price_period: PricePeriod,
    #[serde(default, deserialize_with = "de_money")]
    pub deposit: Option<f64>,
    #[serde(default = "default_min_duration", deserialize_with = "de_min_duration")]
    pub min_duration: i64,
    // Empty dates persist as null, never as "".
    #[serde(default)]
    pub available_from: Option<String>,
    #[serde(default)]
    pub available_to: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "de_loose_bool")]
    pub delivery: bool,
    #[serde(default, deserialize_with = "de_money")]
    pub shipping: Option<f64>,
    #[serde(default, deserialize_with = "de_images")]
    pub images: Vec<String>,
    #[serde(default)]
    pub video: String,
    #[serde(default)]
    pub rental_terms: String,
    #[serde(default, deserialize_with = "de_loose_bool")]
    pub accept_deposit: bool,
    #[serde(default)]
    pub cancellation: CancellationPolicy,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "de_loose_bool")]
    pub is_featured: bool,
    #[serde(default)]
    pub status: ListingStatus,
}

impl Default for ListingRecord {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            category_id: String::new(),
            subcategory_id: String::new(),
            brand: String::new(),
            condition: String::new(),
            description: String::new(),
            specifications: default_spec_rows(),
            price: None,
            price_period: PricePeriod::default(),
            deposit: None,
            min_duration: default_min_duration(),
            available_from: None,
            available_to: None,
            location: String::new(),
            delivery: false,
            shipping: None,
            images: Vec::new(),
            video: String::new(),
            rental_terms: String::new(),
            accept_deposit: false,
            cancellation: CancellationPolicy::default(),
            notes: String::new(),
            is_featured: false,
            status: ListingStatus::default(),
        }
    }
}

fn default_spec_rows() -> Vec<SpecPair> {
    vec![SpecPair::default()]
}

fn default_min_duration() -> i64 {
    1
}

// =========================
// Flexible field decoding
// =========================

/// Decode `specifications` from a structured array or a JSON-encoded string.
/// Parse failures fall back to the default single empty row; the wizard must
/// keep working on a corrupt legacy record.
pub(crate) fn decode_spec_list(value: &Value) -> Vec<SpecPair> {
    match try_decode_spec_list(value) {
        Ok(list) => list,
        Err(e) => {
            warn!("[PHASE: record_load] [STEP: decode] {}", e);
            default_spec_rows()
        }
    }
}

fn try_decode_spec_list(value: &Value) -> Result<Vec<SpecPair>, WizardError> {
    match value {
        Value::Null => Ok(default_spec_rows()),
        Value::String(encoded) => {
            serde_json::from_str(encoded).map_err(|e| WizardError::Parse {
                field: "specifications",
                detail: e.to_string(),
            })
        }
        Value::Array(_) => {
            serde_json::from_value(value.clone()).map_err(|e| WizardError::Parse {
                field: "specifications",
                detail: e.to_string(),
            })
        }
        other => Err(WizardError::Parse {
            field: "specifications",
            detail: format!("unexpected type: {}", json_type_name(other)),
        }),
    }
}

/// Decode `images` from a structured array or a JSON-encoded string.
/// Parse failures fall back to an empty list.
pub(crate) fn decode_image_list(value: &Value) -> Vec<String> {
    match try_decode_image_list(value) {
        Ok(list) => list,
        Err(e) => {
            warn!("[PHASE: record_load] [STEP: decode] {}", e);
            Vec::new()
        }
    }
}

fn try_decode_image_list(value: &Value) -> Result<Vec<String>, WizardError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(encoded) => serde_json::from_str(encoded).map_err(|e| WizardError::Parse {
            field: "images",
            detail: e.to_string(),
        }),
        Value::Array(_) => serde_json::from_value(value.clone()).map_err(|e| WizardError::Parse {
            field: "images",
            detail: e.to_string(),
        }),
        other => Err(WizardError::Parse {
            field: "images",
            detail: format!("unexpected type: {}", json_type_name(other)),
        }),
    }
}

/// Explicit boolean cast: falsy or missing source values become false,
/// 0/1 and "true"/"1" style flags are accepted.
pub(crate) fn loose_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        _ => false,
    }
}

/// Money amounts arrive as JSON numbers, but legacy rows may carry numeric
/// strings. Anything else reads as absent.
pub(crate) fn decode_money(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn de_specifications<'de, D>(deserializer: D) -> Result<Vec<SpecPair>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_spec_list(&value))
}

fn de_images<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_image_list(&value))
}

fn de_loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(loose_bool(&value))
}

fn de_money<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_money(&value))
}

fn de_min_duration<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(n) => n.as_i64().unwrap_or_else(default_min_duration),
        Value::String(s) => s.trim().parse().ok().unwrap_or_else(default_min_duration),
        _ => default_min_duration(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_decodes_to_defaults() {
        let record: ListingRecord = serde_json::from_str("{}").expect("empty record must decode");
        assert_eq!(record, ListingRecord::default());
        assert_eq!(record.min_duration, 1);
        assert_eq!(record.specifications, vec![SpecPair::default()]);
        assert!(record.price.is_none());
    }

    #[test]
    fn specifications_decode_from_structured_array() {
        let record: ListingRecord = serde_json::from_str(
            r#"{"specifications": [{"key": "Color", "value": "Red"}]}"#,
        )
        .unwrap();
        assert_eq!(record.specifications, vec![SpecPair::new("Color", "Red")]);
    }

    #[test]
    fn specifications_decode_from_json_encoded_string() {
        let record: ListingRecord = serde_json::from_str(
            r#"{"specifications": "[{\"key\": \"Size\", \"value\": \"XL\"}]"}"#,
        )
        .unwrap();
        assert_eq!(record.specifications, vec![SpecPair::new("Size", "XL")]);
    }

    #[test]
    fn malformed_specifications_fall_back_to_default_row() {
        let record: ListingRecord =
            serde_json::from_str(r#"{"specifications": "{not json"}"#).unwrap();
        assert_eq!(
            record.specifications,
            vec![SpecPair::default()],
            "corrupt specifications must degrade to the default row, not fail the record"
        );

        let record: ListingRecord = serde_json::from_str(r#"{"specifications": 7}"#).unwrap();
        assert_eq!(record.specifications, vec![SpecPair::default()]);
    }

    #[test]
    fn images_decode_from_either_shape_and_degrade_to_empty() {
        let record: ListingRecord =
            serde_json::from_str(r#"{"images": ["a.jpg", "b.jpg"]}"#).unwrap();
        assert_eq!(record.images, vec!["a.jpg", "b.jpg"]);

        let record: ListingRecord =
            serde_json::from_str(r#"{"images": "[\"c.jpg\"]"}"#).unwrap();
        assert_eq!(record.images, vec!["c.jpg"]);

        let record: ListingRecord = serde_json::from_str(r#"{"images": "{bad"}"#).unwrap();
        assert!(
            record.images.is_empty(),
            "corrupt images must degrade to an empty list"
        );
    }

    #[test]
    fn booleans_coerce_from_numeric_and_string_flags() {
        let record: ListingRecord = serde_json::from_str(
            r#"{"delivery": 1, "accept_deposit": "true", "is_featured": 0}"#,
        )
        .unwrap();
        assert!(record.delivery);
        assert!(record.accept_deposit);
        assert!(!record.is_featured);

        let record: ListingRecord = serde_json::from_str(r#"{"delivery": null}"#).unwrap();
        assert!(!record.delivery, "null must coerce to false, not fail");
    }

    #[test]
    fn money_decodes_from_numbers_and_numeric_strings() {
        let record: ListingRecord =
            serde_json::from_str(r#"{"price": 100, "deposit": "25.5", "shipping": ""}"#).unwrap();
        assert_eq!(record.price, Some(100.0));
        assert_eq!(record.deposit, Some(25.5));
        assert_eq!(record.shipping, None);
    }

    #[test]
    fn min_duration_tolerates_legacy_strings() {
        let record: ListingRecord = serde_json::from_str(r#"{"min_duration": "3"}"#).unwrap();
        assert_eq!(record.min_duration, 3);

        let record: ListingRecord = serde_json::from_str(r#"{"min_duration": "soon"}"#).unwrap();
        assert_eq!(record.min_duration, 1);
    }

    #[test]
    fn serialization_emits_null_dates_and_structured_arrays() {
        let mut record = ListingRecord::default();
        record.specifications = vec![SpecPair::new("Color", "Red")];
        record.images = vec!["a.jpg".to_string()];

        let json: Value = serde_json::to_value(&record).unwrap();
        assert!(json["available_from"].is_null(), "empty dates persist as null");
        assert!(
            json["specifications"].is_array(),
            "no nested JSON-stringification on the way out"
        );
        assert_eq!(json["specifications"][0]["key"], "Color");
        assert!(json.get("id").is_none(), "unassigned id is omitted");
    }

    #[test]
    fn envelope_unwraps_data() {
        let envelope: Envelope<ListingRecord> =
            serde_json::from_str(r#"{"data": {"title": "Camera"}}"#).unwrap();
        assert_eq!(envelope.data.title, "Camera");
    }
}
