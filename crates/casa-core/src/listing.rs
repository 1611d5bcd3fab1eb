//! Property listing domain model.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::image::normalize_image_ref;

/// Identifier of a listing as sent by the backend.
///
/// Database-backed modes send integers, the managed search service sends
/// strings; both are accepted. Whole numbers sent as floats (`42.0`) are
/// read as integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ListingId {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for ListingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => ListingId::Number(n),
            Raw::Float(f) => match whole_number(f) {
                Some(n) => ListingId::Number(n),
                None => ListingId::Text(f.to_string()),
            },
            Raw::Text(s) => ListingId::Text(s),
        })
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingId::Number(n) => write!(f, "{n}"),
            ListingId::Text(s) => f.write_str(s),
        }
    }
}

/// One property record returned by the backend.
///
/// Field names follow the backend's JSON contract; the image reference travels
/// as `image_gcs_uri`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ListingId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canton: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub bedrooms: Option<u32>,
    #[serde(rename = "image_gcs_uri", default)]
    pub image_ref: Option<String>,
}

impl Listing {
    /// Key used to track per-listing UI state.
    ///
    /// Falls back to the listing's position in its result set when the
    /// backend did not send an id.
    pub fn display_key(&self, position: usize) -> String {
        match &self.id {
            Some(id) => id.to_string(),
            None => format!("#{position}"),
        }
    }

    /// Price label: `CHF 1,250`, or `N/A` when the price is unknown.
    pub fn price_label(&self) -> String {
        match self.price {
            Some(price) => format!("CHF {}", group_thousands(price.round() as i64)),
            None => "N/A".to_string(),
        }
    }

    pub fn bedrooms_label(&self) -> Option<String> {
        self.bedrooms.map(|beds| format!("{beds} Beds"))
    }

    /// `City, Canton • Country`, skipping the parts that are missing.
    pub fn location_label(&self) -> String {
        let mut label = self.city.clone();
        if let Some(canton) = self.canton.as_deref().filter(|c| !c.is_empty()) {
            if !label.is_empty() {
                label.push_str(", ");
            }
            label.push_str(canton);
        }
        if let Some(country) = self.country.as_deref().filter(|c| !c.is_empty()) {
            if !label.is_empty() {
                label.push_str(" • ");
            }
            label.push_str(country);
        }
        label
    }

    pub fn has_image(&self) -> bool {
        self.image_ref.is_some()
    }

    /// Attaches a generated image. An existing reference is never replaced.
    ///
    /// Returns `false` when the listing already had an image.
    pub fn attach_image(&mut self, image_ref: impl Into<String>) -> bool {
        if self.image_ref.is_some() {
            return false;
        }
        self.image_ref = Some(image_ref.into());
        true
    }

    /// Rewrites a raw storage reference into the image proxy form.
    pub fn normalize_image_ref(&mut self) {
        if let Some(image_ref) = self.image_ref.as_mut() {
            *image_ref = normalize_image_ref(image_ref);
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a count sent either as an integer or as a float. Values that are not
/// a whole non-negative number are treated as unknown.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value
        .and_then(whole_number)
        .and_then(|n| u32::try_from(n).ok()))
}

fn whole_number(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15).then_some(value as i64)
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Listing {
        Listing {
            id: Some(ListingId::Number(7)),
            title: "Lake view loft".to_string(),
            description: "Bright loft near the water".to_string(),
            price: Some(12_500.0),
            city: "Zurich".to_string(),
            canton: Some("ZH".to_string()),
            country: Some("Switzerland".to_string()),
            bedrooms: Some(2),
            image_ref: None,
        }
    }

    #[test]
    fn test_price_label_formats_and_never_shows_zero_for_missing() {
        let mut l = listing();
        assert_eq!(l.price_label(), "CHF 12,500");

        l.price = Some(950.4);
        assert_eq!(l.price_label(), "CHF 950");

        l.price = Some(1_234_567.0);
        assert_eq!(l.price_label(), "CHF 1,234,567");

        l.price = None;
        assert_eq!(l.price_label(), "N/A");
    }

    #[test]
    fn test_display_key_falls_back_to_position() {
        let mut l = listing();
        assert_eq!(l.display_key(3), "7");
        l.id = None;
        assert_eq!(l.display_key(3), "#3");
    }

    #[test]
    fn test_location_label_skips_missing_parts() {
        let mut l = listing();
        assert_eq!(l.location_label(), "Zurich, ZH • Switzerland");
        l.canton = None;
        l.country = None;
        assert_eq!(l.location_label(), "Zurich");
    }

    #[test]
    fn test_attach_image_never_replaces() {
        let mut l = listing();
        assert!(l.attach_image("data:image/png;base64,AAA"));
        assert!(!l.attach_image("data:image/png;base64,BBB"));
        assert_eq!(l.image_ref.as_deref(), Some("data:image/png;base64,AAA"));
    }

    #[test]
    fn test_deserialize_backend_shape() {
        let json = r#"{
            "id": "doc-42",
            "title": "Studio",
            "description": "Small and cheap",
            "price": null,
            "city": "Geneva",
            "image_gcs_uri": "gs://bucket/studio.jpg"
        }"#;
        let l: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(l.id, Some(ListingId::Text("doc-42".to_string())));
        assert_eq!(l.price, None);
        assert_eq!(l.bedrooms, None);
        assert_eq!(l.bedrooms_label(), None);
        assert_eq!(l.image_ref.as_deref(), Some("gs://bucket/studio.jpg"));
    }

    #[test]
    fn test_deserialize_float_numbers_from_document_store() {
        let json = r#"{
            "id": 42.0,
            "title": "Flat",
            "description": "Two rooms",
            "price": 2100.0,
            "city": "Basel",
            "bedrooms": 2.0
        }"#;
        let l: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(l.id, Some(ListingId::Number(42)));
        assert_eq!(l.bedrooms, Some(2));
        assert_eq!(l.bedrooms_label().as_deref(), Some("2 Beds"));

        let l: Listing = serde_json::from_str(r#"{"id": "doc-1", "bedrooms": 2.5}"#).unwrap();
        assert_eq!(l.id, Some(ListingId::Text("doc-1".to_string())));
        assert_eq!(l.bedrooms, None);
    }

    #[test]
    fn test_deserialize_null_fields() {
        let json = r#"{
            "id": 3,
            "title": null,
            "description": null,
            "city": null,
            "canton": null,
            "bedrooms": null,
            "image_gcs_uri": null
        }"#;
        let l: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(l.id, Some(ListingId::Number(3)));
        assert_eq!(l.title, "");
        assert_eq!(l.description, "");
        assert_eq!(l.city, "");
        assert_eq!(l.bedrooms, None);
        assert!(!l.has_image());
        assert_eq!(l.location_label(), "");
    }

    #[test]
    fn test_deserialize_tolerates_sparse_records() {
        let l: Listing = serde_json::from_str(r#"{"title": "Cabin"}"#).unwrap();
        assert_eq!(l.id, None);
        assert_eq!(l.city, "");
        assert!(!l.has_image());
    }
}
