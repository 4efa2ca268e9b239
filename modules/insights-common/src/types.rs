use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::error::DashboardError;

// --- Facets ---

/// A categorical record field that can be filtered on and enumerated for dropdowns.
///
/// Declaration order is the order the dashboard lays out its filter controls,
/// which is also the order query-string pairs are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    EndYear,
    Region,
    Topic,
    Sector,
    Pestle,
    Source,
    Swot,
    Country,
    City,
}

impl Facet {
    pub const ALL: [Facet; 9] = [
        Facet::EndYear,
        Facet::Region,
        Facet::Topic,
        Facet::Sector,
        Facet::Pestle,
        Facet::Source,
        Facet::Swot,
        Facet::Country,
        Facet::City,
    ];

    /// Record field (and query parameter) name.
    pub fn field(&self) -> &'static str {
        match self {
            Facet::EndYear => "end_year",
            Facet::Region => "region",
            Facet::Topic => "topic",
            Facet::Sector => "sector",
            Facet::Pestle => "pestle",
            Facet::Source => "source",
            Facet::Swot => "swot",
            Facet::Country => "country",
            Facet::City => "city",
        }
    }

    /// Key of this facet's list in the `/filters` response.
    pub fn list_key(&self) -> &'static str {
        match self {
            Facet::EndYear => "endYears",
            Facet::Region => "regions",
            Facet::Topic => "topics",
            Facet::Sector => "sectors",
            Facet::Pestle => "pestles",
            Facet::Source => "sources",
            Facet::Swot => "swots",
            Facet::Country => "countries",
            Facet::City => "cities",
        }
    }

    pub fn from_field(name: &str) -> Option<Facet> {
        Facet::ALL.into_iter().find(|f| f.field() == name)
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field())
    }
}

// --- Records ---

const STRING_FIELDS: &[&str] = &[
    "title",
    "insight",
    "url",
    "topic",
    "sector",
    "region",
    "pestle",
    "source",
    "swot",
    "country",
    "city",
    "start_year",
    "end_year",
    "impact",
    "added",
    "published",
];

const NUMBER_FIELDS: &[&str] = &["intensity", "likelihood", "relevance"];

/// The data-bearing part of a record. Also the payload accepted on create
/// and by the seed import.
///
/// Absent strings are empty and absent numbers are zero. Year-like fields
/// accept JSON numbers and keep them in their decimal string form so that
/// equality filters and facet lists only ever deal in strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[serde(default)]
pub struct RecordFields {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub insight: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub topic: String,
    #[serde(deserialize_with = "lenient_string")]
    pub sector: String,
    #[serde(deserialize_with = "lenient_string")]
    pub region: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pestle: String,
    #[serde(deserialize_with = "lenient_string")]
    pub source: String,
    #[serde(deserialize_with = "lenient_string")]
    pub swot: String,
    #[serde(deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_year: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_year: String,
    #[serde(deserialize_with = "lenient_string")]
    pub impact: String,
    #[serde(deserialize_with = "lenient_string")]
    pub added: String,
    #[serde(deserialize_with = "lenient_string")]
    pub published: String,
    #[serde(deserialize_with = "lenient_number")]
    pub intensity: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub likelihood: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub relevance: f64,
}

impl RecordFields {
    /// Parse a create payload. Shape errors (e.g. an object where a string
    /// belongs) are validation errors.
    pub fn from_json(value: Value) -> Result<Self, DashboardError> {
        if !value.is_object() {
            return Err(DashboardError::Validation(
                "request body must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| DashboardError::Validation(e.to_string()))
    }

    /// Title and topic are the only required fields.
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.title.is_empty() || self.topic.is_empty() {
            return Err(DashboardError::Validation(
                "title and topic are required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn facet_value(&self, facet: Facet) -> &str {
        match facet {
            Facet::EndYear => &self.end_year,
            Facet::Region => &self.region,
            Facet::Topic => &self.topic,
            Facet::Sector => &self.sector,
            Facet::Pestle => &self.pestle,
            Facet::Source => &self.source,
            Facet::Swot => &self.swot,
            Facet::Country => &self.country,
            Facet::City => &self.city,
        }
    }

    /// Serialize to the stored JSON document shape.
    pub fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: RecordFields,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Record {
    pub fn new(fields: RecordFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::ops::Deref for Record {
    type Target = RecordFields;

    fn deref(&self) -> &RecordFields {
        &self.fields
    }
}

// --- Partial updates ---

/// A normalized partial update: only known record fields, each already
/// coerced to its stored type. Unknown keys (including `_id`) are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    values: Map<String, Value>,
}

impl RecordPatch {
    pub fn from_json(value: Value) -> Result<Self, DashboardError> {
        let Value::Object(object) = value else {
            return Err(DashboardError::Validation(
                "request body must be a JSON object".to_string(),
            ));
        };

        let mut values = Map::new();
        for (key, raw) in object {
            if STRING_FIELDS.contains(&key.as_str()) {
                let s = coerce_string(raw)
                    .map_err(|e| DashboardError::Validation(format!("{key}: {e}")))?;
                if (key == "title" || key == "topic") && s.is_empty() {
                    return Err(DashboardError::Validation(format!("{key} cannot be empty")));
                }
                values.insert(key, Value::String(s));
            } else if NUMBER_FIELDS.contains(&key.as_str()) {
                let n = coerce_number(raw)
                    .map_err(|e| DashboardError::Validation(format!("{key}: {e}")))?;
                values.insert(key, Value::from(n));
            }
        }
        Ok(Self { values })
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The patch as a JSON object, suitable for a JSONB `||` merge.
    pub fn to_document(&self) -> Value {
        Value::Object(self.values.clone())
    }

    /// Overlay the patch onto `fields`.
    pub fn apply(&self, fields: &mut RecordFields) {
        let mut doc = match fields.to_document() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in &self.values {
            doc.insert(key.clone(), value.clone());
        }
        // Every value was coerced in from_json, so this cannot fail in practice.
        if let Ok(updated) = serde_json::from_value(Value::Object(doc)) {
            *fields = updated;
        }
    }
}

// --- Lenient field decoding ---

fn coerce_string(value: Value) -> Result<String, String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("expected a string, got {other}")),
    }
}

fn coerce_number(value: Value) -> Result<f64, String> {
    match value {
        Value::Null => Ok(0.0),
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{n} is not a finite number")),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{s:?} is not a number")),
        other => Err(format!("expected a number, got {other}")),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    coerce_string(value).map_err(serde::de::Error::custom)
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    coerce_number(value).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_years_are_kept_as_strings() {
        let fields: RecordFields = serde_json::from_value(json!({
            "title": "Oil demand",
            "topic": "oil",
            "end_year": 2027,
            "start_year": "",
            "intensity": 6,
        }))
        .unwrap();
        assert_eq!(fields.end_year, "2027");
        assert_eq!(fields.start_year, "");
        assert_eq!(fields.intensity, 6.0);
    }

    #[test]
    fn blank_and_null_numbers_default_to_zero() {
        let fields: RecordFields = serde_json::from_value(json!({
            "intensity": "",
            "likelihood": null,
            "relevance": "3",
        }))
        .unwrap();
        assert_eq!(fields.intensity, 0.0);
        assert_eq!(fields.likelihood, 0.0);
        assert_eq!(fields.relevance, 3.0);
    }

    #[test]
    fn create_requires_title_and_topic() {
        let missing_topic = RecordFields::from_json(json!({"title": "t"})).unwrap();
        assert!(matches!(
            missing_topic.validate(),
            Err(DashboardError::Validation(_))
        ));

        let missing_title = RecordFields::from_json(json!({"topic": "gas"})).unwrap();
        assert!(missing_title.validate().is_err());

        let ok = RecordFields::from_json(json!({"title": "t", "topic": "gas"})).unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(RecordFields::from_json(json!([1, 2])).is_err());
        assert!(RecordPatch::from_json(json!("x")).is_err());
    }

    #[test]
    fn patch_drops_unknown_keys_and_coerces() {
        let patch = RecordPatch::from_json(json!({
            "_id": "ignored",
            "color": "blue",
            "end_year": 2030,
            "likelihood": "4",
        }))
        .unwrap();
        assert_eq!(
            patch.to_document(),
            json!({"end_year": "2030", "likelihood": 4.0})
        );
    }

    #[test]
    fn patch_rejects_blanking_required_fields() {
        assert!(RecordPatch::from_json(json!({"title": ""})).is_err());
        assert!(RecordPatch::from_json(json!({"topic": null})).is_err());
    }

    #[test]
    fn patch_apply_only_touches_named_fields() {
        let mut fields = RecordFields::builder()
            .title("Gas prices")
            .topic("gas")
            .region("Europe")
            .intensity(5.0)
            .build();
        let patch = RecordPatch::from_json(json!({"region": "Asia"})).unwrap();
        patch.apply(&mut fields);
        assert_eq!(fields.region, "Asia");
        assert_eq!(fields.title, "Gas prices");
        assert_eq!(fields.intensity, 5.0);
    }

    #[test]
    fn record_wire_shape_uses_underscore_id() {
        let record = Record::new(RecordFields::builder().title("a").topic("b").build());
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("_id").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["topic"], "b");

        let back: Record = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn facet_names_round_trip() {
        for facet in Facet::ALL {
            assert_eq!(Facet::from_field(facet.field()), Some(facet));
        }
        assert_eq!(Facet::from_field("title"), None);
    }
}
