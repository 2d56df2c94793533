//! Listing API payloads and lookup outcomes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::cache::CachedValue;

/// Attribute that carries the capital value.
pub const CAPITAL_VALUE_ATTRIBUTE: &str = "capital_value";

// == Upstream Payload ==
/// The subset of a listing document the pipeline reads.
///
/// Every other field is ignored, whatever its shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingDetails {
    #[serde(
        rename = "PropertyAttributes",
        default,
        deserialize_with = "lenient_attributes"
    )]
    pub property_attributes: Option<Vec<PropertyAttribute>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyAttribute {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Value", default)]
    pub value: Option<Value>,
}

/// Decodes the attribute list, dropping records that are not attribute objects.
fn lenient_attributes<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<PropertyAttribute>>, D::Error>
where
    D: Deserializer<'de>,
{
    let records: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(records.map(|records| {
        records
            .into_iter()
            .filter_map(|record| serde_json::from_value(record).ok())
            .collect()
    }))
}

impl ListingDetails {
    /// Value of the named attribute, if present and non-empty.
    ///
    /// Numbers are rendered as their decimal text.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let attribute = self
            .property_attributes
            .as_deref()?
            .iter()
            .find(|a| a.name.as_deref() == Some(name))?;

        match attribute.value.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn capital_value(&self) -> Option<String> {
        self.attribute(CAPITAL_VALUE_ATTRIBUTE)
    }
}

/// Raw HTTP reply from the listing source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

impl UpstreamReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// == Outcomes ==
/// Why a lookup produced no definitive answer. None of these are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// The request never completed
    Transport,
    /// HTTP 429
    RateLimited,
    /// Any other non-success status
    Upstream { status: u16 },
    /// Success status with a body that could not be decoded
    Malformed,
}

/// What a submitter receives for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    NotFound,
    Failed(FailureKind),
}

impl Resolution {
    pub fn value(&self) -> Option<&str> {
        match self {
            Resolution::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Resolution::Failed(_))
    }
}

impl From<CachedValue> for Resolution {
    fn from(value: CachedValue) -> Self {
        match value {
            CachedValue::Found(v) => Resolution::Found(v),
            CachedValue::NotFound => Resolution::NotFound,
        }
    }
}

/// Result of one pipeline run. `was_cached` decides whether the queue pauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub resolution: Resolution,
    pub was_cached: bool,
}

impl Lookup {
    pub fn cached(value: CachedValue) -> Self {
        Self {
            resolution: value.into(),
            was_cached: true,
        }
    }

    pub fn fetched(resolution: Resolution) -> Self {
        Self {
            resolution,
            was_cached: false,
        }
    }
}
