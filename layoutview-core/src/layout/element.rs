use serde::{Deserialize, Serialize, Serializer, ser::Error as _};

use crate::analysis::bbox::Bbox;

/// Category label of a detected region, e.g. `header` or `answer`.
pub type EntityType = String;

/// One detected text region.
///
/// The group an entity is stored under is its authoritative type; `kind` only
/// mirrors the redundant `type` field some services emit, and is kept so that
/// exports reproduce the payload.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Entity {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityType>,
    /// Recognized content, may be empty.
    #[serde(default)]
    pub text: String,
    pub bbox: Bbox,
    /// Detector certainty in `[0.0, 1.0]`.
    #[serde(serialize_with = "finite")]
    pub confidence: f64,
}

/// JSON has no NaN or infinity, and `serde_json` would silently write `null`.
fn finite<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        Err(S::Error::custom(format!("confidence {value} is not finite")))
    }
}

impl Entity {
    pub fn new(text: impl Into<String>, confidence: f64, bbox: Bbox) -> Self {
        Self {
            kind: None,
            text: text.into(),
            bbox,
            confidence,
        }
    }
}
