use std::{fs, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tracing::*;

use crate::{
    error::{IoReadSnafu, JsonSnafu, LayoutViewError},
    layout::element::{Entity, EntityType},
};

/// Entities grouped by type, in the payload's first-seen key order.
pub type EntityGroups = IndexMap<EntityType, Vec<Entity>>;

/// The full analysis output for one document.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct AnalysisResult {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub entities: EntityGroups,
}

fn default_success() -> bool {
    true
}

impl AnalysisResult {
    pub fn new(entities: EntityGroups) -> Self {
        Self {
            success: true,
            error: None,
            entities,
        }
    }

    /// Parses a result payload as returned by the analysis service.
    pub fn from_json(payload: &[u8]) -> Result<Self, LayoutViewError> {
        serde_json::from_slice(payload).context(JsonSnafu {
            stage: "parse-result",
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LayoutViewError> {
        let path = path.as_ref();
        let payload = fs::read(path).context(IoReadSnafu {
            path: path.to_string_lossy(),
        })?;
        Self::from_json(&payload)
    }

    /// Distinct entity types in first-seen order.
    pub fn type_list(&self) -> Vec<&str> {
        type_list(&self.entities)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.values().map(Vec::len).sum()
    }

    /// Every entity with its group type, in type-list then stored order.
    pub fn iter_entities(&self) -> impl Iterator<Item = (&str, &Entity)> {
        iter_entities(&self.entities)
    }

    /// Checks that every bbox is ordered (`x1 <= x2`, `y1 <= y2`).
    pub fn validate(&self) -> Result<(), LayoutViewError> {
        validate(&self.entities)
    }
}

pub fn type_list(entities: &EntityGroups) -> Vec<&str> {
    entities.keys().map(String::as_str).collect()
}

pub fn iter_entities(entities: &EntityGroups) -> impl Iterator<Item = (&str, &Entity)> {
    entities.iter().flat_map(|(entity_type, group)| {
        group
            .iter()
            .map(move |entity| (entity_type.as_str(), entity))
    })
}

/// Returns `MalformedEntity` for the first inverted bbox found.
///
/// A redundant `type` field that disagrees with its group is only logged, the
/// group key wins.
pub fn validate(entities: &EntityGroups) -> Result<(), LayoutViewError> {
    for (entity_type, group) in entities {
        for (index, entity) in group.iter().enumerate() {
            if let Some(kind) = entity.kind.as_deref() {
                if kind != entity_type.as_str() {
                    warn!("entity #{index} of group `{entity_type}` claims type `{kind}`, using group");
                }
            }
            if !entity.bbox.is_ordered() {
                return Err(LayoutViewError::MalformedEntity {
                    entity_type: entity_type.clone(),
                    index,
                    bbox: entity.bbox,
                });
            }
        }
    }
    Ok(())
}
