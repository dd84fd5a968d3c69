//! Entity browser: one row per entity type, with a single expandable type.

use image::Rgba;
use tracing::*;

use crate::{
    analysis::labels::color_for,
    consts::{ELLIPSIS, PREVIEW_CHARS, PREVIEW_ENTITIES},
    layout::{
        element::{Entity, EntityType},
        result::AnalysisResult,
    },
};

/// Which type, if any, shows its detail rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    Collapsed,
    Expanded(EntityType),
}

impl Expansion {
    /// Initial state: the first type of the result, if there is one.
    pub fn initial(result: &AnalysisResult) -> Self {
        match result.type_list().first() {
            Some(entity_type) => Expansion::Expanded(entity_type.to_string()),
            None => Expansion::Collapsed,
        }
    }

    /// Clicking the expanded type collapses it, clicking any other type expands that one.
    pub fn next(&self, clicked: &str) -> Self {
        match self {
            Expansion::Expanded(current) if current == clicked => Expansion::Collapsed,
            _ => Expansion::Expanded(clicked.to_string()),
        }
    }

    pub fn is_expanded(&self, entity_type: &str) -> bool {
        matches!(self, Expansion::Expanded(current) if current == entity_type)
    }
}

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Characters kept from each previewed text before the ellipsis.
    pub preview_chars: usize,
    /// Entities per type contributing to the preview.
    pub preview_entities: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            preview_chars: PREVIEW_CHARS,
            preview_entities: PREVIEW_ENTITIES,
        }
    }
}

/// Summary row of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRow {
    pub entity_type: EntityType,
    pub badge: Rgba<u8>,
    pub count: usize,
    pub preview: Vec<String>,
    pub expanded: bool,
}

/// One entity of the expanded type.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub text: String,
    /// Percentage with one decimal, e.g. `87.3%`.
    pub confidence: String,
    /// `x1, y1, x2, y2`.
    pub position: String,
}

impl From<&Entity> for DetailRow {
    fn from(entity: &Entity) -> Self {
        Self {
            text: entity.text.clone(),
            confidence: format_confidence(entity.confidence),
            position: entity.bbox.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrowserRow {
    Type(TypeRow),
    Detail(DetailRow),
}

#[derive(Debug, Clone)]
pub struct EntityBrowser {
    pub config: BrowserConfig,
    expansion: Expansion,
}

impl EntityBrowser {
    pub fn new(result: &AnalysisResult) -> Self {
        Self::with_config(BrowserConfig::default(), result)
    }

    pub fn with_config(config: BrowserConfig, result: &AnalysisResult) -> Self {
        Self {
            config,
            expansion: Expansion::initial(result),
        }
    }

    /// Returns to the initial state for a newly installed result.
    pub fn reset(&mut self, result: &AnalysisResult) {
        self.expansion = Expansion::initial(result);
    }

    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    /// Handles a click on a type row. Types missing from `result` are ignored.
    pub fn click(&mut self, result: &AnalysisResult, entity_type: &str) -> &Expansion {
        if result.entities.contains_key(entity_type) {
            self.expansion = self.expansion.next(entity_type);
            debug!("browser expansion now {:?}", self.expansion);
        } else {
            debug!("ignoring click on unknown type `{entity_type}`");
        }
        &self.expansion
    }

    /// Type rows in type-list order, each followed by its detail rows when expanded.
    pub fn rows(&self, result: &AnalysisResult) -> Vec<BrowserRow> {
        let mut rows = Vec::with_capacity(result.entities.len());
        for (entity_type, group) in &result.entities {
            let expanded = self.expansion.is_expanded(entity_type);
            rows.push(BrowserRow::Type(TypeRow {
                entity_type: entity_type.clone(),
                badge: color_for(entity_type),
                count: group.len(),
                preview: group
                    .iter()
                    .take(self.config.preview_entities)
                    .map(|entity| preview_text(&entity.text, self.config.preview_chars))
                    .collect(),
                expanded,
            }));
            if expanded {
                rows.extend(group.iter().map(|entity| BrowserRow::Detail(entity.into())));
            }
        }
        rows
    }

    /// Plain-text table of [`EntityBrowser::rows`].
    pub fn render_text(&self, result: &AnalysisResult) -> String {
        let rows = self.rows(result);
        let type_width = result
            .type_list()
            .iter()
            .map(|entity_type| entity_type.chars().count())
            .chain(std::iter::once("Entity Type".len()))
            .max()
            .unwrap_or_default();

        let mut out = String::new();
        out.push_str(&format!("    {:<type_width$}  Count  Preview\n", "Entity Type"));
        for row in rows {
            let line = match row {
                BrowserRow::Type(row) => format!(
                    "{} {:<type_width$}  {:>5}  {}\n",
                    if row.expanded { "[-]" } else { "[+]" },
                    row.entity_type,
                    row.count,
                    row.preview.join(" | "),
                ),
                BrowserRow::Detail(row) => format!(
                    "      Text: {}  Confidence: {}  Position: {}\n",
                    row.text, row.confidence, row.position
                ),
            };
            out.push_str(&line);
        }
        out
    }
}

/// First `max_chars` characters of `text`, with an ellipsis when truncated.
pub fn preview_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Percentage with one decimal. Exact halves round up, so `0.8725` is `87.3%`.
pub fn format_confidence(confidence: f64) -> String {
    let percent = confidence * 100.0;
    let tenths = percent * 10.0;
    if tenths - tenths.floor() == 0.5 {
        format!("{:.1}%", tenths.ceil() / 10.0)
    } else {
        format!("{percent:.1}%")
    }
}
