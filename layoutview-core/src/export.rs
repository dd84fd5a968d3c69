//! Exports of an analysis result as named byte buffers.

use std::{
    fs,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use snafu::ResultExt;
use tracing::*;

use crate::{
    consts::*,
    error::*,
    layout::{page::DocumentImage, result::AnalysisResult},
    render::overlay::OverlayRenderer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Structured,
    Tabular,
    Image,
}

impl ExportKind {
    pub const ALL: [ExportKind; 3] = [ExportKind::Structured, ExportKind::Tabular, ExportKind::Image];

    pub const fn filename(&self) -> &'static str {
        match self {
            ExportKind::Structured => STRUCTURED_EXPORT_FILENAME,
            ExportKind::Tabular => TABULAR_EXPORT_FILENAME,
            ExportKind::Image => IMAGE_EXPORT_FILENAME,
        }
    }

    pub const fn media_type(&self) -> &'static str {
        match self {
            ExportKind::Structured => "application/json",
            ExportKind::Tabular => "text/csv",
            ExportKind::Image => "image/png",
        }
    }
}

/// A downloadable file: contents plus the suggested filename.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub kind: ExportKind,
    pub bytes: Bytes,
}

impl ExportArtifact {
    pub fn filename(&self) -> &'static str {
        self.kind.filename()
    }

    pub fn media_type(&self) -> &'static str {
        self.kind.media_type()
    }

    /// Saves the artifact as `dir/<filename>`, replacing any previous export.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, LayoutViewError> {
        let path = dir.as_ref().join(self.filename());
        fs::write(&path, &self.bytes).context(IoWriteSnafu {
            path: path.to_string_lossy(),
        })?;
        info!("wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Pretty JSON (2-space indent) of the whole result.
///
/// Fails only for a model built in memory with a non-finite confidence.
pub fn structured(result: &AnalysisResult) -> Result<ExportArtifact, LayoutViewError> {
    Ok(ExportArtifact {
        kind: ExportKind::Structured,
        bytes: Bytes::from(pretty_json(result)?),
    })
}

/// Same text as the structured export, used by the raw view.
pub fn pretty_json(result: &AnalysisResult) -> Result<String, LayoutViewError> {
    serde_json::to_string_pretty(result).context(JsonSnafu {
        stage: "serialize-result",
    })
}

/// CSV with one row per entity in type-list then stored order.
pub fn tabular(result: &AnalysisResult) -> ExportArtifact {
    let mut csv = String::with_capacity(64 * (result.entity_count() + 1));
    csv.push_str(TABULAR_HEADER);
    csv.push('\n');
    for (entity_type, entity) in result.iter_entities() {
        let [x1, y1, x2, y2] = entity.bbox.coords();
        csv.push_str(&format!(
            "{entity_type},{},{},{x1},{y1},{x2},{y2}\n",
            quote(&entity.text),
            entity.confidence
        ));
    }
    ExportArtifact {
        kind: ExportKind::Tabular,
        bytes: Bytes::from(csv),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// PNG of the overlay, or `None` when no page image is loaded.
#[instrument(skip_all)]
pub fn annotated_image(
    renderer: &OverlayRenderer,
    image: Option<&DocumentImage>,
    result: &AnalysisResult,
) -> Result<Option<ExportArtifact>, LayoutViewError> {
    let Some(image) = image else {
        debug!("no page image loaded, image export disabled");
        return Ok(None);
    };
    let png = renderer.render(image, &result.entities)?.to_png()?;
    Ok(Some(ExportArtifact {
        kind: ExportKind::Image,
        bytes: png,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::bbox::Bbox,
        layout::{element::Entity, page::tests::solid_png, result::tests::sample},
    };

    fn single(entity_type: &str, entity: Entity) -> AnalysisResult {
        let mut groups = crate::layout::result::EntityGroups::new();
        groups.insert(entity_type.to_string(), vec![entity]);
        AnalysisResult::new(groups)
    }

    #[test]
    fn test_structured_round_trip() {
        let result = sample();
        let artifact = structured(&result).unwrap();
        assert_eq!(artifact.filename(), "document-analysis.json");
        assert_eq!(artifact.media_type(), "application/json");

        let parsed = AnalysisResult::from_json(&artifact.bytes).unwrap();
        assert_eq!(parsed, result);
        assert_eq!(parsed.type_list(), result.type_list());
    }

    #[test]
    fn test_structured_two_space_indent() {
        let result = single("header", Entity::new("Title", 0.5, Bbox::from_coords(1, 2, 3, 4)));
        let text = String::from_utf8(structured(&result).unwrap().bytes.to_vec()).unwrap();
        assert!(text.starts_with("{\n  \"success\": true,\n  \"entities\": {\n    \"header\": ["));
        assert_eq!(text, pretty_json(&result).unwrap());
    }

    #[test]
    fn test_structured_rejects_non_finite_confidence() {
        let result = single("answer", Entity::new("x", f64::NAN, Bbox::from_coords(0, 0, 1, 1)));
        assert!(matches!(
            structured(&result),
            Err(LayoutViewError::Json { stage, .. }) if stage == "serialize-result"
        ));
        assert!(pretty_json(&result).is_err());

        // The tabular export has no such restriction
        assert!(String::from_utf8(tabular(&result).bytes.to_vec()).unwrap().contains("NaN"));
    }

    #[test]
    fn test_structured_is_idempotent() {
        let result = sample();
        assert_eq!(structured(&result).unwrap(), structured(&result).unwrap());
        assert_eq!(tabular(&result), tabular(&result));
    }

    #[test]
    fn test_tabular_row_escaping() {
        let result = single(
            "header",
            Entity::new("Say \"hi\"", 0.873, Bbox::from_coords(10, 20, 110, 40)),
        );
        let artifact = tabular(&result);
        assert_eq!(artifact.filename(), "document-analysis.csv");
        assert_eq!(
            String::from_utf8(artifact.bytes.to_vec()).unwrap(),
            "Type,Text,Confidence,X1,Y1,X2,Y2\nheader,\"Say \"\"hi\"\"\",0.873,10,20,110,40\n"
        );
    }

    #[test]
    fn test_tabular_order() {
        let csv = String::from_utf8(tabular(&sample()).bytes.to_vec()).unwrap();
        let kinds: Vec<_> = csv
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(kinds, vec!["question", "question", "answer", "header"]);
    }

    #[test]
    fn test_tabular_empty_result() {
        let empty = AnalysisResult::new(Default::default());
        assert_eq!(&tabular(&empty).bytes[..], b"Type,Text,Confidence,X1,Y1,X2,Y2\n");
    }

    #[test]
    fn test_image_export_disabled_without_image() {
        let dir = tempfile::tempdir().unwrap();
        let exported = annotated_image(&OverlayRenderer::default(), None, &sample()).unwrap();
        assert!(exported.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_image_export_png() {
        let page = solid_png(200, 100, [255, 255, 255, 255]);
        let renderer = OverlayRenderer::default();
        let result = sample();

        let first = annotated_image(&renderer, Some(&page), &result)
            .unwrap()
            .unwrap();
        assert_eq!(first.filename(), "document-annotated.png");
        assert_eq!(first.media_type(), "image/png");

        let decoded = image::load_from_memory(&first.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 100));

        let second = annotated_image(&renderer, Some(&page), &result)
            .unwrap()
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_image_export_decode_failure() {
        let page = DocumentImage::new(&b"nope"[..]);
        let err = annotated_image(&OverlayRenderer::default(), Some(&page), &sample()).unwrap_err();
        assert!(matches!(err, LayoutViewError::Decode { .. }));
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = sample();
        for artifact in [structured(&result).unwrap(), tabular(&result)] {
            let path = artifact.write_to(dir.path()).unwrap();
            assert_eq!(path.file_name().unwrap(), artifact.filename());
            assert_eq!(fs::read(&path).unwrap(), artifact.bytes.to_vec());
        }

        let missing = dir.path().join("missing");
        let err = structured(&result).unwrap().write_to(&missing).unwrap_err();
        assert!(matches!(err, LayoutViewError::IoWrite { .. }));
    }
}
