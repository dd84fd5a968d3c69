//! Result presentation shell: the current result, the active view and the export actions.

use tracing::*;

use crate::{
    browser::{BrowserRow, EntityBrowser},
    error::LayoutViewError,
    export::{self, ExportArtifact, ExportKind},
    layout::{page::DocumentImage, result::AnalysisResult},
    render::overlay::{AnnotatedImage, OverlayRenderer},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Entity browser.
    #[default]
    Structured,
    /// Annotated page raster.
    Visualization,
    /// Pretty-printed result.
    Raw,
}

/// One installed result and its page, replaced only as a whole.
#[derive(Debug, Clone)]
pub struct Session {
    pub result: AnalysisResult,
    pub image: Option<DocumentImage>,
    /// Set after the page failed to decode; cleared by the next install.
    image_broken: bool,
}

/// What the active view shows.
#[derive(Debug)]
pub enum Presentation {
    /// No result has been installed yet.
    Empty,
    Structured(Vec<BrowserRow>),
    Visualization(Result<AnnotatedImage, LayoutViewError>),
    Raw(Result<String, LayoutViewError>),
}

#[derive(Debug, Default)]
pub struct ResultShell {
    session: Option<Session>,
    view: View,
    browser: Option<EntityBrowser>,
    renderer: OverlayRenderer,
    last_error: Option<String>,
}

impl ResultShell {
    pub fn new(renderer: OverlayRenderer) -> Self {
        Self {
            renderer,
            ..Default::default()
        }
    }

    /// Replaces the current result and page together and resets the browser.
    pub fn install(&mut self, result: AnalysisResult, image: Option<DocumentImage>) {
        info!(
            "installing result with {} entities in {} types, image: {}",
            result.entity_count(),
            result.entities.len(),
            image.is_some()
        );
        if let Some(image) = image.as_ref() {
            match image.dimensions() {
                Ok((width, height)) => debug!("page image {width}x{height}"),
                Err(err) => debug!("page image header unreadable: {err}"),
            }
        }
        match self.browser.as_mut() {
            Some(browser) => browser.reset(&result),
            None => self.browser = Some(EntityBrowser::new(&result)),
        }
        self.session = Some(Session {
            result,
            image,
            image_broken: false,
        });
        self.last_error = None;
    }

    /// Records a failed upload. The previous result, if any, stays in place.
    pub fn transport_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("document processing failed: {message}");
        self.last_error = Some(message);
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn select(&mut self, view: View) {
        debug!("switching view {:?} -> {view:?}", self.view);
        self.view = view;
    }

    pub fn browser(&self) -> Option<&EntityBrowser> {
        self.browser.as_ref()
    }

    /// Forwards a type-row click to the browser.
    pub fn click(&mut self, entity_type: &str) {
        if let (Some(browser), Some(session)) = (self.browser.as_mut(), self.session.as_ref()) {
            browser.click(&session.result, entity_type);
        }
    }

    /// Whether the visualization and the image export can run.
    pub fn image_available(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.image.is_some() && !session.image_broken)
    }

    /// Renders the active view.
    pub fn present(&mut self) -> Presentation {
        match self.view {
            View::Structured => match (self.session.as_ref(), self.browser.as_ref()) {
                (Some(session), Some(browser)) => {
                    Presentation::Structured(browser.rows(&session.result))
                }
                _ => Presentation::Empty,
            },
            View::Visualization => match self.session.is_some() {
                true => Presentation::Visualization(self.visualize()),
                false => Presentation::Empty,
            },
            View::Raw => match self.session.as_ref() {
                Some(session) => Presentation::Raw(export::pretty_json(&session.result)),
                None => Presentation::Empty,
            },
        }
    }

    /// Runs one export action. Returns `Ok(None)` when the action is disabled.
    pub fn export(&mut self, kind: ExportKind) -> Result<Option<ExportArtifact>, LayoutViewError> {
        let Some(session) = self.session.as_ref() else {
            debug!("no result installed, {kind:?} export disabled");
            return Ok(None);
        };
        match kind {
            ExportKind::Structured => export::structured(&session.result).map(Some),
            ExportKind::Tabular => Ok(Some(export::tabular(&session.result))),
            ExportKind::Image => {
                if session.image_broken {
                    return Err(LayoutViewError::ImageUnavailable);
                }
                let exported =
                    export::annotated_image(&self.renderer, session.image.as_ref(), &session.result);
                self.note_decode_failure(&exported);
                exported
            }
        }
    }

    /// Runs every enabled export action.
    pub fn export_all(&mut self) -> Vec<Result<ExportArtifact, LayoutViewError>> {
        ExportKind::ALL
            .into_iter()
            .filter_map(|kind| self.export(kind).transpose())
            .collect()
    }

    fn visualize(&mut self) -> Result<AnnotatedImage, LayoutViewError> {
        let Some(session) = self.session.as_ref() else {
            return Err(LayoutViewError::ImageUnavailable);
        };
        let image = match (&session.image, session.image_broken) {
            (Some(image), false) => image,
            _ => return Err(LayoutViewError::ImageUnavailable),
        };
        let rendered = self.renderer.render(image, &session.result.entities);
        self.note_decode_failure(&rendered);
        rendered
    }

    fn note_decode_failure<T>(&mut self, outcome: &Result<T, LayoutViewError>) {
        if let Err(LayoutViewError::Decode { source }) = outcome {
            warn!("page image cannot be decoded, disabling visualization: {source}");
            if let Some(session) = self.session.as_mut() {
                session.image_broken = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        browser::Expansion,
        layout::{page::tests::solid_png, result::tests::sample},
    };

    fn loaded_shell() -> ResultShell {
        let mut shell = ResultShell::default();
        shell.install(sample(), Some(solid_png(200, 100, [255, 255, 255, 255])));
        shell
    }

    #[test]
    fn test_empty_shell() {
        let mut shell = ResultShell::default();
        for view in [View::Structured, View::Visualization, View::Raw] {
            shell.select(view);
            assert!(matches!(shell.present(), Presentation::Empty));
        }
        assert!(shell.export_all().is_empty());
        assert!(!shell.image_available());
    }

    #[test]
    fn test_views_share_one_session() {
        let mut shell = loaded_shell();
        assert_eq!(shell.view(), View::Structured);
        assert!(matches!(shell.present(), Presentation::Structured(rows) if rows.len() == 5));

        shell.select(View::Visualization);
        match shell.present() {
            Presentation::Visualization(Ok(image)) => assert_eq!(image.width(), 200),
            other => panic!("expected visualization, got {other:?}"),
        }

        shell.select(View::Raw);
        match shell.present() {
            Presentation::Raw(Ok(json)) => {
                assert_eq!(AnalysisResult::from_json(json.as_bytes()).unwrap(), sample())
            }
            other => panic!("expected raw view, got {other:?}"),
        }

        // Switching back keeps the browser state
        shell.click("question");
        shell.select(View::Structured);
        assert!(matches!(shell.present(), Presentation::Structured(rows) if rows.len() == 3));
    }

    #[test]
    fn test_install_replaces_as_unit() {
        let mut shell = loaded_shell();
        shell.click("answer");

        let replacement = AnalysisResult::from_json(
            br#"{"entities": {"header": [{"text": "New", "bbox": [0, 0, 9, 9], "confidence": 0.7}]}}"#,
        )
        .unwrap();
        shell.install(replacement.clone(), None);

        let session = shell.session().unwrap();
        assert_eq!(session.result, replacement);
        assert!(session.image.is_none());
        assert_eq!(
            shell.browser().unwrap().expansion(),
            &Expansion::Expanded("header".to_string())
        );
        assert!(!shell.image_available());
    }

    #[test]
    fn test_transport_failure_keeps_state() {
        let mut shell = ResultShell::default();
        shell.transport_failed("Document processing failed");
        assert!(shell.session().is_none());
        assert_eq!(shell.last_error(), Some("Document processing failed"));

        let mut shell = loaded_shell();
        shell.transport_failed("timeout");
        assert_eq!(shell.session().unwrap().result, sample());
        assert!(shell.image_available());

        shell.install(sample(), None);
        assert_eq!(shell.last_error(), None);
    }

    #[test]
    fn test_exports_available_from_any_view() {
        let mut shell = loaded_shell();
        for view in [View::Structured, View::Visualization, View::Raw] {
            shell.select(view);
            let artifacts: Vec<_> = shell
                .export_all()
                .into_iter()
                .map(|artifact| artifact.unwrap().filename())
                .collect();
            assert_eq!(
                artifacts,
                vec![
                    "document-analysis.json",
                    "document-analysis.csv",
                    "document-annotated.png"
                ]
            );
        }
    }

    #[test]
    fn test_image_export_noop_without_image() {
        let mut shell = ResultShell::default();
        shell.install(sample(), None);
        assert!(shell.export(ExportKind::Image).unwrap().is_none());
        assert_eq!(shell.export_all().len(), 2);
    }

    #[test]
    fn test_non_finite_confidence_fails_json_only() {
        let mut result = sample();
        result.entities["answer"][0].confidence = f64::NAN;
        let mut shell = ResultShell::default();
        shell.install(result, None);

        shell.select(View::Raw);
        assert!(matches!(
            shell.present(),
            Presentation::Raw(Err(LayoutViewError::Json { .. }))
        ));
        assert!(shell.export(ExportKind::Structured).is_err());
        assert!(shell.export(ExportKind::Tabular).unwrap().is_some());
    }

    #[test]
    fn test_decode_failure_is_local() {
        let mut shell = ResultShell::default();
        shell.install(sample(), Some(DocumentImage::new(&b"broken"[..])));
        assert!(shell.image_available());

        shell.select(View::Visualization);
        assert!(matches!(
            shell.present(),
            Presentation::Visualization(Err(LayoutViewError::Decode { .. }))
        ));
        assert!(!shell.image_available());
        assert!(matches!(
            shell.present(),
            Presentation::Visualization(Err(LayoutViewError::ImageUnavailable))
        ));
        assert!(matches!(
            shell.export(ExportKind::Image),
            Err(LayoutViewError::ImageUnavailable)
        ));

        // Data views and exports are unaffected
        shell.select(View::Raw);
        assert!(matches!(shell.present(), Presentation::Raw(Ok(_))));
        assert!(shell.export(ExportKind::Tabular).unwrap().is_some());

        // A new install clears the flag
        shell.install(sample(), Some(solid_png(10, 10, [0, 0, 0, 255])));
        assert!(shell.image_available());
    }
}
