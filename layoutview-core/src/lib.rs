pub mod analysis;
pub mod browser;
pub mod consts;
pub mod error;
pub mod export;
pub mod layout;
pub mod render;
pub mod shell;

// Re-export commonly used types
pub use layout::{element::Entity, page::DocumentImage, result::AnalysisResult};
pub use render::overlay::{AnnotatedImage, BboxPolicy, OverlayConfig, OverlayRenderer};
pub use shell::{Presentation, ResultShell, View};
