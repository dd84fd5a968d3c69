/// Width in pixels of the stroked outline drawn around every entity.
///
/// The outline grows outward from the bbox edge, one pixel per step, so a
/// width of 2 covers the edge pixel and the pixel just outside it.
pub const STROKE_WIDTH: u32 = 2;

/// Width of the filled label tag drawn above each bbox.
pub const LABEL_WIDTH: u32 = 80;

/// Height of the filled label tag drawn above each bbox.
pub const LABEL_HEIGHT: u32 = 20;

/// Vertical distance between the top of the bbox and the top of its label tag.
///
/// Labels are never clamped: a bbox touching the top edge of the page gets
/// a tag with a negative y coordinate, which the rasterizer clips.
pub const LABEL_OFFSET: i32 = 20;

/// Offset of the label text from the label tag's top-left corner.
pub const LABEL_TEXT_INSET: (i32, i32) = (5, 4);

/// Pixel height used for label text.
pub const FONT_SCALE: f32 = 12.0;

/// Label text color, opaque white.
pub const TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Alpha shared by every entity type color (50%).
pub const LABEL_ALPHA: u8 = 128;

/// Number of characters of each entity's text shown in a browser preview.
pub const PREVIEW_CHARS: usize = 20;

/// Number of entities per type that contribute to a browser preview.
pub const PREVIEW_ENTITIES: usize = 3;

/// Suffix appended to a truncated preview.
pub const ELLIPSIS: &str = "...";

pub const STRUCTURED_EXPORT_FILENAME: &str = "document-analysis.json";
pub const TABULAR_EXPORT_FILENAME: &str = "document-analysis.csv";
pub const IMAGE_EXPORT_FILENAME: &str = "document-annotated.png";

/// Header row of the tabular export.
pub const TABULAR_HEADER: &str = "Type,Text,Confidence,X1,Y1,X2,Y2";

/// Default label font, DejaVu Sans.
pub const FONT: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");
