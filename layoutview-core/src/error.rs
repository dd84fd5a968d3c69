use snafu::prelude::*;

use crate::analysis::bbox::Bbox;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LayoutViewError {
    #[snafu(display("Decode source image error: {}", source))]
    Decode { source: image::ImageError },
    #[snafu(display(
        "Malformed `{}` entity #{}: bbox {} is inverted",
        entity_type,
        index,
        bbox
    ))]
    MalformedEntity {
        entity_type: String,
        index: usize,
        bbox: Bbox,
    },
    #[snafu(display("Source image is unavailable after a previous decode failure"))]
    ImageUnavailable,
    #[snafu(display("Load Font error: {}", source))]
    Font { source: ab_glyph::InvalidFont },
    #[snafu(display("Image Encode error: {}", source))]
    ImageEncode { source: image::ImageError },
    #[snafu(display("Json `{}` error: {}", stage, source))]
    Json {
        source: serde_json::Error,
        stage: String,
    },
    #[snafu(display("Read `{}` error: {}", path, source))]
    IoRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Write `{}` error: {}", path, source))]
    IoWrite {
        source: std::io::Error,
        path: String,
    },
}
