use std::{fmt, io::Cursor};

use ab_glyph::{FontArc, PxScale};
use bytes::Bytes;
use derive_builder::Builder;
use image::{ImageFormat, Rgba, RgbaImage, imageops};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut},
    rect::Rect,
};
use snafu::ResultExt;
use tracing::*;

use crate::{
    analysis::{bbox::Bbox, labels::color_for},
    consts::*,
    error::*,
    layout::{page::DocumentImage, result::EntityGroups},
};

/// What to do with a bbox whose corners are swapped (`x1 > x2` or `y1 > y2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BboxPolicy {
    /// Fail the whole render with `MalformedEntity`.
    #[default]
    Reject,
    /// Swap the corners and draw the normalized box.
    Normalize,
}

/// Drawing parameters for [`OverlayRenderer`].
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct OverlayConfig {
    pub stroke_width: u32,
    pub label_width: u32,
    pub label_height: u32,
    /// Distance from the bbox top to the label tag top.
    pub label_offset: i32,
    pub label_text_inset: (i32, i32),
    pub font_scale: f32,
    pub text_color: [u8; 4],
    pub bbox_policy: BboxPolicy,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            stroke_width: STROKE_WIDTH,
            label_width: LABEL_WIDTH,
            label_height: LABEL_HEIGHT,
            label_offset: LABEL_OFFSET,
            label_text_inset: LABEL_TEXT_INSET,
            font_scale: FONT_SCALE,
            text_color: TEXT_COLOR,
            bbox_policy: BboxPolicy::Reject,
        }
    }
}

/// The source page with entity boxes and labels drawn over it, at native resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedImage {
    pub image: RgbaImage,
}

impl AnnotatedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    pub fn to_png(&self) -> Result<Bytes, LayoutViewError> {
        let mut buf = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .context(ImageEncodeSnafu)?;
        Ok(Bytes::from(buf))
    }
}

/// Draws typed entity boxes over a document page.
///
/// Rendering is a pure function of the page and the entity groups: nothing is
/// cached between calls, and the same input always produces the same raster.
#[derive(Clone)]
pub struct OverlayRenderer {
    pub config: OverlayConfig,
    font: Option<FontArc>,
}

impl fmt::Debug for OverlayRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayRenderer")
            .field("config", &self.config)
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

fn bundled_font() -> Option<FontArc> {
    FontArc::try_from_slice(FONT)
        .inspect_err(|err| error!("bundled label font is unusable: {err}"))
        .ok()
}

impl OverlayRenderer {
    /// Creates a renderer that writes label text with the bundled font.
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            font: bundled_font(),
        }
    }

    /// Replaces the bundled font with the given TrueType/OpenType font.
    pub fn with_font_bytes(mut self, font: Vec<u8>) -> Result<Self, LayoutViewError> {
        self.font = Some(FontArc::try_from_vec(font).context(FontSnafu {})?);
        Ok(self)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Renders the overlay for `entities` on top of `image`.
    ///
    /// Groups are drawn in key order and entities in stored order; overlays are
    /// painted onto one layer with replace semantics, so where two entities
    /// overlap the later one's color is what ends up over the page.
    #[instrument(skip_all, fields(types = entities.len()))]
    pub fn render(
        &self,
        image: &DocumentImage,
        entities: &EntityGroups,
    ) -> Result<AnnotatedImage, LayoutViewError> {
        if self.config.bbox_policy == BboxPolicy::Reject {
            crate::layout::result::validate(entities)?;
        }

        let mut canvas = image.decode()?.to_rgba8();
        let (width, height) = canvas.dimensions();
        debug!("decoded page {width}x{height}");

        let page = Bbox::from_coords(0, 0, width as i32, height as i32);
        let mut layer = RgbaImage::new(width, height);
        let mut drawn = 0usize;

        for (entity_type, group) in entities {
            let color = color_for(entity_type);
            for (index, entity) in group.iter().enumerate() {
                let bbox = if entity.bbox.is_ordered() {
                    entity.bbox
                } else {
                    debug!("normalizing inverted bbox of `{entity_type}` #{index}");
                    entity.bbox.normalized()
                };
                if bbox.intersection(&page) == 0 {
                    debug!("`{entity_type}` #{index} at ({bbox}) lies outside the page");
                }

                self.draw_entity(&mut layer, entity_type, bbox, color);
                drawn += 1;
            }
        }

        imageops::overlay(&mut canvas, &layer, 0, 0);
        info!("rendered {drawn} entities on {width}x{height} page");

        Ok(AnnotatedImage { image: canvas })
    }

    fn draw_entity(&self, layer: &mut RgbaImage, entity_type: &str, bbox: Bbox, color: Rgba<u8>) {
        let (width, height) = layer.dimensions();
        let outline = outline_bounds(bbox, width, height, self.config.stroke_width).to_rect();

        // The outline grows outward one pixel per step
        for offset in 0..self.config.stroke_width {
            let grow = offset as i32;
            let thick_rect = Rect::at(outline.left() - grow, outline.top() - grow)
                .of_size(outline.width() + offset * 2, outline.height() + offset * 2);
            draw_hollow_rect_mut(layer, thick_rect, color);
        }

        let label_x = i64::from(bbox.min.x);
        let label_y = i64::from(bbox.min.y) - i64::from(self.config.label_offset);
        let left = label_x.max(0);
        let top = label_y.max(0);
        let right = (label_x + i64::from(self.config.label_width)).min(i64::from(width));
        let bottom = (label_y + i64::from(self.config.label_height)).min(i64::from(height));
        if right <= left || bottom <= top {
            trace!("label of `{entity_type}` at ({label_x}, {label_y}) is off the page");
            return;
        }
        // Clipped to the page, so every bound fits in i32
        let tag = Rect::at(left as i32, top as i32)
            .of_size((right - left) as u32, (bottom - top) as u32);
        draw_filled_rect_mut(layer, tag, color);

        match &self.font {
            Some(font) => {
                // The tag reaches the page, so its corner is within a label size of it
                let (inset_x, inset_y) = self.config.label_text_inset;
                draw_text_mut(
                    layer,
                    Rgba(self.config.text_color),
                    label_x as i32 + inset_x,
                    label_y as i32 + inset_y,
                    PxScale::from(self.config.font_scale),
                    font,
                    entity_type,
                );
            }
            None => trace!("no font loaded, skipping label text for `{entity_type}`"),
        }
    }
}

/// The bbox with edges beyond the page pulled in to just outside it.
///
/// Every outline pixel of an edge moved this way stays off the page, so the
/// visible result is unchanged while the rasterizer only walks page-sized lines.
fn outline_bounds(bbox: Bbox, width: u32, height: u32, stroke_width: u32) -> Bbox {
    let margin = i32::try_from(stroke_width).unwrap_or(i32::MAX);
    let page = Bbox::from_coords(
        -margin,
        -margin,
        (width as i32).saturating_add(margin),
        (height as i32).saturating_add(margin),
    );
    bbox.clamp(&page)
}
