use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};

use crate::error::StoneDetectError;
use crate::stones::StoneRecord;

/// Draws stone boxes and `Stone<N>` labels onto a copy of the photo.
///
/// Labels use the bundled DejaVu Sans unless another font file is loaded.
/// [`Annotator::without_labels`] draws boxes only.
pub struct Annotator {
    font: Option<FontArc>,
    pub box_color: Rgb<u8>,
    pub label_color: Rgb<u8>,
    pub line_thickness: u32,
    pub label_scale: f32,
}

static BUNDLED_FONT: &[u8] = include_bytes!("../fonts/DejaVuSans.ttf");

impl Default for Annotator {
    fn default() -> Self {
        let font = FontArc::try_from_slice(BUNDLED_FONT)
            .map_err(|e| log::warn!("bundled label font unusable: {e}"))
            .ok();
        Self {
            font,
            box_color: Rgb([0, 255, 0]),
            label_color: Rgb([255, 0, 0]),
            line_thickness: 2,
            label_scale: 14.0,
        }
    }
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("has_font", &self.font.is_some())
            .field("box_color", &self.box_color)
            .field("label_color", &self.label_color)
            .field("line_thickness", &self.line_thickness)
            .field("label_scale", &self.label_scale)
            .finish()
    }
}

impl Annotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a label font from disk.
    pub fn with_font_file(mut self, path: impl AsRef<Path>) -> Result<Self, StoneDetectError> {
        let path = path.as_ref();
        let font_load = |reason: String| StoneDetectError::FontLoad {
            path: PathBuf::from(path),
            reason,
        };
        let bytes = std::fs::read(path).map_err(|e| font_load(e.to_string()))?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| font_load(e.to_string()))?;
        self.font = Some(font);
        Ok(self)
    }

    /// Boxes only, no `Stone<N>` text.
    pub fn without_labels(mut self) -> Self {
        self.font = None;
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Annotated copy of `image`.
    pub fn annotate(&self, image: &RgbImage, stones: &[StoneRecord]) -> RgbImage {
        let mut out = image.clone();
        for stone in stones {
            self.draw_box(&mut out, stone);
            if let Some(font) = &self.font {
                let c = stone.rect.center;
                draw_text_mut(
                    &mut out,
                    self.label_color,
                    c.x.round() as i32,
                    c.y.round() as i32,
                    PxScale::from(self.label_scale),
                    font,
                    &stone.label(),
                );
            }
        }
        out
    }

    fn draw_box(&self, img: &mut RgbImage, stone: &StoneRecord) {
        let corners = stone.rect.corners();
        let thickness = self.line_thickness.max(1);
        for ox in 0..thickness {
            for oy in 0..thickness {
                for k in 0..4 {
                    let a = corners[k];
                    let b = corners[(k + 1) % 4];
                    draw_line_segment_mut(
                        img,
                        (a.x as f32 + ox as f32, a.y as f32 + oy as f32),
                        (b.x as f32 + ox as f32, b.y as f32 + oy as f32),
                        self.box_color,
                    );
                }
            }
        }
    }
}
