//! Rendered report surfaces that can be captured as a raster image.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::{ExportError, Result};
use crate::report_view::ReportView;
use crate::text_layout::{self, LineKind, TextLine};

/// Largest accepted capture scale.
pub const MAX_CAPTURE_SCALE: f32 = 8.0;

/// Upper bound on the pixels of a single capture (400 MB of RGBA).
pub const MAX_CAPTURE_PIXELS: u64 = 100_000_000;

/// Glyph cells per line of a captured report.
pub const REPORT_COLUMNS: usize = 88;

const GLYPH: u32 = 8;
const MARGIN: u32 = 24;

const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([31, 41, 55, 255]);
const HEADING_INK: Rgba<u8> = Rgba([17, 24, 39, 255]);
const CODE_PAPER: Rgba<u8> = Rgba([243, 244, 246, 255]);
const RULE_INK: Rgba<u8> = Rgba([209, 213, 219, 255]);

/// A rendered report that can be rasterized.
pub trait RenderSurface {
    /// Captures the surface at `scale` times its natural size.
    ///
    /// Returns `Ok(None)` when there is nothing rendered to capture.
    fn capture(&self, scale: f32) -> Result<Option<RgbaImage>>;
}

/// Stands in for a report view that is not on screen.
#[derive(Debug, Default, Clone, Copy)]
pub struct AbsentSurface;

impl RenderSurface for AbsentSurface {
    fn capture(&self, _scale: f32) -> Result<Option<RgbaImage>> {
        Ok(None)
    }
}

/// A report laid out as fixed-width text on a white page.
///
/// At scale 1 every glyph is an 8x8 pixel cell; larger scales draw each font
/// pixel as a block and fractional scales are resampled from the next whole
/// scale up.
#[derive(Debug, Clone)]
pub struct ReportSurface {
    columns: usize,
    lines: Vec<TextLine>,
}

impl ReportSurface {
    pub fn new(view: &ReportView) -> Self {
        Self::with_columns(view, REPORT_COLUMNS)
    }

    pub fn with_columns(view: &ReportView, columns: usize) -> Self {
        let columns = columns.max(2);
        Self {
            columns,
            lines: text_layout::layout(view.markdown(), columns),
        }
    }

    /// Size of the capture at scale 1.
    pub fn natural_size(&self) -> (u64, u64) {
        let width = u64::from(2 * MARGIN) + self.columns as u64 * u64::from(GLYPH);
        let body: u64 = self
            .lines
            .iter()
            .map(|line| u64::from(line.kind.advance()))
            .sum();
        (width, u64::from(2 * MARGIN) + body)
    }

    fn paint(&self, canvas: &mut RgbaImage, unit: u32) {
        let left = MARGIN * unit;
        let content_width = self.columns as u32 * GLYPH * unit;
        let mut y = MARGIN * unit;

        for line in &self.lines {
            let advance = line.kind.advance() * unit;
            let glyph_unit = line.kind.glyph_scale() * unit;
            let text_top = y + advance.saturating_sub(GLYPH * glyph_unit) / 2;
            match line.kind {
                LineKind::Heading(_) => {
                    draw_text(canvas, left, text_top, &line.text, HEADING_INK, glyph_unit)
                }
                LineKind::Body => draw_text(canvas, left, text_top, &line.text, INK, glyph_unit),
                LineKind::Code => {
                    fill_rect(canvas, left, y, content_width, advance, CODE_PAPER);
                    draw_text(canvas, left, text_top, &line.text, INK, glyph_unit);
                }
                LineKind::Rule => fill_rect(canvas, left, y + advance / 2, content_width, unit, RULE_INK),
                LineKind::Blank => {}
            }
            y += advance;
        }
    }
}

impl RenderSurface for ReportSurface {
    fn capture(&self, scale: f32) -> Result<Option<RgbaImage>> {
        let scale = checked_scale(scale)?;
        let (width, height) = self.natural_size();

        let unit = scale.ceil() as u32;
        let (canvas_w, canvas_h) = within_budget(width * u64::from(unit), height * u64::from(unit))?;
        let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, PAPER);
        self.paint(&mut canvas, unit);

        let target_w = ((width as f64 * f64::from(scale)).round() as u32).max(1);
        let target_h = ((height as f64 * f64::from(scale)).round() as u32).max(1);
        if (target_w, target_h) == (canvas_w, canvas_h) {
            return Ok(Some(canvas));
        }
        tracing::debug!(
            "[Export] Resampling {}x{} capture to {}x{}",
            canvas_w,
            canvas_h,
            target_w,
            target_h
        );
        Ok(Some(imageops::resize(
            &canvas,
            target_w,
            target_h,
            FilterType::Triangle,
        )))
    }
}

fn checked_scale(scale: f32) -> Result<f32> {
    if !scale.is_finite() || scale <= 0.0 || scale > MAX_CAPTURE_SCALE {
        return Err(ExportError::InvalidScale(scale));
    }
    Ok(scale)
}

fn within_budget(width: u64, height: u64) -> Result<(u32, u32)> {
    let too_large = ExportError::CaptureTooLarge { width, height };
    if width.saturating_mul(height) > MAX_CAPTURE_PIXELS {
        return Err(too_large);
    }
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(too_large),
    }
}

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Draws `text` with the top-left of the first glyph at (`x`, `y`), each font
/// pixel as a `unit` x `unit` block. Pixels outside the canvas are skipped.
fn draw_text(canvas: &mut RgbaImage, x: u32, y: u32, text: &str, color: Rgba<u8>, unit: u32) {
    let (width, height) = canvas.dimensions();
    let mut cursor_x = x;
    for ch in text.chars() {
        for (row_idx, row_bits) in glyph(ch).into_iter().enumerate() {
            for col_idx in 0..GLYPH {
                if (row_bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * unit;
                let py = y + row_idx as u32 * unit;
                for ty in py..(py + unit).min(height) {
                    for tx in px..(px + unit).min(width) {
                        canvas.put_pixel(tx, ty, color);
                    }
                }
            }
        }
        cursor_x += GLYPH * unit;
    }
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    for ty in y..(y + h).min(height) {
        for tx in x..(x + w).min(width) {
            canvas.put_pixel(tx, ty, color);
        }
    }
}
