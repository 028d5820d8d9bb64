//! PDF assembly with `lopdf`.
//!
//! The capture is embedded once as a JPEG image XObject and drawn on every
//! page at that page's offset; the page's media box clips the rest.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::error::{ExportError, Result};
use crate::pagination::PageLayout;

const PDF_VERSION: &str = "1.5";
const IMAGE_NAME: &str = "Im0";
const DEFAULT_JPEG_QUALITY: u8 = 92;

pub struct PdfAssembler {
    jpeg_quality: u8,
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl PdfAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the document for `capture` laid out as `layout`.
    pub fn assemble(&self, capture: &RgbaImage, layout: &PageLayout) -> Result<Document> {
        let (width, height) = capture.dimensions();
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyCapture { width, height });
        }

        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();
        let image_id = doc.add_object(self.image_stream(capture)?);
        let resources_id = doc.add_object(dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        });

        let (page_w, page_h) = layout.page_size_pt();
        let (image_w, image_h) = layout.image_size_pt();

        let mut kids: Vec<Object> = Vec::with_capacity(layout.page_count());
        for placement in &layout.placements {
            let y = layout.image_origin_pt(placement);
            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            real(image_w),
                            0.into(),
                            0.into(),
                            real(image_h),
                            0.into(),
                            real(y),
                        ],
                    ),
                    Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                    Operation::new("Q", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), real(page_w), real(page_h)],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        tracing::debug!(
            "[Export] Assembled {} page(s) from {}x{} capture",
            page_count,
            width,
            height
        );
        Ok(doc)
    }

    pub fn save(&self, doc: &mut Document, path: &Path) -> Result<()> {
        doc.save(path)?;
        Ok(())
    }

    fn image_stream(&self, capture: &RgbaImage) -> Result<Stream> {
        let rgb = flatten_on_white(capture);
        let (width, height) = rgb.dimensions();

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality).encode(
            rgb.as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        )?;

        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        };
        Ok(Stream::new(dict, jpeg))
    }
}

fn real(value: f64) -> Object {
    Object::from(value as f32)
}

/// Drops alpha by compositing onto a white page.
fn flatten_on_white(capture: &RgbaImage) -> RgbImage {
    let (width, height) = capture.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = capture.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn capture(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |_, y| {
            Rgba([(y % 256) as u8, 40, 200, 255])
        })
    }

    #[test]
    fn test_assembles_one_page_per_placement() {
        let image = capture(210, 700);
        let layout = PageLayout::plan(210, 700).unwrap();

        let mut doc = PdfAssembler::new().assemble(&image, &layout).unwrap();
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 3);
    }

    #[test]
    fn test_single_page_for_short_capture() {
        let image = capture(400, 100);
        let layout = PageLayout::plan(400, 100).unwrap();

        let doc = PdfAssembler::new().assemble(&image, &layout).unwrap();

        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_flatten_composites_transparency_on_white() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        assert_eq!(flatten_on_white(&image).get_pixel(0, 0).0, [255, 255, 255]);

        let image = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255]));
        assert_eq!(flatten_on_white(&image).get_pixel(0, 0).0, [10, 20, 30]);
    }
}
