//! Page layout for a tall capture sliced across A4 portrait pages.
//!
//! Every page shows the whole image scaled to the page width; page `k` shifts
//! it up by `k` page heights so consecutive pages show consecutive slices.

use crate::error::{ExportError, Result};

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

const POINTS_PER_MM: f64 = 72.0 / 25.4;

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

/// Where the image sits on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePlacement {
    pub index: usize,
    /// Vertical offset of the image top from the page top, in mm. Zero on
    /// the first page, negative afterwards.
    pub offset_mm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    /// Height of the image once scaled to the page width.
    pub image_height_mm: f64,
    pub placements: Vec<PagePlacement>,
}

impl PageLayout {
    /// Plans A4 portrait pages for a capture of `width` x `height` pixels.
    pub fn plan(width: u32, height: u32) -> Result<Self> {
        Self::plan_on(width, height, A4_WIDTH_MM, A4_HEIGHT_MM)
    }

    pub fn plan_on(width: u32, height: u32, page_width_mm: f64, page_height_mm: f64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyCapture { width, height });
        }

        let image_height_mm = f64::from(height) * page_width_mm / f64::from(width);

        let mut placements = vec![PagePlacement {
            index: 0,
            offset_mm: 0.0,
        }];
        let mut height_left = image_height_mm - page_height_mm;
        while height_left > 0.0 {
            placements.push(PagePlacement {
                index: placements.len(),
                offset_mm: height_left - image_height_mm,
            });
            height_left -= page_height_mm;
        }

        Ok(Self {
            page_width_mm,
            page_height_mm,
            image_height_mm,
            placements,
        })
    }

    pub fn page_count(&self) -> usize {
        self.placements.len()
    }

    /// Bottom edge of the image for `placement`, in PDF points from the page
    /// bottom.
    pub fn image_origin_pt(&self, placement: &PagePlacement) -> f64 {
        mm_to_pt(self.page_height_mm - placement.offset_mm - self.image_height_mm)
    }

    pub fn page_size_pt(&self) -> (f64, f64) {
        (mm_to_pt(self.page_width_mm), mm_to_pt(self.page_height_mm))
    }

    pub fn image_size_pt(&self) -> (f64, f64) {
        (mm_to_pt(self.page_width_mm), mm_to_pt(self.image_height_mm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_capture_fits_one_page() {
        let layout = PageLayout::plan(1000, 500).unwrap();
        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.placements[0].offset_mm, 0.0);
        assert!((layout.image_height_mm - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_page_count_is_ceiling_of_scaled_height() {
        // 210 px wide maps 1 px to 1 mm.
        for (height, expected) in [(296, 1), (297, 1), (298, 2), (594, 2), (595, 3), (1200, 5)] {
            let layout = PageLayout::plan(210, height).unwrap();
            assert_eq!(layout.page_count(), expected, "height {}", height);
        }
    }

    #[test]
    fn test_following_pages_shift_by_page_height() {
        let layout = PageLayout::plan(210, 700).unwrap();
        let offsets: Vec<f64> = layout.placements.iter().map(|p| p.offset_mm).collect();
        assert_eq!(offsets, vec![0.0, -297.0, -594.0]);
    }

    #[test]
    fn test_image_origin_in_pdf_space() {
        let layout = PageLayout::plan(210, 297).unwrap();
        let origin = layout.image_origin_pt(&layout.placements[0]);
        assert!(origin.abs() < 1e-9);

        let layout = PageLayout::plan(210, 400).unwrap();
        let second = layout.image_origin_pt(&layout.placements[1]);
        assert!((second - mm_to_pt(297.0 + 297.0 - 400.0)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_capture_is_rejected() {
        assert!(matches!(
            PageLayout::plan(0, 100),
            Err(ExportError::EmptyCapture { .. })
        ));
    }

    #[test]
    fn test_a4_width_in_points() {
        let layout = PageLayout::plan(100, 100).unwrap();
        let (width, height) = layout.page_size_pt();
        assert!((width - 595.2756).abs() < 1e-3);
        assert!((height - 841.8898).abs() < 1e-3);
    }
}
