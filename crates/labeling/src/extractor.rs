//! LabelExtractor - RGB + segmentation pair to normalized labels.

use std::path::Path;

use contracts::Label;
use image::RgbImage;
use tracing::{debug, instrument, trace};

use crate::color::classify_region;
use crate::error::{LabelingError, Result};
use crate::regions::{connected_regions, traffic_light_mask};

/// Region filter parameters.
#[derive(Debug, Clone, Copy)]
pub struct ExtractorParams {
    /// Minimum bounding-box area in square pixels
    pub min_box_area: u32,
}

impl Default for ExtractorParams {
    fn default() -> Self {
        Self { min_box_area: 30 }
    }
}

/// Label extractor
///
/// Stateless over its parameters: identical input bytes always produce
/// identical labels, in mask scan order.
#[derive(Debug, Clone, Default)]
pub struct LabelExtractor {
    params: ExtractorParams,
}

impl LabelExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: ExtractorParams) -> Self {
        Self { params }
    }

    /// Extract labels from a persisted frame pair.
    #[instrument(
        name = "label_extract_pair",
        skip(self),
        fields(rgb = %rgb_path.display())
    )]
    pub fn extract_pair(&self, rgb_path: &Path, seg_path: &Path) -> Result<Vec<Label>> {
        let rgb = image::open(rgb_path)
            .map_err(|e| LabelingError::image_read(rgb_path, e))?
            .to_rgb8();
        let seg = image::open(seg_path)
            .map_err(|e| LabelingError::image_read(seg_path, e))?
            .to_rgb8();

        self.extract(&rgb, &seg)
    }

    /// Extract labels from decoded images.
    ///
    /// An empty result is a valid outcome; the frame simply contributes no
    /// dataset entry.
    pub fn extract(&self, rgb: &RgbImage, seg: &RgbImage) -> Result<Vec<Label>> {
        if rgb.dimensions() != seg.dimensions() {
            return Err(LabelingError::DimensionMismatch {
                rgb_width: rgb.width(),
                rgb_height: rgb.height(),
                seg_width: seg.width(),
                seg_height: seg.height(),
            });
        }

        let (width, height) = rgb.dimensions();
        let mask = traffic_light_mask(seg);
        let regions = connected_regions(&mask, width, height);

        let mut labels = Vec::new();
        for bbox in regions {
            if bbox.area() < self.params.min_box_area {
                trace!(?bbox, "region below minimum area");
                continue;
            }
            // Edge-clipped detections are discarded, not clamped; a box cut
            // by the frame border would train the detector on partial lamps.
            if bbox.clipped_by_edge(width, height) {
                trace!(?bbox, "region clipped by image edge");
                continue;
            }

            let class = classify_region(rgb, &bbox);
            labels.push(Label::from_pixel_box(
                class, bbox.x, bbox.y, bbox.w, bbox.h, width, height,
            ));
        }

        metrics::counter!("datagen_labels_emitted_total").increment(labels.len() as u64);
        debug!(count = labels.len(), "labels extracted");
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{LabelClass, TRAFFIC_LIGHT_COLOR};
    use image::{Rgb, RgbImage};

    fn seg_with_block(width: u32, height: u32, x0: u32, y0: u32, bw: u32, bh: u32) -> RgbImage {
        let (r, g, b) = TRAFFIC_LIGHT_COLOR;
        let mut seg = RgbImage::new(width, height);
        for y in y0..y0 + bh {
            for x in x0..x0 + bw {
                seg.put_pixel(x, y, Rgb([r, g, b]));
            }
        }
        seg
    }

    fn rgb_with_patch(width: u32, height: u32, x0: u32, y0: u32, bw: u32, bh: u32, color: [u8; 3]) -> RgbImage {
        let mut rgb = RgbImage::new(width, height);
        for y in y0..y0 + bh {
            for x in x0..x0 + bw {
                rgb.put_pixel(x, y, Rgb(color));
            }
        }
        rgb
    }

    #[test]
    fn emits_red_label_for_lit_region() {
        let seg = seg_with_block(100, 100, 50, 50, 10, 10);
        let rgb = rgb_with_patch(100, 100, 50, 50, 10, 10, [255, 0, 0]);

        let labels = LabelExtractor::new().extract(&rgb, &seg).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].class, LabelClass::TrafficLightRed);
        assert_eq!(labels[0].cx, 0.55);
        assert_eq!(labels[0].cy, 0.55);
        assert_eq!(labels[0].w, 0.1);
        assert_eq!(labels[0].h, 0.1);
    }

    #[test]
    fn rejects_region_below_minimum_area() {
        // 29 px^2 bounding box: excluded
        let seg = seg_with_block(100, 100, 10, 10, 29, 1);
        let rgb = RgbImage::new(100, 100);
        let labels = LabelExtractor::new().extract(&rgb, &seg).unwrap();
        assert!(labels.is_empty());

        // 31 px^2, not edge-clipped: included
        let seg = seg_with_block(100, 100, 10, 10, 31, 1);
        let labels = LabelExtractor::new().extract(&rgb, &seg).unwrap();
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn rejects_edge_clipped_region() {
        // block reaches the right edge: x + w == width
        let seg = seg_with_block(100, 100, 90, 10, 10, 10);
        let rgb = RgbImage::new(100, 100);
        let labels = LabelExtractor::new().extract(&rgb, &seg).unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn unlit_region_gets_generic_class() {
        let seg = seg_with_block(100, 100, 40, 40, 10, 10);
        let rgb = RgbImage::new(100, 100); // all black, nothing passes thresholds
        let labels = LabelExtractor::new().extract(&rgb, &seg).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].class, LabelClass::TrafficLight);
    }

    #[test]
    fn empty_segmentation_yields_no_labels() {
        let seg = RgbImage::new(64, 64);
        let rgb = RgbImage::new(64, 64);
        let labels = LabelExtractor::new().extract(&rgb, &seg).unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let seg = RgbImage::new(64, 64);
        let rgb = RgbImage::new(32, 64);
        let err = LabelExtractor::new().extract(&rgb, &seg).unwrap_err();
        assert!(matches!(err, LabelingError::DimensionMismatch { .. }));
    }

    #[test]
    fn extraction_is_deterministic() {
        let seg = seg_with_block(100, 100, 20, 20, 8, 12);
        let rgb = rgb_with_patch(100, 100, 20, 20, 8, 12, [0, 255, 0]);

        let extractor = LabelExtractor::new();
        let first = extractor.extract(&rgb, &seg).unwrap();
        let second = extractor.extract(&rgb, &seg).unwrap();
        assert_eq!(first, second);
    }
}
