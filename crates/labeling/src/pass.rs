//! LabelPass - offline sweep over a recorded capture directory.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::dataset::DatasetWriter;
use crate::error::Result;
use crate::extractor::LabelExtractor;

/// Statistics from one labeling pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelStats {
    /// RGB frames found in the capture directory
    pub frames_scanned: u64,

    /// Frames that produced at least one label
    pub frames_labeled: u64,

    /// Frames skipped for a missing segmentation partner
    pub frames_skipped: u64,

    /// Total labels written
    pub labels_emitted: u64,
}

/// Offline labeling pass
///
/// Pairs every `<frame>.png` in the capture directory with
/// `seg/<frame>.png` by filename stem and runs extractor + writer over each
/// pair. Frames are processed in name order so repeated runs over the same
/// recording behave identically.
pub struct LabelPass {
    extractor: LabelExtractor,
    data_path: PathBuf,
    output_root: PathBuf,
}

impl LabelPass {
    /// Create a pass over `data_path`.
    ///
    /// `output_root` of `None` selects the `yolo_dataset` directory next to
    /// the capture directory.
    pub fn new(data_path: PathBuf, output_root: Option<PathBuf>) -> Self {
        let output_root =
            output_root.unwrap_or_else(|| data_path.join("..").join("yolo_dataset"));
        Self {
            extractor: LabelExtractor::new(),
            data_path,
            output_root,
        }
    }

    /// Run the pass to completion.
    #[instrument(name = "label_pass_run", skip(self), fields(data_path = %self.data_path.display()))]
    pub fn run(&self) -> Result<LabelStats> {
        let mut writer = DatasetWriter::new(&self.output_root);
        let mut stats = LabelStats::default();

        for rgb_path in self.rgb_frames()? {
            stats.frames_scanned += 1;

            let Some(seg_path) = self.segmentation_partner(&rgb_path) else {
                warn!(rgb = %rgb_path.display(), "no segmentation partner, skipping frame");
                stats.frames_skipped += 1;
                continue;
            };

            let labels = self.extractor.extract_pair(&rgb_path, &seg_path)?;
            if let Some(entry) = writer.write_entry(&rgb_path, &labels)? {
                stats.frames_labeled += 1;
                stats.labels_emitted += labels.len() as u64;
                info!(
                    image = %entry.image_path.display(),
                    labels = labels.len(),
                    "frame labeled"
                );
            }
        }

        metrics::counter!("datagen_frames_labeled_total").increment(stats.frames_labeled);
        info!(
            scanned = stats.frames_scanned,
            labeled = stats.frames_labeled,
            skipped = stats.frames_skipped,
            "label pass finished"
        );
        Ok(stats)
    }

    /// RGB frames in the capture directory, sorted by name.
    fn rgb_frames(&self) -> Result<Vec<PathBuf>> {
        let mut frames = Vec::new();
        for entry in std::fs::read_dir(&self.data_path)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "png") {
                frames.push(path);
            }
        }
        frames.sort();
        Ok(frames)
    }

    /// Segmentation frame with the same stem, if present.
    fn segmentation_partner(&self, rgb_path: &Path) -> Option<PathBuf> {
        let name = rgb_path.file_name()?;
        let candidate = self.data_path.join("seg").join(name);
        candidate.is_file().then_some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::TRAFFIC_LIGHT_COLOR;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_pair(dir: &Path, stem: &str, lit: bool) {
        let mut rgb = RgbImage::new(100, 100);
        let mut seg = RgbImage::new(100, 100);
        if lit {
            let (r, g, b) = TRAFFIC_LIGHT_COLOR;
            for y in 50..60 {
                for x in 50..60 {
                    seg.put_pixel(x, y, Rgb([r, g, b]));
                    rgb.put_pixel(x, y, Rgb([255, 0, 0]));
                }
            }
        }
        rgb.save(dir.join(format!("{stem}.png"))).unwrap();
        seg.save(dir.join("seg").join(format!("{stem}.png"))).unwrap();
    }

    #[test]
    fn labels_lit_frames_and_skips_unpaired() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("seg")).unwrap();

        write_pair(dir.path(), "0000000001", true);
        write_pair(dir.path(), "0000000002", false);
        // unpaired rgb frame
        RgbImage::new(100, 100)
            .save(dir.path().join("0000000003.png"))
            .unwrap();

        let out = tempdir().unwrap();
        let pass = LabelPass::new(dir.path().to_path_buf(), Some(out.path().to_path_buf()));
        let stats = pass.run().unwrap();

        assert_eq!(stats.frames_scanned, 3);
        assert_eq!(stats.frames_labeled, 1);
        assert_eq!(stats.frames_skipped, 1);
        assert_eq!(stats.labels_emitted, 1);

        assert!(out.path().join("images/0000000001.png").exists());
        assert!(out.path().join("labels/0000000001.txt").exists());
        // the unlit frame contributes nothing
        assert!(!out.path().join("images/0000000002.png").exists());
    }

    #[test]
    fn label_line_matches_expected_geometry() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("seg")).unwrap();
        write_pair(dir.path(), "0000000009", true);

        let out = tempdir().unwrap();
        LabelPass::new(dir.path().to_path_buf(), Some(out.path().to_path_buf()))
            .run()
            .unwrap();

        let content =
            std::fs::read_to_string(out.path().join("labels/0000000009.txt")).unwrap();
        assert_eq!(content, "81 0.55 0.55 0.1 0.1\n");
    }

    #[test]
    fn rerun_produces_identical_label_bytes() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("seg")).unwrap();
        write_pair(dir.path(), "0000000004", true);

        let out_a = tempdir().unwrap();
        let out_b = tempdir().unwrap();
        LabelPass::new(dir.path().to_path_buf(), Some(out_a.path().to_path_buf()))
            .run()
            .unwrap();
        LabelPass::new(dir.path().to_path_buf(), Some(out_b.path().to_path_buf()))
            .run()
            .unwrap();

        assert_eq!(
            std::fs::read(out_a.path().join("labels/0000000004.txt")).unwrap(),
            std::fs::read(out_b.path().join("labels/0000000004.txt")).unwrap()
        );
    }
}
