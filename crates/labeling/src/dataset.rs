//! DatasetWriter - YOLO-layout image/label pair output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use contracts::{DatasetEntry, Label};
use tracing::{debug, instrument};

use crate::error::{LabelingError, Result};

/// Dataset writer
///
/// Writes `images/<name>` and `labels/<stem>.txt` under the output root.
/// Output directories are created on the first non-empty entry; a run that
/// labels nothing leaves no trace on disk.
pub struct DatasetWriter {
    images_dir: PathBuf,
    labels_dir: PathBuf,
    dirs_created: bool,
}

impl DatasetWriter {
    /// Create a writer rooted at `output_root`.
    pub fn new(output_root: &Path) -> Self {
        Self {
            images_dir: output_root.join("images"),
            labels_dir: output_root.join("labels"),
            dirs_created: false,
        }
    }

    /// Persist one frame's labels.
    ///
    /// Returns `Ok(None)` without touching the filesystem when `labels` is
    /// empty; absence of files is the contract, not an error. Otherwise
    /// copies the RGB image unchanged and writes one line per label.
    #[instrument(
        name = "dataset_write_entry",
        skip(self, labels),
        fields(image = %rgb_path.display(), labels = labels.len())
    )]
    pub fn write_entry(&mut self, rgb_path: &Path, labels: &[Label]) -> Result<Option<DatasetEntry>> {
        if labels.is_empty() {
            return Ok(None);
        }

        self.ensure_dirs()?;

        let file_name = rgb_path
            .file_name()
            .ok_or_else(|| {
                LabelingError::dataset_write(
                    rgb_path,
                    std::io::Error::other("image path has no file name"),
                )
            })?
            .to_owned();
        let stem = Path::new(&file_name)
            .file_stem()
            .unwrap_or(file_name.as_os_str())
            .to_owned();

        let image_path = self.images_dir.join(&file_name);
        fs::copy(rgb_path, &image_path)
            .map_err(|e| LabelingError::dataset_write(&image_path, e))?;

        let mut label_name = stem;
        label_name.push(".txt");
        let label_path = self.labels_dir.join(&label_name);

        let mut file = fs::File::create(&label_path)
            .map_err(|e| LabelingError::dataset_write(&label_path, e))?;
        for label in labels {
            writeln!(file, "{label}").map_err(|e| LabelingError::dataset_write(&label_path, e))?;
        }

        debug!(
            image = %image_path.display(),
            label = %label_path.display(),
            "dataset entry written"
        );
        metrics::counter!("datagen_dataset_entries_total").increment(1);

        Ok(Some(DatasetEntry {
            image_path,
            label_path,
        }))
    }

    fn ensure_dirs(&mut self) -> Result<()> {
        if !self.dirs_created {
            fs::create_dir_all(&self.images_dir)
                .map_err(|e| LabelingError::dataset_write(&self.images_dir, e))?;
            fs::create_dir_all(&self.labels_dir)
                .map_err(|e| LabelingError::dataset_write(&self.labels_dir, e))?;
            self.dirs_created = true;
        }
        Ok(())
    }
}
