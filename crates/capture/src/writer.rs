//! FrameWriter - raw-capture persistence
//!
//! Decodes observations per modality and writes them under the capture
//! layout:
//!
//! ```text
//! <raw_data_root>/<session>/<vehicle_type>_<id>/<vehicle_type>_<id>/
//!     <frame_id:010>.png          RGB frames
//!     seg/<frame_id:010>.png      palette-colored segmentation frames
//!     <frame_id:010>.npy          lidar (N, 4) float32 arrays
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local};
use contracts::{
    palette_color, ActorId, BundleSink, ContractError, FrameBundle, ObservationPayload,
    SensorModality, SensorObservation,
};
use tracing::{debug, instrument, warn};

use crate::error::{CaptureError, Result};
use crate::npy;

/// Lidar point records are 16 bytes: x, y, z, intensity as f32.
const POINT_STRIDE: usize = 16;

/// Session directory stamp, e.g. `record2021_1104_2356`.
pub fn session_stamp(now: DateTime<Local>) -> String {
    now.format("record%Y_%m%d_%H%M").to_string()
}

/// Capture directory for one vehicle.
///
/// The doubled `<type>_<id>` component is part of the on-disk contract.
pub fn capture_directory(
    raw_data_root: &Path,
    session: &str,
    vehicle_type: &str,
    vehicle_id: ActorId,
) -> PathBuf {
    let tag = format!("{vehicle_type}_{vehicle_id}");
    raw_data_root.join(session).join(&tag).join(&tag)
}

/// Frame bundle writer
///
/// Directories are created on demand and memoized; a failed write is fatal
/// for the current frame only.
pub struct FrameWriter {
    base_path: PathBuf,
    created_dirs: HashSet<PathBuf>,
}

impl FrameWriter {
    /// Create a writer rooted at the vehicle's capture directory.
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            created_dirs: HashSet::new(),
        }
    }

    /// Capture directory this writer persists under.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Persist every observation of a complete bundle.
    #[instrument(
        name = "frame_writer_write_bundle",
        skip(self, bundle),
        fields(target_frame_id = bundle.target_frame_id, sensors = bundle.len())
    )]
    pub fn write_bundle(&mut self, bundle: &FrameBundle) -> Result<()> {
        let started = Instant::now();

        for observation in bundle.observations.values() {
            self.write_observation(observation)?;
        }

        metrics::histogram!("datagen_bundle_write_seconds")
            .record(started.elapsed().as_secs_f64());
        metrics::counter!("datagen_bundles_written_total").increment(1);
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "bundle persisted");
        Ok(())
    }

    fn write_observation(&mut self, observation: &SensorObservation) -> Result<()> {
        let stem = frame_stem(observation.frame_id);

        match (&observation.modality, &observation.payload) {
            (SensorModality::CameraSemanticSeg, ObservationPayload::Image { width, height, data }) => {
                let dir = self.base_path.join("seg");
                self.ensure_dir(&dir)
                    .map_err(|e| persist_error(observation, e))?;

                let rgba = decode_segmentation(data);
                let path = dir.join(format!("{stem}.png"));
                image::save_buffer(&path, &rgba, *width, *height, image::ColorType::Rgba8)
                    .map_err(std::io::Error::other)
                    .map_err(|e| persist_error(observation, e))?;
            }

            (SensorModality::CameraRgb, ObservationPayload::Image { width, height, data }) => {
                self.ensure_dir(&self.base_path.clone())
                    .map_err(|e| persist_error(observation, e))?;

                let rgba = bgra_to_rgba(data);
                let path = self.base_path.join(format!("{stem}.png"));
                image::save_buffer(&path, &rgba, *width, *height, image::ColorType::Rgba8)
                    .map_err(std::io::Error::other)
                    .map_err(|e| persist_error(observation, e))?;
            }

            (SensorModality::Lidar, ObservationPayload::PointCloud { num_points, data }) => {
                self.ensure_dir(&self.base_path.clone())
                    .map_err(|e| persist_error(observation, e))?;

                debug_assert_eq!(data.len(), *num_points as usize * POINT_STRIDE);
                let path = self.base_path.join(format!("{stem}.npy"));
                npy::write_f32_rows(&path, data, *num_points, 4)
                    .map_err(|e| persist_error(observation, e))?;
            }

            _ => {
                // No dedicated decode path; keep the data rather than fail.
                warn!(
                    sensor_id = %observation.sensor_id,
                    modality = ?observation.modality,
                    "unsupported modality, falling back to generic save"
                );
                metrics::counter!("datagen_generic_saves_total").increment(1);

                self.ensure_dir(&self.base_path.clone())
                    .map_err(|e| persist_error(observation, e))?;

                let path = self.base_path.join(format!("{stem}.json"));
                let file = File::create(&path).map_err(|e| persist_error(observation, e))?;
                serde_json::to_writer(file, observation)
                    .map_err(|e| persist_error(observation, std::io::Error::other(e)))?;
            }
        }

        Ok(())
    }

    fn ensure_dir(&mut self, dir: &Path) -> std::io::Result<()> {
        if !self.created_dirs.contains(dir) {
            std::fs::create_dir_all(dir)?;
            self.created_dirs.insert(dir.to_path_buf());
        }
        Ok(())
    }
}

impl BundleSink for FrameWriter {
    fn name(&self) -> &str {
        "raw_capture"
    }

    async fn write(&mut self, bundle: &FrameBundle) -> std::result::Result<(), ContractError> {
        self.write_bundle(bundle)
            .map_err(|e| ContractError::sink_write("raw_capture", e.to_string()))
    }

    async fn flush(&mut self) -> std::result::Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> std::result::Result<(), ContractError> {
        debug!(base_path = %self.base_path.display(), "frame writer closed");
        Ok(())
    }
}

/// Zero-padded frame filename stem.
fn frame_stem(frame_id: u64) -> String {
    format!("{frame_id:010}")
}

/// Raw segmentation frames are BGRA with the semantic tag in the R channel;
/// expand each tag to its palette color.
fn decode_segmentation(data: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(data.len());
    for pixel in data.chunks_exact(4) {
        let (r, g, b) = palette_color(pixel[2]);
        rgba.extend_from_slice(&[r, g, b, 255]);
    }
    rgba
}

/// Swap B and R; camera frames arrive BGRA.
fn bgra_to_rgba(data: &[u8]) -> Vec<u8> {
    let mut rgba = data.to_vec();
    for chunk in rgba.chunks_exact_mut(4) {
        chunk.swap(0, 2);
    }
    rgba
}

fn persist_error(observation: &SensorObservation, source: std::io::Error) -> CaptureError {
    CaptureError::Persist {
        sensor_id: observation.sensor_id.to_string(),
        frame_id: observation.frame_id,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{SensorObservation, TRAFFIC_LIGHT_COLOR, TRAFFIC_LIGHT_TAG};
    use tempfile::tempdir;

    fn image_observation(
        sensor_id: &str,
        modality: SensorModality,
        frame_id: u64,
        bgra: Vec<u8>,
        width: u32,
        height: u32,
    ) -> SensorObservation {
        SensorObservation {
            sensor_id: sensor_id.into(),
            modality,
            frame_id,
            payload: ObservationPayload::Image {
                width,
                height,
                data: Bytes::from(bgra),
            },
        }
    }

    #[test]
    fn capture_directory_shape() {
        let dir = capture_directory(
            Path::new("/data/raw_data"),
            "record2021_1104_2356",
            "vehicle.tesla.cybertruck",
            608,
        );
        assert_eq!(
            dir,
            Path::new("/data/raw_data/record2021_1104_2356/vehicle.tesla.cybertruck_608/vehicle.tesla.cybertruck_608")
        );
    }

    #[test]
    fn rgb_frame_written_with_padded_name() {
        let dir = tempdir().unwrap();
        let mut writer = FrameWriter::new(dir.path().to_path_buf());

        let mut bundle = FrameBundle::new(42);
        bundle.insert(image_observation(
            "front_rgb",
            SensorModality::CameraRgb,
            42,
            vec![255, 0, 0, 255, 0, 255, 0, 255], // two BGRA pixels
            2,
            1,
        ));
        writer.write_bundle(&bundle).unwrap();

        let path = dir.path().join("0000000042.png");
        assert!(path.exists());

        let decoded = image::open(&path).unwrap().to_rgba8();
        // first pixel was BGRA blue; on disk it must read back as blue
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn segmentation_frame_decoded_through_palette() {
        let dir = tempdir().unwrap();
        let mut writer = FrameWriter::new(dir.path().to_path_buf());

        // one pixel tagged traffic light, one unlabeled (tag in R channel of BGRA)
        let raw = vec![0, 0, TRAFFIC_LIGHT_TAG, 255, 0, 0, 0, 255];
        let mut bundle = FrameBundle::new(7);
        bundle.insert(image_observation(
            "front_seg",
            SensorModality::CameraSemanticSeg,
            7,
            raw,
            2,
            1,
        ));
        writer.write_bundle(&bundle).unwrap();

        let path = dir.path().join("seg").join("0000000007.png");
        let decoded = image::open(&path).unwrap().to_rgb8();
        let (r, g, b) = TRAFFIC_LIGHT_COLOR;
        assert_eq!(decoded.get_pixel(0, 0).0, [r, g, b]);
        assert_eq!(decoded.get_pixel(1, 0).0, [0, 0, 0]);
    }

    #[test]
    fn lidar_frame_written_as_npy() {
        let dir = tempdir().unwrap();
        let mut writer = FrameWriter::new(dir.path().to_path_buf());

        let points: Vec<f32> = vec![1.0, 2.0, 3.0, 0.5, -1.0, -2.0, -3.0, 0.25];
        let data = Bytes::copy_from_slice(bytemuck::cast_slice(&points));

        let mut bundle = FrameBundle::new(3);
        bundle.insert(SensorObservation {
            sensor_id: "roof_lidar".into(),
            modality: SensorModality::Lidar,
            frame_id: 3,
            payload: ObservationPayload::PointCloud {
                num_points: 2,
                data,
            },
        });
        writer.write_bundle(&bundle).unwrap();

        let bytes = std::fs::read(dir.path().join("0000000003.npy")).unwrap();
        assert_eq!(&bytes[..6], b"\x93NUMPY");
        assert!(bytes.len() > 32 + 2 * POINT_STRIDE);
    }

    #[test]
    fn unknown_modality_saved_generically() {
        let dir = tempdir().unwrap();
        let mut writer = FrameWriter::new(dir.path().to_path_buf());

        let mut bundle = FrameBundle::new(5);
        bundle.insert(SensorObservation {
            sensor_id: "mystery".into(),
            modality: SensorModality::Other,
            frame_id: 5,
            payload: ObservationPayload::Raw(Bytes::from_static(b"\x01\x02")),
        });
        writer.write_bundle(&bundle).unwrap();

        let path = dir.path().join("0000000005.json");
        let parsed: SensorObservation =
            serde_json::from_reader(File::open(path).unwrap()).unwrap();
        assert_eq!(parsed.frame_id, 5);
    }
}
