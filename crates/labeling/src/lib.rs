//! # Labeling
//!
//! Segmentation-guided label extraction over recorded frame pairs.
//!
//! Responsibilities:
//! - Mask segmentation frames against the fixed traffic-light palette color
//!   and extract connected regions (`LabelExtractor`)
//! - Classify each region's dominant lamp color in HSV space
//! - Persist image/label pairs for frames with at least one label
//!   (`DatasetWriter`)
//! - Walk a recorded capture directory pairing RGB and segmentation frames
//!   (`LabelPass`)
//!
//! The pipeline is batch/offline: it reads frames the capture session
//! already persisted and never touches live sensor data.

mod color;
mod dataset;
mod error;
mod extractor;
mod pass;
mod regions;

pub use dataset::DatasetWriter;
pub use error::{LabelingError, Result};
pub use extractor::{ExtractorParams, LabelExtractor};
pub use pass::{LabelPass, LabelStats};
pub use regions::BoundingBox;
