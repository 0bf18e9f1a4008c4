//! Stereograph Alignment Engine
//!
//! Registers the two overlapping eye views of a stereograph into a correctly
//! aligned stereo pair. The crate covers the coordinate-frame system, the
//! per-image rigid transform model, marker-based rotation/translation
//! estimation, and the crop box with its coupled re-centering; windowing,
//! rendering, and file I/O belong to the embedding application.
//!
//! All state is single-threaded and event-driven: shared handles are
//! reference-counted, mutations happen synchronously, and the dirty/notify
//! pattern exists only to coalesce redraws, never to manage concurrency.

pub mod aligner;
pub mod camera;
pub mod clip_box;
pub mod coord;
pub mod error;
pub mod eye;
pub mod marker;
pub mod project;
pub mod transform;

pub use crate::{
    aligner::Aligner,
    camera::{Camera, SharedCamera},
    clip_box::{ClipBox, Edge},
    coord::{CanvasPos, FractionalImagePos, ImagePixelCoordinate, ImageSize, WindowPos},
    error::Error,
    eye::{EyeView, SharedEyeView},
    marker::MarkerStore,
    project::Project,
    transform::ImageTransform,
};
