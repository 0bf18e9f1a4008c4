//! Per-image placement on the shared canvas.

use crate::coord::{FractionalImagePos, ImagePixelCoordinate, ImageSize};
use serde::{Deserialize, Serialize};

/// Rigid placement of one eye image: the end product of the whole alignment
/// process.
///
/// `center` positions the image relative to the canvas; `rotation` is in
/// radians and applies before translation when mapping image-local
/// coordinates onto the canvas. No scale or shear.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageTransform {
    pub center: FractionalImagePos,
    pub rotation: f64,
}

impl ImageTransform {
    pub fn new() -> Self {
        Self {
            center: FractionalImagePos::new(0.0, 0.0),
            rotation: 0.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Serializes through the owning image's pixel frame, so stored values
    /// are meaningful for the same image dimensions.
    pub fn to_data(&self, size: ImageSize) -> TransformData {
        let center = ImagePixelCoordinate::from_fractional(self.center, size);
        TransformData {
            center: [center.x(), center.y()],
            rotation: self.rotation,
        }
    }

    pub fn from_data(data: &TransformData, size: ImageSize) -> Self {
        let pixel = ImagePixelCoordinate::new(data.center[0], data.center[1]);
        Self {
            center: FractionalImagePos::from_pixel(pixel, size),
            rotation: data.rotation,
        }
    }
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized form of [`ImageTransform`], center in image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformData {
    pub center: [f64; 2],
    pub rotation: f64,
}
