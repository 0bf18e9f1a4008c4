//! Frame-tagged 2D positions.
//!
//! Every position in the alignment pipeline lives in exactly one of four
//! coordinate frames. Tagging the vector with a zero-sized frame marker makes
//! cross-frame arithmetic a type error; moving between frames always goes
//! through a conversion function that takes the context needed to
//! disambiguate scale and offset (camera, image transform, or pixel size).

use crate::{camera::Camera, transform::ImageTransform};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

pub trait CoordFrame: Copy + Clone {}

/// Widget pixels, origin at the top-left corner, Y down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowFrame;
impl CoordFrame for WindowFrame {}

/// Shared virtual canvas underlying both eye views. One unit is half the
/// width of the reference (left) image; origin at the canvas center, Y down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasFrame;
impl CoordFrame for CanvasFrame {}

/// Per-image units where 1.0 is half that image's own width; origin at the
/// image center, Y down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractionalFrame;
impl CoordFrame for FractionalFrame {}

/// Pixels of one specific image, origin at the image's upper-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelFrame;
impl CoordFrame for PixelFrame {}

/// A 2D position tagged with its coordinate frame.
///
/// Arithmetic is only defined between positions of the same frame.
#[derive(Clone, Copy, Debug)]
pub struct Pos<Frame: CoordFrame> {
    vec: Vector2<f64>,
    _phan: PhantomData<Frame>,
}

pub type WindowPos = Pos<WindowFrame>;
pub type CanvasPos = Pos<CanvasFrame>;
pub type FractionalImagePos = Pos<FractionalFrame>;
pub type ImagePixelCoordinate = Pos<PixelFrame>;

impl<Frame: CoordFrame> Pos<Frame> {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            vec: Vector2::new(x, y),
            _phan: PhantomData,
        }
    }

    pub fn x(&self) -> f64 {
        self.vec.x
    }

    pub fn y(&self) -> f64 {
        self.vec.y
    }

    pub fn as_vec2(&self) -> Vector2<f64> {
        self.vec
    }
}

impl<Frame: CoordFrame> PartialEq for Pos<Frame> {
    fn eq(&self, other: &Self) -> bool {
        self.vec == other.vec
    }
}

impl<Frame: CoordFrame> std::ops::Add for Pos<Frame> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x() + other.x(), self.y() + other.y())
    }
}

impl<Frame: CoordFrame> std::ops::Sub for Pos<Frame> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x() - other.x(), self.y() - other.y())
    }
}

/// Pixel dimensions of a loaded eye image, supplied by the external image
/// provider. Must be at least 1x1; the conversions below divide by the
/// width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Height over width.
    pub fn aspect(&self) -> f64 {
        self.height as f64 / self.width as f64
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
        }
    }
}

impl CanvasPos {
    /// Converts a window position using the current camera pan/zoom.
    ///
    /// The scale uses the window *width* for both axes: canvas units are
    /// tied to the reference image's half-width, so the widget's aspect
    /// ratio never distorts the canvas.
    pub fn from_window(pos: WindowPos, camera: &Camera, window_size: (f64, f64)) -> Self {
        let scale = 2.0 / camera.zoom() / window_size.0;
        let center = camera.center();
        Self::new(
            (pos.x() - 0.5 * window_size.0) * scale + center.x(),
            (pos.y() - 0.5 * window_size.1) * scale + center.y(),
        )
    }

    /// Converts a per-image fractional position into canvas space.
    ///
    /// Only the transform's translation participates here; rotation is
    /// applied by the alignment math and the render uniforms, never by this
    /// pointwise conversion.
    pub fn from_fractional(pos: FractionalImagePos, transform: &ImageTransform) -> Self {
        Self::new(
            pos.x() - transform.center.x(),
            pos.y() - transform.center.y(),
        )
    }
}

impl WindowPos {
    pub fn from_canvas(pos: CanvasPos, camera: &Camera, window_size: (f64, f64)) -> Self {
        let scale = 2.0 / camera.zoom() / window_size.0;
        let center = camera.center();
        Self::new(
            (pos.x() - center.x()) / scale + 0.5 * window_size.0,
            (pos.y() - center.y()) / scale + 0.5 * window_size.1,
        )
    }
}

impl FractionalImagePos {
    pub fn from_canvas(pos: CanvasPos, transform: &ImageTransform) -> Self {
        Self::new(
            pos.x() + transform.center.x(),
            pos.y() + transform.center.y(),
        )
    }

    pub fn from_pixel(pos: ImagePixelCoordinate, size: ImageSize) -> Self {
        let width = size.width as f64;
        Self::new(
            2.0 * pos.x() / width - 1.0,
            2.0 * pos.y() / width - size.aspect(),
        )
    }
}

impl ImagePixelCoordinate {
    pub fn from_fractional(pos: FractionalImagePos, size: ImageSize) -> Self {
        let half_width = size.width as f64 / 2.0;
        Self::new(
            (pos.x() + 1.0) * half_width,
            (pos.y() + size.aspect()) * half_width,
        )
    }
}
