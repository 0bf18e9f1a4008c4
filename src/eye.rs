//! One eye view of the stereograph: image dimensions, placement, markers.

use crate::{
    camera::Camera,
    coord::{CanvasPos, FractionalImagePos, ImagePixelCoordinate, ImageSize, WindowPos},
    error::Error,
    marker::MarkerStore,
    transform::{ImageTransform, TransformData},
};
use serde::{Deserialize, Serialize};
use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// State for a single eye image.
///
/// The pixel dimensions come from the external image provider; the core
/// never touches pixel data. Conversion helpers here are pointwise and
/// rotation-free, matching what the pointer-event plumbing needs.
#[derive(Clone, Debug, PartialEq)]
pub struct EyeView {
    size: ImageSize,
    pub transform: ImageTransform,
    pub markers: MarkerStore,
}

impl EyeView {
    pub fn new(size: ImageSize) -> Self {
        Self {
            size,
            transform: ImageTransform::new(),
            markers: MarkerStore::new(),
        }
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Called when the image provider loads a (new) image into this eye.
    pub fn set_size(&mut self, size: ImageSize) {
        self.size = size;
    }

    pub fn reset(&mut self) {
        self.transform.reset();
        self.markers.clear();
    }

    pub fn fractional_from_image(&self, pos: ImagePixelCoordinate) -> FractionalImagePos {
        FractionalImagePos::from_pixel(pos, self.size)
    }

    pub fn image_from_canvas(&self, pos: CanvasPos) -> ImagePixelCoordinate {
        let fip = FractionalImagePos::from_canvas(pos, &self.transform);
        ImagePixelCoordinate::from_fractional(fip, self.size)
    }

    pub fn canvas_from_image(&self, pos: ImagePixelCoordinate) -> CanvasPos {
        let fip = FractionalImagePos::from_pixel(pos, self.size);
        CanvasPos::from_fractional(fip, &self.transform)
    }

    /// Maps a pointer position all the way down to this image's pixels, e.g.
    /// for placing a marker under the cursor.
    pub fn image_from_window(
        &self,
        pos: WindowPos,
        camera: &Camera,
        window_size: (f64, f64),
    ) -> ImagePixelCoordinate {
        self.image_from_canvas(CanvasPos::from_window(pos, camera, window_size))
    }

    pub fn to_data(&self) -> EyeData {
        EyeData {
            size: self.size,
            transform: self.transform.to_data(self.size),
            markers: self.markers.to_data(),
        }
    }

    pub fn from_data(data: &EyeData) -> Result<Self, Error> {
        if data.size.width == 0 || data.size.height == 0 {
            return Err(Error::InvalidImageSize {
                width: data.size.width,
                height: data.size.height,
            });
        }
        Ok(Self {
            size: data.size,
            transform: ImageTransform::from_data(&data.transform, data.size),
            markers: MarkerStore::from_data(&data.markers),
        })
    }
}

impl Default for EyeView {
    fn default() -> Self {
        Self::new(ImageSize::default())
    }
}

/// Serialized form of one eye view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EyeData {
    pub size: ImageSize,
    pub transform: TransformData,
    pub markers: Vec<[f64; 2]>,
}

/// A reference-counted handle to an [`EyeView`], shared between the clip
/// box, the aligner, and the owning document.
#[derive(Clone, Debug)]
pub struct SharedEyeView(Rc<RefCell<EyeView>>);

impl SharedEyeView {
    pub fn new(size: ImageSize) -> Self {
        Self(Rc::new(RefCell::new(EyeView::new(size))))
    }

    pub fn borrow(&self) -> Ref<'_, EyeView> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, EyeView> {
        self.0.borrow_mut()
    }
}

impl Default for SharedEyeView {
    fn default() -> Self {
        Self::new(ImageSize::default())
    }
}
