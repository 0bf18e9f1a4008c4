//! Whole-document state and its serialization surface.
//!
//! The document owns the single shared camera, the two eye views, and the
//! clip box over both of them. File I/O stays with the embedding
//! application; this module only guarantees that the serialized form
//! round-trips the core state for the same image dimensions.

use crate::{
    aligner::Aligner,
    camera::SharedCamera,
    clip_box::{ClipBox, ClipBoxData},
    coord::ImageSize,
    error::Error,
    eye::{EyeData, EyeView, SharedEyeView},
};
use serde::{Deserialize, Serialize};

/// One stereograph alignment session.
pub struct Project {
    pub camera: SharedCamera,
    pub left: SharedEyeView,
    pub right: SharedEyeView,
    pub clip_box: ClipBox,
}

impl Project {
    pub fn new() -> Self {
        let camera = SharedCamera::new();
        let left = SharedEyeView::default();
        let right = SharedEyeView::default();
        let clip_box = ClipBox::new(camera.clone(), vec![left.clone(), right.clone()]);
        Self {
            camera,
            left,
            right,
            clip_box,
        }
    }

    /// Starts a fresh document: camera, clip box, and both eye views return
    /// to their initial state.
    pub fn reset(&mut self) {
        self.camera.reset();
        self.clip_box.reset();
        self.left.borrow_mut().reset();
        self.right.borrow_mut().reset();
    }

    /// An aligner over this document's eye views.
    pub fn aligner(&self) -> Aligner {
        Aligner::new(self.left.clone(), self.right.clone())
    }

    /// Serializes the document, normalizing the clip box geometry first.
    pub fn to_data(&mut self) -> ProjectData {
        self.clip_box.recenter();
        ProjectData {
            app: AppInfo::current(),
            clip_box: self.clip_box.to_data(),
            left: self.left.borrow().to_data(),
            right: self.right.borrow().to_data(),
        }
    }

    /// Replaces the document contents from serialized data.
    ///
    /// Eye views are replaced wholesale; the shared handles themselves keep
    /// their identity so the clip box and any external holders stay wired.
    pub fn from_data(&mut self, data: &ProjectData) -> Result<(), Error> {
        *self.left.borrow_mut() = EyeView::from_data(&data.left)?;
        *self.right.borrow_mut() = EyeView::from_data(&data.right)?;
        self.clip_box.from_data(&data.clip_box);
        Ok(())
    }

    pub fn to_json(&mut self) -> Result<String, Error> {
        let data = self.to_data();
        Ok(serde_json::to_string_pretty(&data)?)
    }

    pub fn from_json(&mut self, text: &str) -> Result<(), Error> {
        let data: ProjectData = serde_json::from_str(text)?;
        self.from_data(&data)
    }

    /// Forwards the loaded pixel dimensions from the image provider.
    pub fn set_image_sizes(&mut self, left: ImageSize, right: ImageSize) {
        self.left.borrow_mut().set_size(left);
        self.right.borrow_mut().set_size(right);
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies the writing application in saved projects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

impl AppInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Serialized form of a whole document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub app: AppInfo,
    pub clip_box: ClipBoxData,
    pub left: EyeData,
    pub right: EyeData,
}
