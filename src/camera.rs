//! Pan/zoom view state shared by both eye views.

use crate::coord::{CanvasPos, WindowPos};
use std::{cell::RefCell, rc::Rc};

/// Zoom values are clamped to this floor on every write.
pub const MIN_ZOOM: f64 = 0.25;

/// View state for the shared canvas.
///
/// Mutations set a dirty flag; [`Camera::notify`] reports a pending change at
/// most once per batch so several mutations inside one event coalesce into a
/// single downstream redraw.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    center: CanvasPos,
    zoom: f64,
    dirty: bool,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            center: CanvasPos::new(0.0, 0.0),
            zoom: 1.0,
            dirty: true,
        }
    }

    pub fn center(&self) -> CanvasPos {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_center(&mut self, value: CanvasPos) {
        if self.center == value {
            return;
        }
        self.center = value;
        self.dirty = true;
    }

    pub fn set_zoom(&mut self, value: f64) {
        let value = if value < MIN_ZOOM { MIN_ZOOM } else { value };
        if self.zoom == value {
            return;
        }
        self.zoom = value;
        self.dirty = true;
    }

    pub fn reset(&mut self) {
        self.center = CanvasPos::new(0.0, 0.0);
        self.zoom = 1.0;
        self.dirty = true;
    }

    /// Reports whether a change is pending, then clears the flag.
    ///
    /// Returns `true` at most once per batch of mutations.
    pub fn notify(&mut self) -> bool {
        let pending = self.dirty;
        self.dirty = false;
        pending
    }

    /// Shifts the view by a canvas-space drag delta, moving the content with
    /// the pointer.
    pub fn pan(&mut self, delta: CanvasPos) {
        self.set_center(self.center - delta);
    }

    /// Scales the zoom by `factor` while keeping the canvas point under
    /// `anchor` stationary in the window.
    pub fn zoom_about(&mut self, factor: f64, anchor: WindowPos, window_size: (f64, f64)) {
        let before = CanvasPos::from_window(anchor, self, window_size);
        self.set_zoom(self.zoom * factor);
        let after = CanvasPos::from_window(anchor, self, window_size);
        self.set_center(self.center + (before - after));
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// A reference-counted handle to the single [`Camera`] instance shared by
/// both eye views and the clip box. Mutations through any clone are
/// immediately visible to every holder.
#[derive(Clone, Debug)]
pub struct SharedCamera(Rc<RefCell<Camera>>);

impl SharedCamera {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Camera::new())))
    }

    /// Copies out the current state, e.g. for frame conversions.
    pub fn get(&self) -> Camera {
        *self.0.borrow()
    }

    pub fn center(&self) -> CanvasPos {
        self.0.borrow().center()
    }

    pub fn zoom(&self) -> f64 {
        self.0.borrow().zoom()
    }

    pub fn set_center(&self, value: CanvasPos) {
        self.0.borrow_mut().set_center(value);
    }

    pub fn set_zoom(&self, value: f64) {
        self.0.borrow_mut().set_zoom(value);
    }

    pub fn reset(&self) {
        self.0.borrow_mut().reset();
    }

    pub fn notify(&self) -> bool {
        self.0.borrow_mut().notify()
    }

    pub fn pan(&self, delta: CanvasPos) {
        self.0.borrow_mut().pan(delta);
    }

    pub fn zoom_about(&self, factor: f64, anchor: WindowPos, window_size: (f64, f64)) {
        self.0.borrow_mut().zoom_about(factor, anchor, window_size);
    }
}

impl Default for SharedCamera {
    fn default() -> Self {
        Self::new()
    }
}
