//! Crop rectangle defining the exported stereo frame region.

use crate::{
    camera::SharedCamera,
    coord::{CanvasPos, FractionalImagePos, ImagePixelCoordinate},
    eye::SharedEyeView,
};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// Nudges pixel measurements off exact half-integers before rounding.
const SIZE_EPSILON: f64 = 1e-6;

bitflags! {
    /// Box edges under the pointer. A corner combines its horizontal and
    /// vertical flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Edge: u8 {
        const TOP = 0b0001;
        const BOTTOM = 0b0010;
        const LEFT = 0b0100;
        const RIGHT = 0b1000;
    }
}

/// Axis-aligned crop rectangle in canvas units.
///
/// Holds the shared camera and the managed eye views so that re-centering
/// can move box bounds, camera, and image placements as one logical step.
/// The bounds keep `left <= right` and `top <= bottom` by clamping on every
/// adjustment.
#[derive(Debug)]
pub struct ClipBox {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    camera: SharedCamera,
    images: Vec<SharedEyeView>,
    hovered: bool,
    dirty: bool,
}

/// Snapshot for the undo/redo command layer: box bounds plus the camera and
/// image placements that [`ClipBox::recenter`] couples to them.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipBoxState {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub camera_center: CanvasPos,
    pub image_centers: Vec<FractionalImagePos>,
}

/// Serialized form: pixel dimensions of the exported region. Geometry is
/// normalized by re-centering before serialization, so the bounds are
/// implied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipBoxData {
    pub width: u32,
    pub height: u32,
}

impl ClipBox {
    pub fn new(camera: SharedCamera, images: Vec<SharedEyeView>) -> Self {
        Self {
            left: -0.5,
            right: 0.5,
            top: -0.5,
            bottom: 0.5,
            camera,
            images,
            hovered: false,
            dirty: true,
        }
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Restores the default crop for a fresh document.
    pub fn reset(&mut self) {
        self.left = -0.5;
        self.right = 0.5;
        self.top = -0.5;
        self.bottom = 0.5;
        self.hovered = false;
        self.dirty = true;
    }

    /// Reports whether a change is pending, then clears the flag.
    pub fn notify(&mut self) -> bool {
        let pending = self.dirty;
        self.dirty = false;
        pending
    }

    /// Finds the edge (or corner) within `tolerance` of `pos`.
    ///
    /// Both axes are evaluated independently: the nearer of top/bottom and
    /// the nearer of left/right each contribute their flag when within
    /// tolerance, preferring top and left on ties. Also tracks a deduplicated
    /// hover flag for highlight redraws.
    pub fn check_hover(&mut self, pos: CanvasPos, tolerance: f64) -> Edge {
        if pos.x() < self.left - tolerance
            || pos.x() > self.right + tolerance
            || pos.y() < self.top - tolerance
            || pos.y() > self.bottom + tolerance
        {
            self.set_hovered(false);
            return Edge::empty();
        }
        let mut edge = Edge::empty();
        let d_top = (pos.y() - self.top).abs();
        let d_bottom = (pos.y() - self.bottom).abs();
        if d_top <= d_bottom {
            if d_top <= tolerance {
                edge |= Edge::TOP;
            }
        } else if d_bottom <= tolerance {
            edge |= Edge::BOTTOM;
        }
        let d_left = (pos.x() - self.left).abs();
        let d_right = (pos.x() - self.right).abs();
        if d_left <= d_right {
            if d_left <= tolerance {
                edge |= Edge::LEFT;
            }
        } else if d_right <= tolerance {
            edge |= Edge::RIGHT;
        }
        self.set_hovered(!edge.is_empty());
        edge
    }

    fn set_hovered(&mut self, value: bool) {
        if self.hovered == value {
            return;
        }
        self.hovered = value;
        self.dirty = true;
    }

    /// Drags the given edge(s) by a canvas-space delta, clamping so the
    /// bounds never cross.
    pub fn adjust(&mut self, edge: Edge, delta: CanvasPos) {
        if delta.x() == 0.0 && delta.y() == 0.0 {
            return;
        }
        if edge.contains(Edge::LEFT) {
            self.left += delta.x();
            if self.left > self.right {
                self.left = self.right;
            }
        } else if edge.contains(Edge::RIGHT) {
            self.right += delta.x();
            if self.right < self.left {
                self.right = self.left;
            }
        }
        if edge.contains(Edge::TOP) {
            self.top += delta.y();
            if self.top > self.bottom {
                self.top = self.bottom;
            }
        } else if edge.contains(Edge::BOTTOM) {
            self.bottom += delta.y();
            if self.bottom < self.top {
                self.bottom = self.top;
            }
        }
        self.dirty = true;
    }

    /// Pixel dimensions of the crop, measured through the reference (first)
    /// image's transform and pixel grid.
    pub fn size(&self) -> (u32, u32) {
        let eye = self.images[0].borrow();
        let a = eye.image_from_canvas(CanvasPos::new(self.left, self.top));
        let b = eye.image_from_canvas(CanvasPos::new(self.right, self.bottom));
        let width = ((b.x() - a.x()).abs() + SIZE_EPSILON).round() as u32;
        let height = ((b.y() - a.y()).abs() + SIZE_EPSILON).round() as u32;
        (width, height)
    }

    /// Resizes to the requested pixel dimensions, re-centered on the canvas
    /// origin.
    pub fn set_size(&mut self, size: (u32, u32)) {
        let (half_width, half_height) = {
            let eye = self.images[0].borrow();
            let a = eye.canvas_from_image(ImagePixelCoordinate::new(0.0, 0.0));
            let b = eye.canvas_from_image(ImagePixelCoordinate::new(
                size.0 as f64,
                size.1 as f64,
            ));
            (0.5 * (b.x() - a.x()).abs(), 0.5 * (b.y() - a.y()).abs())
        };
        self.left = -half_width;
        self.right = half_width;
        self.top = -half_height;
        self.bottom = half_height;
        self.dirty = true;
    }

    /// Moves the box center to the canvas origin while shifting the shared
    /// camera and every managed image placement so that nothing appears to
    /// move on screen.
    ///
    /// No-op (and idempotent) when the box is already centered.
    pub fn recenter(&mut self) {
        let cx = 0.5 * (self.left + self.right);
        let cy = 0.5 * (self.top + self.bottom);
        if cx == 0.0 && cy == 0.0 {
            return;
        }
        let offset = CanvasPos::new(cx, cy);

        // Mirror the bounds around their midpoint.
        let half_width = 0.5 * (self.right - self.left);
        let half_height = 0.5 * (self.bottom - self.top);
        self.left = -half_width;
        self.right = half_width;
        self.top = -half_height;
        self.bottom = half_height;

        // Keep the viewport visually stable under the shifted box.
        self.camera.set_center(self.camera.center() - offset);

        // Keep each image where it appears: route its placement through
        // canvas space, displaced by the old box center.
        for image in &self.images {
            let mut eye = image.borrow_mut();
            let transform = eye.transform;
            let canvas = CanvasPos::from_fractional(transform.center, &transform);
            let shifted = canvas + offset;
            eye.transform.center = FractionalImagePos::from_canvas(shifted, &transform);
        }
        self.dirty = true;
    }

    pub fn state(&self) -> ClipBoxState {
        ClipBoxState {
            left: self.left,
            right: self.right,
            top: self.top,
            bottom: self.bottom,
            camera_center: self.camera.center(),
            image_centers: self
                .images
                .iter()
                .map(|image| image.borrow().transform.center)
                .collect(),
        }
    }

    pub fn restore_state(&mut self, state: &ClipBoxState) {
        self.left = state.left;
        self.right = state.right;
        self.top = state.top;
        self.bottom = state.bottom;
        self.camera.set_center(state.camera_center);
        for (image, center) in self.images.iter().zip(&state.image_centers) {
            image.borrow_mut().transform.center = *center;
        }
        self.dirty = true;
    }

    /// Serializes the canonical (re-centered) crop size.
    pub fn to_data(&mut self) -> ClipBoxData {
        self.recenter();
        let (width, height) = self.size();
        ClipBoxData { width, height }
    }

    pub fn from_data(&mut self, data: &ClipBoxData) {
        self.set_size((data.width, data.height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::ImageSize;
    use approx::assert_relative_eq;
    use quickcheck::quickcheck;
    use rstest::rstest;

    fn make_box() -> ClipBox {
        let camera = SharedCamera::new();
        let eye = SharedEyeView::new(ImageSize::new(640, 480));
        ClipBox::new(camera, vec![eye])
    }

    #[rstest]
    #[case(CanvasPos::new(0.0, 0.0), Edge::empty())]
    #[case(CanvasPos::new(-0.5, 0.0), Edge::LEFT)]
    #[case(CanvasPos::new(0.5, 0.0), Edge::RIGHT)]
    #[case(CanvasPos::new(0.0, -0.5), Edge::TOP)]
    #[case(CanvasPos::new(0.0, 0.5), Edge::BOTTOM)]
    #[case(CanvasPos::new(-0.5, -0.5), Edge::TOP.union(Edge::LEFT))]
    #[case(CanvasPos::new(0.52, 0.52), Edge::BOTTOM.union(Edge::RIGHT))]
    #[case(CanvasPos::new(0.0, -0.7), Edge::empty())]
    #[case(CanvasPos::new(0.7, 0.0), Edge::empty())]
    fn hover_detects_edges_and_corners(#[case] pos: CanvasPos, #[case] expected: Edge) {
        let mut clip = make_box();
        assert_eq!(clip.check_hover(pos, 0.05), expected);
        assert_eq!(clip.is_hovered(), !expected.is_empty());
    }

    #[test]
    fn hover_prefers_top_left_on_ties() {
        let mut clip = make_box();
        clip.adjust(Edge::RIGHT, CanvasPos::new(-1.0, 0.0));
        clip.adjust(Edge::BOTTOM, CanvasPos::new(0.0, -1.0));
        // Box is collapsed to a point at (-0.5, -0.5): every edge ties.
        let edge = clip.check_hover(CanvasPos::new(-0.5, -0.5), 0.05);
        assert_eq!(edge, Edge::TOP.union(Edge::LEFT));
    }

    #[test]
    fn hover_flag_changes_are_deduplicated() {
        let mut clip = make_box();
        clip.notify();
        clip.check_hover(CanvasPos::new(2.0, 2.0), 0.05);
        assert!(!clip.notify());
        clip.check_hover(CanvasPos::new(0.5, 0.0), 0.05);
        assert!(clip.notify());
        clip.check_hover(CanvasPos::new(0.5, 0.0), 0.05);
        assert!(!clip.notify());
    }

    #[test]
    fn zero_delta_adjustment_is_a_no_op() {
        let mut clip = make_box();
        clip.notify();
        clip.adjust(Edge::LEFT, CanvasPos::new(0.0, 0.0));
        assert!(!clip.notify());
        assert_relative_eq!(clip.left(), -0.5);
    }

    quickcheck! {
        fn bounds_stay_ordered(moves: Vec<(u8, i8, i8)>) -> bool {
            let mut clip = make_box();
            const EDGES: [Edge; 8] = [
                Edge::TOP,
                Edge::BOTTOM,
                Edge::LEFT,
                Edge::RIGHT,
                Edge::TOP.union(Edge::LEFT),
                Edge::TOP.union(Edge::RIGHT),
                Edge::BOTTOM.union(Edge::LEFT),
                Edge::BOTTOM.union(Edge::RIGHT),
            ];
            for (which, dx, dy) in moves {
                let edge = EDGES[which as usize % EDGES.len()];
                clip.adjust(edge, CanvasPos::new(dx as f64 / 8.0, dy as f64 / 8.0));
                if clip.left() > clip.right() || clip.top() > clip.bottom() {
                    return false;
                }
            }
            true
        }
    }

    #[test]
    fn size_reflects_reference_image_pixels() {
        let clip = make_box();
        // Canvas units are halves of the reference image width.
        assert_eq!(clip.size(), (320, 320));
    }

    #[test]
    fn size_setter_round_trips_within_a_pixel() {
        let mut clip = make_box();
        for requested in [(300, 200), (641, 479), (1, 1), (1024, 768)] {
            clip.set_size(requested);
            let (w, h) = clip.size();
            assert!((w as i64 - requested.0 as i64).abs() <= 1);
            assert!((h as i64 - requested.1 as i64).abs() <= 1);
            assert_relative_eq!(clip.left(), -clip.right());
            assert_relative_eq!(clip.top(), -clip.bottom());
        }
    }

    #[test]
    fn recenter_is_idempotent() {
        let mut clip = make_box();
        clip.adjust(Edge::RIGHT, CanvasPos::new(0.4, 0.0));
        clip.adjust(Edge::TOP, CanvasPos::new(0.0, -0.2));
        clip.recenter();
        let after_once = clip.state();
        clip.recenter();
        assert_eq!(clip.state(), after_once);
        assert_relative_eq!(clip.left(), -clip.right());
        assert_relative_eq!(clip.top(), -clip.bottom());
    }

    #[test]
    fn recenter_keeps_images_apparently_fixed() {
        let camera = SharedCamera::new();
        let eye = SharedEyeView::new(ImageSize::new(640, 480));
        eye.borrow_mut().transform.center = FractionalImagePos::new(0.3, -0.1);
        let mut clip = ClipBox::new(camera.clone(), vec![eye.clone()]);
        clip.adjust(Edge::LEFT, CanvasPos::new(-0.3, 0.0));
        clip.adjust(Edge::BOTTOM, CanvasPos::new(0.0, 0.25));

        let probe = ImagePixelCoordinate::new(100.0, 100.0);
        let before = eye.borrow().canvas_from_image(probe) - camera.center();
        clip.recenter();
        let after = eye.borrow().canvas_from_image(probe) - camera.center();
        assert_relative_eq!(before.x(), after.x(), epsilon = 1e-12);
        assert_relative_eq!(before.y(), after.y(), epsilon = 1e-12);
    }

    #[test]
    fn recenter_flags_both_box_and_camera() {
        let camera = SharedCamera::new();
        let eye = SharedEyeView::new(ImageSize::new(640, 480));
        let mut clip = ClipBox::new(camera.clone(), vec![eye]);
        clip.notify();
        camera.notify();
        clip.adjust(Edge::RIGHT, CanvasPos::new(0.4, 0.0));
        clip.recenter();
        assert!(clip.notify());
        assert!(camera.notify());
        assert!(!clip.notify());
        assert!(!camera.notify());
    }

    #[test]
    fn state_round_trips_through_restore() {
        let camera = SharedCamera::new();
        let eye = SharedEyeView::new(ImageSize::new(640, 480));
        let mut clip = ClipBox::new(camera.clone(), vec![eye.clone()]);
        let saved = clip.state();
        clip.adjust(Edge::RIGHT, CanvasPos::new(0.4, 0.0));
        clip.recenter();
        clip.restore_state(&saved);
        assert_eq!(clip.state(), saved);
    }

    #[test]
    fn data_round_trip_is_canonical() {
        let mut clip = make_box();
        clip.adjust(Edge::RIGHT, CanvasPos::new(0.25, 0.0));
        clip.adjust(Edge::TOP, CanvasPos::new(0.0, 0.125));
        let data = clip.to_data();
        let mut restored = make_box();
        restored.from_data(&data);
        assert_eq!(restored.to_data(), data);
        assert_eq!(restored.size(), clip.size());
    }
}
