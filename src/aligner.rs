//! Marker-based rigid alignment of the two eye views.
//!
//! Given the positional marker correspondences of the two eyes, estimate a
//! rigid correction (rotation + translation, no scale or shear) and split it
//! symmetrically between the two image transforms so that corresponding
//! markers line up vertically with a consistent horizontal separation.

use crate::{
    coord::{CanvasPos, FractionalImagePos},
    eye::{EyeView, SharedEyeView},
    transform::ImageTransform,
};
use std::f64::consts::{FRAC_PI_2, PI};

/// Residual tolerance for the post-correction convergence check, in radians
/// (about 0.05 degrees).
const CONVERGENCE_TOLERANCE: f64 = 0.05 * PI / 180.0;

/// Computes and applies the rigid correction for a pair of eye views.
pub struct Aligner {
    left: SharedEyeView,
    right: SharedEyeView,
}

impl Aligner {
    pub fn new(left: SharedEyeView, right: SharedEyeView) -> Self {
        Self { left, right }
    }

    /// Runs one alignment pass over the first `min(len, len)` marker pairs.
    ///
    /// Mutates both image transforms in place. Returns `true` when the
    /// transforms changed, so the caller can request a redraw of both eye
    /// views. With no usable correspondences this is a no-op.
    pub fn align(&self) -> bool {
        let mut left = self.left.borrow_mut();
        let mut right = self.right.borrow_mut();
        let n = left.markers.len().min(right.markers.len());
        if n < 1 {
            return false;
        }

        let rotation = compute_rotation(
            &marker_canvas_positions(&left, n),
            &marker_canvas_positions(&right, n),
        );
        // Half the correction to each eye, in opposite directions.
        left.transform.rotation += 0.5 * rotation;
        right.transform.rotation -= 0.5 * rotation;

        // Marker positions under the corrected rotations.
        let pl = marker_canvas_positions(&left, n);
        let pr = marker_canvas_positions(&right, n);
        let residual = compute_rotation(&pl, &pr);
        debug_assert!(
            residual.abs() < CONVERGENCE_TOLERANCE,
            "rotation estimate did not converge: residual {residual} rad",
        );

        // Horizontal separation uses the minimum over all pairs: the pair
        // needing the least added disparity must not get clipped. Vertical
        // offset should be zero after rotation, so the mean smooths what
        // noise remains.
        let min_dh = (0..n)
            .map(|i| pr[i].x() - pl[i].x())
            .fold(f64::INFINITY, f64::min);
        let avg_dv = (0..n).map(|i| pr[i].y() - pl[i].y()).sum::<f64>() / n as f64;
        let target = CanvasPos::new(0.5 * min_dh, 0.5 * avg_dv);

        let dl = fractional_delta(target, &left.transform);
        let dr = fractional_delta(target, &right.transform);
        left.transform.center = left.transform.center - dl;
        right.transform.center = right.transform.center + dr;
        true
    }
}

/// Canvas positions of the first `n` markers under the eye's current
/// transform, rotation included.
///
/// The pointwise conversion layer deliberately leaves rotation out; the
/// alignment math is where rotation participates, so it is applied here.
fn marker_canvas_positions(eye: &EyeView, n: usize) -> Vec<CanvasPos> {
    (0..n)
        .map(|i| {
            let fip = eye.fractional_from_image(eye.markers[i]);
            let (sin, cos) = eye.transform.rotation.sin_cos();
            let rotated = FractionalImagePos::new(
                cos * fip.x() - sin * fip.y(),
                sin * fip.x() + cos * fip.y(),
            );
            CanvasPos::from_fractional(rotated, &eye.transform)
        })
        .collect()
}

/// Expresses a canvas-space delta in an image's fractional frame, undoing
/// that image's rotation.
fn fractional_delta(delta: CanvasPos, transform: &ImageTransform) -> FractionalImagePos {
    let (sin, cos) = (-transform.rotation).sin_cos();
    FractionalImagePos::new(
        cos * delta.x() - sin * delta.y(),
        sin * delta.x() + cos * delta.y(),
    )
}

/// Estimates the relative rotation, in radians, that cancels the vertical
/// parallax between two corresponding point sets.
///
/// Each point contributes the rotation about its set's centroid that would
/// close its share of the vertical offset, weighted by `r * (cos(θ/2) + 1)`.
/// Samples whose shifted vertical coordinate leaves the point's circle are
/// dropped rather than clamped. Returns 0.0 for fewer than two pairs or
/// when every sample was dropped.
pub fn compute_rotation(left: &[CanvasPos], right: &[CanvasPos]) -> f64 {
    let n = left.len().min(right.len());
    if n < 2 {
        return 0.0;
    }
    let cl = centroid(&left[..n]);
    let cr = centroid(&right[..n]);
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for i in 0..n {
        let l = left[i] - cl;
        let r = right[i] - cr;
        let dv = r.y() - l.y();
        match rotation_from_dv(l.x(), l.y(), dv) {
            Some((dtheta, weight)) => {
                weighted += dtheta * weight;
                total_weight += weight;
            }
            None => log::warn!("marker pair {i}: left rotation sample out of range, dropped"),
        }
        // The right image receives the negated correction, so its samples
        // enter the average negated.
        match rotation_from_dv(r.x(), r.y(), -dv) {
            Some((dtheta, weight)) => {
                weighted -= dtheta * weight;
                total_weight += weight;
            }
            None => log::warn!("marker pair {i}: right rotation sample out of range, dropped"),
        }
    }
    if total_weight == 0.0 {
        return 0.0;
    }
    let estimate = weighted / total_weight;
    log::debug!("rotation estimate: {:.4} deg", estimate.to_degrees());
    estimate
}

fn centroid(points: &[CanvasPos]) -> CanvasPos {
    if points.is_empty() {
        return CanvasPos::new(0.0, 0.0);
    }
    let mut x = 0.0;
    let mut y = 0.0;
    for p in points {
        x += p.x();
        y += p.y();
    }
    let n = points.len() as f64;
    CanvasPos::new(x / n, y / n)
}

/// Rotation about the local origin that moves `(x, y)` so its vertical
/// coordinate gains `dv`, plus the sample's confidence weight.
///
/// Returns `None` when no such rotation exists, i.e. `(y + dv) / r` falls
/// outside the domain of `asin` (including `r == 0`).
fn rotation_from_dv(x: f64, y: f64, dv: f64) -> Option<(f64, f64)> {
    let theta = y.atan2(x);
    let r = (x * x + y * y).sqrt();
    let ratio = (y + dv) / r;
    // Negated comparison so NaN (from r == 0) is dropped as well.
    if !(ratio.abs() <= 1.0) {
        return None;
    }
    let mut theta2 = ratio.asin();
    if theta.abs() > FRAC_PI_2 {
        // Reflect into the left half-plane.
        theta2 = PI - theta2;
    }
    let mut dtheta = theta2 - theta;
    while dtheta > PI {
        dtheta -= 2.0 * PI;
    }
    while dtheta <= -PI {
        dtheta += 2.0 * PI;
    }
    let weight = r * ((theta / 2.0).cos() + 1.0);
    Some((dtheta, weight))
}
