//! Normalized rectangle geometry shared by the camera engine, the spring
//! integrator, and the frame composer.
//!
//! All coordinates are normalized to `[0.0, 1.0]` relative to the captured
//! screen. A rectangle below `MIN_RECT_SIZE` on either axis would make the
//! derived zoom factor explode, so every constructor clamps into range
//! instead of producing a degenerate camera.

use serde::{Deserialize, Serialize};

/// Smallest width/height a camera rectangle may have. Keeps `1 / max(w, h)`
/// bounded (§3 of the spec): at this floor the zoom factor tops out at 20x.
pub const MIN_RECT_SIZE: f64 = 0.05;

/// A rectangle in normalized screen space, `(0, 0)` top-left, `(1, 1)`
/// bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl NormalizedRect {
    /// The full captured frame, no zoom.
    pub const FULL: NormalizedRect = NormalizedRect {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    /// Construct a rectangle, clamping into the documented invariants
    /// rather than panicking. Width/height are clamped first, then the
    /// origin is clamped so the rectangle never runs off the unit square.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        let w = w.clamp(MIN_RECT_SIZE, 1.0);
        let h = h.clamp(MIN_RECT_SIZE, 1.0);
        Self {
            x: x.clamp(0.0, 1.0 - w),
            y: y.clamp(0.0, 1.0 - h),
            w,
            h,
        }
    }

    /// Construct a rectangle centered at `(cx, cy)`, clamped into range.
    pub fn centered(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    /// Re-clamp an already-constructed rectangle into the invariants.
    /// Used after spring integration, where a step can overshoot.
    pub fn clamp_into_unit_square(self) -> Self {
        Self::new(self.x, self.y, self.w, self.h)
    }

    /// Check the documented invariants without silently fixing them.
    /// Used at load time and on edit commit, where a violation must
    /// surface (§7 `InvariantViolation`) instead of being clamped away.
    pub fn check_invariants(&self) -> Result<(), GeometryError> {
        const EPS: f64 = 1e-6;
        if !(MIN_RECT_SIZE..=1.0 + EPS).contains(&self.w)
            || !(MIN_RECT_SIZE..=1.0 + EPS).contains(&self.h)
        {
            return Err(GeometryError::SizeOutOfRange {
                w: self.w,
                h: self.h,
            });
        }
        if self.x + self.w > 1.0 + EPS || self.y + self.h > 1.0 + EPS {
            return Err(GeometryError::OutOfBounds {
                x: self.x,
                y: self.y,
                w: self.w,
                h: self.h,
            });
        }
        Ok(())
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// `1 / max(w, h)`. Larger means more zoomed in.
    pub fn zoom_strength(&self) -> f64 {
        1.0 / self.w.max(self.h)
    }

    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Does this rectangle fully contain `other`?
    pub fn contains_rect(&self, other: &NormalizedRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shrink the rectangle by `margin` on every side (a "safe zone" used by
    /// the containment check in the Smart Camera Engine). Never shrinks
    /// below `MIN_RECT_SIZE`.
    pub fn shrink(&self, margin: f64) -> NormalizedRect {
        let w = (self.w - 2.0 * margin).max(MIN_RECT_SIZE);
        let h = (self.h - 2.0 * margin).max(MIN_RECT_SIZE);
        let (cx, cy) = self.center();
        NormalizedRect::centered(cx, cy, w, h)
    }

    /// Expand the shorter axis (about the rectangle's own center) so the
    /// result has `target_aspect = w / h`, preserving the padded region on
    /// the longer axis. Used by the semantic-focus aspect lock (§4.3.3).
    pub fn expand_to_aspect(&self, target_aspect: f64) -> NormalizedRect {
        let current_aspect = self.w / self.h;
        let (cx, cy) = self.center();
        if current_aspect > target_aspect {
            // Wider than target: grow height.
            let h = self.w / target_aspect;
            NormalizedRect::centered(cx, cy, self.w, h)
        } else {
            // Taller than (or equal to) target: grow width.
            let w = self.h * target_aspect;
            NormalizedRect::centered(cx, cy, w, self.h)
        }
    }

    /// Linear interpolation between two rectangles.
    pub fn lerp(a: &NormalizedRect, b: &NormalizedRect, t: f64) -> NormalizedRect {
        let t = t.clamp(0.0, 1.0);
        NormalizedRect {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            w: a.w + (b.w - a.w) * t,
            h: a.h + (b.h - a.h) * t,
        }
    }

    /// Convert a point from screen-space to this rectangle's local
    /// `[0, 1]^2` space. Returns `None` if the point falls outside.
    pub fn to_local(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        if !self.contains_point(px, py) {
            return None;
        }
        Some(((px - self.x) / self.w, (py - self.y) / self.h))
    }
}

impl Default for NormalizedRect {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeometryError {
    #[error("rectangle size out of range: w={w}, h={h}")]
    SizeOutOfRange { w: f64, h: f64 },
    #[error("rectangle runs outside [0,1]^2: x={x}, y={y}, w={w}, h={h}")]
    OutOfBounds { x: f64, y: f64, w: f64, h: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_rect_has_unit_zoom() {
        assert_eq!(NormalizedRect::FULL.zoom_strength(), 1.0);
    }

    #[test]
    fn new_clamps_minimum_size() {
        let r = NormalizedRect::new(0.0, 0.0, 0.001, 0.001);
        assert_eq!(r.w, MIN_RECT_SIZE);
        assert_eq!(r.h, MIN_RECT_SIZE);
    }

    #[test]
    fn new_clamps_origin_so_rect_fits() {
        let r = NormalizedRect::new(0.9, 0.9, 0.5, 0.5);
        assert!(r.x + r.w <= 1.0 + 1e-9);
        assert!(r.y + r.h <= 1.0 + 1e-9);
    }

    #[test]
    fn zoom_strength_clamped_by_max_dimension() {
        let r = NormalizedRect::new(0.25, 0.25, 0.5, 0.25);
        assert!((r.zoom_strength() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn check_invariants_rejects_oversized() {
        let bad = NormalizedRect {
            x: 0.8,
            y: 0.0,
            w: 0.5,
            h: 0.5,
        };
        assert!(bad.check_invariants().is_err());
    }

    #[test]
    fn shrink_produces_safe_zone() {
        let r = NormalizedRect::new(0.2, 0.2, 0.4, 0.4);
        let safe = r.shrink(0.1);
        assert!((safe.w - 0.2).abs() < 1e-9);
        assert!(r.contains_rect(&safe));
    }

    #[test]
    fn expand_to_aspect_grows_shorter_axis() {
        let square = NormalizedRect::new(0.3, 0.3, 0.2, 0.2);
        let widened = square.expand_to_aspect(16.0 / 9.0);
        assert!((widened.w / widened.h - 16.0 / 9.0).abs() < 1e-9);
        // Center preserved.
        assert!((widened.center().0 - square.center().0).abs() < 1e-9);
        assert!((widened.center().1 - square.center().1).abs() < 1e-9);
    }

    #[test]
    fn expand_to_aspect_grows_width_when_too_tall() {
        let tall = NormalizedRect::new(0.4, 0.1, 0.1, 0.3);
        let widened = tall.expand_to_aspect(16.0 / 9.0);
        assert!((widened.w / widened.h - 16.0 / 9.0).abs() < 1e-9);
        assert!((widened.h - tall.h).abs() < 1e-9);
    }

    #[test]
    fn to_local_roundtrip() {
        let r = NormalizedRect::new(0.2, 0.3, 0.4, 0.4);
        let local = r.to_local(0.4, 0.5).unwrap();
        assert!((local.0 - 0.5).abs() < 1e-9);
        assert!((local.1 - 0.5).abs() < 1e-9);
        assert!(r.to_local(0.0, 0.0).is_none());
    }

    #[test]
    fn lerp_midpoint() {
        let a = NormalizedRect::FULL;
        let b = NormalizedRect::new(0.25, 0.25, 0.5, 0.5);
        let mid = NormalizedRect::lerp(&a, &b, 0.5);
        assert!((mid.x - 0.125).abs() < 1e-9);
        assert!((mid.w - 0.75).abs() < 1e-9);
    }
}
