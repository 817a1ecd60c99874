#![warn(missing_docs)]

//! Wrap-aware angle helpers.
//!
//! Module headings are continuous (unbounded) angular values. Everything that
//! compares two headings must go through [`shortest_distance`] so that the
//! error for (350°, 10°) comes out as 20° and not 340°.

use core::f64::consts::{PI, TAU};

/// Normalize an angle to be within `(-PI, PI]`.
///
/// # Arguments
///
/// * `angle`: The angle in radians to normalize.
///
/// # Returns
///
/// The equivalent angle in radians within `(-PI, PI]`.
pub fn wrap(angle: f64) -> f64 {
    let a = angle % TAU;
    if a > PI {
        a - TAU
    } else if a <= -PI {
        a + TAU
    } else {
        a
    }
}

/// Signed shortest angular distance from `from` to `to`, in radians.
///
/// The result is within `(-PI, PI]`; adding it to `from` reaches an angle
/// equivalent to `to` with the least rotation.
pub fn shortest_distance(from: f64, to: f64) -> f64 {
    wrap(to - from)
}
