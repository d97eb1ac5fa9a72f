use glam::DVec2;
use snafu::ensure;

use crate::error::{InvalidBboxSnafu, ReadorderError};

/// An axis-aligned rectangle given by its top-left and bottom-right corners.
///
/// Coordinates follow image conventions: the origin is the top-left corner of
/// the page and `y` grows downward. A box lives either in pixel space or in
/// the `0..=100` normalized space emitted by ordering models; the type does
/// not track which, callers do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bbox {
    /// The top-left corner (`x1`, `y1`).
    pub min: DVec2,
    /// The bottom-right corner (`x2`, `y2`).
    pub max: DVec2,
}

impl Bbox {
    /// Creates a new bounding box from its two corners.
    ///
    /// # Example
    /// ```
    /// use glam::DVec2;
    /// use readorder_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(DVec2::new(0.0, 0.0), DVec2::new(10.0, 5.0));
    /// assert_eq!(bbox.width(), 10.0);
    /// ```
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Creates a bounding box from `x1, y1, x2, y2`.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(DVec2::new(x1, y1), DVec2::new(x2, y2))
    }

    /// Creates a new bounding box from a minimum point and size vector.
    ///
    /// This is the shape annotation tools export (`x`, `y`, `width`, `height`).
    ///
    /// # Example
    /// ```
    /// use glam::DVec2;
    /// use readorder_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new_from_min_size(DVec2::new(1.0, 2.0), DVec2::new(5.0, 3.0));
    /// assert_eq!(bbox.corners(), [1.0, 2.0, 6.0, 5.0]);
    /// ```
    pub fn new_from_min_size(min: DVec2, size: DVec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// Returns `[x1, y1, x2, y2]`.
    pub fn corners(&self) -> [f64; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Calculates the center point of the bounding box.
    ///
    /// # Example
    /// ```
    /// use glam::DVec2;
    /// use readorder_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(DVec2::new(0.0, 0.0), DVec2::new(4.0, 2.0));
    /// assert_eq!(bbox.center(), DVec2::new(2.0, 1.0));
    /// ```
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) / 2.0
    }

    /// Checks the corner invariant `x2 >= x1`, `y2 >= y1` and that every
    /// coordinate is finite.
    ///
    /// # Example
    /// ```
    /// use readorder_core::analysis::bbox::Bbox;
    /// assert!(Bbox::from_corners(0.0, 0.0, 1.0, 1.0).validate().is_ok());
    /// assert!(Bbox::from_corners(5.0, 0.0, 1.0, 1.0).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ReadorderError> {
        let [x1, y1, x2, y2] = self.corners();

        ensure!(
            self.min.is_finite() && self.max.is_finite(),
            InvalidBboxSnafu {
                x1,
                y1,
                x2,
                y2,
                reason: "non-finite coordinate",
            }
        );
        ensure!(
            x2 >= x1 && y2 >= y1,
            InvalidBboxSnafu {
                x1,
                y1,
                x2,
                y2,
                reason: "bottom-right corner lies before top-left corner",
            }
        );

        Ok(())
    }

    /// Scales both corners component-wise.
    ///
    /// Used to move boxes between pixel space and the normalized grid.
    ///
    /// # Example
    /// ```
    /// use glam::DVec2;
    /// use readorder_core::analysis::bbox::Bbox;
    /// let normalized = Bbox::from_corners(10.0, 10.0, 20.0, 20.0);
    /// let pixels = normalized.scale(DVec2::new(10.0, 20.0));
    /// assert_eq!(pixels.corners(), [100.0, 200.0, 200.0, 400.0]);
    /// ```
    pub fn scale(&self, factor: DVec2) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }

    /// Clamps the bounding box coordinates to stay within the specified bounds.
    ///
    /// # Example
    /// ```
    /// use glam::DVec2;
    /// use readorder_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_corners(-10.0, -5.0, 1030.0, 1030.0);
    /// let clamped = bbox.clamp(DVec2::ZERO, DVec2::new(1023.0, 1023.0));
    /// assert_eq!(clamped.corners(), [0.0, 0.0, 1023.0, 1023.0]);
    /// ```
    pub fn clamp(&self, min_bounds: DVec2, max_bounds: DVec2) -> Self {
        Self {
            min: self.min.max(min_bounds).min(max_bounds),
            max: self.max.min(max_bounds).max(min_bounds),
        }
    }
}
