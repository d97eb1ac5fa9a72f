use glam::DVec2;
use tracing::*;

use crate::{
    analysis::bbox::Bbox,
    consts::NORMALIZED_SCALE,
    inference::model::{PagePrediction, RankedBox},
};

/// Rescales model output from the normalized grid into image pixels.
///
/// The dimensions must be those of the original page image, captured
/// before any crop or resize.
#[derive(Debug, Clone, Copy)]
pub struct OrderMapper {
    dimensions: DVec2,
}

impl OrderMapper {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            dimensions: DVec2::new(width as f64, height as f64),
        }
    }

    /// Maps every box of a prediction to pixel space, keeping model order
    /// and ranks untouched.
    ///
    /// Boxes the model returns inverted or with non-finite coordinates are
    /// logged and dropped; they never reach identification or rendering.
    ///
    /// # Example
    /// ```
    /// use readorder_core::analysis::bbox::Bbox;
    /// use readorder_core::inference::{OrderMapper, PagePrediction, RankedBox};
    ///
    /// let prediction = PagePrediction {
    ///     boxes: vec![RankedBox {
    ///         index: 0,
    ///         rank: 0,
    ///         bbox: Bbox::from_corners(10.0, 10.0, 20.0, 20.0),
    ///     }],
    /// };
    /// let pixels = OrderMapper::new(1000, 2000).to_pixels(&prediction);
    /// assert_eq!(pixels[0].bbox.corners(), [100.0, 200.0, 200.0, 400.0]);
    /// ```
    pub fn to_pixels(&self, prediction: &PagePrediction) -> Vec<RankedBox> {
        prediction
            .boxes
            .iter()
            .filter_map(|ranked| {
                if let Err(err) = ranked.bbox.validate() {
                    warn!(
                        "Dropping model box {} (rank {}): {}",
                        ranked.index, ranked.rank, err
                    );
                    return None;
                }

                Some(RankedBox {
                    bbox: Bbox::new(
                        ranked.bbox.min * self.dimensions / NORMALIZED_SCALE,
                        ranked.bbox.max * self.dimensions / NORMALIZED_SCALE,
                    ),
                    ..*ranked
                })
            })
            .collect()
    }
}
