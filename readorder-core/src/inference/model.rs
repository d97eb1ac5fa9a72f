use image::DynamicImage;

use crate::{analysis::bbox::Bbox, error::ReadorderError};

/// A box as returned by an ordering model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankedBox {
    /// Index of the box in the list handed to the model.
    pub index: usize,
    /// Predicted reading-order position. Need not be contiguous or zero-based.
    pub rank: usize,
    /// Rectangle; normalized `0..=100` when it comes out of a model.
    pub bbox: Bbox,
}

/// Model output for one image, already sorted by predicted rank.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PagePrediction {
    pub boxes: Vec<RankedBox>,
}

/// A reading-order model.
///
/// `predict` receives a batch of page images and, per image, the pixel-space
/// boxes to order. It returns one [`PagePrediction`] per image whose boxes
/// carry coordinates on the `0..=100` normalized grid, sorted by rank.
pub trait OrderingModel {
    fn name(&self) -> &str;

    fn predict(
        &mut self,
        images: &[&DynamicImage],
        boxes: &[Vec<Bbox>],
    ) -> Result<Vec<PagePrediction>, ReadorderError>;
}
