use glam::DVec2;
use image::{DynamicImage, GenericImageView};
use snafu::ensure;
use tracing::*;

use crate::{
    analysis::bbox::Bbox,
    consts::NORMALIZED_SCALE,
    error::{ModelSnafu, ReadorderError},
    inference::model::{OrderingModel, PagePrediction, RankedBox},
};

#[derive(Debug, Clone)]
pub struct GeometricConfig {
    /// Maximum vertical distance between box centers on the same line,
    /// in normalized units.
    pub y_tolerance: f64,
    /// Minimum horizontal spread of box centers before a page may be
    /// treated as two columns, in normalized units.
    pub min_column_span: f64,
    /// Pages with fewer boxes are always read as a single column.
    pub min_boxes_for_columns: usize,
}

impl Default for GeometricConfig {
    fn default() -> Self {
        Self {
            y_tolerance: 1.0,
            min_column_span: 10.0,
            min_boxes_for_columns: 4,
        }
    }
}

/// Reading-order model driven purely by box geometry.
///
/// Pages are read top-to-bottom and left-to-right within a line. When the
/// box centers split into two populated halves the page is read as two
/// columns, left column first; boxes centered near the page middle are read
/// with the left column.
#[derive(Debug, Clone, Default)]
pub struct GeometricOrdering {
    config: GeometricConfig,
}

impl GeometricOrdering {
    pub fn new(config: GeometricConfig) -> Self {
        Self { config }
    }

    fn order_page(
        &self,
        (width, height): (u32, u32),
        boxes: &[Bbox],
    ) -> Result<PagePrediction, ReadorderError> {
        ensure!(
            width > 0 && height > 0,
            ModelSnafu {
                model: self.name(),
                message: format!("image has no area ({}x{})", width, height),
            }
        );

        let factor = DVec2::new(
            NORMALIZED_SCALE / width as f64,
            NORMALIZED_SCALE / height as f64,
        );
        let normalized: Vec<Bbox> = boxes.iter().map(|bbox| bbox.scale(factor)).collect();

        let order = self.reading_order(&normalized);

        Ok(PagePrediction {
            boxes: order
                .into_iter()
                .enumerate()
                .map(|(rank, index)| RankedBox {
                    index,
                    rank,
                    bbox: normalized[index],
                })
                .collect(),
        })
    }

    /// Returns box indices in reading order.
    fn reading_order(&self, boxes: &[Bbox]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..boxes.len()).collect();

        if self.is_multi_column_layout(boxes) {
            debug!("Ordering {} boxes as two columns", boxes.len());
            self.sort_multi_column_layout(boxes, &mut indices);
        } else {
            debug!("Ordering {} boxes as a single column", boxes.len());
            self.sort_single_column_layout(boxes, &mut indices);
        }

        indices
    }

    /// Detects if the layout has multiple columns by analyzing X-coordinate distribution
    fn is_multi_column_layout(&self, boxes: &[Bbox]) -> bool {
        if boxes.len() < self.config.min_boxes_for_columns {
            return false;
        }

        let mut x_centers: Vec<f64> = boxes.iter().map(|bbox| bbox.center().x).collect();
        x_centers.sort_by(f64::total_cmp);

        let min_x = x_centers[0];
        let max_x = x_centers[x_centers.len() - 1];
        let total_width = max_x - min_x;

        if total_width < self.config.min_column_span {
            return false;
        }

        let mid_x = min_x + total_width / 2.0;
        let left_count = x_centers.iter().filter(|&&x| x < mid_x).count();
        let right_count = x_centers.len() - left_count;

        // At least 25% of the boxes in the smaller column
        let min_per_column = (boxes.len() / 4).max(1);
        left_count >= min_per_column && right_count >= min_per_column
    }

    /// Left column first (top-to-bottom), then right column (top-to-bottom)
    fn sort_multi_column_layout(&self, boxes: &[Bbox], indices: &mut Vec<usize>) {
        let (min_x, max_x) = boxes.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(min_x, max_x), bbox| (min_x.min(bbox.min.x), max_x.max(bbox.max.x)),
        );
        let mid_x = min_x + (max_x - min_x) / 2.0;
        let band = (max_x - min_x) / 6.0;

        let (mut left_column, mut right_column): (Vec<usize>, Vec<usize>) =
            indices.drain(..).partition(|&idx| {
                let center_x = boxes[idx].center().x;
                (center_x - mid_x).abs() < band || center_x < mid_x
            });

        self.sort_single_column_layout(boxes, &mut left_column);
        self.sort_single_column_layout(boxes, &mut right_column);

        indices.extend(left_column);
        indices.extend(right_column);
    }

    /// Top-to-bottom by line, left-to-right within a line
    fn sort_single_column_layout(&self, boxes: &[Bbox], indices: &mut [usize]) {
        indices.sort_by(|&a, &b| boxes[a].center().y.total_cmp(&boxes[b].center().y));

        let mut start = 0;
        while start < indices.len() {
            let line_y = boxes[indices[start]].center().y;
            let mut end = start + 1;
            while end < indices.len()
                && boxes[indices[end]].center().y - line_y <= self.config.y_tolerance
            {
                end += 1;
            }

            indices[start..end]
                .sort_by(|&a, &b| boxes[a].center().x.total_cmp(&boxes[b].center().x));
            start = end;
        }
    }
}

impl OrderingModel for GeometricOrdering {
    fn name(&self) -> &str {
        "geometric"
    }

    #[tracing::instrument(skip_all, fields(images = images.len()))]
    fn predict(
        &mut self,
        images: &[&DynamicImage],
        boxes: &[Vec<Bbox>],
    ) -> Result<Vec<PagePrediction>, ReadorderError> {
        ensure!(
            images.len() == boxes.len(),
            ModelSnafu {
                model: self.name(),
                message: format!(
                    "{} images but {} box lists",
                    images.len(),
                    boxes.len()
                ),
            }
        );

        images
            .iter()
            .zip(boxes)
            .map(|(image, page_boxes)| self.order_page(image.dimensions(), page_boxes))
            .collect()
    }
}
