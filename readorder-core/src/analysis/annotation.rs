use glam::DVec2;
use serde::Deserialize;
use serde_json::Value;
use snafu::ResultExt;
use tracing::*;

use crate::{
    analysis::bbox::Bbox,
    error::{JsonSnafu, ReadorderError},
};

/// One annotated region: its rectangle in pixel space and its first label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledBox {
    pub bbox: Bbox,
    pub label: String,
}

/// A parsed annotation row.
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    /// Page image the boxes belong to, when the row names one.
    pub image_path: Option<String>,
    /// Valid boxes in input order.
    pub boxes: Vec<LabeledBox>,
    /// Number of entries dropped because they were malformed.
    pub skipped: usize,
}

/// Wire shape of one entry of the `annotation_bboxes` list.
#[derive(Debug, Deserialize)]
struct RawBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    labels: Vec<Value>,
}

impl Annotation {
    /// Parses the JSON box list of one annotation row.
    ///
    /// Every entry needs `x`, `y`, `width`, `height` and a non-empty `labels`
    /// list. Entries that miss a key, carry no label or describe a negative
    /// size are logged and skipped; the remaining boxes keep their input
    /// order. Only `labels[0]` is used.
    ///
    /// Fails only when the text is not a JSON array.
    pub fn parse(image_path: Option<String>, json: &str) -> Result<Self, ReadorderError> {
        let entries: Vec<Value> =
            serde_json::from_str(json).context(JsonSnafu { stage: "annotation" })?;

        let mut boxes = Vec::with_capacity(entries.len());
        let mut skipped = 0;

        for (idx, entry) in entries.into_iter().enumerate() {
            match Self::parse_entry(entry) {
                Ok(labeled) => boxes.push(labeled),
                Err(reason) => {
                    warn!("Skipping annotation entry {}: {}", idx, reason);
                    skipped += 1;
                }
            }
        }

        debug!(
            "Parsed {} annotation boxes, skipped {}",
            boxes.len(),
            skipped
        );

        Ok(Self {
            image_path,
            boxes,
            skipped,
        })
    }

    fn parse_entry(entry: Value) -> Result<LabeledBox, String> {
        let raw: RawBox = serde_json::from_value(entry).map_err(|err| err.to_string())?;

        let label = match raw.labels.into_iter().next() {
            Some(Value::String(label)) => label,
            Some(other) => other.to_string(),
            None => return Err("empty `labels`".to_string()),
        };

        let bbox =
            Bbox::new_from_min_size(DVec2::new(raw.x, raw.y), DVec2::new(raw.width, raw.height));
        bbox.validate().map_err(|err| err.to_string())?;

        Ok(LabeledBox { bbox, label })
    }

    pub fn bboxes(&self) -> Vec<Bbox> {
        self.boxes.iter().map(|labeled| labeled.bbox).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.boxes.iter().map(|labeled| labeled.label.clone()).collect()
    }

    /// Looks up the labels of annotation boxes by index, in the given order.
    ///
    /// Indices outside the annotation are logged and skipped.
    pub fn labels_in_order(&self, order: &[usize]) -> Vec<&str> {
        order
            .iter()
            .filter_map(|&idx| match self.boxes.get(idx) {
                Some(labeled) => Some(labeled.label.as_str()),
                None => {
                    warn!(
                        "Order index {} out of range for {} annotation boxes",
                        idx,
                        self.boxes.len()
                    );
                    None
                }
            })
            .collect()
    }
}
