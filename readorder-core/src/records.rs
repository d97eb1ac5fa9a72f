//! CSV files exchanged between the conversion and ordering steps.

use std::path::Path;

use serde::Deserialize;
use snafu::{OptionExt, ResultExt};
use tracing::*;

use crate::{
    analysis::bbox::Bbox,
    consts::{ANNOTATION_COLUMN, BOXES_HEADER, IMAGE_PATH_COLUMN, LABELS_HEADER},
    error::*,
    utils::write_atomic,
};

/// The cells of an annotation CSV row this crate reads.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRow {
    pub image_path: Option<String>,
    pub annotation_bboxes: String,
}

#[derive(Debug, Deserialize)]
struct BoxRecord {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, ReadorderError> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .context(CsvSnafu {
            path: path.to_string_lossy(),
        })
}

/// Reads data row `row` (0-based, header excluded) of an annotation CSV.
pub fn read_annotation_row<P: AsRef<Path>>(
    path: P,
    row: usize,
) -> Result<AnnotationRow, ReadorderError> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();
    let mut reader = open_reader(path)?;

    let headers = reader
        .headers()
        .context(CsvSnafu {
            path: path_str.clone(),
        })?
        .clone();
    let annotation_idx = headers
        .iter()
        .position(|header| header == ANNOTATION_COLUMN)
        .context(MissingColumnSnafu {
            path: path_str.clone(),
            column: ANNOTATION_COLUMN,
        })?;
    let image_idx = headers
        .iter()
        .position(|header| header == IMAGE_PATH_COLUMN);

    let record = reader
        .records()
        .nth(row)
        .context(MissingRowSnafu {
            path: path_str.clone(),
            row,
        })?
        .context(CsvSnafu {
            path: path_str.clone(),
        })?;

    let annotation_bboxes = record
        .get(annotation_idx)
        .context(MissingColumnSnafu {
            path: path_str.clone(),
            column: ANNOTATION_COLUMN,
        })?
        .to_string();
    let image_path = image_idx
        .and_then(|idx| record.get(idx))
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    Ok(AnnotationRow {
        image_path,
        annotation_bboxes,
    })
}

/// Reads an `x1,y1,x2,y2` CSV. Every box must satisfy the corner invariant.
pub fn read_boxes_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Bbox>, ReadorderError> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let mut boxes = Vec::new();
    for record in reader.deserialize::<BoxRecord>() {
        let record = record.context(CsvSnafu {
            path: path.to_string_lossy(),
        })?;
        let bbox = Bbox::from_corners(record.x1, record.y1, record.x2, record.y2);
        bbox.validate()?;
        boxes.push(bbox);
    }

    info!("Read {} boxes from {:?}", boxes.len(), path);
    Ok(boxes)
}

/// Reads a `label` CSV, taking the first cell of every row.
pub fn read_labels_csv<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ReadorderError> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let mut labels = Vec::new();
    for record in reader.records() {
        let record = record.context(CsvSnafu {
            path: path.to_string_lossy(),
        })?;
        match record.get(0) {
            Some(label) => labels.push(label.to_string()),
            None => warn!("Skipping empty row in {:?}", path),
        }
    }

    info!("Read {} labels from {:?}", labels.len(), path);
    Ok(labels)
}

/// Writes boxes as `x1,y1,x2,y2` rows in the given order.
pub fn write_boxes_csv<P: AsRef<Path>>(path: P, boxes: &[Bbox]) -> Result<(), ReadorderError> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    write_atomic(path, |out| {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(BOXES_HEADER).context(CsvSnafu {
            path: path_str.clone(),
        })?;
        for bbox in boxes {
            writer
                .write_record(bbox.corners().map(|value| value.to_string()))
                .context(CsvSnafu {
                    path: path_str.clone(),
                })?;
        }
        writer.flush().context(IoWriteSnafu {
            path: path_str.clone(),
        })
    })
}

/// Writes one `label` row per label in the given order.
pub fn write_labels_csv<P: AsRef<Path>>(path: P, labels: &[String]) -> Result<(), ReadorderError> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    write_atomic(path, |out| {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(LABELS_HEADER).context(CsvSnafu {
            path: path_str.clone(),
        })?;
        for label in labels {
            writer.write_record([label]).context(CsvSnafu {
                path: path_str.clone(),
            })?;
        }
        writer.flush().context(IoWriteSnafu {
            path: path_str.clone(),
        })
    })
}
