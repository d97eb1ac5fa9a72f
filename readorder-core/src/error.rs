use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ReadorderError {
    #[snafu(display("Read `{}` error: {}", path, source))]
    IoRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Write `{}` error: {}", path, source))]
    IoWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Csv `{}` error: {}", path, source))]
    Csv { source: csv::Error, path: String },
    #[snafu(display("Csv `{}` has no column `{}`", path, column))]
    MissingColumn { path: String, column: String },
    #[snafu(display("Csv `{}` has no data row {}", path, row))]
    MissingRow { path: String, row: usize },
    #[snafu(display("Json error at stage `{}`: {}", stage, source))]
    Json {
        source: serde_json::Error,
        stage: String,
    },
    #[snafu(display(
        "Invalid bbox ({}, {}, {}, {}): {}",
        x1,
        y1,
        x2,
        y2,
        reason
    ))]
    InvalidBbox {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        reason: String,
    },
    #[snafu(display("Image Read `{}` error: {}", path, source))]
    ImageRead {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Image Write `{}` error: {}", path, source))]
    ImageWrite {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Load Font error: {}", source))]
    Font { source: ab_glyph::InvalidFont },
    #[snafu(display("Ordering model `{}` error: {}", model, message))]
    Model { model: String, message: String },
    #[snafu(display("Spawn ocr command `{}` error: {}", program, source))]
    OcrSpawn {
        source: std::io::Error,
        program: String,
    },
    #[snafu(display("Ocr command `{}` failed with {}: {}", program, status, stderr))]
    OcrFailed {
        program: String,
        status: String,
        stderr: String,
    },
    #[snafu(display("Invalid config: {}", message))]
    Config { message: String },
}
