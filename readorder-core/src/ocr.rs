use std::{
    io::{BufWriter, Write},
    path::Path,
    process::Command,
};

use glam::DVec2;
use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};
use tracing::*;

use crate::{
    consts::{DEFAULT_OCR_PROGRAM, OCR_PROGRAM_ENV_NAME},
    error::*,
    layout::page::Page,
};

/// Runs text recognition on one image file.
pub trait OcrRunner {
    fn run(&mut self, image_path: &Path, languages: &[String]) -> Result<String, ReadorderError>;
}

/// Invokes an OCR command line tool as
/// `<program> <image> --images --langs <l1,l2,...>` and returns its stdout.
#[derive(Debug, Clone)]
pub struct CommandOcr {
    program: String,
    retries: usize,
}

impl CommandOcr {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            retries: 0,
        }
    }

    /// Uses `READORDER_OCR_BIN` when set, the default program otherwise.
    pub fn from_env() -> Self {
        let program =
            std::env::var(OCR_PROGRAM_ENV_NAME).unwrap_or_else(|_| DEFAULT_OCR_PROGRAM.to_string());
        Self::new(program)
    }

    /// Extra attempts after a failed invocation.
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn invoke(&self, image_path: &Path, languages: &[String]) -> Result<String, ReadorderError> {
        let output = Command::new(&self.program)
            .arg(image_path)
            .arg("--images")
            .arg("--langs")
            .arg(languages.join(","))
            .output()
            .context(OcrSpawnSnafu {
                program: self.program.clone(),
            })?;

        ensure!(
            output.status.success(),
            OcrFailedSnafu {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
        );

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrRunner for CommandOcr {
    fn run(&mut self, image_path: &Path, languages: &[String]) -> Result<String, ReadorderError> {
        let mut attempt = 0;
        loop {
            match self.invoke(image_path, languages) {
                Ok(text) => return Ok(text),
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "OCR attempt {} of {} failed: {}",
                        attempt,
                        self.retries + 1,
                        err
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Recognized text of one box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrResult {
    pub id: String,
    pub rank: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrDocument {
    pub ocr: Vec<OcrResult>,
}

/// Crops every box of `page` out of `image` and runs OCR on it.
///
/// Each crop lives in its own temporary PNG that exists only while the OCR
/// runner reads it. Boxes that collapse to nothing once clamped to the image
/// are skipped. The first OCR failure aborts the page.
///
/// # Arguments
///
/// * `image` - Page image the boxes were placed on
/// * `page` - Ordered boxes in pixel coordinates
/// * `runner` - OCR backend invoked once per crop
/// * `languages` - Language codes passed to the runner
/// * `auto_clean_text` - Repair mojibake with `plsfix`
///
/// # Returns
///
/// One result per non-empty crop, in reading order
#[tracing::instrument(skip_all, fields(boxes = page.boxes.len()))]
pub fn crop_and_run_ocr(
    image: &DynamicImage,
    page: &Page,
    runner: &mut dyn OcrRunner,
    languages: &[String],
    auto_clean_text: bool,
) -> Result<Vec<OcrResult>, ReadorderError> {
    let (width, height) = image.dimensions();
    let bounds = DVec2::new(width as f64, height as f64);

    let mut results = Vec::with_capacity(page.boxes.len());

    for ordered in &page.boxes {
        let clamped = ordered.bbox.clamp(DVec2::ZERO, bounds);
        let x = clamped.min.x.floor() as u32;
        let y = clamped.min.y.floor() as u32;
        let crop_width = (clamped.max.x.ceil() as u32).saturating_sub(x);
        let crop_height = (clamped.max.y.ceil() as u32).saturating_sub(y);

        if crop_width == 0 || crop_height == 0 {
            warn!("Skipping OCR for box {}: empty crop", ordered.id);
            continue;
        }

        let crop = image.crop_imm(x, y, crop_width, crop_height);

        let mut temp = tempfile::Builder::new()
            .prefix(&format!("box_{}_", ordered.id))
            .suffix(".png")
            .tempfile()
            .context(IoWriteSnafu {
                path: std::env::temp_dir().to_string_lossy(),
            })?;
        let temp_display = temp.path().to_string_lossy().into_owned();

        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            crop.write_to(&mut writer, ImageFormat::Png)
                .context(ImageWriteSnafu {
                    path: temp_display.clone(),
                })?;
            writer.flush().context(IoWriteSnafu {
                path: temp_display.clone(),
            })?;
        }

        debug!("Running OCR for box {} on {}", ordered.id, temp_display);
        let mut text = runner.run(temp.path(), languages)?;
        drop(temp);

        if auto_clean_text {
            text = plsfix::fix_text(&text, None);
        }

        results.push(OcrResult {
            id: ordered.id.clone(),
            rank: ordered.rank,
            text,
        });
    }

    info!("Recognized text for {} boxes", results.len());
    Ok(results)
}
