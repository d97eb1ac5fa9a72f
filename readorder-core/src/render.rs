use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use glam::DVec2;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use snafu::ResultExt;
use tracing::*;

use crate::{
    consts::{BOX_COLOR, BOX_THICKNESS, FONT_SIZE, LABEL_COLOR, LABEL_OFFSET, RANK_COLOR},
    error::*,
    layout::page::Page,
    utils::write_atomic,
};

/// Draws predicted reading order onto page images.
pub struct OrderRenderer {
    font: Option<FontVec>,
    font_scale: PxScale,
}

impl OrderRenderer {
    /// Creates a renderer. Without a font only the rectangles are drawn.
    pub fn new(font: Option<FontVec>) -> Self {
        if font.is_none() {
            warn!("No font configured, rank and label text will not be drawn");
        }

        Self {
            font,
            font_scale: PxScale::from(FONT_SIZE),
        }
    }

    /// Loads a TrueType/OpenType font from disk.
    pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontVec, ReadorderError> {
        let path = path.as_ref();
        let data = std::fs::read(path).context(IoReadSnafu {
            path: path.to_string_lossy(),
        })?;

        FontVec::try_from_vec(data).context(FontSnafu {})
    }

    /// Returns a copy of `image` with every box outlined, its rank at the
    /// top-left corner and its label just above it.
    ///
    /// Boxes are clamped to the image first; those left without area are
    /// not drawn.
    pub fn draw(&self, image: &DynamicImage, page: &Page) -> RgbImage {
        let mut output_img = image.to_rgb8();
        let (img_width, img_height) = output_img.dimensions();
        let bounds = DVec2::new(img_width as f64, img_height as f64);

        for ordered in &page.boxes {
            let clamped = ordered.bbox.clamp(DVec2::ZERO, bounds);
            let x = clamped.min.x.floor() as i32;
            let y = clamped.min.y.floor() as i32;
            let width = (clamped.max.x.ceil() as i32 - x).max(0) as u32;
            let height = (clamped.max.y.ceil() as i32 - y).max(0) as u32;

            if width == 0 || height == 0 {
                debug!("Skipping box {}: empty once clamped to the image", ordered.id);
                continue;
            }

            // Draw multiple rectangles to create thicker lines
            for offset in 0..BOX_THICKNESS {
                let thick_rect = Rect::at(x - offset, y - offset)
                    .of_size(width + (offset * 2) as u32, height + (offset * 2) as u32);
                draw_hollow_rect_mut(&mut output_img, thick_rect, Rgb(BOX_COLOR));
            }

            let Some(font) = &self.font else {
                continue;
            };

            draw_text_mut(
                &mut output_img,
                Rgb(RANK_COLOR),
                x.max(0),
                y.max(0),
                self.font_scale,
                font,
                &ordered.rank.to_string(),
            );

            if let Some(label) = &ordered.label {
                draw_text_mut(
                    &mut output_img,
                    Rgb(LABEL_COLOR),
                    x.max(0),
                    (y - LABEL_OFFSET).max(0),
                    self.font_scale,
                    font,
                    label,
                );
            }
        }

        output_img
    }

    /// Draws the page and saves it to `output_path`, picking the encoder from
    /// the file extension.
    pub fn save<P: AsRef<Path>>(
        &self,
        image: &DynamicImage,
        page: &Page,
        output_path: P,
    ) -> Result<(), ReadorderError> {
        let output_path = output_path.as_ref();
        let path_str = output_path.to_string_lossy();

        let format = ImageFormat::from_path(output_path).context(ImageWriteSnafu {
            path: path_str.clone(),
        })?;
        let output_img = DynamicImage::ImageRgb8(self.draw(image, page));

        write_atomic(output_path, |writer| {
            output_img.write_to(writer, format).context(ImageWriteSnafu {
                path: path_str.clone(),
            })
        })?;

        info!("Output image saved to: {}", path_str);
        Ok(())
    }
}
