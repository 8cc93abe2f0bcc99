use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;

/// A PNG image kept as base64 so it can be inlined into documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    base64: String,
}

impl EmbeddedImage {
    pub fn from_png(png: &[u8]) -> Self {
        Self {
            base64: STANDARD.encode(png),
        }
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.base64)
    }
}

pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Draws onto an in-memory white canvas and encodes the result as PNG.
pub fn render_png<F>(width: u32, height: u32, draw: F) -> Result<EmbeddedImage>
where
    F: FnOnce(&Canvas<'_>) -> Result<()>,
{
    let mut pixels = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }

    let image = image::RgbImage::from_raw(width, height, pixels)
        .context("pixel buffer does not match canvas size")?;
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, image::ImageFormat::Png)
        .context("failed to encode PNG")?;

    Ok(EmbeddedImage::from_png(png.get_ref()))
}

/// Draws centered text. Text needs a usable system font, so a failure is
/// reported instead of propagated and the shapes stay on the canvas.
pub fn draw_label(canvas: &Canvas<'_>, text: &str, at: (i32, i32), size: f64, color: &RGBColor) -> bool {
    let style = ("sans-serif", size)
        .into_font()
        .color(color)
        .pos(Pos::new(HPos::Center, VPos::Center));

    match canvas.draw(&Text::new(text, at, style)) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, text, "label not drawn");
            false
        }
    }
}
