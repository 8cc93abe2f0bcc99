use anyhow::Result;
use extract::ScoreVector;
use plotters::prelude::*;
use std::f64::consts::PI;

use crate::raster::{draw_label, render_png, Canvas, EmbeddedImage};

/// The dimensions the radar understands, in drawing order, with axis labels.
pub const RADAR_DIMENSIONS: [(&str, &str); 5] = [
    ("people", "Team"),
    ("market", "Market"),
    ("traction", "Traction"),
    ("moat", "Moat"),
    ("financing", "Financing"),
];

const GRID_RINGS: usize = 4;

pub trait ScoreRadar: Send + Sync {
    /// Returns `None` when none of the recognized dimensions is present.
    fn render(&self, scores: &ScoreVector) -> Option<EmbeddedImage>;
}

/// Recognized dimensions present in `scores`, in radar order.
/// Non-finite values are drawn as zero.
pub fn recognized_dimensions(scores: &ScoreVector) -> Vec<(&'static str, f64)> {
    RADAR_DIMENSIONS
        .iter()
        .filter_map(|(key, label)| {
            scores
                .get(key)
                .map(|v| (*label, if v.is_finite() { v } else { 0.0 }))
        })
        .collect()
}

/// Vertex positions of the radar polygon, starting at 12 o'clock and going
/// clockwise. The first vertex is repeated at the end to close the outline.
pub fn closed_polygon(values: &[f64], center: (i32, i32), radius: f64, max_value: f64) -> Vec<(i32, i32)> {
    let n = values.len();
    let scale = if max_value > 0.0 { radius / max_value } else { 0.0 };

    let mut points: Vec<(i32, i32)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| polar(center, v.max(0.0) * scale, axis_angle(i, n)))
        .collect();
    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    points
}

fn axis_angle(index: usize, count: usize) -> f64 {
    2.0 * PI * index as f64 / count as f64
}

fn polar(center: (i32, i32), r: f64, theta: f64) -> (i32, i32) {
    (
        center.0 + (r * theta.sin()).round() as i32,
        center.1 - (r * theta.cos()).round() as i32,
    )
}

pub struct PlottersRadar {
    size: u32,
}

impl PlottersRadar {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    fn draw(&self, canvas: &Canvas<'_>, dims: &[(&str, f64)]) -> Result<()> {
        let center = (self.size as i32 / 2, self.size as i32 / 2 + 10);
        let radius = self.size as f64 * 0.34;
        let n = dims.len();
        let values: Vec<f64> = dims.iter().map(|(_, v)| *v).collect();
        let max_value = values.iter().copied().fold(0.0f64, f64::max);
        let grid = RGBColor(200, 200, 200);

        for ring in 1..=GRID_RINGS {
            let level = vec![ring as f64; n];
            let outline = closed_polygon(&level, center, radius, GRID_RINGS as f64);
            canvas.draw(&PathElement::new(outline, grid.stroke_width(1)))?;
        }

        for (i, (label, _)) in dims.iter().enumerate() {
            let theta = axis_angle(i, n);
            canvas.draw(&PathElement::new(vec![center, polar(center, radius, theta)], grid.stroke_width(1)))?;
            draw_label(canvas, label, polar(center, radius + 24.0, theta), 15.0, &BLACK);
        }

        let outline = closed_polygon(&values, center, radius, max_value);
        if n >= 3 {
            canvas.draw(&Polygon::new(outline.clone(), BLUE.mix(0.1).filled()))?;
        }
        canvas.draw(&PathElement::new(outline.clone(), BLUE.stroke_width(2)))?;
        for point in &outline[..n] {
            canvas.draw(&Circle::new(*point, 3, BLUE.filled()))?;
        }

        draw_label(canvas, "Investment score radar", (center.0, 18), 18.0, &BLACK);
        Ok(())
    }
}

impl Default for PlottersRadar {
    fn default() -> Self {
        Self::new(480)
    }
}

impl ScoreRadar for PlottersRadar {
    fn render(&self, scores: &ScoreVector) -> Option<EmbeddedImage> {
        let dims = recognized_dimensions(scores);
        if dims.is_empty() {
            return None;
        }

        match render_png(self.size, self.size, |canvas| self.draw(canvas, &dims)) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(error = %e, "radar chart rendering failed");
                None
            }
        }
    }
}

/// Used when charting is unavailable; the radar has no textual fallback.
pub struct NoRadar;

impl ScoreRadar for NoRadar {
    fn render(&self, _scores: &ScoreVector) -> Option<EmbeddedImage> {
        None
    }
}
