use anyhow::Result;
use extract::KeywordWeight;
use plotters::prelude::*;

use crate::raster::{draw_label, render_png, Canvas, EmbeddedImage};

pub const DEFAULT_TOP_K: usize = 30;

/// Guards the min-max range when every selected weight is equal.
const NORMALIZE_EPSILON: f64 = 1e-9;

const CANVAS: (u32, u32) = (600, 450);

pub trait KeywordRenderer: Send + Sync {
    fn render(&self, keywords: &[KeywordWeight], top_k: usize) -> Option<EmbeddedImage>;
}

/// Highest `top_k` weights; equal weights keep their input order.
pub fn select_top_k(keywords: &[KeywordWeight], top_k: usize) -> Vec<KeywordWeight> {
    let mut selected = keywords.to_vec();
    selected.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    selected.truncate(top_k);
    selected
}

/// Min-max scaling into [0, 1] over the given weights.
pub fn min_max_normalize(weights: &[f64]) -> Vec<f64> {
    let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
    let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    weights
        .iter()
        .map(|w| (w - min) / (max - min + NORMALIZE_EPSILON))
        .collect()
}

/// One word of the text layout, in a 100 x 100 box with y pointing up.
#[derive(Debug, Clone, PartialEq)]
pub struct WordPlacement {
    pub word: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

/// Left-to-right, top-to-bottom placement with font size growing with the
/// normalized weight. Wraps when a row is full and stops at the bottom edge.
pub fn layout_words(words: &[(String, f64)]) -> Vec<WordPlacement> {
    let (mut x, mut y) = (5.0, 90.0);
    let mut placements = Vec::new();

    for (word, norm) in words {
        placements.push(WordPlacement {
            word: word.clone(),
            x,
            y,
            font_size: 8.0 + (18.0 * norm).floor(),
        });
        x += f64::max(10.0, word.chars().count() as f64 * 5.0);
        if x > 90.0 {
            x = 5.0;
            y -= 10.0;
            if y < 5.0 {
                break;
            }
        }
    }
    placements
}

pub struct PlottersKeywords;

impl PlottersKeywords {
    fn draw_bars(canvas: &Canvas<'_>, selected: &[KeywordWeight]) -> Result<()> {
        let (width, height) = (CANVAS.0 as f64, CANVAS.1 as f64);
        let (left, right, top, bottom) = (40.0, 20.0, 40.0, 90.0);
        let max = selected.iter().map(|k| k.weight).fold(0.0f64, f64::max);
        let slot = (width - left - right) / selected.len() as f64;
        let plot_height = height - top - bottom;

        canvas.draw(&PathElement::new(
            vec![(left as i32, (height - bottom) as i32), ((width - right) as i32, (height - bottom) as i32)],
            BLACK.stroke_width(1),
        ))?;

        for (i, keyword) in selected.iter().enumerate() {
            let bar = if max > 0.0 { keyword.weight.max(0.0) / max * plot_height } else { 0.0 };
            let x0 = left + i as f64 * slot + slot * 0.15;
            let x1 = left + (i + 1) as f64 * slot - slot * 0.15;
            canvas.draw(&Rectangle::new(
                [(x0 as i32, (height - bottom - bar) as i32), (x1 as i32, (height - bottom) as i32)],
                BLUE.filled(),
            ))?;
            draw_label(canvas, &keyword.term, (((x0 + x1) / 2.0) as i32, (height - bottom + 14.0 + (i % 3) as f64 * 14.0) as i32), 11.0, &BLACK);
        }

        draw_label(canvas, "Keyword weights", ((width / 2.0) as i32, 18), 18.0, &BLACK);
        Ok(())
    }

    /// Fails when no word at all could be drawn, so the caller can fall back.
    fn draw_cloud(canvas: &Canvas<'_>, placements: &[WordPlacement]) -> Result<()> {
        let (width, height) = (CANVAS.0 as f64, CANVAS.1 as f64);
        let mut drawn = 0;
        for p in placements {
            let at = ((p.x / 100.0 * width) as i32, ((100.0 - p.y) / 100.0 * height) as i32);
            // points to pixels at the report's 1.6x scale
            if draw_label(canvas, &p.word, at, p.font_size * 1.6, &BLACK) {
                drawn += 1;
            }
        }
        anyhow::ensure!(drawn > 0, "no keyword could be drawn");
        Ok(())
    }

    fn cloud(&self, selected: &[KeywordWeight]) -> Option<EmbeddedImage> {
        let weights: Vec<f64> = selected.iter().map(|k| k.weight).collect();
        let words: Vec<(String, f64)> = selected
            .iter()
            .map(|k| k.term.clone())
            .zip(min_max_normalize(&weights))
            .collect();
        let placements = layout_words(&words);

        render_png(CANVAS.0, CANVAS.1, |canvas| Self::draw_cloud(canvas, &placements))
            .map_err(|e| tracing::debug!(error = %e, "keyword text layout unavailable"))
            .ok()
    }

    fn bars(&self, selected: &[KeywordWeight]) -> Option<EmbeddedImage> {
        render_png(CANVAS.0, CANVAS.1, |canvas| Self::draw_bars(canvas, selected))
            .map_err(|e| tracing::warn!(error = %e, "keyword bar chart rendering failed"))
            .ok()
    }
}

impl KeywordRenderer for PlottersKeywords {
    fn render(&self, keywords: &[KeywordWeight], top_k: usize) -> Option<EmbeddedImage> {
        let selected = select_top_k(keywords, top_k);
        if selected.is_empty() {
            return None;
        }

        let bars = self.bars(&selected);
        let cloud = self.cloud(&selected);
        if cloud.is_none() && bars.is_some() {
            tracing::info!("keyword text layout produced nothing, using bar chart");
        }
        cloud.or(bars)
    }
}

/// Used when charting is unavailable.
pub struct NoKeywords;

impl KeywordRenderer for NoKeywords {
    fn render(&self, _keywords: &[KeywordWeight], _top_k: usize) -> Option<EmbeddedImage> {
        None
    }
}
