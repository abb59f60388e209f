//! Chart rendering.
//!
//! Charts are rasterized straight onto an RGB canvas and returned as base64
//! PNG. Axis text is not drawn; titles and labels travel alongside the image
//! in [`ChartImage`] so clients can caption it.

use base64::{engine::general_purpose, Engine as _};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use crate::domain::{ChartImage, ChartKind};
use crate::errors::{AppError, AppResult};

pub const CHART_WIDTH: u32 = 640;
pub const CHART_HEIGHT: u32 = 400;

const MARGIN_LEFT: i64 = 56;
const MARGIN_RIGHT: i64 = 24;
const MARGIN_TOP: i64 = 32;
const MARGIN_BOTTOM: i64 = 48;
const GRID_LINES: i64 = 4;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([64, 64, 64]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const GUIDE: Rgb<u8> = Rgb([160, 160, 160]);

const PALETTE: [Rgb<u8>; 6] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
];

pub fn series_color(index: usize) -> Rgb<u8> {
    PALETTE[index % PALETTE.len()]
}

/// Plot area of the canvas, in pixels
#[derive(Debug, Clone, Copy)]
struct Plot {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl Plot {
    fn new() -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            right: CHART_WIDTH as i64 - MARGIN_RIGHT,
            bottom: CHART_HEIGHT as i64 - MARGIN_BOTTOM,
        }
    }

    fn width(&self) -> i64 {
        self.right - self.left
    }

    fn height(&self) -> i64 {
        self.bottom - self.top
    }

    /// Pixel row for `value` on a `[min, max]` vertical scale.
    fn y(&self, value: f64, min: f64, max: f64) -> i64 {
        let ratio = ((value - min) / (max - min)).clamp(0.0, 1.0);
        self.bottom - (ratio * self.height() as f64).round() as i64
    }

    /// Pixel column for `value` on a `[min, max]` horizontal scale.
    fn x(&self, value: f64, min: f64, max: f64) -> i64 {
        let ratio = ((value - min) / (max - min)).clamp(0.0, 1.0);
        self.left + (ratio * self.width() as f64).round() as i64
    }
}

struct Canvas {
    image: RgbImage,
    plot: Plot,
}

impl Canvas {
    fn new() -> Self {
        Self {
            image: RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, BACKGROUND),
            plot: Plot::new(),
        }
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && x < CHART_WIDTH as i64 && y < CHART_HEIGHT as i64 {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.put(x, y, color);
            }
        }
    }

    fn line(&mut self, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.put(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                x += sx;
            }
            if doubled <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn thick_line(&mut self, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
        for offset in -1..=1 {
            self.line((from.0, from.1 + offset), (to.0, to.1 + offset), color);
        }
    }

    fn dashed_horizontal(&mut self, y: i64, color: Rgb<u8>) {
        for x in (self.plot.left..=self.plot.right).filter(|x| (x / 6) % 2 == 0) {
            self.put(x, y, color);
        }
    }

    fn dashed_vertical(&mut self, x: i64, color: Rgb<u8>) {
        for y in (self.plot.top..=self.plot.bottom).filter(|y| (y / 6) % 2 == 0) {
            self.put(x, y, color);
        }
    }

    fn disc(&mut self, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
        for y in -radius..=radius {
            for x in -radius..=radius {
                if x * x + y * y <= radius * radius {
                    self.put(cx + x, cy + y, color);
                }
            }
        }
    }

    fn frame(&mut self) {
        let plot = self.plot;
        for step in 1..=GRID_LINES {
            let y = plot.bottom - plot.height() * step / GRID_LINES;
            self.line((plot.left, y), (plot.right, y), GRID);
        }
        self.line((plot.left, plot.top), (plot.left, plot.bottom), AXIS);
        self.line((plot.left, plot.bottom), (plot.right, plot.bottom), AXIS);
    }

    fn encode(self) -> AppResult<String> {
        let mut png = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| AppError::internal(format!("Chart encoding failed: {}", e)))?;
        Ok(general_purpose::STANDARD.encode(png))
    }
}

fn chart(
    title: &str,
    kind: ChartKind,
    labels: &[String],
    series: &[String],
    canvas: Canvas,
) -> AppResult<ChartImage> {
    Ok(ChartImage {
        title: title.to_string(),
        kind,
        labels: labels.to_vec(),
        series: series.to_vec(),
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
        png_base64: canvas.encode()?,
    })
}

fn require_points(labels: &[String], count: usize) -> AppResult<()> {
    if labels.is_empty() || count == 0 {
        return Err(AppError::validation("Chart needs at least one data point"));
    }
    if labels.len() != count {
        return Err(AppError::validation(format!(
            "Chart has {} labels but {} values",
            labels.len(),
            count
        )));
    }
    Ok(())
}

fn clean(value: f64, min: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    }
}

/// Vertical bars from zero to each value on a `[0, max]` scale.
pub fn bar_chart(title: &str, labels: &[String], values: &[f64], max: f64) -> AppResult<ChartImage> {
    require_points(labels, values.len())?;
    let max = if max > 0.0 { max } else { 1.0 };

    let mut canvas = Canvas::new();
    canvas.frame();
    let plot = canvas.plot;

    let slot = plot.width() / values.len() as i64;
    let bar = (slot * 3 / 5).max(1);
    for (i, value) in values.iter().enumerate() {
        let x0 = plot.left + slot * i as i64 + (slot - bar) / 2;
        let top = plot.y(clean(*value, 0.0, max), 0.0, max);
        if top < plot.bottom {
            canvas.fill_rect(x0, top, x0 + bar - 1, plot.bottom - 1, series_color(i));
        }
    }

    chart(title, ChartKind::Bar, labels, &[], canvas)
}

/// Connected points on a `[min, max]` scale, with a zero guide when the
/// range spans zero.
pub fn line_chart(
    title: &str,
    labels: &[String],
    values: &[f64],
    min: f64,
    max: f64,
) -> AppResult<ChartImage> {
    require_points(labels, values.len())?;
    if !(max > min) {
        return Err(AppError::validation("Chart range is empty"));
    }

    let mut canvas = Canvas::new();
    canvas.frame();
    let plot = canvas.plot;

    if min < 0.0 && max > 0.0 {
        canvas.dashed_horizontal(plot.y(0.0, min, max), GUIDE);
    }

    let last = (values.len() - 1).max(1) as f64;
    let points: Vec<(i64, i64)> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let x = if values.len() == 1 {
                plot.left + plot.width() / 2
            } else {
                plot.x(i as f64, 0.0, last)
            };
            (x, plot.y(clean(*value, min, max), min, max))
        })
        .collect();

    for pair in points.windows(2) {
        canvas.thick_line(pair[0], pair[1], series_color(0));
    }
    for (x, y) in &points {
        canvas.disc(*x, *y, 3, series_color(0));
    }

    chart(title, ChartKind::Line, labels, &[], canvas)
}

/// Points at `(x, y)`, with optional dashed guides splitting the plot into
/// quadrants at `guides = (x, y)`. Axes start at zero and grow to fit.
pub fn scatter_chart(
    title: &str,
    labels: &[String],
    points: &[(f64, f64)],
    guides: Option<(f64, f64)>,
) -> AppResult<ChartImage> {
    require_points(labels, points.len())?;

    let fit = |values: &mut dyn Iterator<Item = f64>, floor: f64| {
        values
            .filter(|v| v.is_finite())
            .fold(floor, f64::max)
            * 1.15
    };
    let (guide_x, guide_y) = guides.unwrap_or((0.0, 0.0));
    let x_max = fit(&mut points.iter().map(|p| p.0), (guide_x * 2.0).max(1.0));
    let y_max = fit(&mut points.iter().map(|p| p.1), (guide_y * 2.0).max(1.0));

    let mut canvas = Canvas::new();
    canvas.frame();
    let plot = canvas.plot;

    if guides.is_some() {
        canvas.dashed_vertical(plot.x(guide_x, 0.0, x_max), GUIDE);
        canvas.dashed_horizontal(plot.y(guide_y, 0.0, y_max), GUIDE);
    }

    for (i, (x, y)) in points.iter().enumerate() {
        let px = plot.x(clean(*x, 0.0, x_max), 0.0, x_max);
        let py = plot.y(clean(*y, 0.0, y_max), 0.0, y_max);
        canvas.disc(px, py, 7, series_color(i));
    }

    chart(title, ChartKind::Scatter, labels, &[], canvas)
}

/// One group of bars per category, one bar per series, on `[0, max]`.
/// `values[s][c]` is series `s` in category `c`.
pub fn grouped_bar_chart(
    title: &str,
    series: &[String],
    categories: &[String],
    values: &[Vec<f64>],
    max: f64,
) -> AppResult<ChartImage> {
    if series.is_empty() || categories.is_empty() || values.len() != series.len() {
        return Err(AppError::validation("Grouped chart needs series and categories"));
    }
    if values.iter().any(|row| row.len() != categories.len()) {
        return Err(AppError::validation(
            "Every series needs one value per category",
        ));
    }
    let max = if max > 0.0 { max } else { 1.0 };

    let mut canvas = Canvas::new();
    canvas.frame();
    let plot = canvas.plot;

    let group = plot.width() / categories.len() as i64;
    let bar = ((group * 4 / 5) / series.len() as i64).max(1);
    let padding = (group - bar * series.len() as i64) / 2;

    for (s, row) in values.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let x0 = plot.left + group * c as i64 + padding + bar * s as i64;
            let top = plot.y(clean(*value, 0.0, max), 0.0, max);
            if top < plot.bottom {
                canvas.fill_rect(x0, top, x0 + bar - 1, plot.bottom - 1, series_color(s));
            }
        }
    }

    chart(title, ChartKind::GroupedBar, categories, series, canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn decode(chart: &ChartImage) -> RgbImage {
        let bytes = general_purpose::STANDARD.decode(&chart.png_base64).unwrap();
        image::load_from_memory(&bytes).unwrap().to_rgb8()
    }

    #[test]
    fn test_bar_chart_renders_png() {
        let chart = bar_chart("Impact", &labels(&["A", "B"]), &[5.0, 2.5], 5.0).unwrap();
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!((chart.width, chart.height), (640, 400));

        let image = decode(&chart);
        assert_eq!(image.dimensions(), (CHART_WIDTH, CHART_HEIGHT));

        // Centre of the first bar, just above the x axis, is painted.
        let plot = Plot::new();
        let slot = plot.width() / 2;
        let x = (plot.left + slot / 2) as u32;
        let y = (plot.bottom - 2) as u32;
        assert_eq!(*image.get_pixel(x, y), series_color(0));
    }

    #[test]
    fn test_bar_values_clamped() {
        assert!(bar_chart("x", &labels(&["A"]), &[f64::NAN], 5.0).is_ok());
        assert!(bar_chart("x", &labels(&["A"]), &[99.0], 5.0).is_ok());
    }

    #[test]
    fn test_empty_input_is_validation_error() {
        assert!(matches!(
            bar_chart("x", &[], &[], 5.0).unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(line_chart("x", &labels(&["a"]), &[], -1.0, 1.0).is_err());
        assert!(scatter_chart("x", &labels(&["a", "b"]), &[(1.0, 1.0)], None).is_err());
        assert!(grouped_bar_chart("x", &labels(&["s"]), &labels(&["c"]), &[vec![]], 1.0).is_err());
    }

    #[test]
    fn test_line_chart_single_point() {
        let chart = line_chart("Sentiment", &labels(&["today"]), &[0.3], -1.0, 1.0).unwrap();
        assert_eq!(chart.kind, ChartKind::Line);
        assert!(line_chart("x", &labels(&["a"]), &[0.0], 1.0, 1.0).is_err());
    }

    #[test]
    fn test_scatter_with_guides() {
        let chart = scatter_chart(
            "BCG",
            &labels(&["Cloud", "Fax"]),
            &[(1.5, 20.0), (0.2, 1.0)],
            Some((1.0, 10.0)),
        )
        .unwrap();
        assert_eq!(chart.labels, labels(&["Cloud", "Fax"]));
        decode(&chart);
    }

    #[test]
    fn test_grouped_bar_keeps_series() {
        let chart = grouped_bar_chart(
            "Comparison",
            &labels(&["Acme", "Globex"]),
            &labels(&["SWOT", "Pressure", "Sentiment"]),
            &[vec![0.5, 1.0, 0.2], vec![1.0, 0.1, 0.9]],
            1.0,
        )
        .unwrap();
        assert_eq!(chart.kind, ChartKind::GroupedBar);
        assert_eq!(chart.series, labels(&["Acme", "Globex"]));
        assert_eq!(chart.labels.len(), 3);
    }
}
