use std::fs;
use std::path::PathBuf;

use cap_core::errors::{CapError, ErrorInfo};
use cap_core::{PlotRange, TimeSeries};
use cap_fit::Polynomial;
use tracing::info;

/// Everything a figure needs to draw a planning run.
#[derive(Debug, Clone, Copy)]
pub struct PlotScene<'a> {
    /// Observed series.
    pub series: &'a TimeSeries,
    /// Fitted trend.
    pub model: &'a Polynomial,
    /// Capacity threshold.
    pub threshold: f64,
    /// Solved crossing period.
    pub crossing: f64,
    /// Extrapolation window.
    pub range: PlotRange,
}

/// Sink for planning figures.
pub trait Renderer {
    /// Draws the scene. Nothing downstream consumes the output.
    fn render(&mut self, scene: &PlotScene<'_>) -> Result<(), CapError>;
}

/// Discards every scene.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _scene: &PlotScene<'_>) -> Result<(), CapError> {
        Ok(())
    }
}

/// Canvas size for SVG figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 480,
        }
    }
}

const MARGIN: f64 = 48.0;

/// Maps data coordinates onto the canvas.
struct Frame {
    x: (f64, f64),
    y: (f64, f64),
    width: f64,
    height: f64,
}

impl Frame {
    fn new(x: (f64, f64), ys: impl Iterator<Item = f64>, config: &FigureConfig) -> Self {
        let (lo, hi) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
        let (lo, hi) = if lo.is_finite() && hi.is_finite() {
            (lo, hi)
        } else {
            (0.0, 1.0)
        };
        let pad = ((hi - lo) * 0.05).max(1e-9);
        Self {
            x: (x.0, x.1.max(x.0 + 1e-9)),
            y: (lo - pad, hi + pad),
            width: f64::from(config.width),
            height: f64::from(config.height),
        }
    }

    fn px(&self, x: f64) -> f64 {
        MARGIN + (x - self.x.0) / (self.x.1 - self.x.0) * (self.width - 2.0 * MARGIN)
    }

    fn py(&self, y: f64) -> f64 {
        self.height - MARGIN - (y - self.y.0) / (self.y.1 - self.y.0) * (self.height - 2.0 * MARGIN)
    }

    fn open(&self, title: &str) -> Vec<String> {
        vec![
            format!(
                "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}'>",
                w = self.width,
                h = self.height
            ),
            format!(
                "<text x='{:.2}' y='{:.2}' text-anchor='middle' font-size='16'>{}</text>",
                self.width / 2.0,
                MARGIN / 2.0,
                title
            ),
            format!(
                "<line x1='{m:.2}' y1='{b:.2}' x2='{r:.2}' y2='{b:.2}' stroke='#111827' />",
                m = MARGIN,
                b = self.height - MARGIN,
                r = self.width - MARGIN
            ),
            format!(
                "<line x1='{m:.2}' y1='{m:.2}' x2='{m:.2}' y2='{b:.2}' stroke='#111827' />",
                m = MARGIN,
                b = self.height - MARGIN
            ),
        ]
    }

    fn points(&self, series: &TimeSeries) -> Vec<String> {
        series
            .observations()
            .iter()
            .map(|obs| {
                format!(
                    "<circle cx='{:.2}' cy='{:.2}' r='2' fill='#3b82f6' />",
                    self.px(f64::from(obs.period)),
                    self.py(obs.value)
                )
            })
            .collect()
    }

    fn curve(&self, samples: &[(f64, f64)], color: &str) -> String {
        let path = samples
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", self.px(*x), self.py(*y)))
            .collect::<Vec<_>>()
            .join(" ");
        format!("<polyline points='{path}' fill='none' stroke='{color}' stroke-width='2' />")
    }
}

fn observed_bounds(series: &TimeSeries) -> (f64, f64) {
    (1.0, f64::from(series.last_period().max(2)))
}

/// Observed data against the fitted trend over the observed periods.
pub fn render_fit_svg(scene: &PlotScene<'_>, config: &FigureConfig) -> String {
    let (start, end) = observed_bounds(scene.series);
    let samples = scene.model.sample(start, end, scene.series.len().max(2));
    let frame = Frame::new(
        (start, end),
        scene.series.values().chain(samples.iter().map(|(_, y)| *y)),
        config,
    );
    let mut parts = frame.open("Polynomial regression of monthly production");
    parts.extend(frame.points(scene.series));
    parts.push(frame.curve(&samples, "#f97316"));
    parts.push("</svg>".into());
    parts.join("")
}

/// Observed data against the Taylor restatement at each observed period.
pub fn render_taylor_svg(scene: &PlotScene<'_>, config: &FigureConfig) -> String {
    let taylor = scene.model.taylor();
    let samples: Vec<(f64, f64)> = scene
        .series
        .periods()
        .map(|p| (p, taylor.evaluate(p)))
        .collect();
    let frame = Frame::new(
        observed_bounds(scene.series),
        scene.series.values().chain(samples.iter().map(|(_, y)| *y)),
        config,
    );
    let mut parts = frame.open("Taylor series approximation of monthly production");
    parts.extend(frame.points(scene.series));
    parts.push(frame.curve(&samples, "#10b981"));
    parts.push("</svg>".into());
    parts.join("")
}

/// Extrapolated trend with the capacity line and the crossing marker.
///
/// The window is widened to include the crossing when it falls past the
/// configured end.
pub fn render_threshold_svg(scene: &PlotScene<'_>, config: &FigureConfig) -> String {
    let start = scene.range.start;
    let end = if scene.crossing.is_finite() {
        scene.range.end.max(scene.crossing.ceil())
    } else {
        scene.range.end
    };
    let samples = scene.model.sample(start, end, scene.range.samples.max(2));
    let frame = Frame::new(
        (start, end),
        scene
            .series
            .values()
            .chain(samples.iter().map(|(_, y)| *y))
            .chain(std::iter::once(scene.threshold)),
        config,
    );
    let mut parts = frame.open("Prediction of when to start building new warehouse");
    parts.extend(frame.points(scene.series));
    parts.push(frame.curve(&samples, "#f97316"));
    let ty = frame.py(scene.threshold);
    parts.push(format!(
        "<line class='threshold' x1='{:.2}' y1='{ty:.2}' x2='{:.2}' y2='{ty:.2}' stroke='#ef4444' stroke-dasharray='6 4' />",
        frame.px(start),
        frame.px(end)
    ));
    if scene.crossing.is_finite() && scene.crossing >= start && scene.crossing <= end {
        let cx = frame.px(scene.crossing);
        parts.push(format!(
            "<line class='crossing' x1='{cx:.2}' y1='{:.2}' x2='{cx:.2}' y2='{:.2}' stroke='#22c55e' stroke-dasharray='6 4' />",
            MARGIN,
            frame.height - MARGIN
        ));
    }
    parts.push("</svg>".into());
    parts.join("")
}

/// Writes `fit.svg`, `taylor.svg` and `threshold.svg` into a directory.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    out_dir: PathBuf,
    config: FigureConfig,
}

impl SvgRenderer {
    /// Creates a renderer targeting `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>, config: FigureConfig) -> Self {
        Self {
            out_dir: out_dir.into(),
            config,
        }
    }

    fn write(&self, name: &str, svg: String) -> Result<(), CapError> {
        let path = self.out_dir.join(name);
        fs::write(&path, svg).map_err(|err| {
            CapError::Render(
                ErrorInfo::new("render.write", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, scene: &PlotScene<'_>) -> Result<(), CapError> {
        fs::create_dir_all(&self.out_dir).map_err(|err| {
            CapError::Render(
                ErrorInfo::new("render.dir", err.to_string())
                    .with_context("path", self.out_dir.display()),
            )
        })?;
        self.write("fit.svg", render_fit_svg(scene, &self.config))?;
        self.write("taylor.svg", render_taylor_svg(scene, &self.config))?;
        self.write("threshold.svg", render_threshold_svg(scene, &self.config))?;
        info!(dir = %self.out_dir.display(), "figures written");
        Ok(())
    }
}
