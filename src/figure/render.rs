use std::io::Cursor;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

use image::RgbImage;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::{register_font, FontStyle};

use super::{Axis, Figure, LegendPosition, LineDash, SeriesStyle};
use crate::error::RenderError;

// matplotlib's "--" pattern, in multiples of the line width.
const DASH_ON: f64 = 3.7;
const DASH_OFF: f64 = 1.6;

/// White border kept around the drawn content when cropping (0.1 in).
const TIGHT_PAD_PT: f64 = 7.2;

const FONT_FAMILY: &str = "sans-serif";

/// Physical size of the saved figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width_in: 6.8,
            height_in: 4.8,
            dpi: 400.0,
        }
    }
}

impl RenderOptions {
    /// Canvas size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi).round() as u32,
            (self.height_in * self.dpi).round() as u32,
        )
    }

    /// Convert a length in points to pixels.
    pub fn px(&self, pt: f64) -> f64 {
        pt * self.dpi / 72.0
    }

    fn px_u32(&self, pt: f64) -> u32 {
        self.px(pt).round().max(1.0) as u32
    }
}

// ---------------------------------------------------------------------------
// Fonts
// ---------------------------------------------------------------------------

/// Text is drawn with the Ubuntu face bundled with egui, so output does not
/// depend on the fonts installed on the host. Bold requests fall back to it.
fn register_fonts() -> Result<(), RenderError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| {
        register_font(FONT_FAMILY, FontStyle::Normal, epaint_default_fonts::UBUNTU_LIGHT).is_ok()
    });
    if ok {
        Ok(())
    } else {
        Err(RenderError::Draw("bundled font could not be parsed".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Axes with explicit ticks
// ---------------------------------------------------------------------------

/// Linear `f64` axis whose labelled ticks are exactly the figure's tick
/// positions. Falls back to plotters' own ticks when none are given.
struct TickedAxis {
    inner: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TickedAxis {
    fn new(axis: &Axis) -> Self {
        Self {
            inner: (axis.min..axis.max).into(),
            ticks: axis.ticks.clone(),
        }
    }
}

impl Ranged for TickedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.inner.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if self.ticks.is_empty() {
            return self.inner.key_points(hint);
        }
        // No minor ticks.
        if hint.weight().allow_light_points() {
            Vec::new()
        } else {
            self.ticks.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.inner.range()
    }
}

// ---------------------------------------------------------------------------
// PNG output
// ---------------------------------------------------------------------------

/// Rasterise `figure` and encode it as PNG.
/// The canvas is cropped to the drawn content plus a 0.1 in border, like
/// matplotlib's tight bounding box.
pub fn render_png(figure: &Figure, options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
    register_fonts()?;
    let (width, height) = options.pixel_size();
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        draw(&root, figure, options)?;
        root.present().map_err(draw_err)?;
    }

    let len = pixels.len();
    let image = RgbImage::from_raw(width, height, pixels).ok_or(RenderError::Buffer {
        len,
        width,
        height,
    })?;
    let image = crop_to_content(image, options.px_u32(TIGHT_PAD_PT));
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(png)
}

/// Render `figure` and write it to `path`, replacing any previous file.
pub fn save_png(figure: &Figure, path: &Path, options: &RenderOptions) -> Result<(), RenderError> {
    let png = render_png(figure, options)?;
    std::fs::write(path, &png)?;
    log::info!("Saved '{}' to {} ({} bytes)", figure.title, path.display(), png.len());
    Ok(())
}

fn draw_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Trim uniform white margins, keeping `pad` pixels around whatever was drawn.
fn crop_to_content(image: RgbImage, pad: u32) -> RgbImage {
    let white = image::Rgb([255, 255, 255]);
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if *pixel != white {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }
    let Some((x0, y0, x1, y1)) = bounds else {
        return image;
    };

    let (width, height) = image.dimensions();
    let left = x0.saturating_sub(pad);
    let top = y0.saturating_sub(pad);
    let right = (x1 + 1).saturating_add(pad).min(width);
    let bottom = (y1 + 1).saturating_add(pad).min(height);
    image::imageops::crop_imm(&image, left, top, right - left, bottom - top).to_image()
}

fn format_tick(v: &f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn draw(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    figure: &Figure,
    o: &RenderOptions,
) -> Result<(), RenderError> {
    root.fill(&WHITE).map_err(draw_err)?;

    let title_font = (FONT_FAMILY, o.px(12.0)).into_font().style(FontStyle::Bold);
    let text_font = (FONT_FAMILY, o.px(10.0)).into_font();

    let x_area = if figure.x_axis.label.is_some() { 34.0 } else { 20.0 };
    let y_area = if figure.y_axis.label.is_some() { 38.0 } else { 26.0 };

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, title_font)
        .margin(o.px_u32(10.0))
        .x_label_area_size(o.px_u32(x_area))
        .y_label_area_size(o.px_u32(y_area))
        .build_cartesian_2d(TickedAxis::new(&figure.x_axis), TickedAxis::new(&figure.y_axis))
        .map_err(draw_err)?;

    // Left and bottom spines only, no grid.
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .x_labels(figure.x_axis.ticks.len())
        .y_labels(figure.y_axis.ticks.len())
        .x_label_formatter(&format_tick)
        .y_label_formatter(&format_tick)
        .label_style(text_font.clone())
        .axis_desc_style(text_font.clone())
        .axis_style(BLACK.stroke_width(o.px_u32(0.8)));
    if let Some(label) = &figure.x_axis.label {
        mesh.x_desc(label.as_str());
    }
    if let Some(label) = &figure.y_axis.label {
        mesh.y_desc(label.as_str());
    }
    mesh.draw().map_err(draw_err)?;

    let legend_len = o.px_u32(20.0) as i32;

    for series in &figure.series {
        let points = series.points.iter().copied();
        match series.style {
            SeriesStyle::Line {
                color,
                width_pt,
                dash,
            } => {
                let rgb = color.to_plotters();
                let width = o.px_u32(width_pt);
                let anno = match dash {
                    LineDash::Solid => {
                        chart.draw_series(LineSeries::new(points, rgb.stroke_width(width)))
                    }
                    LineDash::Dashed => chart.draw_series(DashedLineSeries::new(
                        points,
                        o.px_u32(DASH_ON * width_pt),
                        o.px_u32(DASH_OFF * width_pt),
                        rgb.stroke_width(width),
                    )),
                }
                .map_err(draw_err)?;
                anno.label(series.label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + legend_len, y)], rgb.stroke_width(width))
                });
            }
            SeriesStyle::Scatter { color, marker_pt } => {
                let rgb = color.to_plotters();
                let radius = o.px_u32(marker_pt / 2.0);
                chart
                    .draw_series(points.map(|p| Circle::new(p, radius, rgb.filled())))
                    .map_err(draw_err)?
                    .label(series.label.as_str())
                    .legend(move |(x, y)| Circle::new((x + legend_len / 2, y), radius, rgb.filled()));
            }
        }
    }

    if !figure.series.is_empty() {
        let position = match figure.legend {
            LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
            LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
            LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
            LegendPosition::LowerLeft => SeriesLabelPosition::LowerLeft,
        };
        chart
            .configure_series_labels()
            .position(position)
            .label_font(text_font)
            .legend_area_size(o.px_u32(24.0))
            .margin(o.px_u32(6.0))
            .background_style(WHITE.mix(0.8))
            .border_style(RGBColor(204, 204, 204))
            .draw()
            .map_err(draw_err)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::figure::{tick_range, Axis, Series};

    fn sample_figure() -> Figure {
        let mut fig = Figure::new(
            "Sample",
            Axis::new(0.0, 90.0).with_ticks(tick_range(0.0, 90.0, 10.0)),
            Axis::new(0.0, 90.0).with_ticks(tick_range(0.0, 90.0, 10.0)),
        );
        fig.push(Series::scatter("pts", vec![(10.0, 12.0), (40.0, 41.0)], Rgb::CYCLE_BLUE, 2.8));
        fig.push(Series::line("ref", vec![(0.0, 0.0), (80.0, 80.0)], Rgb::LIME, 3.0, LineDash::Dashed));
        fig
    }

    fn small() -> RenderOptions {
        RenderOptions {
            width_in: 3.4,
            height_in: 2.4,
            dpi: 100.0,
        }
    }

    #[test]
    fn default_canvas_is_400_dpi() {
        let o = RenderOptions::default();
        assert_eq!(o.pixel_size(), (2720, 1920));
        assert!((o.px(72.0) - 400.0).abs() < 1e-9);
        assert_eq!(o.px_u32(0.01), 1);
    }

    #[test]
    fn tick_labels_drop_trailing_zeros() {
        assert_eq!(format_tick(&10.0), "10");
        assert_eq!(format_tick(&-12.0), "-12");
        assert_eq!(format_tick(&2.5), "2.5");
    }

    #[test]
    fn ticked_axis_reports_exact_ticks_as_bold_points() {
        use plotters::coord::ranged1d::{BoldPoints, LightPoints};

        let axis = Axis::new(-12.0, 12.0).with_ticks(tick_range(-12.0, 12.0, 2.0));
        let ticked = TickedAxis::new(&axis);
        assert_eq!(ticked.key_points(BoldPoints(4)), axis.ticks);
        assert!(ticked.key_points(LightPoints::new(13, 40)).is_empty());
        assert_eq!(ticked.range(), -12.0..12.0);
        assert_eq!(ticked.map(&0.0, (0, 240)), 120);

        let plain = TickedAxis::new(&Axis::new(0.0, 10.0));
        assert!(!plain.key_points(BoldPoints(6)).is_empty());
    }

    #[test]
    fn crop_keeps_padding_around_content() {
        let mut img = RgbImage::from_pixel(100, 80, image::Rgb([255, 255, 255]));
        img.put_pixel(30, 20, image::Rgb([0, 0, 0]));
        img.put_pixel(59, 49, image::Rgb([10, 20, 30]));

        let cropped = crop_to_content(img, 5);
        assert_eq!(cropped.dimensions(), (40, 40));
        assert_eq!(*cropped.get_pixel(5, 5), image::Rgb([0, 0, 0]));
        assert_eq!(*cropped.get_pixel(34, 34), image::Rgb([10, 20, 30]));
    }

    #[test]
    fn crop_clamps_padding_to_canvas_and_skips_blank_images() {
        let mut img = RgbImage::from_pixel(50, 50, image::Rgb([255, 255, 255]));
        img.put_pixel(1, 48, image::Rgb([0, 0, 0]));
        assert_eq!(crop_to_content(img, 10).dimensions(), (12, 12));

        let blank = RgbImage::from_pixel(7, 3, image::Rgb([255, 255, 255]));
        assert_eq!(crop_to_content(blank, 2).dimensions(), (7, 3));
    }

    #[test]
    fn rendering_is_deterministic() {
        let fig = sample_figure();
        let first = render_png(&fig, &small()).unwrap();
        let second = render_png(&fig, &small()).unwrap();
        assert_eq!(first, second);

        let decoded = image::load_from_memory(&first).unwrap();
        assert!(decoded.width() <= 340 && decoded.height() <= 240);
        assert!(decoded.width() > 100 && decoded.height() > 100);
    }

    #[test]
    fn renders_symmetric_ticks_and_dashed_lines() {
        let mut fig = Figure::new(
            "Traversal",
            Axis::new(-12.0, 12.0)
                .with_ticks(tick_range(-12.0, 12.0, 2.0))
                .with_label("x"),
            Axis::new(-15.0, 10.0)
                .with_ticks(tick_range(-15.0, 10.0, 5.0))
                .with_label("y"),
        )
        .with_legend(LegendPosition::LowerLeft);
        fig.push(Series::line("expected", vec![(-10.0, 0.0), (10.0, 5.0)], Rgb::BLACK, 2.0, LineDash::Solid));
        fig.push(Series::line("actual", vec![(-10.0, 1.0), (10.0, 4.0)], Rgb::RED, 2.0, LineDash::Dashed));

        let png = render_png(&fig, &small()).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn save_png_overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.png");
        std::fs::write(&path, b"old contents").unwrap();

        save_png(&sample_figure(), &path, &small()).unwrap();
        let first = std::fs::read(&path).unwrap();
        save_png(&sample_figure(), &path, &small()).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(&first[1..4], b"PNG");
    }
}
