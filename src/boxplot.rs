//! Rendering of horizontal box-plots of the per-network value distributions to PNG images.
//!
//! The styling follows the figures of the original Yeo network analysis: one box per network, filled with the
//! network's publication color and outlined in black, the mean marked by a white star with blue edge.
//! Sizes are given in typographic points and converted to pixels with the figure resolution.

use log::{debug, info};
use plotters::prelude::*;

use std::f64::consts::PI;
use std::fmt::Display;
use std::path::Path;

use crate::atlas::YeoAtlas;
use crate::error::{Result, YeonetsError};
use crate::extract::NetworkValues;
use crate::stats::BoxStats;

pub const FONT_FAMILY: &str = "sans-serif";

/// Fraction of the value span added on both sides of the x axis.
const X_PADDING: f64 = 0.05;

/// Style and size of a box-plot figure.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub line_width_pt: f64,
    pub box_height: f64, // Relative to the distance between two boxes.
    pub show_outliers: bool,
    pub grid_alpha: f64,
    pub title_pt: f64,
    pub axis_label_pt: f64,
    pub tick_pt: f64,
}

impl Default for PlotStyle {
    fn default() -> PlotStyle {
        PlotStyle {
            width_in: 12.0,
            height_in: 10.0,
            dpi: 300,
            title: String::new(),
            x_label: String::from("3D brain map values"),
            y_label: String::from("Yeo functional networks"),
            line_width_pt: 3.0,
            box_height: 0.6,
            show_outliers: false,
            grid_alpha: 0.4,
            title_pt: 18.0,
            axis_label_pt: 16.0,
            tick_pt: 10.0,
        }
    }
}

impl PlotStyle {

    /// The style used for the given atlas. The 17 network figure is wider.
    pub fn for_atlas(atlas: YeoAtlas) -> PlotStyle {
        let width_in = match atlas {
            YeoAtlas::Yeo7 => 12.0,
            YeoAtlas::Yeo17 => 16.0,
        };
        PlotStyle {
            width_in,
            title: format!("Volume values for the Yeo {} functional networks", atlas.num_networks()),
            ..PlotStyle::default()
        }
    }

    /// Convert a size in points to pixels at the resolution of this style. At least one pixel.
    pub fn px(&self, points: f64) -> u32 {
        ((points * self.dpi as f64 / 72.0).round() as u32).max(1)
    }

    /// The image size in pixels.
    pub fn figure_pixels(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }
}


/// The PNG file name for the box-plot of the given atlas.
pub fn output_file_name(atlas: YeoAtlas) -> String {
    format!("Yeo_{}_nets.png", atlas.num_networks())
}


fn plot_error<E: Display>(err: E) -> YeonetsError {
    YeonetsError::Plot(err.to_string())
}


/// The x axis range covering all whiskers, and the outliers if they are shown, with some padding.
pub fn value_range(stats: &[BoxStats], show_outliers: bool) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for s in stats.iter() {
        let (s_lo, s_hi) = if show_outliers { (s.min, s.max) } else { (s.whisker_low, s.whisker_high) };
        lo = lo.min(s_lo).min(s.mean);
        hi = hi.max(s_hi).max(s.mean);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    let pad = if span > 0.0 { span * X_PADDING } else { 1.0 };
    (lo - pad, hi + pad)
}


/// The outline of a five-pointed star with the given outer radius, centered at the origin, pointing up.
/// Coordinates are pixel offsets, so y grows downwards.
pub fn star_points(radius: i32) -> Vec<(i32, i32)> {
    let inner = radius as f64 * 0.4;
    (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { radius as f64 } else { inner };
            let angle = -PI / 2.0 + i as f64 * PI / 5.0;
            ((r * angle.cos()).round() as i32, (r * angle.sin()).round() as i32)
        })
        .collect()
}


/// The y coordinate of the box at position `idx` of `n` networks. The first network is drawn at the top.
pub fn row_of(idx: usize, n: usize) -> f64 {
    (n - 1 - idx) as f64
}


/// The tick label at y coordinate `y` for networks drawn in the order of `names`, empty between rows.
pub fn tick_label(names: &[String], y: f64) -> String {
    let n = names.len();
    let pos = y.round();
    if (y - pos).abs() > 1e-6 || pos < 0.0 || pos as usize >= n {
        String::new()
    } else {
        names[n - 1 - pos as usize].clone()
    }
}


/// Draw one horizontal box per network into a PNG file.
///
/// The networks are drawn top to bottom in the given order, so pass them sorted, see
/// [`crate::extract::sorted_by_mean`]. Each box is filled with the color of its network.
pub fn render_boxplot<P: AsRef<Path>>(networks: &[NetworkValues], style: &PlotStyle, path: P) -> Result<()> {
    let stats: Vec<BoxStats> = networks
        .iter()
        .map(|n| n.box_stats())
        .collect::<Result<Vec<BoxStats>>>()?;

    let n = networks.len();
    if n == 0 {
        return Err(YeonetsError::Plot(String::from("no networks to draw")));
    }
    let names: Vec<String> = networks.iter().map(|net| net.name.clone()).collect();

    let (x_min, x_max) = value_range(&stats, style.show_outliers);

    let (width, height) = style.figure_pixels();
    let line_px = style.px(style.line_width_pt);
    let tick_px = style.px(style.tick_pt);
    let axis_px = style.px(style.axis_label_pt);
    let longest_name = names.iter().map(|s| s.chars().count()).max().unwrap_or(0) as u32;
    debug!("Rendering {}x{} px figure for {} networks, x range [{}, {}].", width, height, n, x_min, x_max);

    let root = BitMapBackend::new(path.as_ref(), (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(style.px(18.0) as i32)
        .caption(&style.title, (FONT_FAMILY, style.px(style.title_pt) as f64))
        .x_label_area_size((tick_px * 2 + axis_px * 2) as i32)
        .y_label_area_size((longest_name * tick_px * 6 / 10 + tick_px + axis_px * 2) as i32)
        .build_cartesian_2d(x_min..x_max, -0.5..(n as f64 - 0.5))
        .map_err(plot_error)?;

    // With half a row of space at both ends, the n key points of the y axis are the rows 0..n.
    let label_for = |y: &f64| tick_label(&names, *y);

    chart
        .configure_mesh()
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .axis_desc_style((FONT_FAMILY, axis_px as f64))
        .label_style((FONT_FAMILY, tick_px as f64))
        .y_labels(n)
        .y_label_formatter(&label_for)
        .max_light_lines(0)
        .bold_line_style(RGBColor(176, 176, 176).mix(style.grid_alpha).stroke_width(style.px(0.8)))
        .axis_style(BLACK.stroke_width(style.px(0.8)))
        .draw()
        .map_err(plot_error)?;

    let half = style.box_height / 2.0;
    let cap = style.box_height / 4.0;
    let star = star_points(style.px(7.0) as i32);
    let mut star_outline = star.clone();
    star_outline.push(star[0]);

    for (idx, (net, s)) in networks.iter().zip(stats.iter()).enumerate() {
        let y = row_of(idx, n);
        let (r, g, b) = net.color;
        let edge = BLACK.stroke_width(line_px);

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(s.q1, y - half), (s.q3, y + half)],
                RGBColor(r, g, b).filled(),
            )))
            .map_err(plot_error)?;
        chart
            .draw_series(std::iter::once(Rectangle::new([(s.q1, y - half), (s.q3, y + half)], edge)))
            .map_err(plot_error)?;

        chart
            .draw_series(vec![
                PathElement::new(vec![(s.median, y - half), (s.median, y + half)], edge),
                PathElement::new(vec![(s.whisker_low, y), (s.q1, y)], edge),
                PathElement::new(vec![(s.q3, y), (s.whisker_high, y)], edge),
                PathElement::new(vec![(s.whisker_low, y - cap), (s.whisker_low, y + cap)], edge),
                PathElement::new(vec![(s.whisker_high, y - cap), (s.whisker_high, y + cap)], edge),
            ])
            .map_err(plot_error)?;

        if style.show_outliers {
            let flier_px = style.px(2.5) as i32;
            chart
                .draw_series(s.outliers.iter().map(|&v| {
                    EmptyElement::at((v, y))
                        + Polygon::new(
                            vec![(0, -flier_px), (flier_px, 0), (0, flier_px), (-flier_px, 0)],
                            RGBColor(60, 60, 60).filled(),
                        )
                }))
                .map_err(plot_error)?;
        }

        chart
            .draw_series(std::iter::once(
                EmptyElement::at((s.mean, y))
                    + Polygon::new(star.clone(), WHITE.filled())
                    + PathElement::new(star_outline.clone(), BLUE.stroke_width(style.px(1.0))),
            ))
            .map_err(plot_error)?;
    }

    root.present().map_err(plot_error)?;
    info!("Box-plot of {} networks written to '{}'.", n, path.as_ref().display());
    Ok(())
}
