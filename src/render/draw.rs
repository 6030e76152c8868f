use std::f64::consts::FRAC_1_SQRT_2;

use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::text_anchor::{HPos, VPos};

use super::glyphs::{self, GLYPH_HEIGHT};
use super::{HEIGHT, WIDTH};
use crate::chart::math::HistogramBin;
use crate::chart::{ChartData, ChartSpec};
use crate::color::{
    coolwarm, text_on, BAR_FILL, GRID, HISTOGRAM_FILL, SCATTER_MARKER, UNDEFINED_CELL,
};
use crate::error::RenderError;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const TITLE_FONT: (&str, u32) = ("sans-serif", 28);
const LABEL_FONT: (&str, u32) = ("sans-serif", 15);
const DESC_FONT: (&str, u32) = ("sans-serif", 18);
/// Glyph scale matching `LABEL_FONT` for labels drawn outside plotters' mesh.
const LABEL_SCALE: i32 = 2;

const MARGIN: u32 = 20;
const X_LABEL_AREA: u32 = 60;
const Y_LABEL_AREA: u32 = 80;
/// Room below rotated labels for the axis description.
const DESC_ROOM: u32 = 34;
const TICK_GAP: i32 = 6;
/// Rotated labels may claim at most this share of the canvas height.
const MAX_LABEL_AREA: f64 = 0.4;
const COLORBAR_AREA: u32 = 120;

/// Fill `root` with the chart described by `spec`.
pub(super) fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
) -> Result<(), RenderError> {
    root.fill(&WHITE)?;
    match &spec.data {
        ChartData::Histogram { bins } => histogram(root, spec, bins)?,
        ChartData::Scatter { points } => scatter(root, spec, points)?,
        ChartData::Bar { categories } => bar(root, spec, categories)?,
        ChartData::Correlation { columns, matrix } => heatmap(root, spec, columns, matrix)?,
    }
    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Histogram / scatter
// ---------------------------------------------------------------------------

fn histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    bins: &[HistogramBin],
) -> Result<(), RenderError> {
    let (x0, x1) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.lower, last.upper),
        _ => (0.0, 1.0),
    };
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64 * 1.05;

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, TITLE_FONT)
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x0..x1, 0f64..y_max)?;
    draw_mesh(&mut chart, spec, true)?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new(
            [(b.lower, 0.0), (b.upper, b.count as f64)],
            HISTOGRAM_FILL.mix(0.7).filled(),
        )
    }))?;
    chart.draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
        Rectangle::new(
            [(b.lower, 0.0), (b.upper, b.count as f64)],
            BLACK.stroke_width(1),
        )
    }))?;
    Ok(())
}

fn scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    points: &[(f64, f64)],
) -> Result<(), RenderError> {
    let finite: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let (x0, x1) = padded_range(finite.iter().map(|p| p.0));
    let (y0, y1) = padded_range(finite.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, TITLE_FONT)
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x0..x1, y0..y1)?;
    draw_mesh(&mut chart, spec, true)?;

    chart.draw_series(
        finite
            .iter()
            .map(|&p| Circle::new(p, 4, SCATTER_MARKER.mix(0.6).filled())),
    )?;
    Ok(())
}

/// Data range padded by 5% on each side; `0..1` when there is no data.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo > hi {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

// ---------------------------------------------------------------------------
// Bar
// ---------------------------------------------------------------------------

fn bar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    categories: &[(String, usize)],
) -> Result<(), RenderError> {
    let n = categories.len();
    let labels: Vec<String> = categories.iter().map(|(label, _)| label.clone()).collect();
    let plot_width = WIDTH - 2 * MARGIN - Y_LABEL_AREA;
    let layout = CategoryLabels::fit(&labels, plot_width / n.max(1) as u32);

    let y_max = categories.iter().map(|c| c.1).max().unwrap_or(0).max(1) as f64 * 1.05;
    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, TITLE_FONT)
        .margin(MARGIN)
        .x_label_area_size(layout.area)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(-0.5..(n.max(1) as f64 - 0.5), 0f64..y_max)?;
    draw_mesh(&mut chart, spec, false)?;

    chart.draw_series(categories.iter().enumerate().map(|(i, (_, count))| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *count as f64)], BAR_FILL.filled())
    }))?;

    let ticks: Vec<(i32, i32)> = (0..n)
        .map(|i| chart.backend_coord(&(i as f64, 0.0)))
        .collect();
    layout.draw(root, &ticks)
}

/// Category labels under a row of slots, rotated when any would overflow
/// its slot.
struct CategoryLabels {
    texts: Vec<String>,
    rotated: bool,
    /// Height of the x label area needed to show them.
    area: u32,
}

impl CategoryLabels {
    fn fit(labels: &[String], slot_width: u32) -> Self {
        let text_height = (GLYPH_HEIGHT * LABEL_SCALE) as u32;
        let widest = |texts: &[String]| {
            texts
                .iter()
                .map(|t| glyphs::text_size(t, LABEL_SCALE).0)
                .max()
                .unwrap_or(0)
        };

        if widest(labels) + 4 <= slot_width {
            return CategoryLabels {
                texts: labels.to_vec(),
                rotated: false,
                area: X_LABEL_AREA,
            };
        }

        // A 45 degree label of width w and height h drops (w + h) / sqrt(2).
        let max_area = (f64::from(HEIGHT) * MAX_LABEL_AREA) as u32;
        let room = max_area - DESC_ROOM - TICK_GAP as u32;
        let max_text = ((f64::from(room) / FRAC_1_SQRT_2) as u32).saturating_sub(text_height);
        let texts: Vec<String> = labels
            .iter()
            .map(|l| glyphs::ellipsize(l, LABEL_SCALE, max_text))
            .collect();
        let drop = (f64::from(widest(&texts) + text_height) * FRAC_1_SQRT_2).ceil() as u32;

        CategoryLabels {
            texts,
            rotated: true,
            area: (drop + DESC_ROOM + TICK_GAP as u32).max(X_LABEL_AREA),
        }
    }

    /// Draw each label below its tick (pixel coordinates on `root`).
    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        ticks: &[(i32, i32)],
    ) -> Result<(), RenderError> {
        let (angle, anchor) = if self.rotated {
            (45.0, (HPos::Right, VPos::Top))
        } else {
            (0.0, (HPos::Center, VPos::Top))
        };
        for (text, &(x, y)) in self.texts.iter().zip(ticks) {
            draw_label(root, text, (x, y + TICK_GAP), LABEL_SCALE, angle, anchor, &BLACK)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    columns: &[String],
    matrix: &[Vec<Option<f64>>],
) -> Result<(), RenderError> {
    let n = columns.len().max(1);
    let row_label_width = columns
        .iter()
        .map(|c| glyphs::text_size(c, LABEL_SCALE).0)
        .max()
        .unwrap_or(0)
        .min(WIDTH / 4);
    let row_labels: Vec<String> = columns
        .iter()
        .map(|c| glyphs::ellipsize(c, LABEL_SCALE, row_label_width))
        .collect();
    let y_area = row_label_width + 2 * TICK_GAP as u32;
    let plot_width = WIDTH - 2 * MARGIN - COLORBAR_AREA - y_area;
    let layout = CategoryLabels::fit(columns, plot_width / n as u32);

    let chart = ChartBuilder::on(root)
        .caption(&spec.title, TITLE_FONT)
        .margin(MARGIN)
        .margin_right(MARGIN + COLORBAR_AREA)
        .x_label_area_size(layout.area)
        .y_label_area_size(y_area)
        .build_cartesian_2d(0f64..n as f64, 0f64..n as f64)?;

    let origin = chart.backend_coord(&(0.0, 0.0));
    let unit = chart.backend_coord(&(1.0, 1.0));
    let cell_width = (unit.0 - origin.0).max(1) as u32;

    for (i, row) in matrix.iter().enumerate() {
        // row 0 at the top
        let y = (n - 1 - i) as f64;
        for (j, value) in row.iter().enumerate() {
            let x = j as f64;
            let fill = value.map(coolwarm).unwrap_or(UNDEFINED_CELL);
            root.draw(&Rectangle::new(
                [
                    chart.backend_coord(&(x, y + 1.0)),
                    chart.backend_coord(&(x + 1.0, y)),
                ],
                fill.filled(),
            ))?;

            let text = value.map_or_else(|| "nan".to_string(), |v| format!("{v:.2}"));
            let scale = if glyphs::text_size(&text, 2).0 + 4 <= cell_width { 2 } else { 1 };
            let center = chart.backend_coord(&(x + 0.5, y + 0.5));
            draw_label(
                root,
                &text,
                center,
                scale,
                0.0,
                (HPos::Center, VPos::Center),
                &text_on(fill),
            )?;
        }
    }

    for (i, label) in row_labels.iter().enumerate() {
        let (x, y) = chart.backend_coord(&(0.0, (n - 1 - i) as f64 + 0.5));
        draw_label(
            root,
            label,
            (x - TICK_GAP, y),
            LABEL_SCALE,
            0.0,
            (HPos::Right, VPos::Center),
            &BLACK,
        )?;
    }

    let ticks: Vec<(i32, i32)> = (0..columns.len())
        .map(|j| chart.backend_coord(&(j as f64 + 0.5, 0.0)))
        .collect();
    layout.draw(root, &ticks)?;

    let top = chart.backend_coord(&(0.0, n as f64)).1;
    let bottom = origin.1;
    colorbar(root, (WIDTH - COLORBAR_AREA) as i32, top, bottom)
}

/// Vertical [-1, 1] colour scale with tick labels.
fn colorbar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    left: i32,
    top: i32,
    bottom: i32,
) -> Result<(), RenderError> {
    const BAR_WIDTH: i32 = 20;
    let span = (bottom - top).max(1);

    for y in top..bottom {
        let value = 1.0 - 2.0 * f64::from(y - top) / f64::from(span);
        root.draw(&Rectangle::new(
            [(left, y), (left + BAR_WIDTH, y + 1)],
            coolwarm(value).filled(),
        ))?;
    }
    root.draw(&Rectangle::new(
        [(left, top), (left + BAR_WIDTH, bottom)],
        BLACK.stroke_width(1),
    ))?;

    for tick in [-1.0, -0.5, 0.0, 0.5, 1.0] {
        let y = top + ((1.0 - tick) / 2.0 * f64::from(span)).round() as i32;
        root.draw(&PathElement::new(
            vec![(left + BAR_WIDTH, y), (left + BAR_WIDTH + 4, y)],
            BLACK,
        ))?;
        draw_label(
            root,
            &format!("{tick:.1}"),
            (left + BAR_WIDTH + 8, y),
            LABEL_SCALE,
            0.0,
            (HPos::Left, VPos::Center),
            &BLACK,
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn draw_mesh<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    spec: &ChartSpec,
    x_ticks: bool,
) -> Result<(), RenderError> {
    let mut mesh = chart.configure_mesh();
    mesh.x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .label_style(LABEL_FONT)
        .axis_desc_style(DESC_FONT)
        .light_line_style(GRID)
        .y_label_formatter(&tick_label);
    if x_ticks {
        mesh.x_label_formatter(&tick_label);
    } else {
        mesh.disable_x_mesh().x_label_formatter(&blank_label);
    }
    mesh.draw()?;
    Ok(())
}

/// Rasterise `text` straight onto `root` at pixel position `pos`.
fn draw_label<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    text: &str,
    pos: (i32, i32),
    scale: i32,
    angle: f64,
    (h, v): (HPos, VPos),
    color: &RGBColor,
) -> Result<(), RenderError> {
    for (dx, dy) in glyphs::rasterize(text, scale, angle, h, v) {
        root.draw_pixel((pos.0 + dx, pos.1 + dy), color)?;
    }
    Ok(())
}

/// Compact axis tick text: at most two decimals, scientific outside
/// [1e-3, 1e5).
fn tick_label(value: &f64) -> String {
    let v = *value;
    if v == 0.0 {
        return "0".to_string();
    }
    let magnitude = v.abs();
    if !(1e-3..1e5).contains(&magnitude) {
        return format!("{v:.1e}");
    }
    let fixed = format!("{v:.2}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn blank_label(_: &f64) -> String {
    String::new()
}
