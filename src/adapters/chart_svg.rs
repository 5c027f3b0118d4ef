//! Inline SVG charts: closing price with overlays, and one panel per oscillator.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;
use chrono::{NaiveDateTime, Timelike};

const CHART_WIDTH: f64 = 800.0;
const PRICE_HEIGHT: f64 = 320.0;
const PANEL_HEIGHT: f64 = 160.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

const PRICE_COLOR: &str = "#2563eb";
const PALETTE: [&str; 4] = ["#f59e0b", "#10b981", "#8b5cf6", "#ef4444"];
const BAND_COLOR: &str = "#9ca3af";
const GUIDE_COLOR: &str = "#d1d5db";

/// Maps bar index and value onto plot coordinates.
struct Frame {
    height: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Frame {
    fn new(height: f64, count: usize, values: impl Iterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !min.is_finite() || count == 0 {
            return None;
        }
        // flat series still get a visible band
        let pad = if max > min { 0.0 } else { min.abs().max(1.0) * 0.01 };
        Some(Self {
            height,
            count,
            min: min - pad,
            max: max + pad,
        })
    }

    fn plot_width(&self) -> f64 {
        CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height(&self) -> f64 {
        self.height - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn x(&self, i: usize) -> f64 {
        MARGIN_LEFT + (i as f64 / (self.count - 1).max(1) as f64) * self.plot_width()
    }

    fn y(&self, v: f64) -> f64 {
        MARGIN_TOP + self.plot_height() - ((v - self.min) / (self.max - self.min)) * self.plot_height()
    }
}

fn fmt_timestamp(ts: NaiveDateTime) -> String {
    if ts.hour() == 0 && ts.minute() == 0 {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Path through the defined points, breaking the line at gaps.
fn path_data(frame: &Frame, points: &[Option<f64>]) -> String {
    let mut out = String::new();
    let mut pen_down = false;
    for (i, point) in points.iter().enumerate() {
        match point {
            Some(v) if v.is_finite() => {
                let cmd = if pen_down { " L" } else { " M" };
                out.push_str(&format!("{} {:.1} {:.1}", cmd, frame.x(i), frame.y(*v)));
                pen_down = true;
            }
            _ => pen_down = false,
        }
    }
    out.trim_start().to_string()
}

fn open_svg(svg: &mut String, height: f64, title: &str) {
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, height, CHART_WIDTH, height
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"15\" text-anchor=\"end\" font-size=\"12\" fill=\"#666\">{}</text>\n",
        CHART_WIDTH - MARGIN_RIGHT,
        title
    ));
}

fn draw_axes(svg: &mut String, frame: &Frame, first: NaiveDateTime, last: NaiveDateTime) {
    let bottom = frame.height - MARGIN_BOTTOM;
    svg.push_str(&format!(
        "  <line x1=\"{l}\" y1=\"{t}\" x2=\"{l}\" y2=\"{b}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        l = MARGIN_LEFT,
        t = MARGIN_TOP,
        b = bottom
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{b}\" x2=\"{}\" y2=\"{b}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        CHART_WIDTH - MARGIN_RIGHT,
        b = bottom
    ));
    for (value, y) in [
        (frame.max, MARGIN_TOP + 5.0),
        ((frame.max + frame.min) / 2.0, MARGIN_TOP + frame.plot_height() / 2.0),
        (frame.min, bottom - 5.0),
    ] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{:.2}</text>\n",
            MARGIN_LEFT - 5.0,
            y,
            value
        ));
    }
    for (x, anchor, ts) in [
        (MARGIN_LEFT, "start", first),
        (CHART_WIDTH - MARGIN_RIGHT, "end", last),
    ] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"{}\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            x,
            frame.height - 10.0,
            anchor,
            fmt_timestamp(ts)
        ));
    }
}

fn draw_line(svg: &mut String, frame: &Frame, points: &[Option<f64>], color: &str, dashed: bool) {
    let d = path_data(frame, points);
    if d.is_empty() {
        return;
    }
    let dash = if dashed { " stroke-dasharray=\"4 3\"" } else { "" };
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"{}/>\n",
        d, color, dash
    ));
}

fn draw_guide(svg: &mut String, frame: &Frame, value: f64) {
    let y = frame.y(value);
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{:.1}\" x2=\"{}\" y2=\"{:.1}\" stroke=\"{}\" stroke-dasharray=\"2 2\"/>\n",
        MARGIN_LEFT,
        y,
        CHART_WIDTH - MARGIN_RIGHT,
        y,
        GUIDE_COLOR
    ));
}

/// One component of an indicator as an optional value per bar.
fn component(series: &IndicatorSeries, name: &str) -> Vec<Option<f64>> {
    series
        .values
        .iter()
        .map(|p| {
            if !p.valid {
                return None;
            }
            p.value
                .components()
                .into_iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v)
        })
        .collect()
}

fn component_names(series: &IndicatorSeries) -> Vec<&'static str> {
    series
        .values
        .first()
        .map(|p| p.value.components().into_iter().map(|(n, _)| n).collect())
        .unwrap_or_default()
}

fn legend(svg: &mut String, entries: &[(String, &str)]) {
    let mut x = MARGIN_LEFT;
    for (label, color) in entries {
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"15\" font-size=\"11\" fill=\"{}\">{}</text>\n",
            x, color, label
        ));
        x += 12.0 + label.len() as f64 * 6.5;
    }
}

/// Closing-price line with price-scale overlays (moving averages, bands).
///
/// Returns an empty string when there is nothing to plot.
pub fn generate_price_svg(series: &PriceSeries, overlays: &[&IndicatorSeries]) -> String {
    let closes: Vec<Option<f64>> = series.closes().into_iter().map(Some).collect();
    let mut lines: Vec<(String, Vec<Option<f64>>, &str, bool)> = Vec::new();

    let mut palette = PALETTE.iter().cycle();
    for overlay in overlays.iter().filter(|s| s.indicator_type.is_price_overlay()) {
        let label = overlay.indicator_type.to_string();
        if let IndicatorType::Bollinger { .. } = overlay.indicator_type {
            lines.push((format!("{} upper", label), component(overlay, "upper"), BAND_COLOR, true));
            lines.push((format!("{} middle", label), component(overlay, "middle"), BAND_COLOR, false));
            lines.push((format!("{} lower", label), component(overlay, "lower"), BAND_COLOR, true));
        } else {
            let color = palette.next().copied().unwrap_or(PALETTE[0]);
            lines.push((label, component(overlay, "value"), color, false));
        }
    }

    let all_values = closes
        .iter()
        .chain(lines.iter().flat_map(|(_, pts, _, _)| pts.iter()))
        .flatten()
        .copied();
    let Some(frame) = Frame::new(PRICE_HEIGHT, series.bar_count(), all_values) else {
        return String::new();
    };
    let (first, last) = series.time_range();

    let mut svg = String::new();
    open_svg(&mut svg, PRICE_HEIGHT, &format!("{} Close", series.ticker()));
    draw_axes(&mut svg, &frame, first, last);
    for (_, points, color, dashed) in &lines {
        draw_line(&mut svg, &frame, points, color, *dashed);
    }
    draw_line(&mut svg, &frame, &closes, PRICE_COLOR, false);

    let mut entries = vec![("Close".to_string(), PRICE_COLOR)];
    entries.extend(
        lines
            .iter()
            .filter(|(label, ..)| !label.ends_with(" upper") && !label.ends_with(" lower"))
            .map(|(label, _, color, _)| (label.trim_end_matches(" middle").to_string(), *color)),
    );
    legend(&mut svg, &entries);
    svg.push_str("</svg>");
    svg
}

/// Reference levels drawn across an oscillator panel.
pub fn guides_for(indicator: IndicatorType, rsi_levels: (f64, f64)) -> Vec<f64> {
    match indicator {
        IndicatorType::Rsi(_) => vec![rsi_levels.0, rsi_levels.1],
        IndicatorType::Roc(_) | IndicatorType::Macd { .. } => vec![0.0],
        _ => Vec::new(),
    }
}

/// Separate panel for an indicator on its own scale, such as RSI or MACD.
pub fn generate_panel_svg(series: &IndicatorSeries, guides: &[f64]) -> String {
    if series.valid_count() == 0 {
        return String::new();
    }
    let mut palette = std::iter::once(PRICE_COLOR).chain(PALETTE.iter().copied()).cycle();
    let lines: Vec<(&str, Vec<Option<f64>>, &str)> = component_names(series)
        .into_iter()
        .map(|name| {
            let color = palette.next().unwrap_or(PRICE_COLOR);
            (name, component(series, name), color)
        })
        .collect();

    let values = lines
        .iter()
        .flat_map(|(_, pts, _)| pts.iter().flatten().copied())
        .chain(guides.iter().copied());
    let Some(frame) = Frame::new(PANEL_HEIGHT, series.values.len(), values) else {
        return String::new();
    };
    let first = series.values[0].timestamp;
    let last = series.values[series.values.len() - 1].timestamp;

    let mut svg = String::new();
    open_svg(&mut svg, PANEL_HEIGHT, &series.indicator_type.to_string());
    draw_axes(&mut svg, &frame, first, last);
    for &guide in guides {
        draw_guide(&mut svg, &frame, guide);
    }
    for (_, points, color) in &lines {
        draw_line(&mut svg, &frame, points, color, false);
    }
    if lines.len() > 1 {
        let entries: Vec<(String, &str)> =
            lines.iter().map(|(n, _, c)| (n.to_string(), *c)).collect();
        legend(&mut svg, &entries);
    }
    svg.push_str("</svg>");
    svg
}
