//! Normalized chart model.
//!
//! A [`ChartModel`] is what a widget record holds and what the rendering
//! surface draws. It stores data as rows of `(label, value, fill, stroke)` so
//! the parallel-array invariant of the wire format (labels, data, fill
//! colors, border colors all the same length) holds by construction.
//!
//! Conversions:
//! - [`ChartModel::from_config`] normalizes a wire [`ChartConfig`]: pie
//!   configs read one flat slice list, axis configs read the shared label axis
//!   plus the first series. Missing values become `0`, missing colors cycle
//!   through a fixed palette.
//! - [`ChartModel::to_config`] produces the canonical wire form again.

#[cfg(test)]
#[path = "chart_test.rs"]
mod chart_test;

use crate::consts::{
    BORDER_DARKEN_PERCENT, DEFAULT_CHART_TITLE, DEFAULT_FONT_SIZE, DEFAULT_SERIES_NAME, FILL_PALETTE, STROKE_PALETTE,
    UNKNOWN_COLOR_FALLBACK,
};
use crate::snapshot::{ChartConfig, ChartType, ColorSpec, SeriesEntry};

/// One data row of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
    pub fill: String,
    pub stroke: String,
}

/// Normalized chart configuration held by a widget record.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub kind: ChartType,
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub font_size: u32,
    /// Legend name of the single axis series. Unused for pie charts.
    pub series_name: String,
    pub points: Vec<DataPoint>,
}

/// One row of a customization edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRow {
    pub label: String,
    pub value: f64,
    pub color: String,
}

/// Field values submitted from the chart customization panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartEdit {
    pub title: String,
    /// `None` or `0` keeps the default font size.
    pub font_size: Option<u32>,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub series_name: String,
    pub rows: Vec<EditRow>,
}

impl ChartModel {
    /// An empty chart of the given kind.
    #[must_use]
    pub fn empty(kind: ChartType) -> Self {
        Self {
            kind,
            title: String::new(),
            x_axis_label: String::new(),
            y_axis_label: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            series_name: String::new(),
            points: Vec::new(),
        }
    }

    /// Normalize a wire config into rows.
    #[must_use]
    pub fn from_config(kind: ChartType, config: &ChartConfig) -> Self {
        let (series_name, points) = if kind.is_pie() {
            (String::new(), pie_points(&config.series_data))
        } else {
            let series = config.series_data.first();
            let name = series.map(|s| s.name.clone()).unwrap_or_default();
            (name, axis_points(&config.x_axis_data, series))
        };

        Self {
            kind,
            title: config.title.clone(),
            x_axis_label: config.x_axis_label.clone(),
            y_axis_label: config.y_axis_label.clone(),
            font_size: if config.font_size == 0 { DEFAULT_FONT_SIZE } else { config.font_size },
            series_name,
            points,
        }
    }

    /// Canonical wire form of this chart.
    #[must_use]
    pub fn to_config(&self) -> ChartConfig {
        let series_data = if self.kind.is_pie() {
            self.points
                .iter()
                .map(|p| SeriesEntry {
                    name: p.label.clone(),
                    value: Some(p.value),
                    data: Vec::new(),
                    background_color: Some(ColorSpec::One(p.fill.clone())),
                    border_color: Some(ColorSpec::One(p.stroke.clone())),
                })
                .collect()
        } else {
            vec![SeriesEntry {
                name: self.series_name.clone(),
                value: None,
                data: self.points.iter().map(|p| p.value).collect(),
                background_color: Some(ColorSpec::Many(self.points.iter().map(|p| Some(p.fill.clone())).collect())),
                border_color: Some(ColorSpec::Many(self.points.iter().map(|p| Some(p.stroke.clone())).collect())),
            }]
        };

        ChartConfig {
            title: self.title.clone(),
            x_axis_label: self.x_axis_label.clone(),
            y_axis_label: self.y_axis_label.clone(),
            font_size: self.font_size,
            x_axis_data: self.points.iter().map(|p| p.label.clone()).collect(),
            series_data,
        }
    }

    /// Title as displayed; empty titles show a placeholder.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() { DEFAULT_CHART_TITLE } else { &self.title }
    }

    /// Series legend name as displayed.
    #[must_use]
    pub fn display_series_name(&self) -> &str {
        if self.series_name.trim().is_empty() { DEFAULT_SERIES_NAME } else { &self.series_name }
    }

    /// Apply a customization edit. Border colors are derived from the fill.
    pub fn apply_edit(&mut self, edit: ChartEdit) {
        self.title = edit.title;
        self.font_size = edit.font_size.filter(|s| *s > 0).unwrap_or(DEFAULT_FONT_SIZE);
        if !self.kind.is_pie() {
            self.x_axis_label = edit.x_axis_label;
            self.y_axis_label = edit.y_axis_label;
            self.series_name = edit.series_name;
        }
        self.points = edit
            .rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let fill = if row.color.trim().is_empty() { palette_fill(i).to_owned() } else { row.color };
                let stroke = darken_color(&fill, BORDER_DARKEN_PERCENT);
                let value = if row.value.is_finite() { row.value } else { 0.0 };
                DataPoint { label: row.label, value, fill, stroke }
            })
            .collect();
    }
}

fn palette_fill(index: usize) -> &'static str {
    FILL_PALETTE[index % FILL_PALETTE.len()]
}

fn palette_stroke(index: usize) -> &'static str {
    STROKE_PALETTE[index % STROKE_PALETTE.len()]
}

fn pick_color(spec: Option<&ColorSpec>, row: usize, fallback: &str) -> String {
    spec.and_then(|s| s.at(row)).unwrap_or(fallback).to_owned()
}

fn pie_points(slices: &[SeriesEntry]) -> Vec<DataPoint> {
    slices
        .iter()
        .enumerate()
        .map(|(i, slice)| DataPoint {
            label: slice.name.clone(),
            value: slice.value.unwrap_or(0.0),
            fill: pick_color(slice.background_color.as_ref(), 0, palette_fill(i)),
            stroke: pick_color(slice.border_color.as_ref(), 0, palette_stroke(i)),
        })
        .collect()
}

fn axis_points(labels: &[String], series: Option<&SeriesEntry>) -> Vec<DataPoint> {
    let data: &[f64] = series.map(|s| s.data.as_slice()).unwrap_or_default();
    let rows = labels.len().max(data.len());

    (0..rows)
        .map(|i| DataPoint {
            label: labels.get(i).cloned().unwrap_or_else(|| format!("Item {}", i + 1)),
            value: data.get(i).copied().unwrap_or(0.0),
            fill: pick_color(series.and_then(|s| s.background_color.as_ref()), i, palette_fill(i)),
            stroke: pick_color(series.and_then(|s| s.border_color.as_ref()), i, palette_stroke(i)),
        })
        .collect()
}

/// Darken a `#rrggbb`, `#rgb`, or `rgb(...)`/`rgba(...)` color by `percent`.
///
/// Returns `rgb(r, g, b)`. Unrecognized formats yield a neutral gray.
#[must_use]
pub fn darken_color(color: &str, percent: u32) -> String {
    let Some((r, g, b)) = parse_rgb(color.trim()) else {
        return UNKNOWN_COLOR_FALLBACK.to_owned();
    };
    let keep = 100 - percent.min(100);
    let scale = |c: u8| u32::from(c) * keep / 100;
    format!("rgb({}, {}, {})", scale(r), scale(g), scale(b))
}

fn parse_rgb(color: &str) -> Option<(u8, u8, u8)> {
    if let Some(hex) = color.strip_prefix('#') {
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_owned(),
            _ => return None,
        };
        let channel = |i: usize| match u8::from_str_radix(expanded.get(i..i + 2)?, 16) {
            Ok(v) => Some(v),
            Err(_) => None,
        };
        return Some((channel(0)?, channel(2)?, channel(4)?));
    }

    if color.starts_with("rgb") {
        let mut channels = color
            .split(|c: char| !c.is_ascii_digit())
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<u16>() {
                Ok(v) => u8::try_from(v.min(255)).unwrap_or(u8::MAX),
                Err(_) => u8::MAX,
            });
        return Some((channels.next()?, channels.next()?, channels.next()?));
    }

    None
}
