//! @ai:module:intent Cyclic line style, marker and color palettes for chart series
//! @ai:module:layer infrastructure
//! @ai:module:public_api Palette, SeriesStyle, LineStyle, MarkerShape
//! @ai:module:stateless true

use crate::config::ChartConfig;
use anyhow::{bail, Context, Result};
use plotters::style::RGBColor;

/// @ai:intent Stroke pattern of a line series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    DashDot,
    Dotted,
}

impl LineStyle {
    fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "solid" | "-" => LineStyle::Solid,
            "dashed" | "--" => LineStyle::Dashed,
            "dash-dot" | "-." => LineStyle::DashDot,
            "dotted" | ":" => LineStyle::Dotted,
            other => bail!("Unknown line style: {}", other),
        })
    }

    /// Dash length and gap in pixels, None for a solid stroke.
    pub fn dash(&self) -> Option<(i32, i32)> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some((10, 6)),
            LineStyle::DashDot => Some((14, 4)),
            LineStyle::Dotted => Some((2, 4)),
        }
    }
}

/// @ai:intent Point marker drawn at every data point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
    TriangleUp,
    Diamond,
    Star,
    Cross,
    Plus,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
}

impl MarkerShape {
    fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "circle" | "o" => MarkerShape::Circle,
            "square" | "s" => MarkerShape::Square,
            "triangle-up" | "^" => MarkerShape::TriangleUp,
            "diamond" | "D" => MarkerShape::Diamond,
            "star" | "*" => MarkerShape::Star,
            "cross" | "x" => MarkerShape::Cross,
            "plus" | "+" => MarkerShape::Plus,
            "triangle-down" | "v" => MarkerShape::TriangleDown,
            "triangle-left" | "<" => MarkerShape::TriangleLeft,
            "triangle-right" | ">" => MarkerShape::TriangleRight,
            other => bail!("Unknown marker: {}", other),
        })
    }

    /// @ai:intent Polygon outline in pixel offsets around the point
    /// @ai:effects pure
    pub fn outline(&self) -> Option<Vec<(i32, i32)>> {
        let shape = match self {
            MarkerShape::Square => vec![(-4, -4), (4, -4), (4, 4), (-4, 4)],
            MarkerShape::TriangleUp => vec![(0, -6), (5, 4), (-5, 4)],
            MarkerShape::TriangleDown => vec![(0, 6), (5, -4), (-5, -4)],
            MarkerShape::TriangleLeft => vec![(-6, 0), (4, -5), (4, 5)],
            MarkerShape::TriangleRight => vec![(6, 0), (-4, -5), (-4, 5)],
            MarkerShape::Diamond => vec![(0, -6), (5, 0), (0, 6), (-5, 0)],
            MarkerShape::Star => (0..10)
                .map(|i| {
                    let radius = if i % 2 == 0 { 7.0 } else { 3.0 };
                    let angle = (-90.0 + 36.0 * i as f64).to_radians();
                    (
                        (radius * angle.cos()).round() as i32,
                        (radius * angle.sin()).round() as i32,
                    )
                })
                .collect(),
            MarkerShape::Circle | MarkerShape::Cross | MarkerShape::Plus => return None,
        };
        Some(shape)
    }
}

/// @ai:intent Resolved style of one series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub line: LineStyle,
    pub marker: MarkerShape,
    pub color: RGBColor,
}

/// @ai:intent Ordered palettes, indexed cyclically by series position
#[derive(Debug, Clone)]
pub struct Palette {
    lines: Vec<LineStyle>,
    markers: Vec<MarkerShape>,
    colors: Vec<RGBColor>,
}

impl Palette {
    /// @ai:intent Build palettes from chart configuration
    /// @ai:pre every palette is non-empty
    /// @ai:effects pure
    pub fn from_config(config: &ChartConfig) -> Result<Self> {
        let lines = config
            .line_styles
            .iter()
            .map(|s| LineStyle::parse(s))
            .collect::<Result<Vec<_>>>()?;
        let markers = config
            .markers
            .iter()
            .map(|s| MarkerShape::parse(s))
            .collect::<Result<Vec<_>>>()?;
        let colors = config
            .colors
            .iter()
            .map(|s| parse_hex_color(s))
            .collect::<Result<Vec<_>>>()?;

        if lines.is_empty() || markers.is_empty() || colors.is_empty() {
            bail!("Chart palettes must not be empty");
        }

        Ok(Self {
            lines,
            markers,
            colors,
        })
    }

    /// @ai:intent Style for the series at a position
    /// @ai:effects pure
    pub fn style(&self, index: usize) -> SeriesStyle {
        SeriesStyle {
            line: self.lines[index % self.lines.len()],
            marker: self.markers[index % self.markers.len()],
            color: self.color(index),
        }
    }

    pub fn color(&self, index: usize) -> RGBColor {
        self.colors[index % self.colors.len()]
    }
}

/// @ai:intent Parse `#rrggbb`
/// @ai:effects pure
fn parse_hex_color(value: &str) -> Result<RGBColor> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        bail!("Invalid color '{}': expected #rrggbb", value);
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .with_context(|| format!("Invalid color '{}'", value))
    };
    Ok(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
