//! @ai:module:intent Render chart plans to PNG files
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChartGenerator, ChartGeneratorTrait
//! @ai:module:stateless true

use crate::config::ChartConfig;
use crate::report::plan::{BarChartPlan, ChartPlan, LineChartPlan, XAxis};
use crate::report::style::{MarkerShape, Palette};
use anyhow::Result;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// @ai:intent Trait for chart rendering
pub trait ChartGeneratorTrait: Send + Sync {
    /// @ai:intent Render every non-empty plan into the output directory
    fn generate_all(&self, plans: &[ChartPlan], output_dir: &Path) -> Result<Vec<String>>;
}

/// @ai:intent Renders line and bar charts with the configured palettes
pub struct ChartGenerator {
    palette: Palette,
    width: u32,
    height: u32,
}

/// Pad a data range so points never sit on the frame.
fn padded_range(min: f64, max: f64) -> std::ops::Range<f64> {
    let span = max - min;
    let pad = if span.abs() < f64::EPSILON {
        if min.abs() < f64::EPSILON {
            1.0
        } else {
            min.abs() * 0.1
        }
    } else {
        span * 0.08
    };
    (min - pad)..(max + pad)
}

/// Remove a half-written chart; a failure to do so is only logged.
fn discard_partial(path: &Path) {
    if !path.exists() {
        return;
    }
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!("Failed to remove partial chart {}: {}", path.display(), e);
    }
}

fn format_tick(value: f64) -> String {
    let text = format!("{:.3}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl ChartGenerator {
    /// @ai:intent Create a generator from chart configuration
    /// @ai:pre palettes contain only known style names and `#rrggbb` colors
    /// @ai:effects pure
    pub fn new(config: &ChartConfig) -> Result<Self> {
        Ok(Self {
            palette: Palette::from_config(config)?,
            width: config.width,
            height: config.height,
        })
    }

    /// @ai:intent Draw a multi-series line chart with markers and a legend
    /// @ai:effects fs:write
    fn render_line(&self, plan: &LineChartPlan, output_path: &Path) -> Result<()> {
        let root = BitMapBackend::new(output_path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let points = plan.series.iter().flat_map(|s| s.points.iter());
        let (mut x_min, mut x_max, mut y_min, mut y_max) =
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }

        let (x_range, x_label_count) = match &plan.x_axis {
            XAxis::Numeric => (padded_range(x_min, x_max), 10),
            XAxis::Categorical(labels) => (-0.5..(labels.len() as f64 - 0.5), labels.len()),
        };

        let mut chart = ChartBuilder::on(&root)
            .caption(&plan.title, ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, padded_range(y_min, y_max))?;

        let x_formatter = |x: &f64| match &plan.x_axis {
            XAxis::Numeric => format_tick(*x),
            XAxis::Categorical(labels) => {
                let nearest = x.round();
                if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
                    return String::new();
                }
                labels.get(nearest as usize).cloned().unwrap_or_default()
            }
        };

        chart
            .configure_mesh()
            .x_desc(&plan.x_label)
            .y_desc(&plan.y_label)
            .x_labels(x_label_count)
            .x_label_formatter(&x_formatter)
            .light_line_style(BLACK.mix(0.08))
            .draw()?;

        for series in &plan.series {
            let style = self.palette.style(series.style_index);
            let color = style.color;
            let line = color.stroke_width(2);
            let coords: Vec<(f64, f64)> = series.points.iter().map(|p| (p.x, p.y)).collect();

            let anno = match style.line.dash() {
                None => chart.draw_series(LineSeries::new(coords.clone(), line))?,
                Some((dash, gap)) => {
                    chart.draw_series(DashedLineSeries::new(coords.clone(), dash, gap, line))?
                }
            };
            anno.label(series.name.clone()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });

            match style.marker {
                MarkerShape::Circle => {
                    chart.draw_series(coords.iter().map(|&p| Circle::new(p, 5, color.filled())))?;
                }
                MarkerShape::Cross => {
                    chart.draw_series(coords.iter().map(|&p| Cross::new(p, 5, line)))?;
                }
                MarkerShape::Plus => {
                    chart.draw_series(coords.iter().map(|&p| {
                        EmptyElement::at(p)
                            + PathElement::new(vec![(-6, 0), (6, 0)], line)
                            + PathElement::new(vec![(0, -6), (0, 6)], line)
                    }))?;
                }
                shape => {
                    let outline = shape.outline().unwrap_or_default();
                    chart.draw_series(coords.iter().map(|&p| {
                        EmptyElement::at(p) + Polygon::new(outline.clone(), color.filled())
                    }))?;
                }
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    /// @ai:intent Draw one bar per router with its value printed on top
    /// @ai:effects fs:write
    fn render_bar(&self, plan: &BarChartPlan, output_path: &Path) -> Result<()> {
        let root = BitMapBackend::new(output_path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let low = plan.bars.iter().map(|b| b.value).fold(0.0_f64, f64::min);
        let high = plan.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
        let headroom = if (high - low).abs() < f64::EPSILON {
            1.0
        } else {
            (high - low) * 0.15
        };
        let y_start = if low < 0.0 { low - headroom } else { 0.0 };
        let y_range = y_start..(high + headroom);

        let mut chart = ChartBuilder::on(&root)
            .caption(&plan.title, ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d((0..plan.bars.len() as i32).into_segmented(), y_range)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Router")
            .y_desc(&plan.y_label)
            .x_label_formatter(&|x: &SegmentValue<i32>| match x {
                SegmentValue::CenterOf(i) => plan
                    .bars
                    .get(*i as usize)
                    .map(|b| b.name.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(plan.bars.iter().enumerate().map(|(i, bar)| {
            let color = self.palette.color(bar.color_index);
            let mut rect = Rectangle::new(
                [
                    (SegmentValue::Exact(i as i32), 0.0),
                    (SegmentValue::Exact(i as i32 + 1), bar.value),
                ],
                color.mix(0.85).filled(),
            );
            rect.set_margin(0, 0, 12, 12);
            rect
        }))?;

        let label_style = TextStyle::from(("sans-serif", 14).into_font())
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart.draw_series(plan.bars.iter().enumerate().map(|(i, bar)| {
            Text::new(
                format!("{:.4}", bar.value),
                (SegmentValue::CenterOf(i as i32), bar.value),
                label_style.clone(),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    fn render(&self, plan: &ChartPlan, output_path: &Path) -> Result<()> {
        match plan {
            ChartPlan::Line(line) => self.render_line(line, output_path),
            ChartPlan::Bar(bar) => self.render_bar(bar, output_path),
        }
    }
}

impl ChartGeneratorTrait for ChartGenerator {
    /// @ai:intent Render each plan, skipping empty ones and charts that fail
    /// @ai:effects fs:write
    fn generate_all(&self, plans: &[ChartPlan], output_dir: &Path) -> Result<Vec<String>> {
        std::fs::create_dir_all(output_dir)?;

        let mut generated = Vec::new();

        for plan in plans {
            if plan.point_count() == 0 {
                tracing::debug!("Skipping {}: no data points", plan.file_name());
                continue;
            }

            let path = output_dir.join(plan.file_name());
            match self.render(plan, &path) {
                Ok(()) => {
                    tracing::debug!("Wrote {}", path.display());
                    generated.push(plan.file_name().to_string());
                }
                Err(e) => {
                    tracing::warn!("Failed to render {}: {}", plan.file_name(), e);
                    discard_partial(&path);
                }
            }
        }

        tracing::info!("Generated {} chart(s) in {}", generated.len(), output_dir.display());
        Ok(generated)
    }
}
