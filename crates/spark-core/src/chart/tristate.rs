// File: crates/spark-core/src/chart/tristate.rs
// Summary: Win/loss/draw chart: half-height bars above or below the middle line.

use crate::chart::bar::ColorMap;
use crate::chart::{numeric, BarRegionHighlighting, ChartBase, ChartRenderer, Region};
use crate::color::Color;
use crate::format::FieldSet;
use crate::options::{ChartKind, Options};
use crate::surface::{Shape, ShapeId, SharedSurface};
use crate::types::Value;

pub struct TristateChart {
    base: ChartBase,
    numbers: Vec<Option<f64>>,
    bar_width: f64,
    total_bar_width: f64,
    colors: ColorMap,
    region_shapes: Vec<Vec<ShapeId>>,
}

impl TristateChart {
    pub fn new(values: Vec<Value>, options: Options, surface: Option<SharedSurface>) -> Self {
        let base = ChartBase::new(values, options, surface);
        let bar_width = base.options.f64_or("barWidth", 4.0).trunc();
        let bar_spacing = base.options.f64_or("barSpacing", 1.0).trunc();
        let colors = ColorMap::from_options(&base.options);
        let numbers = numeric(&base.values);
        Self {
            base,
            numbers,
            bar_width,
            total_bar_width: bar_width + bar_spacing,
            colors,
            region_shapes: Vec::new(),
        }
    }

    fn calc_color(&self, value: f64, index: usize) -> Option<Color> {
        let options = &self.base.options;
        self.colors
            .index(index)
            .or_else(|| self.colors.value(value))
            .or_else(|| {
                if value < 0.0 {
                    options.color("negBarColor")
                } else if value > 0.0 {
                    options.color("posBarColor")
                } else {
                    options.color("zeroBarColor")
                }
            })
    }
}

impl BarRegionHighlighting for TristateChart {
    fn region_count(&self) -> usize {
        self.numbers.len()
    }

    fn render_region(&self, index: usize, highlight: bool) -> Vec<Shape> {
        let Some(Some(value)) = self.numbers.get(index).copied() else {
            return Vec::new();
        };
        let half = (self.base.canvas_height / 2.0).round();
        let x = index as f64 * self.total_bar_width;
        let (y, height) = if value < 0.0 {
            (half, half - 1.0)
        } else if value > 0.0 {
            (0.0, half - 1.0)
        } else {
            (half - 1.0, 2.0)
        };
        let Some(mut color) = self.calc_color(value, index) else {
            return Vec::new();
        };
        if highlight {
            color = self.base.highlight_color(color);
        }
        vec![Shape::rect(x, y, self.bar_width - 1.0, height - 1.0, Some(color), Some(color))]
    }

    fn region_shapes(&self) -> &[Vec<ShapeId>] {
        &self.region_shapes
    }

    fn region_shapes_mut(&mut self) -> &mut Vec<Vec<ShapeId>> {
        &mut self.region_shapes
    }
}

impl ChartRenderer for TristateChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Tristate
    }

    fn base(&self) -> &ChartBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ChartBase {
        &mut self.base
    }

    fn render(&mut self) -> bool {
        self.render_regions()
    }

    fn region_at(&self, x: f64, _y: f64) -> Option<Region> {
        let i = (x / self.total_bar_width).floor();
        (i >= 0.0 && (i as usize) < self.numbers.len()).then_some(Region::Value(i as usize))
    }

    fn change_highlight(&mut self, highlight: bool) {
        self.highlight_region(highlight);
    }

    fn current_region_fields(&self) -> Vec<FieldSet> {
        let Some(Region::Value(i)) = self.base.current_region else {
            return Vec::new();
        };
        let value = self.numbers.get(i).copied().flatten();
        let color = value
            .and_then(|v| self.calc_color(v, i))
            .map(|c| c.to_string())
            .unwrap_or_default();
        vec![FieldSet::new()
            .null(value.is_none())
            .with("value", value)
            .with("color", color)
            .with("offset", i as f64)]
    }
}
