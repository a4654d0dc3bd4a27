// File: crates/spark-core/src/chart/discrete.rs
// Summary: Discrete chart: one short vertical tick per value, positioned by value.

use crate::chart::{numeric, BarRegionHighlighting, ChartBase, ChartRenderer, Region};
use crate::format::FieldSet;
use crate::geometry::clip;
use crate::options::{ChartKind, Options};
use crate::stats::min_max;
use crate::surface::{Shape, ShapeId, SharedSurface};
use crate::types::Value;

pub struct DiscreteChart {
    base: ChartBase,
    numbers: Vec<Option<f64>>,
    min: f64,
    max: f64,
    interval: f64,
    item_width: f64,
    line_height: f64,
    region_shapes: Vec<Vec<ShapeId>>,
}

impl DiscreteChart {
    pub fn new(values: Vec<Value>, options: Options, surface: Option<SharedSurface>) -> Self {
        let base = ChartBase::new(values, options, surface);
        let numbers = numeric(&base.values);
        let options = &base.options;
        let (mut min, mut max) = min_max(numbers.iter().flatten().copied()).unwrap_or((0.0, 0.0));
        if let Some(rmin) = options.f64("chartRangeMin") {
            if options.flag("chartRangeClip") || rmin < min {
                min = rmin;
            }
        }
        if let Some(rmax) = options.f64("chartRangeMax") {
            if options.flag("chartRangeClip") || rmax > max {
                max = rmax;
            }
        }
        let count = numbers.len().max(1) as f64;
        let line_height = options
            .f64("lineHeight")
            .unwrap_or_else(|| (base.canvas_height * 0.3).round());
        Self {
            interval: (base.canvas_width / count).floor(),
            item_width: base.canvas_width / count,
            base,
            numbers,
            min,
            max,
            line_height,
            region_shapes: Vec::new(),
        }
    }

    pub fn line_height(&self) -> f64 {
        self.line_height
    }
}

impl BarRegionHighlighting for DiscreteChart {
    fn region_count(&self) -> usize {
        self.numbers.len()
    }

    fn render_region(&self, index: usize, highlight: bool) -> Vec<Shape> {
        let Some(Some(value)) = self.numbers.get(index).copied() else {
            return Vec::new();
        };
        let options = &self.base.options;
        let range = if self.max - self.min == 0.0 { 1.0 } else { self.max - self.min };
        let plot_height = self.base.canvas_height - self.line_height;
        let val = clip(value, self.min, self.max);
        let x = index as f64 * self.interval;
        let top = (plot_height - plot_height * ((val - self.min) / range)).round();
        let threshold = options.f64_or("thresholdValue", 0.0);
        let color = match options.color("thresholdColor") {
            Some(c) if val < threshold => Some(c),
            _ => options.color("lineColor"),
        };
        let color = match color {
            Some(c) if highlight => Some(self.base.highlight_color(c)),
            other => other,
        };
        vec![Shape::line((x, top).into(), (x, top + self.line_height).into(), color, 1.0)]
    }

    fn region_shapes(&self) -> &[Vec<ShapeId>] {
        &self.region_shapes
    }

    fn region_shapes_mut(&mut self) -> &mut Vec<Vec<ShapeId>> {
        &mut self.region_shapes
    }
}

impl ChartRenderer for DiscreteChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Discrete
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
        if self.item_width <= 0.0 {
            return None;
        }
        let i = (x / self.item_width).floor();
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
        vec![FieldSet::new()
            .null(value.is_none())
            .with("value", value)
            .with("offset", i as f64)]
    }
}
