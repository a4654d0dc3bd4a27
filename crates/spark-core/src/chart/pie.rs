// File: crates/spark-core/src/chart/pie.rs
// Summary: Pie chart: one slice per positive value, optional start offset and border ring.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::chart::{cycle, numeric, ChartBase, ChartRenderer, Region};
use crate::format::FieldSet;
use crate::geometry::Point;
use crate::options::{ChartKind, Options};
use crate::surface::{Shape, ShapeId, SharedSurface};
use crate::types::Value;

pub struct PieChart {
    base: ChartBase,
    numbers: Vec<f64>,
    total: f64,
    radius: f64,
    shape_slices: HashMap<ShapeId, usize>,
    slice_shapes: HashMap<usize, ShapeId>,
}

impl PieChart {
    pub fn new(values: Vec<Value>, options: Options, surface: Option<SharedSurface>) -> Self {
        let base = ChartBase::new(values, options, surface);
        // Zero, negative and null values take no share of the pie.
        let numbers: Vec<f64> = numeric(&base.values)
            .into_iter()
            .map(|v| v.filter(|n| *n > 0.0).unwrap_or(0.0))
            .collect();
        let total = numbers.iter().sum();
        let radius = (base.canvas_width.min(base.canvas_height) / 2.0).floor();
        Self {
            base,
            numbers,
            total,
            radius,
            shape_slices: HashMap::new(),
            slice_shapes: HashMap::new(),
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Start and end angle of a slice in radians.
    pub fn slice_angles(&self, index: usize) -> Option<(f64, f64)> {
        let offset = self.base.options.f64_or("offset", 0.0);
        let mut next = if offset != 0.0 { 2.0 * PI * (offset / 360.0) } else { 0.0 };
        for (i, v) in self.numbers.iter().enumerate() {
            let start = next;
            let end = if self.total > 0.0 { next + 2.0 * PI * (v / self.total) } else { next };
            if i == index {
                return Some((start, end));
            }
            next = end;
        }
        None
    }

    fn render_slice(&self, index: usize, highlight: bool) -> Option<Shape> {
        let (start, end) = self.slice_angles(index)?;
        let colors = self.base.options.colors("sliceColors");
        let mut color = cycle(&colors, index)?;
        if highlight {
            color = self.base.highlight_color(color);
        }
        let border = self.base.options.f64_or("borderWidth", 0.0);
        let center = Point::new(self.radius, self.radius);
        Some(Shape::pie_slice(center, self.radius - border, start, end, None, Some(color)))
    }
}

impl ChartRenderer for PieChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Pie
    }

    fn base(&self) -> &ChartBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ChartBase {
        &mut self.base
    }

    fn render(&mut self) -> bool {
        if !self.base.begin_render() {
            return false;
        }
        self.shape_slices.clear();
        self.slice_shapes.clear();
        let border = self.base.options.f64_or("borderWidth", 0.0);
        if border > 0.0 {
            let ring = Shape::circle(
                Point::new(self.radius, self.radius),
                (self.radius - border / 2.0).floor(),
                self.base.options.color("borderColor"),
                None,
                border,
            );
            self.base.append(ring);
        }
        for i in (0..self.numbers.len()).rev() {
            if self.numbers[i] == 0.0 {
                continue;
            }
            if let Some(slice) = self.render_slice(i, false) {
                let id = self.base.append(slice);
                self.shape_slices.insert(id, i);
                self.slice_shapes.insert(i, id);
            }
        }
        self.base.flush();
        true
    }

    fn region_at(&self, x: f64, y: f64) -> Option<Region> {
        self.base
            .shape_at(x, y)
            .and_then(|id| self.shape_slices.get(&id).copied())
            .map(Region::Value)
    }

    fn change_highlight(&mut self, highlight: bool) {
        let Some(Region::Value(i)) = self.base.current_region else { return };
        let Some(old) = self.slice_shapes.get(&i).copied() else { return };
        let Some(slice) = self.render_slice(i, highlight) else { return };
        self.shape_slices.remove(&old);
        let id = self.base.replace(old, slice);
        self.shape_slices.insert(id, i);
        self.slice_shapes.insert(i, id);
    }

    fn current_region_fields(&self) -> Vec<FieldSet> {
        let Some(Region::Value(i)) = self.base.current_region else {
            return Vec::new();
        };
        let value = self.numbers.get(i).copied();
        let colors = self.base.options.colors("sliceColors");
        let color = cycle(&colors, i).map(|c| c.to_string()).unwrap_or_default();
        let percent = value.map(|v| if self.total > 0.0 { v / self.total * 100.0 } else { 0.0 });
        vec![FieldSet::new()
            .null(value.is_none())
            .with("value", value)
            .with("percent", percent)
            .with("color", color)
            .with("offset", i as f64)]
    }
}
