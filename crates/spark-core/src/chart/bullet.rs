// File: crates/spark-core/src/chart/bullet.rs
// Summary: Bullet graph: qualitative range bands, a performance bar and a target marker.

use std::collections::HashMap;

use crate::chart::{cycle, numeric, ChartBase, ChartRenderer, Region};
use crate::format::FieldSet;
use crate::options::{ChartKind, Options};
use crate::stats::min_max;
use crate::surface::{Shape, ShapeId, SharedSurface};
use crate::types::Value;

/// Values are `[target, performance, range1, range2, ...]`.
pub struct BulletChart {
    base: ChartBase,
    numbers: Vec<Option<f64>>,
    min: f64,
    max: f64,
    range: f64,
    shape_regions: HashMap<ShapeId, Region>,
    region_shapes: HashMap<Region, ShapeId>,
}

impl BulletChart {
    pub fn new(values: Vec<Value>, options: Options, surface: Option<SharedSurface>) -> Self {
        let mut base = ChartBase::new(values, options, surface);
        let numbers = numeric(&base.values);
        let (min, max) = bullet_bounds(&numbers, base.options.f64("base"));
        if numbers.is_empty() {
            base.disabled = true;
        }
        Self {
            base,
            numbers,
            min,
            max,
            range: max - min,
            shape_regions: HashMap::new(),
            region_shapes: HashMap::new(),
        }
    }

    /// Scale minimum (the fixed base, else `min(0, data min)`) and maximum.
    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    fn scaled(&self, v: f64) -> f64 {
        if self.range == 0.0 { 0.0 } else { self.base.canvas_width * ((v - self.min) / self.range) }
    }

    fn render_range(&self, index: usize, highlight: bool) -> Option<Shape> {
        let value = self.numbers.get(index).copied().flatten()?;
        let width = self.scaled(value).round();
        let colors = self.base.options.colors("rangeColors");
        let mut color = cycle(&colors, index.saturating_sub(2))?;
        if highlight {
            color = self.base.highlight_color(color);
        }
        Some(Shape::rect(0.0, 0.0, width - 1.0, self.base.canvas_height - 1.0, Some(color), Some(color)))
    }

    fn render_performance(&self, highlight: bool) -> Option<Shape> {
        let value = self.numbers.get(1).copied().flatten()?;
        let width = self.scaled(value).round();
        let mut color = self.base.options.color("performanceColor")?;
        if highlight {
            color = self.base.highlight_color(color);
        }
        let h = self.base.canvas_height;
        Some(Shape::rect(0.0, (h * 0.3).round(), width - 1.0, (h * 0.4).round() - 1.0, Some(color), Some(color)))
    }

    fn render_target(&self, highlight: bool) -> Option<Shape> {
        let value = self.numbers.first().copied().flatten()?;
        let target_width = self.base.options.f64_or("targetWidth", 3.0);
        let x = (self.scaled(value) - target_width / 2.0).round();
        let h = self.base.canvas_height;
        let top = (h * 0.1).round();
        let mut color = self.base.options.color("targetColor")?;
        if highlight {
            color = self.base.highlight_color(color);
        }
        Some(Shape::rect(x, top, target_width - 1.0, h - top * 2.0 - 1.0, Some(color), Some(color)))
    }

    fn render_for(&self, region: Region, highlight: bool) -> Option<Shape> {
        match region {
            Region::Range(i) => self.render_range(i, highlight),
            Region::Performance => self.render_performance(highlight),
            Region::Target => self.render_target(highlight),
            _ => None,
        }
    }

    fn track(&mut self, region: Region, id: ShapeId) {
        self.shape_regions.insert(id, region);
        self.region_shapes.insert(region, id);
    }
}

/// Scale bounds for bullet values. A null target or performance counts as the first range.
pub fn bullet_bounds(numbers: &[Option<f64>], base: Option<f64>) -> (f64, f64) {
    let mut vals = numbers.to_vec();
    let first_range = vals.get(2).copied().flatten();
    for slot in vals.iter_mut().take(2) {
        if slot.is_none() {
            *slot = first_range;
        }
    }
    let (data_min, max) = min_max(vals.into_iter().flatten()).unwrap_or((0.0, 0.0));
    let min = match base {
        Some(b) => b,
        None => data_min.min(0.0),
    };
    (min, max)
}

fn field_key(region: Region) -> (&'static str, String) {
    match region {
        Region::Range(i) => ("r", format!("r{i}")),
        Region::Performance => ("p", "p1".to_string()),
        Region::Target => ("t", "t0".to_string()),
        Region::Value(i) => ("v", format!("v{i}")),
        Region::Summary => ("s", "s".to_string()),
    }
}

impl ChartRenderer for BulletChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Bullet
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
        self.shape_regions.clear();
        self.region_shapes.clear();
        // Widest band first so each narrower band paints on top of it.
        let mut ranges: Vec<(usize, f64)> = (2..self.numbers.len())
            .filter_map(|i| self.numbers[i].map(|v| (i, self.scaled(v))))
            .collect();
        ranges.sort_by(|a, b| b.1.total_cmp(&a.1));
        let mut regions: Vec<Region> = ranges.into_iter().map(|(i, _)| Region::Range(i)).collect();
        regions.push(Region::Performance);
        regions.push(Region::Target);
        for region in regions {
            if let Some(shape) = self.render_for(region, false) {
                let id = self.base.append(shape);
                self.track(region, id);
            }
        }
        self.base.flush();
        true
    }

    fn region_at(&self, x: f64, y: f64) -> Option<Region> {
        self.base.shape_at(x, y).and_then(|id| self.shape_regions.get(&id).copied())
    }

    fn change_highlight(&mut self, highlight: bool) {
        let Some(region) = self.base.current_region else { return };
        let Some(old) = self.region_shapes.get(&region).copied() else { return };
        let Some(shape) = self.render_for(region, highlight) else { return };
        self.shape_regions.remove(&old);
        let id = self.base.replace(old, shape);
        self.track(region, id);
    }

    fn current_region_fields(&self) -> Vec<FieldSet> {
        let Some(region) = self.base.current_region else {
            return Vec::new();
        };
        let (key, name) = field_key(region);
        let index = match region {
            Region::Range(i) => i,
            Region::Performance => 1,
            _ => 0,
        };
        vec![FieldSet::new()
            .with("fieldkey", key)
            .with("value", self.numbers.get(index).copied().flatten())
            .with("region", name)]
    }
}
