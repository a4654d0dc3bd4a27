// File: crates/spark-core/src/chart/bar.rs
// Summary: Vertical bar chart with optional stacking, range clipping and colour maps.

use crate::chart::{cycle, BarRegionHighlighting, ChartBase, ChartRenderer, Region};
use crate::color::Color;
use crate::format::FieldSet;
use crate::geometry::clip;
use crate::options::{ChartKind, OptionValue, Options};
use crate::range_map::RangeMap;
use crate::stats::{all, min_max};
use crate::surface::{Shape, ShapeId, SharedSurface};
use crate::types::{normalize_value, Value};

/// Colour overrides from the `colorMap` option: a list by offset or a value table.
#[derive(Clone, Debug, Default)]
pub(crate) struct ColorMap {
    pub by_index: Option<Vec<Option<Color>>>,
    pub by_value: Option<RangeMap<Color>>,
}

impl ColorMap {
    pub fn from_options(options: &Options) -> Self {
        match options.get("colorMap") {
            Some(OptionValue::List(items)) => Self {
                by_index: Some(items.iter().map(OptionValue::as_color).collect()),
                by_value: None,
            },
            Some(map @ OptionValue::Map(_)) => Self { by_index: None, by_value: map.to_color_map() },
            _ => Self::default(),
        }
    }

    pub fn index(&self, i: usize) -> Option<Color> {
        self.by_index.as_ref().and_then(|list| list.get(i).copied().flatten())
    }

    pub fn value(&self, v: f64) -> Option<Color> {
        self.by_value.as_ref().and_then(|m| m.get(v).copied())
    }
}

/// Width in pixels of `count` bars.
pub fn bar_chart_width(count: usize, bar_width: f64, bar_spacing: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    count as f64 * bar_width + (count as f64 - 1.0) * bar_spacing
}

/// A value is a stack when it is a list or a `a:b:c` token.
pub(crate) fn stack_of(value: &Value) -> Option<Vec<Option<f64>>> {
    match value {
        Value::List(items) => Some(items.iter().map(Value::as_f64).collect()),
        Value::Text(s) if s.contains(':') => Some(s.split(':').map(|t| normalize_value(t).as_f64()).collect()),
        _ => None,
    }
}

pub fn is_stacked(values: &[Value]) -> bool {
    values.iter().any(|v| stack_of(v).is_some())
}

pub struct BarChart {
    base: ChartBase,
    stacks: Vec<Vec<Option<f64>>>,
    stacked: bool,
    bar_width: f64,
    total_bar_width: f64,
    x_axis_offset: f64,
    range: f64,
    canvas_height_ef: f64,
    y_offset: f64,
    colors: ColorMap,
    region_shapes: Vec<Vec<ShapeId>>,
}

impl BarChart {
    pub fn new(values: Vec<Value>, options: Options, surface: Option<SharedSurface>) -> Self {
        let base = ChartBase::new(values, options, surface);
        let options = &base.options;
        let bar_width = options.f64_or("barWidth", 4.0).trunc();
        let bar_spacing = options.f64_or("barSpacing", 1.0).trunc();
        let range_min = options.f64("chartRangeMin");
        let range_max = options.f64("chartRangeMax");
        let clip_range = options.flag("chartRangeClip");
        let (clip_min, clip_max) = (range_min.unwrap_or(f64::NEG_INFINITY), range_max.unwrap_or(f64::INFINITY));
        let clamp = |v: Option<f64>| match v {
            Some(v) if clip_range => Some(clip(v, clip_min, clip_max)),
            other => other,
        };

        let stacked = is_stacked(&base.values);
        let stacks: Vec<Vec<Option<f64>>> = base
            .values
            .iter()
            .map(|v| match stack_of(v) {
                Some(stack) => stack.into_iter().map(clamp).collect(),
                None => vec![clamp(v.as_f64())],
            })
            .collect();

        let (data_min, data_max) = min_max(stacks.iter().flatten().flatten().copied()).unwrap_or((0.0, 0.0));
        let mut stack_totals = Vec::with_capacity(stacks.len());
        let mut stack_ranges = Vec::with_capacity(stacks.len());
        let mut stack_ranges_neg = Vec::with_capacity(stacks.len());
        for stack in &stacks {
            let (mut total, mut pos, mut neg) = (0.0, 0.0, 0.0);
            for v in stack.iter().flatten() {
                if *v > 0.0 {
                    total += v;
                }
                if data_min < 0.0 && data_max > 0.0 {
                    if *v < 0.0 { neg += v.abs() } else { pos += v }
                } else {
                    pos += (v - if *v < 0.0 { data_max } else { data_min }).abs();
                }
            }
            stack_totals.push(total);
            stack_ranges.push(pos);
            stack_ranges_neg.push(neg);
        }

        let stack_max = if stacked {
            stack_totals.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        } else {
            data_max
        };
        let mut min = data_min;
        let mut max = data_max;
        if let Some(rmin) = range_min {
            if clip_range || rmin < min {
                min = rmin;
            }
        }
        if let Some(rmax) = range_max {
            if clip_range || rmax > max {
                max = rmax;
            }
        }

        let zero_axis = options.flag("zeroAxis");
        let x_axis_offset = if min <= 0.0 && max >= 0.0 && zero_axis {
            0.0
        } else if !zero_axis || min > 0.0 {
            min
        } else {
            max
        };

        let range = if stacked {
            let top = |r: &[f64]| r.iter().copied().fold(0.0, f64::max);
            top(&stack_ranges) + top(&stack_ranges_neg)
        } else {
            max - min
        };

        let canvas_height = base.canvas_height;
        let mut canvas_height_ef = if zero_axis && min < 0.0 { canvas_height - 2.0 } else { canvas_height - 1.0 };
        let y_offset = if min < x_axis_offset {
            let y_max = if stacked && max >= 0.0 { stack_max } else { max };
            let y = (y_max - x_axis_offset) / range * canvas_height;
            if y != y.ceil() {
                canvas_height_ef -= 2.0;
                y.ceil()
            } else {
                y
            }
        } else {
            canvas_height
        };

        let colors = ColorMap::from_options(options);
        log::debug!(
            "bar chart: {} values, stacked={stacked}, axis={x_axis_offset}, range={range}",
            stacks.len()
        );
        Self {
            base,
            stacks,
            stacked,
            bar_width,
            total_bar_width: bar_width + bar_spacing,
            x_axis_offset,
            range,
            canvas_height_ef,
            y_offset,
            colors,
            region_shapes: Vec::new(),
        }
    }

    pub fn is_stacked(&self) -> bool {
        self.stacked
    }

    pub fn x_axis_offset(&self) -> f64 {
        self.x_axis_offset
    }

    /// Shape ids drawn for each value, by offset.
    pub fn shapes_by_region(&self) -> &[Vec<ShapeId>] {
        &self.region_shapes
    }

    fn calc_color(&self, stack_num: usize, value: Option<f64>, value_num: usize) -> Option<Color> {
        let options = &self.base.options;
        let mut palette = if self.stacked {
            options.colors("stackedBarColor")
        } else if value.is_some_and(|v| v < 0.0) {
            options.colors("negBarColor")
        } else {
            options.colors("barColor")
        };
        if value == Some(0.0) {
            if let Some(zero) = options.color("zeroColor") {
                palette = vec![zero];
            }
        }
        if let Some(mapped) = value.and_then(|v| self.colors.value(v)) {
            palette = vec![mapped];
        } else if let Some(indexed) = self.colors.index(value_num) {
            palette = vec![indexed];
        }
        cycle(&palette, stack_num)
    }
}

impl BarRegionHighlighting for BarChart {
    fn region_count(&self) -> usize {
        self.stacks.len()
    }

    fn render_region(&self, index: usize, highlight: bool) -> Vec<Shape> {
        let Some(vals) = self.stacks.get(index) else {
            return Vec::new();
        };
        let options = &self.base.options;
        let x = index as f64 * self.total_bar_width;
        let axis = self.x_axis_offset;
        let mut y_offset = self.y_offset;

        if all(&None, vals, false) {
            let Some(null_color) = options.color("nullColor") else {
                return Vec::new();
            };
            let color = if highlight { self.base.highlight_color(null_color) } else { null_color };
            let y = if y_offset > 0.0 { y_offset - 1.0 } else { y_offset };
            return vec![Shape::rect(x, y, self.bar_width - 1.0, 0.0, Some(color), Some(color))];
        }

        let all_min = all(&Some(axis), vals, true);
        let mut min_plotted = false;
        let mut y_offset_neg = y_offset;
        let mut shapes = Vec::with_capacity(vals.len());
        for (i, val) in vals.iter().enumerate() {
            let Some(val) = *val else { continue };
            if self.stacked && val == axis {
                if !all_min || min_plotted {
                    continue;
                }
                min_plotted = true;
            }
            let height = if self.range > 0.0 {
                (self.canvas_height_ef * ((val - axis).abs() / self.range)).floor() + 1.0
            } else {
                1.0
            };
            let y = if val < axis || (val == axis && y_offset == 0.0) {
                let y = y_offset_neg;
                y_offset_neg += height;
                y
            } else {
                y_offset -= height;
                y_offset
            };
            let Some(mut color) = self.calc_color(i, Some(val), index) else { continue };
            if highlight {
                color = self.base.highlight_color(color);
            }
            shapes.push(Shape::rect(x, y, self.bar_width - 1.0, height - 1.0, Some(color), Some(color)));
        }
        shapes
    }

    fn region_shapes(&self) -> &[Vec<ShapeId>] {
        &self.region_shapes
    }

    fn region_shapes_mut(&mut self) -> &mut Vec<Vec<ShapeId>> {
        &mut self.region_shapes
    }
}

impl ChartRenderer for BarChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Bar
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
        (i >= 0.0 && (i as usize) < self.stacks.len()).then_some(Region::Value(i as usize))
    }

    fn change_highlight(&mut self, highlight: bool) {
        self.highlight_region(highlight);
    }

    fn current_region_fields(&self) -> Vec<FieldSet> {
        let Some(Region::Value(i)) = self.base.current_region else {
            return Vec::new();
        };
        let Some(vals) = self.stacks.get(i) else {
            return Vec::new();
        };
        vals.iter()
            .enumerate()
            .rev()
            .map(|(stack_num, v)| {
                let color = self.calc_color(stack_num, *v, i).map(|c| c.to_string()).unwrap_or_default();
                FieldSet::new()
                    .null(v.is_none())
                    .with("value", *v)
                    .with("color", color)
                    .with("offset", i as f64)
            })
            .collect()
    }
}
