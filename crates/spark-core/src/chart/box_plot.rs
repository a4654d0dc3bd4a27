// File: crates/spark-core/src/chart/box_plot.rs
// Summary: Box plot: quartile box, whiskers, median, outlier spots and an optional target cross.

use crate::chart::{numeric, ChartBase, ChartRenderer, Region};
use crate::format::FieldSet;
use crate::geometry::Point;
use crate::options::{ChartKind, Options};
use crate::stats::{min_max, quartile};
use crate::surface::{Shape, SharedSurface};
use crate::types::Value;

/// Five-number summary plus the extreme points drawn as outliers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub lower_outlier: Option<f64>,
    pub upper_outlier: Option<f64>,
}

impl BoxSummary {
    /// Quartiles with whiskers at the most extreme values within `iqr_factor` IQRs.
    pub fn compute(values: &[f64], show_outliers: bool, iqr_factor: f64) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (&first, &last) = (sorted.first()?, sorted.last()?);
        let q1 = quartile(&sorted, 1);
        let median = quartile(&sorted, 2);
        let q3 = quartile(&sorted, 3);
        if !show_outliers {
            return Some(Self {
                q1,
                median,
                q3,
                lower_whisker: first,
                upper_whisker: last,
                lower_outlier: None,
                upper_outlier: None,
            });
        }
        let iqr = q3 - q1;
        let low_fence = q1 - iqr * iqr_factor;
        let high_fence = q3 + iqr * iqr_factor;
        let lower_whisker = sorted.iter().copied().find(|v| *v > low_fence).unwrap_or(first);
        let upper_whisker = sorted.iter().copied().filter(|v| *v < high_fence).last().unwrap_or(last);
        Some(Self {
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            lower_outlier: Some(first),
            upper_outlier: Some(last),
        })
    }

    /// Read precomputed points: `[lo, lw, q1, med, q3, rw, ro]` with outliers, else `[lw, q1, med, q3, rw]`.
    pub fn from_raw(values: &[f64], show_outliers: bool) -> Option<Self> {
        if show_outliers && values.len() > 5 {
            Some(Self {
                lower_outlier: values.first().copied(),
                lower_whisker: *values.get(1)?,
                q1: *values.get(2)?,
                median: *values.get(3)?,
                q3: *values.get(4)?,
                upper_whisker: *values.get(5)?,
                upper_outlier: values.get(6).copied(),
            })
        } else {
            Some(Self {
                lower_whisker: *values.first()?,
                q1: *values.get(1)?,
                median: *values.get(2)?,
                q3: *values.get(3)?,
                upper_whisker: *values.get(4)?,
                lower_outlier: None,
                upper_outlier: None,
            })
        }
    }

    /// Outliers actually drawn: those beyond their whisker.
    pub fn drawn_outliers(&self) -> Vec<f64> {
        let mut out = Vec::new();
        if let Some(lo) = self.lower_outlier.filter(|lo| *lo < self.lower_whisker) {
            out.push(lo);
        }
        if let Some(ro) = self.upper_outlier.filter(|ro| *ro > self.upper_whisker) {
            out.push(ro);
        }
        out
    }
}

pub struct BoxChart {
    base: ChartBase,
    numbers: Vec<f64>,
    summary: Option<BoxSummary>,
}

impl BoxChart {
    pub fn new(values: Vec<Value>, options: Options, surface: Option<SharedSurface>) -> Self {
        let mut base = ChartBase::new(values, options, surface);
        let numbers: Vec<f64> = numeric(&base.values).into_iter().flatten().collect();
        if numbers.is_empty() {
            base.disabled = true;
        }
        Self { base, numbers, summary: None }
    }

    /// Summary from the last render.
    pub fn summary(&self) -> Option<BoxSummary> {
        self.summary
    }

    fn draw(&mut self, summary: &BoxSummary) {
        let options = self.base.options.clone();
        let (data_min, data_max) = min_max(self.numbers.iter().copied()).unwrap_or((0.0, 0.0));
        let min_value = options.f64("chartRangeMin").unwrap_or(data_min);
        let max_value = options.f64("chartRangeMax").unwrap_or(data_max);
        let height = self.base.canvas_height;
        let mut width = self.base.canvas_width;
        let mut left = 0.0;
        let spot_radius = options.f64_or("spotRadius", 1.5);
        let show_outliers = options.flag("showOutliers");
        if show_outliers {
            left = spot_radius.ceil();
            width -= 2.0 * spot_radius.ceil();
        }
        let unit = width / (max_value - min_value + 1.0);
        let at = |v: f64| (v - min_value) * unit + left;
        let mid = (height / 2.0).round();

        if show_outliers {
            let (stroke, fill) = (options.color("outlierLineColor"), options.color("outlierFillColor"));
            for v in summary.drawn_outliers() {
                self.base.append(Shape::circle(Point::new(at(v), height / 2.0), spot_radius, stroke, fill, 1.0));
            }
        }

        self.base.append(Shape::rect(
            at(summary.q1).round(),
            (height * 0.1).round(),
            ((summary.q3 - summary.q1) * unit).round(),
            (height * 0.8).round(),
            options.color("boxLineColor"),
            options.color("boxFillColor"),
        ));
        let line_color = options.color("lineColor");
        let whisker_color = options.color("whiskerColor");
        let quarter = (height / 4.0).round();
        let three_quarter = (height - height / 4.0).round();
        for (whisker, edge) in [(summary.lower_whisker, summary.q1), (summary.upper_whisker, summary.q3)] {
            let wx = at(whisker).round();
            self.base.append(Shape::line(Point::new(wx, mid), Point::new(at(edge).round(), mid), line_color, 1.0));
            self.base.append(Shape::line(Point::new(wx, quarter), Point::new(wx, three_quarter), whisker_color, 1.0));
        }
        let mx = at(summary.median).round();
        self.base.append(Shape::line(
            Point::new(mx, (height * 0.1).round()),
            Point::new(mx, (height * 0.9).round()),
            options.color("medianColor"),
            1.0,
        ));

        if let Some(target) = options.f64("target").filter(|t| *t != 0.0) {
            let size = spot_radius.ceil();
            let tx = at(target);
            let color = options.color("targetColor");
            self.base.append(Shape::line(
                Point::new(tx.round(), (height / 2.0 - size).round()),
                Point::new(tx.round(), (height / 2.0 + size).round()),
                color,
                1.0,
            ));
            self.base.append(Shape::line(
                Point::new((tx - size).round(), mid),
                Point::new((tx + size).round(), mid),
                color,
                1.0,
            ));
        }
    }
}

impl ChartRenderer for BoxChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Box
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
        let options = &self.base.options;
        let show_outliers = options.flag("showOutliers");
        let summary = if options.flag("raw") {
            BoxSummary::from_raw(&self.numbers, show_outliers)
        } else {
            BoxSummary::compute(&self.numbers, show_outliers, options.f64_or("outlierIQR", 1.5))
        };
        self.summary = summary;
        match summary {
            Some(summary) => self.draw(&summary),
            None => log::warn!("box plot needs at least five raw points, got {}", self.numbers.len()),
        }
        self.base.flush();
        true
    }

    fn region_at(&self, _x: f64, _y: f64) -> Option<Region> {
        Some(Region::Summary)
    }

    /// The whole plot is one region and is not redrawn on hover.
    fn change_highlight(&mut self, _highlight: bool) {}

    fn current_region_fields(&self) -> Vec<FieldSet> {
        let Some(s) = self.summary else {
            return Vec::new();
        };
        let field = |name: &str, v: f64| FieldSet::new().with("field", name).with("value", v);
        let mut fields = vec![field("lq", s.q1), field("med", s.median), field("uq", s.q3)];
        // Only outliers that are actually drawn get a row.
        if let Some(lo) = s.lower_outlier.filter(|lo| *lo < s.lower_whisker) {
            fields.push(field("lo", lo));
        }
        if let Some(ro) = s.upper_outlier.filter(|ro| *ro > s.upper_whisker) {
            fields.push(field("ro", ro));
        }
        fields.push(field("lw", s.lower_whisker));
        fields.push(field("rw", s.upper_whisker));
        fields
    }
}
