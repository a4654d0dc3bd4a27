// File: crates/spark-core/src/chart/line.rs
// Summary: Line chart: segments between non-null points, fill, spots, normal band and hover marker.

use crate::chart::{ChartBase, ChartRenderer, Region};
use crate::color::Color;
use crate::format::FieldSet;
use crate::geometry::{clip, Point};
use crate::options::{ChartKind, OptionValue, Options};
use crate::range_map::RangeMap;
use crate::stats::min_max;
use crate::surface::{Shape, ShapeId, SharedSurface};
use crate::types::{parse_number, Value};

/// Horizontal pixel band `[from, to]` owned by one value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionBand {
    pub from: f64,
    pub to: f64,
    pub index: usize,
}

pub struct LineChart {
    base: ChartBase,
    xvalues: Vec<f64>,
    yvalues: Vec<Option<f64>>,
    vertices: Vec<Option<Point>>,
    region_map: Vec<RegionBand>,
    canvas_top: f64,
    last_shape_id: Option<ShapeId>,
    highlight_spot: Option<ShapeId>,
    highlight_line: Option<ShapeId>,
}

/// x, y for one token: `[x, y]` lists and `x:y` strings carry both, anything else is y at `index`.
fn split_xy(value: &Value, index: usize) -> (f64, Option<f64>) {
    match value {
        Value::List(pair) if pair.len() >= 2 => (
            pair[0].as_f64().unwrap_or(f64::NAN),
            pair[1].as_f64(),
        ),
        Value::Text(s) if s.split(':').count() == 2 => {
            let (x, y) = s.split_once(':').unwrap_or((s, ""));
            (parse_number(x).unwrap_or(f64::NAN), parse_number(y))
        }
        other => (index as f64, other.as_f64()),
    }
}

impl LineChart {
    pub fn new(values: Vec<Value>, options: Options, surface: Option<SharedSurface>) -> Self {
        let base = ChartBase::new(values, options, surface);
        let (mut xvalues, yvalues): (Vec<f64>, Vec<Option<f64>>) =
            base.values.iter().enumerate().map(|(i, v)| split_xy(v, i)).unzip();
        if let Some(OptionValue::List(xs)) = base.options.get("xvalues") {
            xvalues = xs.iter().map(|x| x.as_f64().unwrap_or(f64::NAN)).collect();
        }
        Self {
            base,
            xvalues,
            yvalues,
            vertices: Vec::new(),
            region_map: Vec::new(),
            canvas_top: 0.0,
            last_shape_id: None,
            highlight_spot: None,
            highlight_line: None,
        }
    }

    /// Pixel bands used for picking, by value offset.
    pub fn region_map(&self) -> &[RegionBand] {
        &self.region_map
    }

    /// Plotted point per value; `None` for nulls.
    pub fn vertices(&self) -> &[Option<Point>] {
        &self.vertices
    }

    fn value_spots(&self) -> Option<RangeMap<Color>> {
        self.base.options.get("valueSpots").and_then(|v| v.to_color_map())
    }

    fn draw(&mut self) {
        self.vertices.clear();
        self.region_map.clear();
        let options = self.base.options.clone();
        let yvalues = self.yvalues.clone();
        let xvalues = self.xvalues.clone();
        let present: Vec<f64> = yvalues.iter().flatten().copied().collect();
        if present.is_empty() || yvalues.len() < 2 {
            return;
        }
        let Some((miny_org, maxy_org)) = min_max(present.iter().copied()) else {
            return;
        };
        let (mut minx, mut maxx) = min_max(xvalues.iter().copied()).unwrap_or((0.0, 0.0));
        let (mut miny, mut maxy) = (miny_org, maxy_org);

        let normal_min = options.f64("normalRangeMin");
        let normal_max = options.f64("normalRangeMax");
        if let Some(nmin) = normal_min {
            miny = miny.min(nmin);
            if let Some(nmax) = normal_max {
                maxy = maxy.max(nmax);
            }
        }
        let clip_y = options.flag("chartRangeClip");
        let clip_x = options.flag("chartRangeClipX");
        if let Some(v) = options.f64("chartRangeMin").filter(|v| clip_y || *v < miny) {
            miny = v;
        }
        if let Some(v) = options.f64("chartRangeMax").filter(|v| clip_y || *v > maxy) {
            maxy = v;
        }
        if let Some(v) = options.f64("chartRangeMinX").filter(|v| clip_x || *v < minx) {
            minx = v;
        }
        if let Some(v) = options.f64("chartRangeMaxX").filter(|v| clip_x || *v > maxx) {
            maxx = v;
        }

        let range_x = if maxx - minx == 0.0 { 1.0 } else { maxx - minx };
        let range_y = if maxy - miny == 0.0 { 1.0 } else { maxy - miny };
        let last = yvalues.len() - 1;
        let mut canvas_width = self.base.canvas_width;
        let mut canvas_height = self.base.canvas_height;
        let (mut canvas_left, mut canvas_top) = (0.0, 0.0);

        let mut spot_radius = options.f64_or("spotRadius", 0.0);
        if spot_radius > 0.0 && (canvas_width < spot_radius * 4.0 || canvas_height < spot_radius * 4.0) {
            spot_radius = 0.0;
        }
        let spot_color = options.color("spotColor");
        let min_spot = options.color("minSpotColor");
        let max_spot = options.color("maxSpotColor");
        if spot_radius > 0.0 {
            let r = spot_radius.ceil();
            let hl_spots = options.color("highlightSpotColor").is_some() && !options.flag("disableInteraction");
            let last_y = yvalues[last];
            if hl_spots || min_spot.is_some() || (spot_color.is_some() && last_y == Some(miny)) {
                canvas_height -= r;
            }
            if hl_spots || max_spot.is_some() || (spot_color.is_some() && last_y == Some(maxy)) {
                canvas_height -= r;
                canvas_top += r;
            }
            let extreme = |y: Option<f64>| y == Some(miny) || y == Some(maxy);
            if hl_spots || ((min_spot.is_some() || max_spot.is_some()) && extreme(yvalues[0])) {
                canvas_left += r;
                canvas_width -= r;
            }
            if hl_spots || spot_color.is_some() || ((min_spot.is_some() || max_spot.is_some()) && extreme(last_y)) {
                canvas_width -= r;
            }
        }
        canvas_height -= 1.0;

        let xpos = |x: f64| canvas_left + ((x - minx) * (canvas_width / range_x)).round();
        let ypos = |y: f64| canvas_top + (canvas_height - canvas_height * ((y - miny) / range_y)).round();
        let bottom = canvas_top + canvas_height;

        let normal_band = match (normal_min, normal_max) {
            (Some(nmin), Some(nmax)) => {
                let top = canvas_top + (canvas_height - canvas_height * ((nmax - miny) / range_y)).round();
                let height = (canvas_height * (nmax - nmin) / range_y).round();
                let color = options.color("normalRangeColor");
                Some(Shape::rect(canvas_left, top, canvas_width, height, None, color))
            }
            _ => None,
        };
        let on_top = options.flag("drawNormalOnTop");
        if let (Some(band), false) = (&normal_band, on_top) {
            self.base.append(band.clone());
        }

        let mut paths: Vec<Vec<Point>> = vec![Vec::new()];
        let mut prev_edge: Option<f64> = None;
        for (i, y) in yvalues.iter().enumerate() {
            let x = xvalues.get(i).copied().unwrap_or(i as f64);
            let px = xpos(x);
            // The last band runs to the right edge of the canvas, not the spot-inset plot width.
            let edge = if i < last {
                let px_next = xpos(xvalues.get(i + 1).copied().unwrap_or((i + 1) as f64));
                px + (px_next - px) / 2.0
            } else {
                self.base.canvas_width
            };
            self.region_map.push(RegionBand { from: prev_edge.unwrap_or(0.0), to: edge, index: i });
            prev_edge = Some(edge);

            match y {
                None => {
                    if i > 0 && yvalues[i - 1].is_some() {
                        paths.push(Vec::new());
                    }
                    self.vertices.push(None);
                }
                Some(y) => {
                    let y = clip(*y, miny, maxy);
                    let path = paths.last_mut();
                    let vertex = Point::new(px, ypos(y));
                    if let Some(path) = path {
                        if path.is_empty() {
                            path.push(Point::new(px, bottom));
                        }
                        path.push(vertex);
                    }
                    self.vertices.push(Some(vertex));
                }
            }
        }

        let fill_color = options.color("fillColor");
        let mut line_paths = Vec::new();
        let mut fill_paths = Vec::new();
        for mut path in paths.into_iter().filter(|p| !p.is_empty()) {
            if fill_color.is_some() {
                let mut fill = path.clone();
                if let Some(end) = path.last() {
                    fill.push(Point::new(end.x, bottom));
                }
                fill_paths.push(fill);
            }
            // A lone point keeps its baseline start and shows as a vertical stroke.
            if path.len() > 2 {
                path[0] = Point::new(path[0].x, path[1].y);
            }
            line_paths.push(path);
        }

        for fill in fill_paths {
            self.base.append(Shape::path(fill, fill_color, fill_color, 1.0));
        }
        if let (Some(band), true) = (normal_band, on_top) {
            self.base.append(band);
        }
        let line_color = options.color("lineColor");
        let line_width = options.f64_or("lineWidth", 1.0);
        for path in line_paths {
            self.base.append(Shape::path(path, line_color, None, line_width));
        }

        if spot_radius > 0.0 {
            if let Some(spots) = self.value_spots() {
                for (i, y) in yvalues.iter().enumerate() {
                    let Some(y) = *y else { continue };
                    if let Some(color) = spots.get(y) {
                        let center = Point::new(xpos(xvalues.get(i).copied().unwrap_or(i as f64)), ypos(y));
                        self.base.append(Shape::circle(center, spot_radius, None, Some(*color), 1.0));
                    }
                }
            }
            if let (Some(color), Some(y)) = (spot_color, yvalues[last]) {
                let x = xvalues.get(last).copied().unwrap_or(last as f64);
                self.base.append(Shape::circle(Point::new(xpos(x), ypos(y)), spot_radius, None, Some(color), 1.0));
            }
            if maxy != miny_org {
                for (color, target) in [(min_spot, miny_org), (max_spot, maxy_org)] {
                    let Some(color) = color else { continue };
                    let Some(i) = yvalues.iter().position(|y| *y == Some(target)) else { continue };
                    let x = xvalues.get(i).copied().unwrap_or(i as f64);
                    self.base.append(Shape::circle(Point::new(xpos(x), ypos(target)), spot_radius, None, Some(color), 1.0));
                }
            }
        }
        self.canvas_top = canvas_top;
    }
}

impl ChartRenderer for LineChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Line
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
        self.highlight_spot = None;
        self.highlight_line = None;
        self.draw();
        self.last_shape_id = self.base.last_shape_id();
        self.base.flush();
        true
    }

    fn region_at(&self, x: f64, _y: f64) -> Option<Region> {
        self.region_map
            .iter()
            .rev()
            .find(|band| x >= band.from && x <= band.to)
            .map(|band| Region::Value(band.index))
    }

    fn change_highlight(&mut self, highlight: bool) {
        if !highlight {
            for id in [self.highlight_spot.take(), self.highlight_line.take()].into_iter().flatten() {
                self.base.remove(id);
            }
            return;
        }
        let Some(Region::Value(i)) = self.base.current_region else { return };
        let Some(Some(vertex)) = self.vertices.get(i).copied() else { return };
        let Some(anchor) = self.last_shape_id else { return };
        let options = &self.base.options;
        let radius = options.f64_or("spotRadius", 0.0);
        let spot = options
            .color("highlightSpotColor")
            .filter(|_| radius > 0.0)
            .map(|c| Shape::circle(vertex, radius, None, Some(c), 1.0));
        let line = options.color("highlightLineColor").map(|c| {
            Shape::line(
                Point::new(vertex.x, self.canvas_top),
                Point::new(vertex.x, self.canvas_top + self.base.canvas_height),
                Some(c),
                1.0,
            )
        });
        if let Some(spot) = spot {
            self.highlight_spot = Some(self.base.insert_after(anchor, spot));
        }
        if let Some(line) = line {
            self.highlight_line = Some(self.base.insert_after(anchor, line));
        }
    }

    fn current_region_fields(&self) -> Vec<FieldSet> {
        let Some(Region::Value(i)) = self.base.current_region else {
            return Vec::new();
        };
        let options = &self.base.options;
        let y = self.yvalues.get(i).copied().flatten();
        vec![FieldSet::new()
            .null(y.is_none())
            .with("x", self.xvalues.get(i).copied())
            .with("y", y)
            .with("color", options.text("lineColor").unwrap_or_default())
            .with("fillColor", options.text("fillColor").unwrap_or_default())
            .with("offset", i as f64)]
    }
}
