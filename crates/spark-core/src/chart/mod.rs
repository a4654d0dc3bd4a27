// File: crates/spark-core/src/chart/mod.rs
// Summary: Shared chart contract (render, regions, highlight, tooltip) and per-chart base state.

pub mod bar;
pub mod bar_highlight;
pub mod box_plot;
pub mod bullet;
pub mod discrete;
pub mod line;
pub mod pie;
pub mod tristate;

use std::cell::RefCell;
use std::rc::Rc;

use crate::color::Color;
use crate::format::{FieldSet, FieldValue, Lookups, TooltipFormat};
use crate::options::{ChartKind, Options};
use crate::surface::{Shape, ShapeId, SharedSurface};
use crate::types::Value;

pub use bar::BarChart;
pub use bar_highlight::BarRegionHighlighting;
pub use box_plot::BoxChart;
pub use bullet::BulletChart;
pub use discrete::DiscreteChart;
pub use line::LineChart;
pub use pie::PieChart;
pub use tristate::TristateChart;

/// Interactive sub-element of a chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    /// Value at an offset: a bar, tick, line point or pie slice.
    Value(usize),
    Target,
    Performance,
    /// Bullet range band, by offset into the value sequence.
    Range(usize),
    /// The whole chart (box plots).
    Summary,
}

/// State every renderer carries: values, options, the target surface and region bookkeeping.
pub struct ChartBase {
    pub values: Vec<Value>,
    pub options: Options,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub current_region: Option<Region>,
    pub disabled: bool,
    surface: Option<SharedSurface>,
    owned: Vec<ShapeId>,
}

impl ChartBase {
    /// A chart without a surface starts disabled.
    pub fn new(values: Vec<Value>, options: Options, surface: Option<SharedSurface>) -> Self {
        let (canvas_width, canvas_height) = surface
            .as_ref()
            .map(|s| {
                let s = s.borrow();
                (s.pixel_width() as f64, s.pixel_height() as f64)
            })
            .unwrap_or((0.0, 0.0));
        Self {
            values,
            options,
            canvas_width,
            canvas_height,
            current_region: None,
            disabled: surface.is_none(),
            surface,
            owned: Vec::new(),
        }
    }

    pub fn surface(&self) -> Option<&SharedSurface> {
        self.surface.as_ref()
    }

    /// Start a render pass. Shapes from a previous pass of this chart are dropped so that
    /// repeated renders draw the same picture. False when the chart is disabled.
    pub fn begin_render(&mut self) -> bool {
        if self.disabled {
            log::debug!("{} chart disabled, nothing rendered", self.options.kind());
            return false;
        }
        if let Some(surface) = &self.surface {
            let mut surface = surface.borrow_mut();
            for id in self.owned.drain(..) {
                surface.remove_shape(id);
            }
        }
        self.current_region = None;
        true
    }

    pub fn append(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id;
        if let Some(surface) = &self.surface {
            surface.borrow_mut().append_shape(shape);
            self.owned.push(id);
        }
        id
    }

    pub fn replace(&mut self, old: ShapeId, shape: Shape) -> ShapeId {
        let id = shape.id;
        if let Some(surface) = &self.surface {
            surface.borrow_mut().replace_with_shape(old, shape);
            self.owned.retain(|o| *o != old);
            self.owned.push(id);
        }
        id
    }

    pub fn replace_many(&mut self, old: &[ShapeId], shapes: Vec<Shape>) -> Vec<ShapeId> {
        let ids: Vec<ShapeId> = shapes.iter().map(|s| s.id).collect();
        if let Some(surface) = &self.surface {
            surface.borrow_mut().replace_with_shapes(old, shapes);
            self.owned.retain(|o| !old.contains(o));
            self.owned.extend(&ids);
        }
        ids
    }

    pub fn insert_after(&mut self, after: ShapeId, shape: Shape) -> ShapeId {
        let id = shape.id;
        if let Some(surface) = &self.surface {
            surface.borrow_mut().insert_after_shape(after, shape);
            self.owned.push(id);
        }
        id
    }

    pub fn remove(&mut self, id: ShapeId) {
        if let Some(surface) = &self.surface {
            surface.borrow_mut().remove_shape(id);
        }
        self.owned.retain(|o| *o != id);
    }

    pub fn last_shape_id(&self) -> Option<ShapeId> {
        self.surface.as_ref().and_then(|s| s.borrow().last_shape_id())
    }

    pub fn shape_at(&self, x: f64, y: f64) -> Option<ShapeId> {
        self.surface.as_ref().and_then(|s| s.borrow().shape_at(x, y))
    }

    /// Paint everything queued on the surface.
    pub fn flush(&self) {
        if let Some(surface) = &self.surface {
            surface.borrow_mut().render();
        }
    }

    /// Ids of shapes currently drawn by this chart.
    pub fn owned_shapes(&self) -> &[ShapeId] {
        &self.owned
    }

    pub fn highlight_enabled(&self) -> bool {
        self.options.flag("enableHighlight") && !self.options.flag("disableHighlight")
    }

    /// `highlightColor` when set, else the colour lightened by `highlightLighten`.
    pub fn highlight_color(&self, color: Color) -> Color {
        if let Some(fixed) = self.options.color("highlightColor") {
            return fixed;
        }
        match self.options.f64("highlightLighten") {
            Some(factor) if factor != 0.0 => color.lighten(factor),
            _ => color,
        }
    }

    pub fn in_bounds(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x <= self.canvas_width && y <= self.canvas_height
    }
}

/// Contract every chart type implements.
pub trait ChartRenderer {
    fn kind(&self) -> ChartKind;
    fn base(&self) -> &ChartBase;
    fn base_mut(&mut self) -> &mut ChartBase;

    /// Emit every shape and paint. False when the chart has no surface.
    fn render(&mut self) -> bool;
    fn region_at(&self, x: f64, y: f64) -> Option<Region>;
    /// Redraw the current region highlighted or plain.
    fn change_highlight(&mut self, highlight: bool);
    fn current_region_fields(&self) -> Vec<FieldSet>;

    /// Track the region under the pointer. `None` when the pointer is outside the canvas,
    /// otherwise whether the current region changed.
    fn set_region_highlight(&mut self, x: f64, y: f64) -> Option<bool> {
        if !self.base().in_bounds(x, y) {
            return None;
        }
        let next = self.region_at(x, y);
        if next == self.base().current_region {
            return Some(false);
        }
        let highlight = self.base().highlight_enabled();
        if self.base().current_region.is_some() && highlight {
            self.change_highlight(false);
        }
        log::trace!("{} region {:?} -> {:?}", self.kind(), self.base().current_region, next);
        self.base_mut().current_region = next;
        if next.is_some() && highlight {
            self.change_highlight(true);
        }
        Some(true)
    }

    fn clear_region_highlight(&mut self) -> bool {
        if self.base().current_region.is_none() {
            return false;
        }
        if self.base().highlight_enabled() {
            self.change_highlight(false);
        }
        self.base_mut().current_region = None;
        true
    }

    /// Tooltip markup for the current region; empty when nothing is highlighted.
    fn current_region_tooltip(&self) -> String {
        let base = self.base();
        if base.current_region.is_none() {
            return String::new();
        }
        let options = &base.options;
        let mut fields = self.current_region_fields();
        if let Some(formatter) = options.tooltip_formatter() {
            return formatter(&fields, options);
        }
        let header = options
            .text("tooltipChartTitle")
            .filter(|t| !t.is_empty())
            .map(|t| format!("<div class=\"jqs jqstitle\">{t}</div>\n"))
            .unwrap_or_default();
        let formats = TooltipFormat::list_from_option(options.get("tooltipFormat").as_ref());
        if formats.is_empty() {
            return String::new();
        }
        if let (Some(order), Some(key)) = (options.get("tooltipFormatFieldlist"), options.text("tooltipFormatFieldlistKey")) {
            if let Some(order) = order.as_list() {
                let wanted: Vec<String> = order.iter().map(|v| v.to_text()).collect();
                let mut picked: Vec<(usize, FieldSet)> = fields
                    .into_iter()
                    .filter_map(|f| {
                        let name = f.get(&key)?.to_string();
                        wanted.iter().position(|w| *w == name).map(|pos| (pos, f))
                    })
                    .collect();
                picked.sort_by_key(|(pos, _)| *pos);
                fields = picked.into_iter().map(|(_, f)| f).collect();
            }
        }
        let lookups = Lookups::from_option(options.get("tooltipValueLookups").as_ref());
        let skip_null = options.flag("tooltipSkipNull");
        let prefix = options.text("tooltipPrefix").unwrap_or_default();
        let suffix = options.text("tooltipSuffix").unwrap_or_default();
        let mut entries = Vec::new();
        for format in &formats {
            let class = format.class.as_deref().unwrap_or("jqsfield");
            for field in fields.iter().filter(|f| !(f.is_null && skip_null)) {
                let field = field
                    .clone()
                    .with("prefix", FieldValue::Text(prefix.clone()))
                    .with("suffix", FieldValue::Text(suffix.clone()));
                let text = format.render_with(&field, &lookups, options);
                entries.push(format!("<div class=\"{class}\">{text}</div>"));
            }
        }
        if entries.is_empty() {
            return String::new();
        }
        header + &entries.join("\n")
    }
}

pub type ChartRef = Rc<RefCell<dyn ChartRenderer>>;

/// Build the renderer for `options.kind()` over an already acquired surface.
pub fn build_chart(values: Vec<Value>, options: Options, surface: Option<SharedSurface>) -> ChartRef {
    match options.kind() {
        ChartKind::Line => Rc::new(RefCell::new(LineChart::new(values, options, surface))),
        ChartKind::Bar => Rc::new(RefCell::new(BarChart::new(values, options, surface))),
        ChartKind::Tristate => Rc::new(RefCell::new(TristateChart::new(values, options, surface))),
        ChartKind::Discrete => Rc::new(RefCell::new(DiscreteChart::new(values, options, surface))),
        ChartKind::Bullet => Rc::new(RefCell::new(BulletChart::new(values, options, surface))),
        ChartKind::Pie => Rc::new(RefCell::new(PieChart::new(values, options, surface))),
        ChartKind::Box => Rc::new(RefCell::new(BoxChart::new(values, options, surface))),
    }
}

/// Numeric values only; nulls and non-numeric tokens become `None`.
pub(crate) fn numeric(values: &[Value]) -> Vec<Option<f64>> {
    values.iter().map(Value::as_f64).collect()
}

/// Pick a colour from a list by offset, cycling.
pub(crate) fn cycle(colors: &[Color], i: usize) -> Option<Color> {
    if colors.is_empty() { None } else { Some(colors[i % colors.len()]) }
}
