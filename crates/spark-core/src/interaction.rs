// File: crates/spark-core/src/interaction.rs
// Summary: Pointer handling for the charts sharing one surface: region tracking, repaint, tooltip, events.

use std::cell::RefCell;
use std::rc::Rc;

use crate::chart::ChartRef;
use crate::geometry::Point;
use crate::options::Options;
use crate::surface::SharedSurface;
use crate::tooltip::{TextMeasure, Tooltip, Viewport};

/// Pointer position in page coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PointerEvent {
    pub page_x: f64,
    pub page_y: f64,
}

impl PointerEvent {
    pub fn at(page_x: f64, page_y: f64) -> Self {
        Self { page_x, page_y }
    }
}

/// Notifications for the host; fire-and-forget.
#[derive(Clone)]
pub enum SparklineEvent {
    RegionChange { charts: Vec<ChartRef> },
    Click { pointer: PointerEvent, charts: Vec<ChartRef> },
}

pub type EventHandler = Rc<dyn Fn(&SparklineEvent)>;

/// Subscriber list shared by every controller of one engine.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Rc<RefCell<Vec<EventHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: impl Fn(&SparklineEvent) + 'static) {
        self.handlers.borrow_mut().push(Rc::new(handler));
    }

    pub fn emit(&self, event: &SparklineEvent) {
        // Handlers may subscribe while being called.
        let handlers: Vec<EventHandler> = self.handlers.borrow().clone();
        for handler in handlers {
            handler(event);
        }
    }
}

/// Tracks the pointer over one surface and drives every chart registered on it.
pub struct InteractionController {
    surface: SharedSurface,
    surface_offset: Point,
    options: Options,
    charts: Vec<ChartRef>,
    tooltip: Option<Tooltip>,
    measure: Rc<dyn TextMeasure>,
    viewport: Viewport,
    events: EventBus,
    over: bool,
    pointer: Point,
    display_tooltips: bool,
    highlight_enabled: bool,
}

impl InteractionController {
    pub fn new(surface: SharedSurface, options: Options, measure: Rc<dyn TextMeasure>, events: EventBus) -> Self {
        let display_tooltips = !options.flag("disableTooltips");
        let highlight_enabled = !options.flag("disableHighlight");
        Self {
            surface,
            surface_offset: Point::default(),
            options,
            charts: Vec::new(),
            tooltip: None,
            measure,
            viewport: Viewport::default(),
            events,
            over: false,
            pointer: Point::default(),
            display_tooltips,
            highlight_enabled,
        }
    }

    /// Page offset of the surface's top-left corner.
    pub fn set_surface_offset(&mut self, offset: Point) {
        self.surface_offset = offset;
    }

    /// Point at a freshly created surface after a non-composite redraw.
    pub fn bind_surface(&mut self, surface: SharedSurface) {
        self.surface = surface;
    }

    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(tooltip) = &mut self.tooltip {
            tooltip.set_viewport(viewport);
        }
    }

    pub fn register_chart(&mut self, chart: ChartRef) {
        self.charts.push(chart);
        if self.over {
            self.update_display();
        }
    }

    /// Forget every chart, e.g. before a non-composite redraw.
    pub fn reset(&mut self, remove_tooltip: bool) {
        self.charts.clear();
        if remove_tooltip {
            if let Some(mut tooltip) = self.tooltip.take() {
                tooltip.remove();
            }
        }
    }

    pub fn charts(&self) -> &[ChartRef] {
        &self.charts
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn pointer_enter(&mut self, event: PointerEvent) {
        self.over = true;
        self.pointer = Point::new(event.page_x, event.page_y);
        if self.tooltip.is_none() && self.display_tooltips {
            let mut tooltip = Tooltip::new(&self.options, Rc::clone(&self.measure), self.viewport);
            tooltip.update_position(Some(self.pointer));
            self.tooltip = Some(tooltip);
        }
        self.update_display();
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        self.pointer = Point::new(event.page_x, event.page_y);
        if let Some(tooltip) = &mut self.tooltip {
            tooltip.update_position(Some(self.pointer));
        }
        self.update_display();
    }

    pub fn pointer_leave(&mut self) {
        self.over = false;
        if let Some(mut tooltip) = self.tooltip.take() {
            tooltip.remove();
        }
        let mut needs_refresh = false;
        for chart in &self.charts {
            if chart.borrow_mut().clear_region_highlight() {
                needs_refresh = true;
            }
        }
        if needs_refresh {
            self.surface.borrow_mut().render();
        }
    }

    pub fn click(&mut self, event: PointerEvent) {
        self.events.emit(&SparklineEvent::Click { pointer: event, charts: self.charts.clone() });
    }

    /// Re-evaluate regions at the current pointer position. Repaints at most once.
    pub fn update_display(&mut self) {
        if !self.over {
            return;
        }
        let local_x = self.pointer.x - self.surface_offset.x;
        let local_y = self.pointer.y - self.surface_offset.y;
        let mut needs_refresh = false;
        let mut left_bounds = false;
        for chart in &self.charts {
            match chart.borrow_mut().set_region_highlight(local_x, local_y) {
                Some(true) => needs_refresh = true,
                Some(false) => {}
                None => left_bounds = true,
            }
        }
        if left_bounds {
            self.pointer_leave();
            return;
        }
        if !needs_refresh {
            return;
        }
        self.events.emit(&SparklineEvent::RegionChange { charts: self.charts.clone() });
        if let Some(tooltip) = &mut self.tooltip {
            let html: String = self.charts.iter().map(|c| c.borrow().current_region_tooltip()).collect();
            tooltip.set_content(&html);
        }
        if self.highlight_enabled {
            self.surface.borrow_mut().render();
        }
    }
}
