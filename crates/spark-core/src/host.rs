// File: crates/spark-core/src/host.rs
// Summary: Host layer: containers, attaching charts, the pending-render queue and the tooltip stylesheet.
// Notes:
// - `Sparklines` owns the process-wide pieces (frozen defaults, backend provider, pending queue)
//   and is handed to whatever drives the document; nothing here is ambient global state.
// - Failures stay inside the container they concern: they are logged, the chart is skipped
//   or disabled, and attaching carries on with the next container.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::chart::bar::bar_chart_width;
use crate::chart::{build_chart, ChartRef};
use crate::error::{Result, SparklineError};
use crate::geometry::Point;
use crate::interaction::{EventBus, InteractionController, PointerEvent};
use crate::options::{ChartKind, Defaults, Dimension, Options, UserOptions};
use crate::surface::{share, Exported, SharedSurface, SurfaceProvider};
use crate::tooltip::{ApproxMeasure, TextMeasure, Viewport};
use crate::types::{normalize_value, Value, DEFAULT_EM_PX, DEFAULT_LINE_HEIGHT};

/// Where a container stands relative to the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attachment {
    /// Created but not inserted yet.
    Detached,
    Attached,
    /// Inserted and later taken out again.
    Removed,
}

/// A host element charts are drawn into.
pub struct Container {
    pub attributes: IndexMap<String, String>,
    pub text: String,
    pub visible: bool,
    pub attachment: Attachment,
    /// Page offset of the drawing surface.
    pub offset: Point,
    pub line_height: f64,
    pub em_px: f64,
    cleared: bool,
    surface: Option<SharedSurface>,
    controller: Option<Rc<RefCell<InteractionController>>>,
    charts: Vec<ChartRef>,
    pending: bool,
    composite_notified: bool,
}

pub type ContainerRef = Rc<RefCell<Container>>;

impl Default for Container {
    fn default() -> Self {
        Self {
            attributes: IndexMap::new(),
            text: String::new(),
            visible: true,
            attachment: Attachment::Attached,
            offset: Point::default(),
            line_height: DEFAULT_LINE_HEIGHT,
            em_px: DEFAULT_EM_PX,
            cleared: false,
            surface: None,
            controller: None,
            charts: Vec::new(),
            pending: false,
            composite_notified: false,
        }
    }
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn detached(mut self) -> Self {
        self.attachment = Attachment::Detached;
        self
    }

    pub fn shared(self) -> ContainerRef {
        Rc::new(RefCell::new(self))
    }

    pub fn surface(&self) -> Option<SharedSurface> {
        self.surface.clone()
    }

    pub fn charts(&self) -> &[ChartRef] {
        &self.charts
    }

    pub fn controller(&self) -> Option<Rc<RefCell<InteractionController>>> {
        self.controller.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// True once a chart failed to get a surface and the content was wiped.
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn export(&self) -> Result<Exported> {
        match &self.surface {
            Some(surface) => surface.borrow().export(),
            None => Err(SparklineError::SurfaceUnavailable),
        }
    }

    pub fn pointer_enter(&self, event: PointerEvent) {
        if let Some(c) = &self.controller {
            c.borrow_mut().pointer_enter(event);
        }
    }

    pub fn pointer_move(&self, event: PointerEvent) {
        if let Some(c) = &self.controller {
            c.borrow_mut().pointer_move(event);
        }
    }

    pub fn pointer_leave(&self) {
        if let Some(c) = &self.controller {
            c.borrow_mut().pointer_leave();
        }
    }

    pub fn click(&self, event: PointerEvent) {
        if let Some(c) = &self.controller {
            c.borrow_mut().click(event);
        }
    }

    fn clear_content(&mut self) {
        self.surface = None;
        self.charts.clear();
        self.text.clear();
        self.cleared = true;
    }

    fn is_displayable(&self) -> bool {
        self.visible && self.attachment == Attachment::Attached
    }
}

/// Where the values for a chart come from.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueSource {
    Explicit(Vec<Value>),
    /// Read the values attribute, else the container text.
    Markup,
}

impl From<Vec<Value>> for ValueSource {
    fn from(values: Vec<Value>) -> Self {
        ValueSource::Explicit(values)
    }
}

impl From<Vec<f64>> for ValueSource {
    fn from(values: Vec<f64>) -> Self {
        ValueSource::Explicit(values.into_iter().map(Value::Number).collect())
    }
}

/// Parse inline series text: comment delimiters and whitespace are dropped, then comma separated tokens.
pub fn values_from_markup(raw: &str) -> Vec<Value> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("<!--").unwrap_or(trimmed);
    let trimmed = trimmed.trim_end();
    let trimmed = trimmed.strip_suffix("-->").unwrap_or(trimmed);
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    compact.split(',').map(normalize_value).collect()
}

struct PendingRender {
    container: ContainerRef,
    source: ValueSource,
    user: UserOptions,
}

const DEFAULT_STYLESHEET: &str = ".{class} { position: absolute; left: 0px; top: 0px; visibility: hidden; \
background: rgb(0, 0, 0) transparent; background-color: rgba(0,0,0,0.6); color: white; \
font: 10px arial, san serif; text-align: left; white-space: nowrap; padding: 5px; \
border: 1px solid white; box-sizing: content-box; z-index: 10000; }\n\
.jqsfield { color: white; font: 10px arial, san serif; text-align: left; }";

/// The engine: frozen defaults, the backend chosen at startup and the pending queue.
pub struct Sparklines {
    defaults: Arc<Defaults>,
    provider: Box<dyn SurfaceProvider>,
    measure: Rc<dyn TextMeasure>,
    viewport: Cell<Viewport>,
    events: EventBus,
    pending: RefCell<Vec<PendingRender>>,
    stylesheet_taken: Cell<bool>,
    notifier: Box<dyn Fn(&str)>,
}

impl Sparklines {
    pub fn new(defaults: Arc<Defaults>, provider: Box<dyn SurfaceProvider>) -> Self {
        log::debug!("sparklines engine using {:?} backend", provider.backend());
        Self {
            defaults,
            provider,
            measure: Rc::new(ApproxMeasure::default()),
            viewport: Cell::new(Viewport::default()),
            events: EventBus::new(),
            pending: RefCell::new(Vec::new()),
            stylesheet_taken: Cell::new(false),
            notifier: Box::new(|msg| log::warn!("{msg}")),
        }
    }

    pub fn with_measure(mut self, measure: Rc<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    /// User-visible notification hook (composite misuse).
    pub fn with_notifier(mut self, notifier: impl Fn(&str) + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn defaults(&self) -> &Arc<Defaults> {
        &self.defaults
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// The tooltip stylesheet, handed out once.
    pub fn take_stylesheet(&self) -> Option<String> {
        if self.stylesheet_taken.replace(true) {
            return None;
        }
        let class = self
            .defaults
            .common("tooltipClassname")
            .map(|v| v.to_text())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "jqstooltip".to_string());
        Some(DEFAULT_STYLESHEET.replace("{class}", &class))
    }

    /// Draw into every container, or queue it while hidden. Returns the containers processed.
    pub fn attach(&self, containers: &[ContainerRef], source: ValueSource, user: &UserOptions) -> Vec<ContainerRef> {
        for container in containers {
            let options = {
                let c = container.borrow();
                match Options::resolve(&self.defaults, user, Some(&c.attributes)) {
                    Ok(options) => options,
                    Err(e) => {
                        log::warn!("skipping container: {e}");
                        continue;
                    }
                }
            };
            let deferred = {
                let c = container.borrow();
                (!options.flag("disableHiddenCheck") && !c.visible) || c.attachment != Attachment::Attached
            };
            if deferred {
                let mut pending = self.pending.borrow_mut();
                if !options.flag("composite") && container.borrow().pending {
                    pending.retain(|p| !Rc::ptr_eq(&p.container, container));
                }
                pending.push(PendingRender {
                    container: Rc::clone(container),
                    source: source.clone(),
                    user: user.clone(),
                });
                container.borrow_mut().pending = true;
                log::debug!("container not displayable, {} chart queued", options.kind());
            } else {
                self.render_into(container, &source, options);
            }
        }
        containers.to_vec()
    }

    /// Render queued charts whose containers are now visible; drop those removed from the document.
    pub fn display_visible(&self) {
        let queued = std::mem::take(&mut *self.pending.borrow_mut());
        let mut keep = Vec::with_capacity(queued.len());
        for entry in queued {
            let (displayable, attachment) = {
                let c = entry.container.borrow();
                (c.is_displayable(), c.attachment)
            };
            if displayable {
                let resolved = {
                    let mut c = entry.container.borrow_mut();
                    c.pending = false;
                    Options::resolve(&self.defaults, &entry.user, Some(&c.attributes))
                };
                match resolved {
                    Ok(options) => self.render_into(&entry.container, &entry.source, options),
                    Err(e) => log::warn!("dropping queued chart: {e}"),
                }
            } else if attachment == Attachment::Removed {
                entry.container.borrow_mut().pending = false;
                log::debug!("dropping queued chart for removed container");
            } else {
                keep.push(entry);
            }
        }
        // Anything queued while rendering goes after what is still waiting.
        let mut pending = self.pending.borrow_mut();
        keep.append(&mut pending);
        *pending = keep;
    }

    fn render_into(&self, container: &ContainerRef, source: &ValueSource, options: Options) {
        let kind = options.kind();
        let composite = options.flag("composite");
        let interactive = !options.flag("disableInteraction");

        let values = match source {
            ValueSource::Explicit(values) => values.clone(),
            ValueSource::Markup => {
                let c = container.borrow();
                let attr = options.text("tagValuesAttribute").unwrap_or_else(|| "values".to_string());
                values_from_markup(c.attributes.get(&attr).unwrap_or(&c.text))
            }
        };

        let mut c = container.borrow_mut();
        if composite && c.surface.is_none() {
            if !c.composite_notified {
                c.composite_notified = true;
                (self.notifier)("Attempted to attach a composite sparkline to an element with no existing sparkline");
            }
            return;
        }

        let surface = if composite {
            c.surface.clone()
        } else {
            let height = match options.dimension("height") {
                Dimension::Auto => c.line_height.round().max(1.0) as u32,
                other => other.to_px(c.em_px, c.line_height),
            };
            let width = chart_width(kind, &options, values.len(), height, c.em_px);
            let created = self.provider.create(width, height, interactive).map(share);
            if created.is_none() {
                log::warn!("no drawing surface for {kind} chart ({width}x{height})");
            }
            created
        };

        if let (true, Some(surface)) = (interactive, &surface) {
            match c.controller.clone() {
                Some(controller) if !composite => {
                    let mut ctl = controller.borrow_mut();
                    ctl.reset(false);
                    ctl.bind_surface(Rc::clone(surface));
                }
                Some(_) => {}
                None => {
                    let mut ctl = InteractionController::new(
                        Rc::clone(surface),
                        options.clone(),
                        Rc::clone(&self.measure),
                        self.events.clone(),
                    );
                    ctl.set_viewport(self.viewport.get());
                    c.controller = Some(Rc::new(RefCell::new(ctl)));
                }
            }
            if let Some(controller) = &c.controller {
                controller.borrow_mut().set_surface_offset(c.offset);
            }
        }

        let chart = build_chart(values, options, surface.clone());
        if !composite {
            c.charts.clear();
        }
        let rendered = chart.borrow_mut().render();
        if !rendered {
            c.clear_content();
            return;
        }
        c.surface = surface;
        c.cleared = false;
        c.charts.push(Rc::clone(&chart));
        let controller = c.controller.clone();
        drop(c);
        if let (true, Some(controller)) = (interactive, controller) {
            controller.borrow_mut().register_chart(chart);
        }
    }
}

/// Pixel width for a chart. Bar-like charts size themselves from the value count; the
/// rest use the `width` option with a per-type fallback for `auto`.
pub fn chart_width(kind: ChartKind, options: &Options, count: usize, height: u32, em_px: f64) -> u32 {
    match kind {
        ChartKind::Bar | ChartKind::Tristate => {
            let w = bar_chart_width(count, options.f64_or("barWidth", 4.0).trunc(), options.f64_or("barSpacing", 1.0).trunc());
            w.max(0.0).round() as u32
        }
        _ => {
            let auto = match kind {
                ChartKind::Discrete => count as f64 * 2.0,
                ChartKind::Pie => height as f64,
                ChartKind::Bullet | ChartKind::Box => 4.0 * em_px,
                _ => count as f64 * options.f64_or("defaultPixelsPerValue", 3.0),
            };
            options.dimension("width").to_px(em_px, auto)
        }
    }
}
