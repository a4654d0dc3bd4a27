// File: crates/spark-core/tests/interaction.rs
// Purpose: Pointer tracking across composited charts: one repaint per change, forced leave, tooltip and events.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use spark_core::geometry::Point;
use spark_core::surface::{share, BackendKind, DrawingSurface, Exported, Shape, ShapeId};
use spark_core::types::values;
use spark_core::{
    build_chart, ApproxMeasure, ChartKind, ChartRef, ChartRenderer, Defaults, EventBus, InteractionController, Options, PointerEvent,
    Region, SharedSurface, SparklineEvent, UserOptions, VectorSurface,
};

/// Vector surface that counts paints.
struct CountingSurface {
    inner: VectorSurface,
    renders: Rc<Cell<usize>>,
}

impl DrawingSurface for CountingSurface {
    fn kind(&self) -> BackendKind {
        self.inner.kind()
    }
    fn pixel_width(&self) -> u32 {
        self.inner.pixel_width()
    }
    fn pixel_height(&self) -> u32 {
        self.inner.pixel_height()
    }
    fn append_shape(&mut self, shape: Shape) -> ShapeId {
        self.inner.append_shape(shape)
    }
    fn replace_with_shape(&mut self, old: ShapeId, shape: Shape) {
        self.inner.replace_with_shape(old, shape)
    }
    fn replace_with_shapes(&mut self, old: &[ShapeId], shapes: Vec<Shape>) {
        self.inner.replace_with_shapes(old, shapes)
    }
    fn insert_after_shape(&mut self, after: ShapeId, shape: Shape) {
        self.inner.insert_after_shape(after, shape)
    }
    fn remove_shape(&mut self, id: ShapeId) {
        self.inner.remove_shape(id)
    }
    fn shape_at(&self, x: f64, y: f64) -> Option<ShapeId> {
        self.inner.shape_at(x, y)
    }
    fn last_shape_id(&self) -> Option<ShapeId> {
        self.inner.last_shape_id()
    }
    fn render(&mut self) {
        self.renders.set(self.renders.get() + 1);
        self.inner.render()
    }
    fn reset(&mut self) {
        self.inner.reset()
    }
    fn shapes(&self) -> Vec<Shape> {
        self.inner.shapes()
    }
    fn export(&self) -> spark_core::Result<Exported> {
        self.inner.export()
    }
}

struct Fixture {
    surface: SharedSurface,
    renders: Rc<Cell<usize>>,
    bar: ChartRef,
    line: ChartRef,
    controller: InteractionController,
    changes: Rc<Cell<usize>>,
    clicks: Rc<RefCell<Vec<usize>>>,
}

fn fixture(user: UserOptions) -> Fixture {
    let defaults = Arc::new(Defaults::standard());
    let renders = Rc::new(Cell::new(0));
    let surface = share(Box::new(CountingSurface { inner: VectorSurface::new(14, 10, true), renders: renders.clone() }));

    let bar_opts = Options::for_kind(&defaults, ChartKind::Bar, user.clone());
    let line_opts = Options::for_kind(&defaults, ChartKind::Line, user.set("composite", true));
    let bar = build_chart(values([1.0, 2.0, 3.0]), bar_opts.clone(), Some(surface.clone()));
    let line = build_chart(values([3.0, 1.0, 2.0]), line_opts, Some(surface.clone()));
    assert!(bar.borrow_mut().render());
    assert!(line.borrow_mut().render());

    let events = EventBus::new();
    let changes = Rc::new(Cell::new(0));
    let clicks = Rc::new(RefCell::new(Vec::new()));
    {
        let changes = changes.clone();
        let clicks = clicks.clone();
        events.subscribe(move |event| match event {
            SparklineEvent::RegionChange { .. } => changes.set(changes.get() + 1),
            SparklineEvent::Click { charts, .. } => clicks.borrow_mut().push(charts.len()),
        });
    }
    let mut controller = InteractionController::new(surface.clone(), bar_opts, Rc::new(ApproxMeasure::default()), events);
    controller.set_surface_offset(Point::new(100.0, 50.0));
    controller.register_chart(bar.clone());
    controller.register_chart(line.clone());
    renders.set(0);
    Fixture { surface, renders, bar, line, controller, changes, clicks }
}

#[test]
fn one_repaint_per_region_change() {
    let mut f = fixture(UserOptions::new());

    f.controller.pointer_enter(PointerEvent::at(111.0, 55.0));
    assert_eq!(f.renders.get(), 1);
    assert_eq!(f.changes.get(), 1);
    assert_eq!(f.bar.borrow().base().current_region, Some(Region::Value(2)));
    assert!(f.line.borrow().base().current_region.is_some());

    f.controller.pointer_move(PointerEvent::at(112.0, 53.0));
    assert_eq!(f.renders.get(), 1, "same regions, no repaint");
    assert_eq!(f.changes.get(), 1);

    f.controller.pointer_move(PointerEvent::at(101.0, 55.0));
    assert_eq!(f.renders.get(), 2);
    assert_eq!(f.changes.get(), 2);
    assert_eq!(f.bar.borrow().base().current_region, Some(Region::Value(0)));
}

#[test]
fn leaving_the_canvas_clears_every_highlight() {
    let mut f = fixture(UserOptions::new());
    f.controller.pointer_enter(PointerEvent::at(106.0, 55.0));
    let shapes_lit = f.surface.borrow().shapes().len();
    assert_eq!(f.renders.get(), 1);

    // One chart reports the pointer outside its bounds: the whole surface leaves.
    f.controller.pointer_move(PointerEvent::at(95.0, 55.0));
    assert_eq!(f.renders.get(), 2);
    assert!(!f.controller.is_over());
    assert!(f.controller.tooltip().is_none());
    assert_eq!(f.bar.borrow().base().current_region, None);
    assert_eq!(f.line.borrow().base().current_region, None);
    // The hover marker of the line chart is gone.
    assert!(f.surface.borrow().shapes().len() < shapes_lit);

    f.controller.pointer_leave();
    assert_eq!(f.renders.get(), 2, "nothing left to clear");
}

#[test]
fn tooltip_concatenates_charts_and_follows_pointer() {
    let mut f = fixture(UserOptions::new());
    f.controller.pointer_enter(PointerEvent::at(111.0, 55.0));
    let tooltip = match f.controller.tooltip() {
        Some(t) => t,
        None => panic!("tooltip should exist while the pointer is over the surface"),
    };
    assert!(tooltip.is_visible());
    assert_eq!(tooltip.class_name(), "jqstooltip");
    let content = tooltip.content().to_string();
    assert_eq!(content.matches("<div class=\"jqsfield\">").count(), 2);
    assert!(content.starts_with("<div class=\"jqsfield\"><span style=\"color: #3366cc\">&#9679;</span> 3</div>"));

    let (w, h) = tooltip.size();
    assert!(w > 0.0 && h > 0.0);
    let pos = tooltip.position().unwrap_or_default();
    assert_eq!(pos.x, 121.0);
    assert_eq!(pos.y, 55.0 - (h + 12.0));
}

#[test]
fn tooltips_and_highlights_can_be_disabled() {
    let mut f = fixture(UserOptions::new().set("disableTooltips", true).set("disableHighlight", true));
    let before: Vec<_> = f.surface.borrow().shapes();
    f.controller.pointer_enter(PointerEvent::at(111.0, 55.0));
    assert!(f.controller.tooltip().is_none());
    assert_eq!(f.changes.get(), 1);
    assert_eq!(f.renders.get(), 0);
    let after = f.surface.borrow().shapes();
    assert_eq!(before.len(), after.len());
    assert!(before.iter().zip(&after).all(|(a, b)| a.id == b.id));
}

#[test]
fn click_reports_every_chart() {
    let mut f = fixture(UserOptions::new());
    f.controller.click(PointerEvent::at(105.0, 55.0));
    assert_eq!(*f.clicks.borrow(), vec![2]);
}

#[test]
fn registering_while_over_updates_immediately() {
    let mut f = fixture(UserOptions::new());
    f.controller.reset(false);
    f.controller.pointer_enter(PointerEvent::at(111.0, 55.0));
    assert_eq!(f.changes.get(), 0);
    f.controller.register_chart(f.bar.clone());
    assert_eq!(f.changes.get(), 1);
    assert_eq!(f.controller.charts().len(), 1);
}
