// File: crates/spark-core/tests/host.rs
// Purpose: Attaching charts to containers: sizing, markup values, composites, hidden queue and missing backends.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use spark_core::host::{chart_width, values_from_markup};
use spark_core::surface::{DrawingSurface, UnsupportedProvider};
use spark_core::types::Value;
use spark_core::{
    Attachment, ChartKind, Container, ContainerRef, Defaults, Exported, Options, PointerEvent, SparklineEvent,
    Sparklines, UserOptions, ValueSource, VectorProvider,
};

fn engine() -> Sparklines {
    Sparklines::new(Arc::new(Defaults::standard()), Box::new(VectorProvider))
}

fn size_of(container: &ContainerRef) -> Option<(u32, u32)> {
    let c = container.borrow();
    let surface = c.surface()?;
    let s = surface.borrow();
    Some((s.pixel_width(), s.pixel_height()))
}

#[test]
fn markup_values_are_cleaned_and_split() {
    assert_eq!(
        values_from_markup("  <!-- 1, 2,\n null , x -->  "),
        vec![Value::Number(1.0), Value::Number(2.0), Value::Null, Value::Text("x".into())]
    );
    assert_eq!(values_from_markup("5"), vec![Value::Number(5.0)]);
}

#[test]
fn attach_reads_markup_and_sizes_line_chart() {
    let sparks = engine();
    let container = Container::new().with_text("<!-- 1,2,3 -->").shared();
    sparks.attach(&[container.clone()], ValueSource::Markup, &UserOptions::new());
    assert_eq!(size_of(&container), Some((9, 16)));
    assert_eq!(container.borrow().charts().len(), 1);

    let from_attr = Container::new().with_text("ignored").with_attribute("values", "4,5").shared();
    sparks.attach(&[from_attr.clone()], ValueSource::Markup, &UserOptions::new().set("height", "10px"));
    assert_eq!(size_of(&from_attr), Some((6, 10)));

    match container.borrow().export() {
        Ok(Exported::Svg(svg)) => assert!(svg.starts_with("<svg") && svg.contains("<path")),
        other => panic!("expected svg export, got {other:?}"),
    };
}

#[test]
fn per_type_widths() {
    let defaults = Arc::new(Defaults::standard());
    let opts = |kind| Options::for_kind(&defaults, kind, UserOptions::new());
    assert_eq!(chart_width(ChartKind::Bar, &opts(ChartKind::Bar), 3, 16, 16.0), 14);
    assert_eq!(chart_width(ChartKind::Tristate, &opts(ChartKind::Tristate), 4, 16, 16.0), 19);
    assert_eq!(chart_width(ChartKind::Discrete, &opts(ChartKind::Discrete), 5, 16, 16.0), 10);
    assert_eq!(chart_width(ChartKind::Pie, &opts(ChartKind::Pie), 5, 20, 16.0), 20);
    assert_eq!(chart_width(ChartKind::Bullet, &opts(ChartKind::Bullet), 5, 16, 16.0), 64);
    assert_eq!(chart_width(ChartKind::Box, &opts(ChartKind::Box), 5, 16, 10.0), 40);
    assert_eq!(chart_width(ChartKind::Line, &opts(ChartKind::Line), 5, 16, 16.0), 15);

    let fixed = Options::for_kind(&defaults, ChartKind::Line, UserOptions::new().set("width", "3em"));
    assert_eq!(chart_width(ChartKind::Line, &fixed, 5, 16, 10.0), 30);
}

#[test]
fn composite_draws_onto_existing_surface() {
    let sparks = engine();
    let container = Container::new().shared();
    sparks.attach(&[container.clone()], vec![1.0, 2.0, 3.0].into(), &UserOptions::new().set("type", "bar"));
    let first = container.borrow().surface();
    sparks.attach(
        &[container.clone()],
        vec![3.0, 1.0, 2.0].into(),
        &UserOptions::new().set("composite", true).set("fillColor", false),
    );
    let c = container.borrow();
    assert_eq!(c.charts().len(), 2);
    match (first, c.surface()) {
        (Some(a), Some(b)) => assert!(Rc::ptr_eq(&a, &b)),
        _ => panic!("both attaches should share one surface"),
    }
    assert_eq!(c.controller().map(|ctl| ctl.borrow().charts().len()), Some(2));
}

#[test]
fn composite_without_base_chart_notifies_once() {
    let notices = Rc::new(Cell::new(0));
    let counter = notices.clone();
    let sparks = engine().with_notifier(move |_| counter.set(counter.get() + 1));
    let container = Container::new().shared();
    let user = UserOptions::new().set("composite", true);
    sparks.attach(&[container.clone()], vec![1.0, 2.0].into(), &user);
    sparks.attach(&[container.clone()], vec![1.0, 2.0].into(), &user);
    assert_eq!(notices.get(), 1);
    assert!(container.borrow().surface().is_none());
    assert!(container.borrow().charts().is_empty());
}

#[test]
fn hidden_containers_wait_for_display() {
    let sparks = engine();
    let container = Container::new().hidden().shared();
    sparks.attach(&[container.clone()], vec![1.0, 2.0].into(), &UserOptions::new());
    sparks.attach(&[container.clone()], vec![1.0, 2.0, 3.0].into(), &UserOptions::new());
    assert_eq!(sparks.pending_count(), 1, "a non-composite attach replaces the queued one");
    assert!(container.borrow().is_pending());
    assert!(container.borrow().surface().is_none());

    sparks.display_visible();
    assert_eq!(sparks.pending_count(), 1);

    container.borrow_mut().visible = true;
    sparks.display_visible();
    assert_eq!(sparks.pending_count(), 0);
    assert!(!container.borrow().is_pending());
    assert_eq!(size_of(&container), Some((9, 16)));
}

#[test]
fn removed_containers_leave_the_queue_and_detached_ones_stay() {
    let sparks = engine();
    let removed = Container::new().hidden().shared();
    let detached = Container::new().detached().shared();
    sparks.attach(&[removed.clone(), detached.clone()], vec![1.0, 2.0].into(), &UserOptions::new());
    assert_eq!(sparks.pending_count(), 2);

    removed.borrow_mut().attachment = Attachment::Removed;
    sparks.display_visible();
    assert_eq!(sparks.pending_count(), 1);
    assert!(removed.borrow().surface().is_none());

    detached.borrow_mut().attachment = Attachment::Attached;
    sparks.display_visible();
    assert_eq!(sparks.pending_count(), 0);
    assert!(detached.borrow().surface().is_some());
}

#[test]
fn hidden_check_can_be_disabled() {
    let sparks = engine();
    let container = Container::new().hidden().shared();
    sparks.attach(&[container.clone()], vec![1.0, 2.0].into(), &UserOptions::new().set("disableHiddenCheck", true));
    assert_eq!(sparks.pending_count(), 0);
    assert!(container.borrow().surface().is_some());
}

#[test]
fn missing_backend_clears_the_container() {
    let sparks = Sparklines::new(Arc::new(Defaults::standard()), Box::new(UnsupportedProvider));
    let container = Container::new().with_text("1,2,3").shared();
    sparks.attach(&[container.clone()], ValueSource::Markup, &UserOptions::new());
    let c = container.borrow();
    assert!(c.is_cleared());
    assert!(c.text.is_empty());
    assert!(c.charts().is_empty());
    assert!(c.controller().is_none());
    assert!(c.export().is_err());
}

#[test]
fn unknown_type_skips_only_that_container() {
    let sparks = engine();
    let bad = Container::new().with_attribute("sparkType", "radar").shared();
    let good = Container::new().shared();
    let user = UserOptions::new().set("enableTagOptions", true);
    sparks.attach(&[bad.clone(), good.clone()], vec![1.0, 2.0].into(), &user);
    assert!(bad.borrow().surface().is_none());
    assert!(good.borrow().surface().is_some());
}

#[test]
fn pointer_events_reach_the_engine_bus() {
    let sparks = engine();
    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = seen.clone();
        sparks.events().subscribe(move |e| {
            seen.borrow_mut().push(matches!(e, SparklineEvent::RegionChange { .. }));
        });
    }
    let container = Container::new().shared();
    container.borrow_mut().offset = (20.0, 10.0).into();
    sparks.attach(&[container.clone()], vec![1.0, 2.0, 3.0].into(), &UserOptions::new().set("type", "bar"));

    let c = container.borrow();
    c.pointer_enter(PointerEvent::at(22.0, 15.0));
    c.click(PointerEvent::at(22.0, 15.0));
    c.pointer_leave();
    assert_eq!(*seen.borrow(), vec![true, false]);

    let quiet = Container::new().shared();
    sparks.attach(&[quiet.clone()], vec![1.0].into(), &UserOptions::new().set("disableInteraction", true));
    assert!(quiet.borrow().controller().is_none());
}

#[test]
fn stylesheet_is_handed_out_once() {
    let sparks = engine();
    let css = sparks.take_stylesheet().unwrap_or_default();
    assert!(css.contains(".jqstooltip {"));
    assert!(css.contains(".jqsfield"));
    assert_eq!(sparks.take_stylesheet(), None);
}
