// File: crates/spark-core/tests/charts.rs
// Purpose: Per-type rendering on the vector surface: shapes, regions, highlight and tooltip text.

use std::sync::Arc;

use spark_core::chart::{BarChart, BoxChart, BulletChart, DiscreteChart, LineChart, PieChart, TristateChart};
use spark_core::surface::{share, Primitive};
use spark_core::types::{values, Value};
use spark_core::{ChartKind, ChartRenderer, Color, Defaults, Options, Region, SharedSurface, UserOptions, VectorSurface};

fn surface(width: u32, height: u32) -> SharedSurface {
    share(Box::new(VectorSurface::new(width, height, true)))
}

fn options(kind: ChartKind, user: UserOptions) -> Options {
    Options::for_kind(&Arc::new(Defaults::standard()), kind, user)
}

fn rects(surface: &SharedSurface) -> Vec<(f64, f64, f64, f64, Option<Color>)> {
    surface
        .borrow()
        .shapes()
        .into_iter()
        .filter_map(|s| match s.primitive {
            Primitive::Rect { x, y, width, height } => Some((x, y, width, height, s.style.fill)),
            _ => None,
        })
        .collect()
}

fn count(surface: &SharedSurface, pred: impl Fn(&Primitive) -> bool) -> usize {
    surface.borrow().shapes().iter().filter(|s| pred(&s.primitive)).count()
}

#[test]
fn bar_geometry_and_highlight() {
    let s = surface(14, 10);
    let mut chart = BarChart::new(values([1.0, 2.0, 3.0]), options(ChartKind::Bar, UserOptions::new()), Some(s.clone()));
    assert!(chart.render());
    assert_eq!(chart.x_axis_offset(), 1.0);

    let blue = Color::parse("#3366cc");
    let drawn = rects(&s);
    // Last value is appended first.
    assert_eq!(drawn[0], (10.0, 0.0, 3.0, 9.0, blue));
    assert_eq!(drawn[2], (0.0, 9.0, 3.0, 0.0, blue));

    assert_eq!(chart.region_at(11.0, 5.0), Some(Region::Value(2)));
    assert_eq!(chart.region_at(4.9, 5.0), Some(Region::Value(0)));

    assert_eq!(chart.set_region_highlight(11.0, 5.0), Some(true));
    assert_eq!(chart.set_region_highlight(12.0, 2.0), Some(false));
    assert_eq!(chart.set_region_highlight(-1.0, 2.0), None);
    let lit = Color::parse("#478fff");
    assert!(rects(&s).iter().any(|r| *r == (10.0, 0.0, 3.0, 9.0, lit)));
    assert_eq!(rects(&s).len(), 3);

    assert_eq!(
        chart.current_region_tooltip(),
        "<div class=\"jqsfield\"><span style=\"color: #3366cc\">&#9679;</span> 3</div>"
    );

    assert!(chart.clear_region_highlight());
    assert!(!rects(&s).iter().any(|r| r.4 == lit));
    assert_eq!(chart.current_region_tooltip(), "");
}

#[test]
fn stacked_bar_highlight_swaps_whole_stack() {
    let s = surface(14, 10);
    let vals = vec![Value::from("2:1"), Value::from("1:1"), Value::from(-1.0)];
    let mut chart = BarChart::new(vals, options(ChartKind::Bar, UserOptions::new()), Some(s.clone()));
    assert!(chart.is_stacked());
    assert!(chart.render());
    assert_eq!(chart.x_axis_offset(), 0.0);

    let before = chart.shapes_by_region()[0].clone();
    assert_eq!(before.len(), 2);
    assert!(rects(&s).contains(&(0.0, 4.0, 3.0, 3.0, Color::parse("#3366cc"))));
    assert!(rects(&s).contains(&(0.0, 2.0, 3.0, 1.0, Color::parse("#dc3912"))));
    assert!(rects(&s).contains(&(10.0, 8.0, 3.0, 1.0, Color::parse("#3366cc"))));
    let total = rects(&s).len();

    assert_eq!(chart.set_region_highlight(1.0, 5.0), Some(true));
    let after = chart.shapes_by_region()[0].clone();
    assert_eq!(after.len(), 2);
    assert!(after.iter().all(|id| !before.contains(id)));
    assert_eq!(rects(&s).len(), total);
    assert!(rects(&s).contains(&(0.0, 4.0, 3.0, 3.0, Color::parse("#478fff"))));
    assert!(rects(&s).contains(&(0.0, 2.0, 3.0, 1.0, Color::parse("#ff5019"))));

    let tip = chart.current_region_tooltip();
    assert_eq!(tip.matches("jqsfield").count(), 2);
    // Top of the stack is listed first.
    assert!(tip.find("> 1<").unwrap_or(usize::MAX) < tip.find("> 2<").unwrap_or(0));
}

#[test]
fn bar_null_color_and_color_map() {
    let s = surface(9, 10);
    let user = UserOptions::new()
        .set("nullColor", "#000")
        .set("colorMap", vec!["#f00", ""]);
    let mut chart = BarChart::new(vec![Value::from(5.0), Value::Null], options(ChartKind::Bar, user), Some(s.clone()));
    assert!(chart.render());
    let drawn = rects(&s);
    assert!(drawn.iter().any(|r| r.4 == Color::parse("#000")));
    assert!(drawn.iter().any(|r| r.4 == Color::parse("#f00")));

    assert_eq!(chart.set_region_highlight(6.0, 1.0), Some(true));
    // Null bars carry no tooltip with tooltipSkipNull.
    assert_eq!(chart.current_region_tooltip(), "");
}

#[test]
fn line_splits_at_nulls_and_tracks_regions() {
    let s = surface(30, 10);
    let mut chart = LineChart::new(
        vec![Value::from(1.0), Value::Null, Value::from(3.0)],
        options(ChartKind::Line, UserOptions::new()),
        Some(s.clone()),
    );
    assert!(chart.render());

    let verts = chart.vertices().to_vec();
    assert_eq!(verts.len(), 3);
    assert!(verts[1].is_none());
    let (first, last) = match (verts[0], verts[2]) {
        (Some(a), Some(b)) => (a, b),
        other => panic!("expected two vertices, got {other:?}"),
    };
    assert!(first.x < last.x);
    assert!(first.y > last.y);
    assert_eq!(chart.region_map().len(), 3);

    let paths = count(&s, |p| matches!(p, Primitive::Path(_)));
    let circles = count(&s, |p| matches!(p, Primitive::Circle { .. }));
    assert_eq!(paths, 4, "two fill paths and two single-point strokes");
    assert_eq!(circles, 3, "last, min and max spots");

    assert_eq!(chart.set_region_highlight(last.x, 5.0), Some(true));
    assert_eq!(chart.base().current_region, Some(Region::Value(2)));
    assert_eq!(s.borrow().shapes().len(), 9);
    assert_eq!(
        chart.current_region_tooltip(),
        "<div class=\"jqsfield\"><span style=\"color: #00f\">&#9679;</span> 3</div>"
    );

    let middle = (first.x + last.x) / 2.0;
    assert_eq!(chart.set_region_highlight(middle, 5.0), Some(true));
    assert_eq!(chart.base().current_region, Some(Region::Value(1)));
    assert_eq!(s.borrow().shapes().len(), 7);
    assert_eq!(chart.current_region_tooltip(), "");
}

#[test]
fn line_with_xy_pairs() {
    let s = surface(40, 12);
    let user = UserOptions::new().set("spotRadius", 0);
    let vals = vec![Value::from("0:1"), Value::from("10:4"), Value::from((30.0, 2.0))];
    let mut chart = LineChart::new(vals, options(ChartKind::Line, user), Some(s.clone()));
    assert!(chart.render());
    let xs: Vec<f64> = chart.vertices().iter().flatten().map(|p| p.x).collect();
    assert_eq!(xs.len(), 3);
    // x=10 sits a third of the way along.
    assert!((xs[1] - 40.0 / 3.0).abs() <= 1.0);
    assert_eq!(count(&s, |p| matches!(p, Primitive::Circle { .. })), 0);
}

#[test]
fn tristate_bars() {
    let s = surface(19, 10);
    let mut chart = TristateChart::new(values([1.0, -1.0, 0.0, 1.0]), options(ChartKind::Tristate, UserOptions::new()), Some(s.clone()));
    assert!(chart.render());
    let drawn = rects(&s);
    assert_eq!(drawn.len(), 4);
    assert!(drawn.contains(&(0.0, 0.0, 3.0, 3.0, Color::parse("#6f6"))));
    assert!(drawn.contains(&(5.0, 5.0, 3.0, 3.0, Color::parse("#f44"))));
    assert!(drawn.contains(&(10.0, 4.0, 3.0, 1.0, Color::parse("#999"))));

    assert_eq!(chart.set_region_highlight(6.0, 1.0), Some(true));
    assert_eq!(
        chart.current_region_tooltip(),
        "<div class=\"jqsfield\"><span style=\"color: #ff4444\">&#9679;</span> Loss</div>"
    );
}

#[test]
fn discrete_ticks() {
    let s = surface(8, 10);
    let user = UserOptions::new().set("thresholdValue", 2).set("thresholdColor", "#f00");
    let mut chart = DiscreteChart::new(values([1.0, 2.0, 3.0, 4.0]), options(ChartKind::Discrete, user), Some(s.clone()));
    assert!(chart.render());
    assert_eq!(chart.line_height(), 3.0);
    let shapes = s.borrow().shapes();
    assert_eq!(shapes.len(), 4);
    let red = shapes.iter().filter(|sh| sh.style.stroke == Color::parse("#f00")).count();
    assert_eq!(red, 1);

    assert_eq!(chart.region_at(7.5, 0.0), Some(Region::Value(3)));
    assert_eq!(chart.region_at(8.5, 0.0), None);
}

#[test]
fn bullet_bounds_and_picking() {
    let s = surface(40, 10);
    let vals = vec![Value::Null, Value::from(5.0), Value::from(2.0), Value::from(8.0)];
    let mut chart = BulletChart::new(vals, options(ChartKind::Bullet, UserOptions::new()), Some(s.clone()));
    assert_eq!(chart.bounds(), (0.0, 8.0));
    assert!(chart.render());
    // No target marker for a null target.
    assert_eq!(s.borrow().shapes().len(), 3);

    assert_eq!(chart.region_at(20.0, 5.0), Some(Region::Performance));
    assert_eq!(chart.region_at(30.0, 1.0), Some(Region::Range(3)));
    // The narrower band sits on top of the wider one.
    assert_eq!(chart.region_at(5.0, 1.0), Some(Region::Range(2)));

    assert_eq!(chart.set_region_highlight(20.0, 5.0), Some(true));
    assert_eq!(chart.current_region_tooltip(), "<div class=\"jqsfield\">Performance - 5</div>");
    assert_eq!(s.borrow().shapes().len(), 3);
}

#[test]
fn bullet_without_values_is_disabled() {
    let s = surface(40, 10);
    let mut chart = BulletChart::new(Vec::new(), options(ChartKind::Bullet, UserOptions::new()), Some(s));
    assert!(!chart.render());
}

#[test]
fn pie_slices_and_percent() {
    let s = surface(20, 20);
    let mut chart = PieChart::new(values([1.0, 1.0, 2.0]), options(ChartKind::Pie, UserOptions::new()), Some(s.clone()));
    assert!(chart.render());
    assert_eq!(chart.radius(), 10.0);
    assert_eq!(count(&s, |p| matches!(p, Primitive::PieSlice { .. })), 3);

    assert_eq!(chart.region_at(15.0, 12.0), Some(Region::Value(0)));
    assert_eq!(chart.region_at(5.0, 15.0), Some(Region::Value(1)));
    assert_eq!(chart.region_at(5.0, 5.0), Some(Region::Value(2)));

    assert_eq!(chart.set_region_highlight(5.0, 5.0), Some(true));
    assert_eq!(
        chart.current_region_tooltip(),
        "<div class=\"jqsfield\"><span style=\"color: #ff9900\">&#9679;</span> 2 (50.0%)</div>"
    );
    assert_eq!(count(&s, |p| matches!(p, Primitive::PieSlice { .. })), 3);
}

#[test]
fn pie_skips_non_positive_values() {
    let s = surface(20, 20);
    let mut chart = PieChart::new(values([3.0, 0.0, -2.0]), options(ChartKind::Pie, UserOptions::new()), Some(s.clone()));
    assert!(chart.render());
    let slices: Vec<_> = s.borrow().shapes().into_iter().filter(|sh| matches!(sh.primitive, Primitive::PieSlice { .. })).collect();
    assert_eq!(slices.len(), 1);
    assert!(slices[0].primitive.is_full_circle());
}

#[test]
fn box_plot_summary_and_tooltip() {
    let s = surface(40, 10);
    let data: Vec<f64> = (1..=10).map(f64::from).collect();
    let mut chart = BoxChart::new(values(data), options(ChartKind::Box, UserOptions::new()), Some(s.clone()));
    assert!(chart.render());
    let summary = chart.summary().unwrap_or_default();
    assert_eq!((summary.q1, summary.median, summary.q3), (3.0, 5.5, 8.0));
    assert_eq!((summary.lower_whisker, summary.upper_whisker), (1.0, 10.0));
    assert!(summary.drawn_outliers().is_empty());
    // Box, two whisker pairs and the median.
    assert_eq!(s.borrow().shapes().len(), 6);

    assert_eq!(chart.set_region_highlight(5.0, 5.0), Some(true));
    let tip = chart.current_region_tooltip();
    assert!(tip.contains("<div class=\"jqsfield\">Median: 5.5</div>"));
    assert!(tip.contains("Lower Quartile: 3"));
    // No outliers drawn, so no outlier rows either.
    assert!(!tip.contains("Outlier"));
    assert_eq!(tip.matches("jqsfield").count(), 5);
    assert_eq!(s.borrow().shapes().len(), 6);
}

#[test]
fn box_plot_tooltip_lists_drawn_outliers_only() {
    let s = surface(40, 10);
    let mut data: Vec<f64> = (1..=10).map(f64::from).collect();
    data.push(100.0);
    let mut chart = BoxChart::new(values(data), options(ChartKind::Box, UserOptions::new()), Some(s));
    assert!(chart.render());
    let summary = chart.summary().unwrap_or_default();
    assert_eq!(summary.drawn_outliers(), vec![100.0]);

    assert_eq!(chart.set_region_highlight(5.0, 5.0), Some(true));
    let tip = chart.current_region_tooltip();
    assert!(tip.contains("Right Outlier: 100"));
    assert!(!tip.contains("Left Outlier"));
    assert_eq!(tip.matches("jqsfield").count(), 6);
}

#[test]
fn box_plot_field_order_follows_fieldlist() {
    let s = surface(40, 10);
    let user = UserOptions::new().set("tooltipFormatFieldlist", vec!["med", "lq"]);
    let mut chart = BoxChart::new(values([1.0, 2.0, 3.0, 4.0, 50.0]), options(ChartKind::Box, user), Some(s));
    assert!(chart.render());
    assert_eq!(chart.set_region_highlight(1.0, 1.0), Some(true));
    assert_eq!(
        chart.current_region_tooltip(),
        "<div class=\"jqsfield\">Median: 3</div>\n<div class=\"jqsfield\">Lower Quartile: 1.5</div>"
    );
}

#[test]
fn rendering_twice_draws_the_same_picture() {
    let s = surface(30, 10);
    let mut chart = LineChart::new(values([4.0, 1.0, 3.0, 2.0]), options(ChartKind::Line, UserOptions::new()), Some(s.clone()));
    assert!(chart.render());
    let first = s.borrow().shapes();
    assert!(chart.render());
    let second = s.borrow().shapes();
    assert_eq!(first.len(), second.len());
    assert!(first.iter().zip(&second).all(|(a, b)| a.same_as(b) && a.id != b.id));
}

#[test]
fn chart_without_surface_is_disabled() {
    let mut chart = LineChart::new(values([1.0, 2.0]), options(ChartKind::Line, UserOptions::new()), None);
    assert!(!chart.render());
    assert!(chart.base().disabled);
}
