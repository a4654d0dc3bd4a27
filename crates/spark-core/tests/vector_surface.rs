// File: crates/spark-core/tests/vector_surface.rs
// Purpose: Retained-mode SVG surface: pending vs committed shapes, in-place patching and picking.

use spark_core::geometry::Point;
use spark_core::surface::{DrawingSurface, Exported, Shape, VectorSurface};
use spark_core::Color;

fn red() -> Option<Color> {
    Color::parse("#f00")
}

#[test]
fn shapes_stay_pending_until_render() {
    let mut s = VectorSurface::new(20, 10, true);
    let a = s.append_shape(s.draw_rect(0.0, 0.0, 4.0, 4.0, red(), red()));
    assert!(!s.markup().contains("<rect"));
    assert_eq!(s.shape_at(1.0, 1.0), None, "pending shapes are not pickable");
    s.render();
    assert!(s.markup().starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10" viewBox="0 0 20 10">"#));
    assert!(s.markup().contains(&format!(r##"<rect id="jqsshape{a}" x="0" y="0" width="4" height="4" fill="#ff0000" stroke="#ff0000" stroke-width="1"/>"##)));
    assert_eq!(s.shape_at(1.0, 1.0), Some(a));
    assert_eq!(s.last_shape_id(), Some(a));
}

#[test]
fn replace_and_insert_keep_document_order() {
    let mut s = VectorSurface::new(20, 10, false);
    let a = s.append_shape(Shape::rect(0.0, 0.0, 4.0, 4.0, None, red()));
    let b = s.append_shape(Shape::circle(Point::new(10.0, 5.0), 2.0, None, red(), 1.0));
    s.render();

    let c = Shape::rect(0.0, 0.0, 6.0, 6.0, None, Color::parse("#00f"));
    let c_id = c.id;
    s.replace_with_shape(a, c);
    let d = Shape::line(Point::new(0.0, 0.0), Point::new(5.0, 5.0), red(), 1.0);
    let d_id = d.id;
    s.insert_after_shape(c_id, d);
    s.render();

    let ids: Vec<_> = s.shapes().iter().map(|sh| sh.id).collect();
    assert_eq!(ids, vec![c_id, d_id, b]);
    let markup = s.markup().to_string();
    let pos = |id: u64| markup.find(&format!("jqsshape{id}\"")).unwrap_or(usize::MAX);
    assert!(pos(c_id) < pos(d_id) && pos(d_id) < pos(b));
    assert!(!markup.contains(&format!("jqsshape{a}\"")));

    s.remove_shape(d_id);
    s.render();
    assert!(!s.markup().contains(&format!("jqsshape{d_id}\"")));
    assert_eq!(s.shape_at(10.0, 5.0), Some(b));
}

#[test]
fn group_replace_takes_first_position() {
    let mut s = VectorSurface::new(20, 10, false);
    let a = s.append_shape(Shape::rect(0.0, 0.0, 1.0, 1.0, None, red()));
    let b = s.append_shape(Shape::rect(2.0, 0.0, 1.0, 1.0, None, red()));
    let c = s.append_shape(Shape::rect(4.0, 0.0, 1.0, 1.0, None, red()));
    s.render();

    let n1 = Shape::rect(2.0, 0.0, 1.0, 2.0, None, red());
    let n2 = Shape::rect(2.0, 2.0, 1.0, 2.0, None, red());
    let (n1_id, n2_id) = (n1.id, n2.id);
    s.replace_with_shapes(&[b], vec![n1, n2]);
    s.render();
    let ids: Vec<_> = s.shapes().iter().map(|sh| sh.id).collect();
    assert_eq!(ids, vec![a, n1_id, n2_id, c]);
}

#[test]
fn full_pie_slice_exports_as_circle_and_reset_clears() {
    let mut s = VectorSurface::new(10, 10, false);
    s.append_shape(Shape::pie_slice(Point::new(5.0, 5.0), 5.0, 0.0, std::f64::consts::TAU, None, red()));
    s.append_shape(Shape::pie_slice(Point::new(5.0, 5.0), 5.0, 0.0, 1.0, None, red()));
    s.render();
    match s.export() {
        Ok(Exported::Svg(svg)) => {
            assert_eq!(svg.matches("<circle").count(), 1);
            assert!(svg.contains(" A5 5 0 0 1 "));
        }
        other => panic!("unexpected export {other:?}"),
    }
    s.reset();
    assert!(s.shapes().is_empty());
    assert!(!s.markup().contains("jqsshape"));
}
