// File: crates/spark-core/src/surface/vector.rs
// Summary: Retained-mode backend producing SVG markup; nodes are patched in place on replace.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::Result;
use crate::geometry::Point;
use crate::surface::{
    BackendKind, DrawingSurface, Exported, Primitive, Shape, ShapeId, ShapeList, Style, SurfaceProvider,
};

/// SVG surface. Appended shapes stay pending until `render`, which commits them to the
/// document and rebuilds the markup in one pass.
#[derive(Debug)]
pub struct VectorSurface {
    width: u32,
    height: u32,
    interactive: bool,
    pending: Vec<Shape>,
    document: ShapeList,
    nodes: HashMap<ShapeId, String>,
    markup: String,
}

impl VectorSurface {
    pub fn new(width: u32, height: u32, interactive: bool) -> Self {
        let mut surface = Self {
            width,
            height,
            interactive,
            pending: Vec::new(),
            document: ShapeList::new(),
            nodes: HashMap::new(),
            markup: String::new(),
        };
        surface.rebuild_markup();
        surface
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Markup as of the last `render`.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    fn commit_node(&mut self, shape: &Shape) {
        self.nodes.insert(shape.id, shape_markup(shape));
    }

    fn rebuild_markup(&mut self) {
        let mut out = String::with_capacity(128 + self.nodes.len() * 96);
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        for shape in self.document.iter() {
            if let Some(node) = self.nodes.get(&shape.id) {
                out.push_str(node);
            }
        }
        out.push_str("</svg>");
        self.markup = out;
    }
}

impl DrawingSurface for VectorSurface {
    fn kind(&self) -> BackendKind {
        BackendKind::Vector
    }

    fn pixel_width(&self) -> u32 {
        self.width
    }

    fn pixel_height(&self) -> u32 {
        self.height
    }

    fn append_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id;
        self.pending.push(shape);
        id
    }

    fn replace_with_shape(&mut self, old: ShapeId, shape: Shape) {
        if let Some(slot) = self.pending.iter_mut().find(|s| s.id == old) {
            *slot = shape;
            return;
        }
        self.nodes.remove(&old);
        self.commit_node(&shape);
        if !self.document.replace(old, shape) {
            log::debug!("vector surface: replace target {old} not found");
        }
    }

    fn replace_with_shapes(&mut self, old: &[ShapeId], shapes: Vec<Shape>) {
        if old.iter().all(|id| self.pending.iter().any(|s| s.id == *id)) && !old.is_empty() {
            let at = self.pending.iter().position(|s| old.contains(&s.id)).unwrap_or(self.pending.len());
            self.pending.retain(|s| !old.contains(&s.id));
            let at = at.min(self.pending.len());
            self.pending.splice(at..at, shapes);
            return;
        }
        for id in old {
            self.nodes.remove(id);
        }
        for shape in &shapes {
            self.commit_node(shape);
        }
        self.document.replace_many(old, shapes);
    }

    fn insert_after_shape(&mut self, after: ShapeId, shape: Shape) {
        if let Some(i) = self.pending.iter().position(|s| s.id == after) {
            self.pending.insert(i + 1, shape);
            return;
        }
        self.commit_node(&shape);
        let id = shape.id;
        if !self.document.insert_after(after, shape) {
            self.nodes.remove(&id);
            log::debug!("vector surface: insert anchor {after} not found");
        }
    }

    fn remove_shape(&mut self, id: ShapeId) {
        self.pending.retain(|s| s.id != id);
        if self.document.remove(id).is_some() {
            self.nodes.remove(&id);
        }
    }

    fn shape_at(&self, x: f64, y: f64) -> Option<ShapeId> {
        let p = Point::new(x, y);
        self.document
            .iter()
            .rev()
            .find(|s| s.primitive.contains(p))
            .map(|s| s.id)
    }

    fn last_shape_id(&self) -> Option<ShapeId> {
        self.pending.last().map(|s| s.id).or_else(|| self.document.last_id())
    }

    fn render(&mut self) {
        for shape in std::mem::take(&mut self.pending) {
            self.commit_node(&shape);
            self.document.push(shape);
        }
        self.rebuild_markup();
        log::debug!("vector surface rendered {} shapes", self.document.len());
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.document.clear();
        self.nodes.clear();
        self.rebuild_markup();
    }

    fn shapes(&self) -> Vec<Shape> {
        let mut all = self.document.to_vec();
        all.extend(self.pending.iter().cloned());
        all
    }

    fn export(&self) -> Result<Exported> {
        Ok(Exported::Svg(self.markup.clone()))
    }
}

/// Creates SVG surfaces; always available.
#[derive(Clone, Copy, Debug, Default)]
pub struct VectorProvider;

impl SurfaceProvider for VectorProvider {
    fn backend(&self) -> Option<BackendKind> {
        Some(BackendKind::Vector)
    }

    fn create(&self, width: u32, height: u32, interactive: bool) -> Option<Box<dyn DrawingSurface>> {
        Some(Box::new(VectorSurface::new(width, height, interactive)))
    }
}

fn num(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn paint_attrs(style: &Style) -> String {
    let fill = style.fill.map_or_else(|| "none".to_string(), |c| c.to_string());
    let stroke = style.stroke.map_or_else(|| "none".to_string(), |c| c.to_string());
    format!(
        r#"fill="{fill}" stroke="{stroke}" stroke-width="{}""#,
        num(style.line_width)
    )
}

fn shape_markup(shape: &Shape) -> String {
    let id = shape.id;
    match &shape.primitive {
        Primitive::Path(points) => {
            let mut d = String::new();
            for (i, p) in points.iter().enumerate() {
                let _ = write!(d, "{}{} {} ", if i == 0 { "M" } else { "L" }, num(p.x), num(p.y));
            }
            let closed = shape.style.fill.is_some();
            if closed {
                d.push('Z');
            }
            format!(
                r#"<path id="jqsshape{id}" d="{}" {}/>"#,
                d.trim_end(),
                paint_attrs(&shape.style)
            )
        }
        Primitive::Circle { center, radius } => format!(
            r#"<circle id="jqsshape{id}" cx="{}" cy="{}" r="{}" {}/>"#,
            num(center.x),
            num(center.y),
            num(*radius),
            paint_attrs(&shape.style)
        ),
        Primitive::Rect { x, y, width, height } => format!(
            r#"<rect id="jqsshape{id}" x="{}" y="{}" width="{}" height="{}" {}/>"#,
            num(*x),
            num(*y),
            num(*width),
            num(*height),
            paint_attrs(&shape.style)
        ),
        Primitive::PieSlice { center, radius, start, end } => {
            if shape.primitive.is_full_circle() {
                return format!(
                    r#"<circle id="jqsshape{id}" cx="{}" cy="{}" r="{}" {}/>"#,
                    num(center.x),
                    num(center.y),
                    num(*radius),
                    paint_attrs(&shape.style)
                );
            }
            let (sx, sy) = (center.x + radius * start.cos(), center.y + radius * start.sin());
            let (ex, ey) = (center.x + radius * end.cos(), center.y + radius * end.sin());
            let large = if end - start > std::f64::consts::PI { 1 } else { 0 };
            format!(
                r#"<path id="jqsshape{id}" d="M{} {} L{} {} A{r} {r} 0 {large} 1 {} {} Z" {}/>"#,
                num(center.x),
                num(center.y),
                num(sx),
                num(sy),
                num(ex),
                num(ey),
                paint_attrs(&shape.style),
                r = num(*radius)
            )
        }
    }
}
