// File: crates/spark-core/src/surface/mod.rs
// Summary: Drawing-surface contract shared by the raster and vector backends.
// Notes:
// - Shapes are plain values until appended; appending marks them for the next `render`.
// - Ids come from one process-wide counter so charts composited onto a single surface
//   never collide.

pub mod vector;

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::color::Color;
use crate::error::Result;
use crate::geometry::{circle_contains, polygon_contains, slice_contains, Point, RectF};

pub use vector::{VectorProvider, VectorSurface};

pub type ShapeId = u64;

static NEXT_SHAPE_ID: AtomicU64 = AtomicU64::new(0);

/// Next id from the process-wide monotonic counter.
pub fn next_shape_id() -> ShapeId {
    NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// Polyline; closed and filled when the style has a fill.
    Path(Vec<Point>),
    Circle { center: Point, radius: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    /// Angles in radians, clockwise from the positive x axis.
    PieSlice { center: Point, radius: f64, start: f64, end: f64 },
}

impl Primitive {
    /// Geometric containment used for coordinate-math picking.
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Primitive::Path(points) => polygon_contains(points, p),
            Primitive::Circle { center, radius } => circle_contains(*center, *radius, p),
            Primitive::Rect { x, y, width, height } => RectF::from_ltwh(*x, *y, *width, *height).contains(p),
            Primitive::PieSlice { center, radius, start, end } => slice_contains(*center, *radius, *start, *end, p),
        }
    }

    pub fn is_full_circle(&self) -> bool {
        matches!(self, Primitive::PieSlice { start, end, .. } if end - start >= 2.0 * PI - 1e-9)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
    pub line_width: f64,
}

impl Style {
    pub fn new(stroke: Option<Color>, fill: Option<Color>, line_width: f64) -> Self {
        Self { stroke, fill, line_width }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub primitive: Primitive,
    pub style: Style,
}

impl Shape {
    pub fn new(primitive: Primitive, style: Style) -> Self {
        Self { id: next_shape_id(), primitive, style }
    }

    pub fn line(from: Point, to: Point, stroke: Option<Color>, line_width: f64) -> Self {
        Self::new(Primitive::Path(vec![from, to]), Style::new(stroke, None, line_width))
    }

    pub fn path(points: Vec<Point>, stroke: Option<Color>, fill: Option<Color>, line_width: f64) -> Self {
        Self::new(Primitive::Path(points), Style::new(stroke, fill, line_width))
    }

    pub fn circle(center: Point, radius: f64, stroke: Option<Color>, fill: Option<Color>, line_width: f64) -> Self {
        Self::new(Primitive::Circle { center, radius }, Style::new(stroke, fill, line_width))
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64, stroke: Option<Color>, fill: Option<Color>) -> Self {
        Self::new(Primitive::Rect { x, y, width, height }, Style::new(stroke, fill, 1.0))
    }

    pub fn pie_slice(center: Point, radius: f64, start: f64, end: f64, stroke: Option<Color>, fill: Option<Color>) -> Self {
        Self::new(Primitive::PieSlice { center, radius, start, end }, Style::new(stroke, fill, 1.0))
    }

    /// Same geometry and style, ignoring the id.
    pub fn same_as(&self, other: &Shape) -> bool {
        self.primitive == other.primitive && self.style == other.style
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Immediate mode: every render repaints the whole shape sequence.
    Raster,
    /// Retained mode: markup nodes are kept and patched in place.
    Vector,
}

/// Exported surface content.
#[derive(Clone, Debug, PartialEq)]
pub enum Exported {
    Svg(String),
    Png(Vec<u8>),
}

/// Shape-based drawing API implemented by each backend.
pub trait DrawingSurface {
    fn kind(&self) -> BackendKind;
    fn pixel_width(&self) -> u32;
    fn pixel_height(&self) -> u32;

    fn draw_line(&self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: Option<Color>, line_width: f64) -> Shape {
        Shape::line(Point::new(x1, y1), Point::new(x2, y2), stroke, line_width)
    }

    fn draw_shape(&self, points: Vec<Point>, stroke: Option<Color>, fill: Option<Color>, line_width: f64) -> Shape {
        Shape::path(points, stroke, fill, line_width)
    }

    fn draw_circle(&self, x: f64, y: f64, radius: f64, stroke: Option<Color>, fill: Option<Color>, line_width: f64) -> Shape {
        Shape::circle(Point::new(x, y), radius, stroke, fill, line_width)
    }

    fn draw_rect(&self, x: f64, y: f64, width: f64, height: f64, stroke: Option<Color>, fill: Option<Color>) -> Shape {
        Shape::rect(x, y, width, height, stroke, fill)
    }

    fn draw_pie_slice(&self, x: f64, y: f64, radius: f64, start: f64, end: f64, stroke: Option<Color>, fill: Option<Color>) -> Shape {
        Shape::pie_slice(Point::new(x, y), radius, start, end, stroke, fill)
    }

    /// Queue a shape for the next render.
    fn append_shape(&mut self, shape: Shape) -> ShapeId;
    fn replace_with_shape(&mut self, old: ShapeId, shape: Shape);
    /// Swap a group of shapes for another; the new ones take the position of the first old one.
    fn replace_with_shapes(&mut self, old: &[ShapeId], shapes: Vec<Shape>);
    fn insert_after_shape(&mut self, after: ShapeId, shape: Shape);
    fn remove_shape(&mut self, id: ShapeId);
    /// Topmost visible shape under the pixel.
    fn shape_at(&self, x: f64, y: f64) -> Option<ShapeId>;
    fn last_shape_id(&self) -> Option<ShapeId>;
    /// Flush all pending operations in one paint.
    fn render(&mut self);
    /// Drop every shape.
    fn reset(&mut self);
    /// Every shape in paint order, pending ones included.
    fn shapes(&self) -> Vec<Shape>;
    fn export(&self) -> Result<Exported>;
}

pub type SharedSurface = Rc<RefCell<Box<dyn DrawingSurface>>>;

pub fn share(surface: Box<dyn DrawingSurface>) -> SharedSurface {
    Rc::new(RefCell::new(surface))
}

/// Creates surfaces for one backend, chosen once at startup.
pub trait SurfaceProvider {
    fn backend(&self) -> Option<BackendKind>;
    fn create(&self, width: u32, height: u32, interactive: bool) -> Option<Box<dyn DrawingSurface>>;
}

/// Stand-in for an environment where no backend works; every chart ends up disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedProvider;

impl SurfaceProvider for UnsupportedProvider {
    fn backend(&self) -> Option<BackendKind> {
        None
    }

    fn create(&self, _width: u32, _height: u32, _interactive: bool) -> Option<Box<dyn DrawingSurface>> {
        None
    }
}

/// Ordered shape sequence with id-addressed edits; the bookkeeping both backends share.
#[derive(Clone, Debug, Default)]
pub struct ShapeList {
    seq: Vec<Shape>,
}

impl ShapeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, shape: Shape) {
        self.seq.push(shape);
    }

    pub fn position(&self, id: ShapeId) -> Option<usize> {
        self.seq.iter().position(|s| s.id == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.position(id).is_some()
    }

    pub fn replace(&mut self, old: ShapeId, shape: Shape) -> bool {
        match self.position(old) {
            Some(i) => {
                self.seq[i] = shape;
                true
            }
            None => false,
        }
    }

    /// Remove `old`, inserting `shapes` where the earliest of them stood (at the end if none was present).
    pub fn replace_many(&mut self, old: &[ShapeId], shapes: Vec<Shape>) {
        let first = self.seq.iter().position(|s| old.contains(&s.id));
        self.seq.retain(|s| !old.contains(&s.id));
        let at = first.unwrap_or(self.seq.len());
        self.seq.splice(at..at, shapes);
    }

    pub fn insert_after(&mut self, after: ShapeId, shape: Shape) -> bool {
        match self.position(after) {
            Some(i) => {
                self.seq.insert(i + 1, shape);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        self.position(id).map(|i| self.seq.remove(i))
    }

    pub fn last_id(&self) -> Option<ShapeId> {
        self.seq.last().map(|s| s.id)
    }

    pub fn clear(&mut self) {
        self.seq.clear();
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Shape> {
        self.seq.iter()
    }

    pub fn to_vec(&self) -> Vec<Shape> {
        self.seq.clone()
    }
}
