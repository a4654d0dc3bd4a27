// File: crates/spark-render-skia/src/raster.rs
// Summary: Immediate-mode surface; every render clears the canvas and repaints the whole shape sequence.

use std::path::Path;

use anyhow::{Context, Result};
use skia_safe as skia;
use spark_core::geometry::Point;
use spark_core::surface::{
    BackendKind, DrawingSurface, Exported, Primitive, Shape, ShapeId, ShapeList, SurfaceProvider,
};
use spark_core::{Color, SparklineError};

/// Paths and rectangles are drawn on pixel centres so one-pixel strokes stay crisp.
const PIXEL_OFFSET: f32 = 0.5;

pub struct RasterSurface {
    width: u32,
    height: u32,
    interactive: bool,
    surface: skia::Surface,
    shapes: ShapeList,
    // Snapshot of the last paint; exports read from it.
    frame: skia::Image,
}

impl RasterSurface {
    /// `None` when Skia cannot allocate a CPU surface of that size.
    pub fn new(width: u32, height: u32, interactive: bool) -> Option<Self> {
        let mut surface = skia::surfaces::raster_n32_premul((width.max(1) as i32, height.max(1) as i32))?;
        surface.canvas().clear(skia::Color::TRANSPARENT);
        let frame = surface.image_snapshot();
        Some(Self { width, height, interactive, surface, shapes: ShapeList::new(), frame })
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Last paint as unpremultiplied RGBA8: (pixels, width, height, row bytes).
    pub fn to_rgba8(&self) -> Result<(Vec<u8>, u32, u32, usize)> {
        let (w, h) = (self.frame.width(), self.frame.height());
        let info = skia::ImageInfo::new((w, h), skia::ColorType::RGBA8888, skia::AlphaType::Unpremul, None);
        let row_bytes = w as usize * 4;
        let mut pixels = vec![0u8; row_bytes * h as usize];
        let ok = self.frame.read_pixels(&info, pixels.as_mut_slice(), row_bytes, (0, 0), skia::image::CachingHint::Allow);
        if !ok {
            anyhow::bail!("failed to read back {w}x{h} raster pixels");
        }
        Ok((pixels, w as u32, h as u32, row_bytes))
    }

    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        #[allow(deprecated)]
        let data = self
            .frame
            .encode_to_data(skia::EncodedImageFormat::PNG)
            .ok_or_else(|| anyhow::anyhow!("encode PNG failed"))?;
        Ok(data.as_bytes().to_vec())
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.png_bytes()?).with_context(|| format!("writing {}", path.display()))
    }
}

impl DrawingSurface for RasterSurface {
    fn kind(&self) -> BackendKind {
        BackendKind::Raster
    }

    fn pixel_width(&self) -> u32 {
        self.width
    }

    fn pixel_height(&self) -> u32 {
        self.height
    }

    fn append_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id;
        self.shapes.push(shape);
        id
    }

    fn replace_with_shape(&mut self, old: ShapeId, shape: Shape) {
        if !self.shapes.replace(old, shape) {
            log::debug!("raster surface: replace target {old} not found");
        }
    }

    fn replace_with_shapes(&mut self, old: &[ShapeId], shapes: Vec<Shape>) {
        self.shapes.replace_many(old, shapes);
    }

    fn insert_after_shape(&mut self, after: ShapeId, shape: Shape) {
        if !self.shapes.insert_after(after, shape) {
            log::debug!("raster surface: insert anchor {after} not found");
        }
    }

    fn remove_shape(&mut self, id: ShapeId) {
        self.shapes.remove(id);
    }

    fn shape_at(&self, x: f64, y: f64) -> Option<ShapeId> {
        let p = skia::Point::new(x as f32, y as f32);
        self.shapes
            .iter()
            .rev()
            .find(|s| outline(&s.primitive).contains(p))
            .map(|s| s.id)
    }

    fn last_shape_id(&self) -> Option<ShapeId> {
        self.shapes.last_id()
    }

    fn render(&mut self) {
        let canvas = self.surface.canvas();
        canvas.clear(skia::Color::TRANSPARENT);
        for shape in self.shapes.iter() {
            paint_shape(canvas, shape);
        }
        self.frame = self.surface.image_snapshot();
        log::debug!("raster surface repainted {} shapes", self.shapes.len());
    }

    fn reset(&mut self) {
        self.shapes.clear();
        self.surface.canvas().clear(skia::Color::TRANSPARENT);
        self.frame = self.surface.image_snapshot();
    }

    fn shapes(&self) -> Vec<Shape> {
        self.shapes.to_vec()
    }

    fn export(&self) -> spark_core::Result<Exported> {
        self.png_bytes()
            .map(Exported::Png)
            .map_err(|e| SparklineError::Export(e.to_string()))
    }
}

/// Creates Skia CPU raster surfaces.
#[derive(Clone, Copy, Debug, Default)]
pub struct RasterProvider;

impl RasterProvider {
    /// Whether this process can allocate a raster surface at all.
    pub fn available() -> bool {
        skia::surfaces::raster_n32_premul((1, 1)).is_some()
    }
}

impl SurfaceProvider for RasterProvider {
    fn backend(&self) -> Option<BackendKind> {
        Some(BackendKind::Raster)
    }

    fn create(&self, width: u32, height: u32, interactive: bool) -> Option<Box<dyn DrawingSurface>> {
        match RasterSurface::new(width, height, interactive) {
            Some(s) => Some(Box::new(s)),
            None => {
                log::warn!("failed to allocate {width}x{height} raster surface");
                None
            }
        }
    }
}

fn sk_color(c: Color) -> skia::Color {
    skia::Color::from_argb(c.a, c.r, c.g, c.b)
}

fn offset(p: Point) -> (f32, f32) {
    (p.x as f32 + PIXEL_OFFSET, p.y as f32 + PIXEL_OFFSET)
}

/// Outline of a primitive as it is painted.
fn outline(primitive: &Primitive) -> skia::Path {
    let mut path = skia::Path::new();
    match primitive {
        Primitive::Path(points) => {
            if let Some((first, rest)) = points.split_first() {
                path.move_to(offset(*first));
                for p in rest {
                    path.line_to(offset(*p));
                }
            }
        }
        Primitive::Rect { x, y, width, height } => {
            let (x, y, w, h) = (*x, *y, *width, *height);
            let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
            path.move_to(offset(Point::new(corners[0].0, corners[0].1)));
            for (cx, cy) in &corners[1..] {
                path.line_to(offset(Point::new(*cx, *cy)));
            }
            path.close();
        }
        Primitive::Circle { center, radius } => {
            path.add_circle((center.x as f32, center.y as f32), *radius as f32, None);
        }
        Primitive::PieSlice { center, radius, start, end } => {
            let (cx, cy, r) = (center.x as f32, center.y as f32, *radius as f32);
            if primitive.is_full_circle() {
                path.add_circle((cx, cy), r, None);
            } else {
                let oval = skia::Rect::from_xywh(cx - r, cy - r, r * 2.0, r * 2.0);
                path.move_to((cx, cy));
                path.arc_to(oval, start.to_degrees() as f32, (end - start).to_degrees() as f32, false);
                path.close();
            }
        }
    }
    path
}

fn paint_shape(canvas: &skia::Canvas, shape: &Shape) {
    let mut path = outline(&shape.primitive);
    let style = &shape.style;
    if let Some(fill) = style.fill {
        if let Primitive::Path(_) = shape.primitive {
            path.close();
        }
        let mut paint = skia::Paint::default();
        paint.set_anti_alias(true);
        paint.set_style(skia::paint::Style::Fill);
        paint.set_color(sk_color(fill));
        canvas.draw_path(&path, &paint);
    }
    if let Some(stroke) = style.stroke {
        if style.line_width > 0.0 {
            let mut paint = skia::Paint::default();
            paint.set_anti_alias(true);
            paint.set_style(skia::paint::Style::Stroke);
            paint.set_stroke_width(style.line_width as f32);
            paint.set_color(sk_color(stroke));
            canvas.draw_path(&path, &paint);
        }
    }
}
