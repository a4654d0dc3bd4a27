// File: crates/spark-core/src/tooltip.rs
// Summary: Floating tooltip model: sized from its content, placed near the pointer, kept inside the viewport.

use std::rc::Rc;

use crate::geometry::Point;
use crate::options::Options;

/// Measures rendered tooltip markup in pixels (width, height).
pub trait TextMeasure {
    fn measure(&self, markup: &str) -> (f64, f64);
}

/// Fixed-advance estimate: tags are ignored, entities count as one glyph, one line per `\n`.
#[derive(Clone, Copy, Debug)]
pub struct ApproxMeasure {
    pub char_width: f64,
    pub line_height: f64,
    pub padding: f64,
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self { char_width: 7.0, line_height: 14.0, padding: 6.0 }
    }
}

impl TextMeasure for ApproxMeasure {
    fn measure(&self, markup: &str) -> (f64, f64) {
        let lines: Vec<usize> = markup.split('\n').map(visible_chars).collect();
        let widest = lines.iter().copied().max().unwrap_or(0);
        (
            widest as f64 * self.char_width + self.padding,
            lines.len() as f64 * self.line_height + self.padding,
        )
    }
}

/// Visible text of a markup fragment: tags dropped, `&...;` entities decoded to a placeholder glyph.
pub fn visible_text(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    let mut chars = markup.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '&' => {
                let entity: String = chars.clone().take_while(|c| *c != ';').take(10).collect();
                if chars.clone().nth(entity.len()) == Some(';') {
                    for _ in 0..=entity.len() {
                        chars.next();
                    }
                    out.push(decode_entity(&entity));
                } else {
                    out.push('&');
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn decode_entity(entity: &str) -> char {
    match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "nbsp" => ' ',
        _ => entity
            .strip_prefix('#')
            .and_then(|n| n.parse::<u32>().ok())
            .and_then(char::from_u32)
            .unwrap_or('?'),
    }
}

fn visible_chars(line: &str) -> usize {
    visible_text(line).chars().count()
}

/// Scroll position and width of the visible document area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub scroll_left: f64,
    pub scroll_top: f64,
    pub width: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scroll_left: 0.0, scroll_top: 0.0, width: 1024.0 }
    }
}

impl Viewport {
    pub fn scroll_right(&self) -> f64 {
        self.scroll_left + self.width
    }
}

/// One tooltip overlay, shared by every chart on a surface while the pointer is over it.
pub struct Tooltip {
    class_name: String,
    offset_x: f64,
    offset_y: f64,
    container_offset: Point,
    viewport: Viewport,
    measure: Rc<dyn TextMeasure>,
    content: String,
    size: (f64, f64),
    hidden: bool,
    mouse: Option<Point>,
    position: Option<Point>,
}

impl Tooltip {
    pub fn new(options: &Options, measure: Rc<dyn TextMeasure>, viewport: Viewport) -> Self {
        Self {
            class_name: options.text("tooltipClassname").unwrap_or_else(|| "jqstooltip".to_string()),
            offset_x: options.f64_or("tooltipOffsetX", 10.0),
            offset_y: options.f64_or("tooltipOffsetY", 12.0),
            container_offset: Point::default(),
            viewport,
            measure,
            content: String::new(),
            size: (0.0, 0.0),
            hidden: true,
            mouse: None,
            position: None,
        }
    }

    /// Offset of the element the tooltip is positioned within.
    pub fn with_container_offset(mut self, offset: Point) -> Self {
        self.container_offset = offset;
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
    }

    /// Top-left corner, once both content and a pointer position are known.
    pub fn position(&self) -> Option<Point> {
        if self.hidden { None } else { self.position }
    }

    /// Empty content hides the tooltip.
    pub fn set_content(&mut self, content: &str) {
        if content.is_empty() {
            self.hidden = true;
            self.content.clear();
            return;
        }
        let (w, h) = self.measure.measure(content);
        self.size = (w + 1.0, h);
        self.content = content.to_string();
        if self.hidden {
            self.hidden = false;
            self.update_position(None);
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.update_position(None);
    }

    /// Move to a page position, or re-place at the last one with `None`.
    pub fn update_position(&mut self, page: Option<Point>) {
        let p = match page {
            Some(p) => {
                let local = Point::new(p.x - self.container_offset.x, p.y - self.container_offset.y);
                self.mouse = Some(local);
                local
            }
            None => match self.mouse {
                Some(p) => p,
                None => return,
            },
        };
        let (w, h) = self.size;
        if w == 0.0 || h == 0.0 || self.hidden {
            return;
        }
        let mut y = p.y - (h + self.offset_y);
        let mut x = p.x + self.offset_x;
        if y < self.viewport.scroll_top {
            y = self.viewport.scroll_top;
        }
        if x < self.viewport.scroll_left {
            x = self.viewport.scroll_left;
        } else if x + w > self.viewport.scroll_right() {
            x = self.viewport.scroll_right() - w;
        }
        self.position = Some(Point::new(x, y));
    }

    /// Detach: clears content and position.
    pub fn remove(&mut self) {
        self.hidden = true;
        self.content.clear();
        self.position = None;
        self.mouse = None;
    }
}
