// File: crates/spark-render-skia/src/text.rs
// Summary: Skia textlayout shaper used to size tooltip content.

use skia_safe as skia;
use skia::textlayout::{FontCollection, Paragraph, ParagraphBuilder, ParagraphStyle, TextStyle};
use spark_core::tooltip::{visible_text, TextMeasure};

pub struct TextShaper {
    fonts: FontCollection,
    size: f32,
    padding: f32,
}

impl TextShaper {
    /// Tooltip default: 10px sans with 5px padding on each side.
    pub fn new() -> Self {
        Self::with_size(10.0, 5.0)
    }

    pub fn with_size(size: f32, padding: f32) -> Self {
        let mut fc = FontCollection::new();
        // Use system manager fallback
        fc.set_default_font_manager(skia::FontMgr::default(), None);
        Self { fonts: fc, size: size.max(1.0), padding: padding.max(0.0) }
    }

    fn make_style(&self) -> TextStyle {
        let mut ts = TextStyle::new();
        ts.set_font_size(self.size);
        ts.set_color(skia::Color::BLACK);
        ts.set_font_families(&["Segoe UI", "Arial", "Helvetica", "Roboto", "DejaVu Sans", "sans-serif"]);
        ts
    }

    pub fn layout(&self, text: &str) -> Paragraph {
        let mut pstyle = ParagraphStyle::new();
        pstyle.set_text_align(skia::textlayout::TextAlign::Left);
        let mut builder = ParagraphBuilder::new(&pstyle, &self.fonts);
        builder.push_style(&self.make_style());
        builder.add_text(text);
        let mut paragraph = builder.build();
        paragraph.layout(10_000.0);
        paragraph
    }

    /// Width of the longest line of plain text.
    pub fn measure_width(&self, text: &str) -> f32 {
        self.layout(text).longest_line()
    }
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for TextShaper {
    fn measure(&self, markup: &str) -> (f64, f64) {
        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for line in markup.split('\n') {
            let p = self.layout(&visible_text(line));
            width = width.max(p.longest_line());
            // Empty lines still take a line box.
            height += p.height().max(self.size);
        }
        let pad = self.padding * 2.0;
        ((width + pad) as f64, (height + pad) as f64)
    }
}
