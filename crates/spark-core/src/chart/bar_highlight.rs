// File: crates/spark-core/src/chart/bar_highlight.rs
// Summary: Region-per-value rendering and highlight swapping shared by bar, tristate and discrete charts.

use crate::chart::{ChartRenderer, Region};
use crate::surface::{Shape, ShapeId};

/// Charts whose regions are one value each, drawn as zero or more shapes.
///
/// Implementors describe how a single region is drawn; rendering and highlight
/// toggling come from the provided methods.
pub trait BarRegionHighlighting: ChartRenderer {
    fn region_count(&self) -> usize;
    /// Shapes for one region; empty when the value draws nothing.
    fn render_region(&self, index: usize, highlight: bool) -> Vec<Shape>;
    fn region_shapes(&self) -> &[Vec<ShapeId>];
    fn region_shapes_mut(&mut self) -> &mut Vec<Vec<ShapeId>>;

    /// Append every region, last value first, then paint once.
    fn render_regions(&mut self) -> bool {
        if !self.base_mut().begin_render() {
            return false;
        }
        let count = self.region_count();
        let mut by_region = vec![Vec::new(); count];
        for i in (0..count).rev() {
            let shapes = self.render_region(i, false);
            by_region[i] = shapes.into_iter().map(|s| self.base_mut().append(s)).collect();
        }
        *self.region_shapes_mut() = by_region;
        self.base().flush();
        true
    }

    /// Swap the current region's shapes for plain or highlighted ones.
    ///
    /// A stack may come back with a different number of shapes than it had, so the
    /// whole group is swapped and the region's id list rebuilt from what was inserted.
    fn highlight_region(&mut self, highlight: bool) {
        let Some(Region::Value(i)) = self.base().current_region else {
            return;
        };
        let old = match self.region_shapes().get(i) {
            Some(ids) if !ids.is_empty() => ids.clone(),
            _ => return,
        };
        let mut shapes = self.render_region(i, highlight);
        let ids = if old.len() == 1 && shapes.len() == 1 {
            let shape = shapes.remove(0);
            vec![self.base_mut().replace(old[0], shape)]
        } else {
            self.base_mut().replace_many(&old, shapes)
        };
        if let Some(slot) = self.region_shapes_mut().get_mut(i) {
            *slot = ids;
        }
    }
}
