// File: crates/spark-core/src/lib.rs
// Summary: Core library entry point; exports the sparkline engine, chart renderers and drawing-surface contract.

pub mod error;
pub mod geometry;
pub mod types;
pub mod stats;
pub mod color;
pub mod range_map;
pub mod options;
pub mod format;
pub mod surface;
pub mod chart;
pub mod tooltip;
pub mod interaction;
pub mod host;

pub use error::{Result, SparklineError};
pub use types::Value;
pub use color::Color;
pub use range_map::RangeMap;
pub use options::{ChartKind, Defaults, Dimension, OptionValue, Options, TagOverrides, UserOptions};
pub use format::{FieldSet, FieldValue, TooltipFormat};
pub use surface::{BackendKind, DrawingSurface, Exported, Shape, ShapeId, SharedSurface, SurfaceProvider, VectorProvider, VectorSurface};
pub use chart::{build_chart, ChartRef, ChartRenderer, Region};
pub use tooltip::{ApproxMeasure, TextMeasure, Tooltip, Viewport};
pub use interaction::{EventBus, InteractionController, PointerEvent, SparklineEvent};
pub use host::{Attachment, Container, ContainerRef, Sparklines, ValueSource};
