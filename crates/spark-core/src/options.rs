// File: crates/spark-core/src/options.rs
// Summary: Option values, the shared defaults store and the layered per-chart option resolver.
// Notes:
// - Defaults are built once (`Defaults::standard`, optionally overridden from JSON) and then
//   shared read-only through an `Arc`. Resolution never writes into them.
// - A chart's `Options` is an ordered list of providers (tag attributes, caller options,
//   defaults) queried highest priority first, memoized per key.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::format::FieldSet;
use crate::color::Color;
use crate::error::{Result, SparklineError};
use crate::range_map::RangeMap;
use crate::types::{normalize_value, parse_number, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Line,
    Bar,
    Tristate,
    Discrete,
    Bullet,
    Pie,
    Box,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Tristate,
        ChartKind::Discrete,
        ChartKind::Bullet,
        ChartKind::Pie,
        ChartKind::Box,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Tristate => "tristate",
            ChartKind::Discrete => "discrete",
            ChartKind::Bullet => "bullet",
            ChartKind::Pie => "pie",
            ChartKind::Box => "box",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = SparklineError;
    fn from_str(s: &str) -> Result<Self> {
        ChartKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SparklineError::UnknownChartType(s.to_string()))
    }
}

/// A single option value.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<OptionValue>),
    Map(IndexMap<String, OptionValue>),
}

impl OptionValue {
    pub fn is_null(&self) -> bool {
        matches!(self, OptionValue::Null)
    }

    /// Loose truthiness: null, false, 0, NaN and "" are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Null => false,
            OptionValue::Bool(b) => *b,
            OptionValue::Number(n) => *n != 0.0 && !n.is_nan(),
            OptionValue::Text(s) => !s.is_empty(),
            OptionValue::List(_) | OptionValue::Map(_) => true,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            OptionValue::Text(s) => parse_number(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[OptionValue]> {
        match self {
            OptionValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, OptionValue>> {
        match self {
            OptionValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Parse as a colour; falsy values disable the colour silently, junk is logged.
    pub fn as_color(&self) -> Option<Color> {
        if !self.is_truthy() {
            return None;
        }
        let text = self.as_str()?;
        let parsed = Color::parse(text);
        if parsed.is_none() {
            log::warn!("ignoring unparsable colour `{text}`");
        }
        parsed
    }

    /// Render as display text, the way a tooltip label is shown.
    pub fn to_text(&self) -> String {
        match self {
            OptionValue::Null => String::new(),
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::Number(n) => crate::types::number_to_string(*n),
            OptionValue::Text(s) => s.clone(),
            OptionValue::List(items) => items.iter().map(OptionValue::to_text).collect::<Vec<_>>().join(","),
            OptionValue::Map(_) => "[object]".to_string(),
        }
    }

    /// Interpret a map as a label lookup table.
    pub fn to_label_map(&self) -> Option<RangeMap<String>> {
        let map = self.as_map()?;
        Some(map.iter().map(|(k, v)| (k.clone(), v.to_text())).collect())
    }

    /// Interpret a map as a colour lookup table; entries that are not colours are skipped.
    pub fn to_color_map(&self) -> Option<RangeMap<Color>> {
        let map = self.as_map()?;
        Some(
            map.iter()
                .filter_map(|(k, v)| v.as_color().map(|c| (k.clone(), c)))
                .collect(),
        )
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self { OptionValue::Bool(b) }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self { OptionValue::Number(n) }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self { OptionValue::Number(n as f64) }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self { OptionValue::Text(s.to_string()) }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self { OptionValue::Text(s) }
}

impl<T: Into<OptionValue>> From<Vec<T>> for OptionValue {
    fn from(items: Vec<T>) -> Self { OptionValue::List(items.into_iter().map(Into::into).collect()) }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for OptionValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        OptionValue::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<Value> for OptionValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Undefined | Value::Null => OptionValue::Null,
            Value::Bool(b) => OptionValue::Bool(b),
            Value::Number(n) => OptionValue::Number(n),
            Value::Text(s) => OptionValue::Text(s),
            Value::List(items) => OptionValue::List(items.into_iter().map(Into::into).collect()),
        }
    }
}

impl From<serde_json::Value> for OptionValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => OptionValue::Null,
            J::Bool(b) => OptionValue::Bool(b),
            J::Number(n) => n.as_f64().map_or(OptionValue::Null, OptionValue::Number),
            J::String(s) => OptionValue::Text(s),
            J::Array(items) => OptionValue::List(items.into_iter().map(Into::into).collect()),
            J::Object(map) => OptionValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

/// A width or height as given in options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dimension {
    Auto,
    Px(f64),
    Em(f64),
}

impl Dimension {
    pub fn parse(value: Option<&OptionValue>) -> Self {
        match value {
            Some(OptionValue::Number(n)) => Dimension::Px(*n),
            Some(OptionValue::Text(s)) => Self::parse_str(s),
            _ => Dimension::Auto,
        }
    }

    pub fn parse_str(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Dimension::Auto;
        }
        if let Some(em) = s.strip_suffix("em").and_then(parse_number) {
            return Dimension::Em(em);
        }
        s.strip_suffix("px")
            .unwrap_or(s)
            .parse::<f64>()
            .map(Dimension::Px)
            .unwrap_or(Dimension::Auto)
    }

    /// Resolve to whole pixels, using `auto` when unspecified.
    pub fn to_px(self, em_px: f64, auto: f64) -> u32 {
        let px = match self {
            Dimension::Auto => auto,
            Dimension::Px(px) => px,
            Dimension::Em(em) => em * em_px,
        };
        if px.is_finite() && px > 0.0 { px.round() as u32 } else { 0 }
    }
}

type Table = IndexMap<String, OptionValue>;

fn table(entries: Vec<(&str, OptionValue)>) -> Table {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

const PALETTE: [&str; 8] = [
    "#3366cc", "#dc3912", "#ff9900", "#109618", "#66aa00", "#dd4477", "#0099c6", "#990099",
];

/// Process-wide default option tables: one common table and one per chart type.
#[derive(Clone, Debug, PartialEq)]
pub struct Defaults {
    common: Table,
    per_kind: HashMap<ChartKind, Table>,
}

impl Defaults {
    pub fn standard() -> Self {
        let common = table(vec![
            ("type", "line".into()),
            ("lineColor", "#00f".into()),
            ("fillColor", "#cdf".into()),
            ("defaultPixelsPerValue", 3.into()),
            ("width", "auto".into()),
            ("height", "auto".into()),
            ("composite", false.into()),
            ("tagValuesAttribute", "values".into()),
            ("tagOptionsPrefix", "spark".into()),
            ("enableTagOptions", false.into()),
            ("enableHighlight", true.into()),
            ("highlightLighten", 1.4.into()),
            ("tooltipSkipNull", true.into()),
            ("tooltipPrefix", "".into()),
            ("tooltipSuffix", "".into()),
            ("disableHiddenCheck", false.into()),
            ("numberFormatter", false.into()),
            ("numberDigitGroupCount", 3.into()),
            ("numberDigitGroupSep", ",".into()),
            ("numberDecimalMark", ".".into()),
            ("disableTooltips", false.into()),
            ("disableInteraction", false.into()),
        ]);

        let mut per_kind = HashMap::new();
        per_kind.insert(ChartKind::Line, table(vec![
            ("spotColor", "#f80".into()),
            ("highlightSpotColor", "#5f5".into()),
            ("highlightLineColor", "#f22".into()),
            ("spotRadius", 1.5.into()),
            ("minSpotColor", "#f80".into()),
            ("maxSpotColor", "#f80".into()),
            ("lineWidth", 1.into()),
            ("normalRangeColor", "#ccc".into()),
            ("drawNormalOnTop", false.into()),
            ("tooltipFormat", "<span style=\"color: {{color}}\">&#9679;</span> {{prefix}}{{y}}{{suffix}}".into()),
        ]));
        per_kind.insert(ChartKind::Bar, table(vec![
            ("barColor", "#3366cc".into()),
            ("negBarColor", "#f44".into()),
            ("stackedBarColor", PALETTE.to_vec().into()),
            ("zeroAxis", true.into()),
            ("barWidth", 4.into()),
            ("barSpacing", 1.into()),
            ("chartRangeClip", false.into()),
            ("tooltipFormat", "<span style=\"color: {{color}}\">&#9679;</span> {{prefix}}{{value}}{{suffix}}".into()),
        ]));
        per_kind.insert(ChartKind::Tristate, table(vec![
            ("barWidth", 4.into()),
            ("barSpacing", 1.into()),
            ("posBarColor", "#6f6".into()),
            ("negBarColor", "#f44".into()),
            ("zeroBarColor", "#999".into()),
            ("colorMap", OptionValue::Map(IndexMap::new())),
            ("tooltipFormat", "<span style=\"color: {{color}}\">&#9679;</span> {{value:map}}".into()),
            ("tooltipValueLookups", [(
                "map",
                [("-1", "Loss"), ("0", "Draw"), ("1", "Win")].into_iter().collect::<OptionValue>(),
            )].into_iter().collect()),
        ]));
        per_kind.insert(ChartKind::Discrete, table(vec![
            ("lineHeight", "auto".into()),
            ("thresholdValue", 0.into()),
            ("chartRangeClip", false.into()),
            ("tooltipFormat", "{{prefix}}{{value}}{{suffix}}".into()),
        ]));
        per_kind.insert(ChartKind::Bullet, table(vec![
            ("targetColor", "#f33".into()),
            ("targetWidth", 3.into()),
            ("performanceColor", "#33f".into()),
            ("rangeColors", vec!["#d3dafe", "#a8b6ff", "#7f94ff"].into()),
            ("tooltipFormat", "{{fieldkey:fields}} - {{value}}".into()),
            ("tooltipValueLookups", [(
                "fields",
                [("r", "Range"), ("p", "Performance"), ("t", "Target")].into_iter().collect::<OptionValue>(),
            )].into_iter().collect()),
        ]));
        per_kind.insert(ChartKind::Pie, table(vec![
            ("offset", 0.into()),
            ("sliceColors", PALETTE.to_vec().into()),
            ("borderWidth", 0.into()),
            ("borderColor", "#000".into()),
            ("tooltipFormat", "<span style=\"color: {{color}}\">&#9679;</span> {{value}} ({{percent.1}}%)".into()),
        ]));
        per_kind.insert(ChartKind::Box, table(vec![
            ("raw", false.into()),
            ("boxLineColor", "#000".into()),
            ("boxFillColor", "#cdf".into()),
            ("whiskerColor", "#000".into()),
            ("outlierLineColor", "#333".into()),
            ("outlierFillColor", "#fff".into()),
            ("medianColor", "#f00".into()),
            ("showOutliers", true.into()),
            ("outlierIQR", 1.5.into()),
            ("spotRadius", 1.5.into()),
            ("targetColor", "#4a2".into()),
            ("tooltipFormat", "{{field:fields}}: {{value}}".into()),
            ("tooltipFormatFieldlistKey", "field".into()),
            ("tooltipValueLookups", [(
                "fields",
                [
                    ("lq", "Lower Quartile"),
                    ("med", "Median"),
                    ("uq", "Upper Quartile"),
                    ("lo", "Left Outlier"),
                    ("ro", "Right Outlier"),
                    ("lw", "Left Whisker"),
                    ("rw", "Right Whisker"),
                ].into_iter().collect::<OptionValue>(),
            )].into_iter().collect()),
        ]));

        Self { common, per_kind }
    }

    /// Merge a JSON object of the form `{"common": {...}, "bar": {...}}` over these defaults.
    pub fn with_json_overrides(mut self, json: &str) -> Result<Self> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(sections) = parsed else {
            return Err(SparklineError::DefaultsShape(parsed.to_string()));
        };
        for (section, body) in sections {
            let serde_json::Value::Object(entries) = body else {
                return Err(SparklineError::DefaultsShape(format!("section `{section}` is not an object")));
            };
            let target = if section == "common" {
                &mut self.common
            } else {
                let kind: ChartKind = section.parse()?;
                self.per_kind.entry(kind).or_default()
            };
            for (key, value) in entries {
                target.insert(key, value.into());
            }
        }
        Ok(self)
    }

    pub fn common(&self, key: &str) -> Option<&OptionValue> {
        self.common.get(key)
    }

    pub fn for_kind(&self, kind: ChartKind, key: &str) -> Option<&OptionValue> {
        self.per_kind.get(&kind).and_then(|t| t.get(key))
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::standard()
    }
}

pub type NumberFormatter = Rc<dyn Fn(f64) -> String>;
pub type TooltipFormatter = Rc<dyn Fn(&[FieldSet], &Options) -> String>;

/// Options supplied by the caller of `attach`.
#[derive(Clone, Default)]
pub struct UserOptions {
    values: Table,
    number_formatter: Option<NumberFormatter>,
    tooltip_formatter: Option<TooltipFormatter>,
}

impl UserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<OptionValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn with_number_formatter(mut self, f: impl Fn(f64) -> String + 'static) -> Self {
        self.number_formatter = Some(Rc::new(f));
        self
    }

    pub fn with_tooltip_formatter(mut self, f: impl Fn(&[FieldSet], &Options) -> String + 'static) -> Self {
        self.tooltip_formatter = Some(Rc::new(f));
        self
    }

    /// Parse caller options from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        match OptionValue::from(parsed) {
            OptionValue::Map(values) => Ok(Self { values, ..Self::default() }),
            other => Err(SparklineError::DefaultsShape(other.to_text())),
        }
    }
}

impl fmt::Debug for UserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserOptions")
            .field("values", &self.values)
            .field("number_formatter", &self.number_formatter.is_some())
            .field("tooltip_formatter", &self.tooltip_formatter.is_some())
            .finish()
    }
}

/// One layer of option resolution.
pub trait OptionProvider {
    fn name(&self) -> &'static str;
    fn lookup(&self, key: &str) -> Option<OptionValue>;
}

/// Per-tag overrides read from container attributes named `prefix + key`.
pub struct TagOverrides {
    prefix: String,
    attributes: IndexMap<String, String>,
}

impl TagOverrides {
    pub fn new(prefix: impl Into<String>, attributes: IndexMap<String, String>) -> Self {
        Self { prefix: prefix.into(), attributes }
    }
}

impl OptionProvider for TagOverrides {
    fn name(&self) -> &'static str { "tag" }
    fn lookup(&self, key: &str) -> Option<OptionValue> {
        // Attribute names are matched case-insensitively, as markup attributes are.
        let name = format!("{}{}", self.prefix, key);
        self.attributes
            .iter()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(&name))
            .map(|(_, raw)| parse_tag_literal(raw))
    }
}

struct CallerLayer(Table);

impl OptionProvider for CallerLayer {
    fn name(&self) -> &'static str { "caller" }
    fn lookup(&self, key: &str) -> Option<OptionValue> {
        self.0.get(key).cloned()
    }
}

struct DefaultsLayer {
    defaults: Arc<Defaults>,
    kind: ChartKind,
}

impl OptionProvider for DefaultsLayer {
    fn name(&self) -> &'static str { "defaults" }
    fn lookup(&self, key: &str) -> Option<OptionValue> {
        self.defaults
            .for_kind(self.kind, key)
            .or_else(|| self.defaults.common(key))
            .cloned()
    }
}

/// Parse a tag attribute literal: `[a, b]` lists, `{k: v, ...}` maps, else a scalar token.
pub fn parse_tag_literal(raw: &str) -> OptionValue {
    let inner = |s: &str| s.get(1..s.len().saturating_sub(1)).unwrap_or("").to_string();
    if raw.starts_with('[') {
        let body = inner(raw);
        OptionValue::List(body.split(',').map(|t| normalize_value(t.trim()).into()).collect())
    } else if raw.starts_with('{') {
        let body = inner(raw);
        OptionValue::Map(
            body.split(',')
                .filter_map(|pair| {
                    let (k, v) = pair.split_once(':')?;
                    Some((k.trim().to_string(), normalize_value(v.trim()).into()))
                })
                .collect(),
        )
    } else {
        normalize_value(raw).into()
    }
}

/// Resolved options for one chart instance.
#[derive(Clone)]
pub struct Options {
    kind: ChartKind,
    layers: Vec<Rc<dyn OptionProvider>>,
    cache: RefCell<HashMap<String, Option<OptionValue>>>,
    number_formatter: Option<NumberFormatter>,
    tooltip_formatter: Option<TooltipFormatter>,
}

impl Options {
    /// Resolve options for a container. `attributes` are only consulted when the caller
    /// enabled tag options; the chart type may itself come from a tag attribute.
    pub fn resolve(
        defaults: &Arc<Defaults>,
        user: &UserOptions,
        attributes: Option<&IndexMap<String, String>>,
    ) -> Result<Self> {
        let mut layers: Vec<Rc<dyn OptionProvider>> = Vec::with_capacity(3);
        let tags_enabled = user.get("enableTagOptions").is_some_and(OptionValue::is_truthy);
        if let (true, Some(attrs)) = (tags_enabled, attributes) {
            let prefix = user
                .get("tagOptionsPrefix")
                .filter(|v| v.is_truthy())
                .or_else(|| defaults.common("tagOptionsPrefix"))
                .map(OptionValue::to_text)
                .unwrap_or_default();
            layers.push(Rc::new(TagOverrides::new(prefix, attrs.clone())));
        }
        layers.push(Rc::new(CallerLayer(user.values.clone())));

        let kind_value = layers
            .iter()
            .find_map(|l| l.lookup("type"))
            .or_else(|| defaults.common("type").cloned())
            .unwrap_or(OptionValue::Null);
        let kind: ChartKind = kind_value.to_text().parse()?;

        layers.push(Rc::new(DefaultsLayer { defaults: Arc::clone(defaults), kind }));
        Ok(Self {
            kind,
            layers,
            cache: RefCell::new(HashMap::new()),
            number_formatter: user.number_formatter.clone(),
            tooltip_formatter: user.tooltip_formatter.clone(),
        })
    }

    /// Shorthand for programmatic use: caller options with an explicit chart type.
    pub fn for_kind(defaults: &Arc<Defaults>, kind: ChartKind, user: UserOptions) -> Self {
        let user = user.set("type", kind.as_str());
        let layers: Vec<Rc<dyn OptionProvider>> = vec![
            Rc::new(CallerLayer(user.values.clone())),
            Rc::new(DefaultsLayer { defaults: Arc::clone(defaults), kind }),
        ];
        Self {
            kind,
            layers,
            cache: RefCell::new(HashMap::new()),
            number_formatter: user.number_formatter,
            tooltip_formatter: user.tooltip_formatter,
        }
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// Raw lookup through every layer, highest priority first. An explicit null still
    /// wins over lower layers.
    pub fn get(&self, key: &str) -> Option<OptionValue> {
        if let Some(hit) = self.cache.borrow().get(key) {
            return hit.clone();
        }
        let found = self.layers.iter().find_map(|l| l.lookup(key));
        self.cache.borrow_mut().insert(key.to_string(), found.clone());
        found
    }

    /// Present and not null.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_f64())
    }

    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.f64(key).unwrap_or(default)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v.is_truthy())
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_null()).map(|v| v.to_text())
    }

    pub fn color(&self, key: &str) -> Option<Color> {
        self.get(key).and_then(|v| v.as_color())
    }

    /// A colour list; a single colour yields a one-element list.
    pub fn colors(&self, key: &str) -> Vec<Color> {
        match self.get(key) {
            Some(OptionValue::List(items)) => items.iter().filter_map(OptionValue::as_color).collect(),
            Some(other) => other.as_color().into_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn dimension(&self, key: &str) -> Dimension {
        Dimension::parse(self.get(key).as_ref())
    }

    pub fn number_formatter(&self) -> Option<&NumberFormatter> {
        self.number_formatter.as_ref()
    }

    pub fn tooltip_formatter(&self) -> Option<&TooltipFormatter> {
        self.tooltip_formatter.as_ref()
    }

    /// Names of the resolution layers, highest priority first.
    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|l| l.name()).collect()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("kind", &self.kind)
            .field("layers", &self.layer_names())
            .finish()
    }
}
