// File: crates/spark-core/src/format.rs
// Summary: Tooltip field sets and the `{{field}}` template renderer with value lookups.

use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};

use crate::options::{OptionValue, Options};
use crate::range_map::RangeMap;
use crate::stats::format_number;
use crate::types::number_to_string;

/// One field of a tooltip field set.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Number(n) => f.write_str(&number_to_string(*n)),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self { FieldValue::Number(n) }
}

impl From<Option<f64>> for FieldValue {
    fn from(n: Option<f64>) -> Self { n.map_or(FieldValue::Null, FieldValue::Number) }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self { FieldValue::Text(s.to_string()) }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self { FieldValue::Text(s) }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self { FieldValue::Bool(b) }
}

/// Named values describing the highlighted region of a chart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldSet {
    pub is_null: bool,
    pub fields: IndexMap<String, FieldValue>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn null(mut self, is_null: bool) -> Self {
        self.is_null = is_null;
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<FieldValue>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

/// Named label tables referenced by `{{field:name}}` tokens.
#[derive(Clone, Debug, Default)]
pub struct Lookups(IndexMap<String, RangeMap<String>>);

impl Lookups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, table: RangeMap<String>) {
        self.0.insert(name.to_string(), table);
    }

    pub fn get(&self, name: &str) -> Option<&RangeMap<String>> {
        self.0.get(name)
    }

    /// Build from a `tooltipValueLookups` option value (a map of maps).
    pub fn from_option(value: Option<&OptionValue>) -> Self {
        let mut lookups = Lookups::new();
        if let Some(map) = value.and_then(OptionValue::as_map) {
            for (name, table) in map {
                if let Some(table) = table.to_label_map() {
                    lookups.insert(name, table);
                }
            }
        }
        lookups
    }
}

/// Number formatting settings taken from resolved options.
#[derive(Clone, Debug)]
pub struct NumberStyle {
    pub group_size: usize,
    pub group_sep: String,
    pub decimal_mark: String,
}

impl Default for NumberStyle {
    fn default() -> Self {
        Self { group_size: 3, group_sep: ",".into(), decimal_mark: ".".into() }
    }
}

impl NumberStyle {
    pub fn from_options(options: &Options) -> Self {
        let base = Self::default();
        Self {
            group_size: options.f64("numberDigitGroupCount").map_or(base.group_size, |n| n.max(0.0) as usize),
            group_sep: options.text("numberDigitGroupSep").unwrap_or(base.group_sep),
            decimal_mark: options.text("numberDecimalMark").unwrap_or(base.decimal_mark),
        }
    }
}

fn token_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([\w.]+?)(:(.+?))?\}\}").ok()).as_ref()
}

fn precision_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w+)\.(\d+)").ok()).as_ref()
}

/// A tooltip template. `class` is the CSS class of the wrapping element.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipFormat {
    pub template: String,
    pub class: Option<String>,
}

impl TooltipFormat {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into(), class: None }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Formats from a `tooltipFormat` option: a string, a `{format, class}` map or a list of either.
    pub fn list_from_option(value: Option<&OptionValue>) -> Vec<TooltipFormat> {
        fn one(v: &OptionValue) -> Option<TooltipFormat> {
            match v {
                OptionValue::Text(s) if !s.is_empty() => Some(TooltipFormat::new(s.clone())),
                OptionValue::Map(m) => {
                    let template = m.get("format")?.as_str()?;
                    let fmt = TooltipFormat::new(template);
                    Some(match m.get("class").and_then(OptionValue::as_str) {
                        Some(class) => fmt.with_class(class),
                        None => fmt,
                    })
                }
                _ => None,
            }
        }
        match value {
            Some(OptionValue::List(items)) => items.iter().filter_map(one).collect(),
            Some(v) => one(v).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Substitute every token. Missing fields render as the empty string.
    pub fn render(
        &self,
        fields: &FieldSet,
        lookups: &Lookups,
        style: &NumberStyle,
        formatter: Option<&dyn Fn(f64) -> String>,
    ) -> String {
        let Some(re) = token_re() else {
            log::error!("tooltip token pattern failed to compile");
            return self.template.clone();
        };
        re.replace_all(&self.template, |caps: &Captures| {
            let raw = caps.get(1).map_or("", |m| m.as_str());
            let (name, precision) = split_precision(raw);
            let Some(value) = fields.get(name) else {
                return String::new();
            };
            if let Some(table) = caps.get(3).and_then(|m| lookups.get(m.as_str())) {
                let hit = match value {
                    FieldValue::Number(n) => table.get(*n),
                    other => table.get_key(&other.to_string()),
                };
                return hit.cloned().unwrap_or_else(|| value.to_string());
            }
            match value {
                FieldValue::Number(n) => match formatter {
                    Some(f) => f(*n),
                    None => format_number(*n, precision, style.group_size, &style.group_sep, &style.decimal_mark),
                },
                other => other.to_string(),
            }
        })
        .into_owned()
    }

    /// Render using the formatter and number settings of `options`.
    pub fn render_with(&self, fields: &FieldSet, lookups: &Lookups, options: &Options) -> String {
        let style = NumberStyle::from_options(options);
        let formatter = options.number_formatter().map(|f| f.as_ref() as &dyn Fn(f64) -> String);
        self.render(fields, lookups, &style, formatter)
    }
}

fn split_precision(token: &str) -> (&str, Option<usize>) {
    let Some(caps) = precision_re().and_then(|re| re.captures(token)) else {
        return (token, None);
    };
    match (caps.get(1), caps.get(2).and_then(|m| m.as_str().parse().ok())) {
        (Some(name), Some(p)) => (name.as_str(), Some(p)),
        _ => (token, None),
    }
}
