// File: crates/spark-core/tests/options.rs
// Purpose: Layered option resolution: defaults, caller options, tag attributes and JSON overrides.

use std::sync::Arc;

use indexmap::IndexMap;
use spark_core::options::parse_tag_literal;
use spark_core::{ChartKind, Defaults, Dimension, OptionValue, Options, SparklineError, UserOptions};

fn defaults() -> Arc<Defaults> {
    Arc::new(Defaults::standard())
}

fn attrs(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn type_defaults_fill_in_under_caller_options() {
    let opts = Options::for_kind(&defaults(), ChartKind::Bar, UserOptions::new());
    assert_eq!(opts.text("barColor").as_deref(), Some("#3366cc"));
    assert_eq!(opts.text("lineColor").as_deref(), Some("#00f"));

    let opts = Options::for_kind(&defaults(), ChartKind::Bar, UserOptions::new().set("barColor", "red"));
    assert_eq!(opts.text("barColor").as_deref(), Some("red"));
}

#[test]
fn unspecified_type_is_line_and_unknown_type_fails() -> anyhow::Result<()> {
    let opts = Options::resolve(&defaults(), &UserOptions::new(), None)?;
    assert_eq!(opts.kind(), ChartKind::Line);
    assert_eq!(opts.layer_names(), vec!["caller", "defaults"]);

    let err = Options::resolve(&defaults(), &UserOptions::new().set("type", "radar"), None);
    assert!(matches!(err, Err(SparklineError::UnknownChartType(t)) if t == "radar"));
    Ok(())
}

#[test]
fn tag_attributes_only_apply_when_enabled() -> anyhow::Result<()> {
    let tags = attrs(&[("sparkType", "bar"), ("sparkBarColor", "#0f0"), ("sparkColorMap", "[red, blue]")]);

    let off = Options::resolve(&defaults(), &UserOptions::new(), Some(&tags))?;
    assert_eq!(off.kind(), ChartKind::Line);

    let user = UserOptions::new().set("enableTagOptions", true).set("barColor", "red");
    let on = Options::resolve(&defaults(), &user, Some(&tags))?;
    assert_eq!(on.kind(), ChartKind::Bar);
    assert_eq!(on.layer_names(), vec!["tag", "caller", "defaults"]);
    assert_eq!(on.text("barColor").as_deref(), Some("#0f0"));
    assert_eq!(on.colors("colorMap").len(), 2);
    Ok(())
}

#[test]
fn custom_tag_prefix() -> anyhow::Result<()> {
    let tags = attrs(&[("dataHeight", "20")]);
    let user = UserOptions::new().set("enableTagOptions", true).set("tagOptionsPrefix", "data");
    let opts = Options::resolve(&defaults(), &user, Some(&tags))?;
    assert_eq!(opts.f64("height"), Some(20.0));
    Ok(())
}

#[test]
fn tag_literals() {
    assert_eq!(
        parse_tag_literal("[1, 2, null]"),
        OptionValue::List(vec![1.0.into(), 2.0.into(), OptionValue::Null])
    );
    let map = parse_tag_literal("{-1: red, 1: green}");
    let keys: Vec<&str> = map.as_map().map(|m| m.keys().map(String::as_str).collect()).unwrap_or_default();
    assert_eq!(keys, vec!["-1", "1"]);
    assert_eq!(parse_tag_literal("false"), OptionValue::Bool(false));
    assert_eq!(parse_tag_literal("#abc"), OptionValue::Text("#abc".into()));
}

#[test]
fn dimensions() {
    assert_eq!(Dimension::parse_str("auto"), Dimension::Auto);
    assert_eq!(Dimension::parse_str("2em"), Dimension::Em(2.0));
    assert_eq!(Dimension::parse_str("10px"), Dimension::Px(10.0));
    assert_eq!(Dimension::parse_str("12"), Dimension::Px(12.0));
    assert_eq!(Dimension::Em(2.0).to_px(16.0, 0.0), 32);
    assert_eq!(Dimension::Auto.to_px(16.0, 21.4), 21);
}

#[test]
fn json_overrides_and_caller_json() -> anyhow::Result<()> {
    let overridden = Defaults::standard().with_json_overrides(r##"{"common": {"lineColor": "#123"}, "bar": {"barWidth": 6}}"##)?;
    let defaults = Arc::new(overridden);
    let bar = Options::for_kind(&defaults, ChartKind::Bar, UserOptions::new());
    assert_eq!(bar.f64("barWidth"), Some(6.0));
    assert_eq!(bar.text("lineColor").as_deref(), Some("#123"));

    assert!(Defaults::standard().with_json_overrides("[1, 2]").is_err());
    assert!(Defaults::standard().with_json_overrides(r#"{"radar": {}}"#).is_err());
    assert!(Defaults::standard().with_json_overrides("{not json").is_err());

    let user = UserOptions::from_json(r##"{"type": "pie", "sliceColors": ["#f00", "#0f0"]}"##)?;
    let pie = Options::resolve(&defaults, &user, None)?;
    assert_eq!(pie.kind(), ChartKind::Pie);
    assert_eq!(pie.colors("sliceColors").len(), 2);
    Ok(())
}

#[test]
fn explicit_null_wins_over_defaults() {
    let opts = Options::for_kind(&defaults(), ChartKind::Line, UserOptions::new().set("spotColor", OptionValue::Null));
    assert!(opts.get("spotColor").is_some_and(|v| v.is_null()));
    assert!(!opts.is_set("spotColor"));
    assert_eq!(opts.color("spotColor"), None);
}
