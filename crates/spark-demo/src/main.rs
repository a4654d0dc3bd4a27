// File: crates/spark-demo/src/main.rs
// Summary: Loads sparkline rows from CSV (or built-in samples) and writes each chart as PNG and SVG.
// Usage: spark-demo [series.csv] [--defaults overrides.json]
// Logging: level from SPARK_LOG (error|warn|info|debug|trace), default info.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use spark_core::{
    Container, ContainerRef, Defaults, DrawingSurface, Exported, PointerEvent, SparklineEvent, Sparklines, UserOptions, ValueSource,
    VectorProvider,
};
use spark_render_skia::{probe, TextShaper};

/// One CSV row: `name,type,values,options` where values use the inline markup syntax
/// (`"1,2,3"`, `"2:1"` stacks, `null`) and options is an optional JSON object.
#[derive(Debug, Deserialize)]
struct Row {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    values: String,
    #[serde(default)]
    options: Option<String>,
}

fn main() -> Result<()> {
    init_logging()?;

    let mut input: Option<PathBuf> = None;
    let mut defaults_path: Option<PathBuf> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--defaults" {
            let p = args.next().context("--defaults needs a path")?;
            defaults_path = Some(PathBuf::from(p));
        } else {
            input = Some(PathBuf::from(arg));
        }
    }

    let defaults = load_defaults(defaults_path.as_deref())?;
    let rows = match &input {
        Some(path) => load_rows(path).with_context(|| format!("failed to load CSV '{}'", path.display()))?,
        None => builtin_rows(),
    };
    if rows.is_empty() {
        anyhow::bail!("no sparkline rows loaded; check the header is `name,type,values,options`");
    }
    log::info!("rendering {} sparklines", rows.len());

    let raster = Sparklines::new(Arc::clone(&defaults), probe()).with_measure(Rc::new(TextShaper::new()));
    let vector = Sparklines::new(Arc::clone(&defaults), Box::new(VectorProvider));
    raster.events().subscribe(|event| {
        if let SparklineEvent::RegionChange { charts } = event {
            log::debug!("region change over {} chart(s)", charts.len());
        }
    });
    if let Some(css) = raster.take_stylesheet() {
        write_out("tooltip.css", css.as_bytes())?;
    }

    for row in &rows {
        let user = match &row.options {
            Some(json) if !json.trim().is_empty() => UserOptions::from_json(json)
                .with_context(|| format!("options for '{}'", row.name))?,
            _ => UserOptions::new(),
        }
        .set("type", row.kind.as_str());

        for (i, engine) in [&raster, &vector].into_iter().enumerate() {
            let container = Container::new().with_text(&row.values).shared();
            engine.attach(&[container.clone()], ValueSource::Markup, &user);
            export(&container, &row.name)?;
            if i == 0 {
                hover_middle(&container, &row.name);
            }
        }
    }
    Ok(())
}

fn init_logging() -> Result<()> {
    let level = std::env::var("SPARK_LOG")
        .ok()
        .and_then(|v| v.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("installing logger")?;
    Ok(())
}

fn load_defaults(path: Option<&Path>) -> Result<Arc<Defaults>> {
    let defaults = match path {
        Some(p) => {
            let json = std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            Defaults::standard()
                .with_json_overrides(&json)
                .with_context(|| format!("applying defaults from {}", p.display()))?
        }
        None => Defaults::standard(),
    };
    Ok(Arc::new(defaults))
}

fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut rows = Vec::new();
    for (i, record) in rdr.deserialize::<Row>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            // Skip bad lines rather than abort the whole batch.
            Err(e) => log::warn!("row {}: {e}", i + 2),
        }
    }
    Ok(rows)
}

fn builtin_rows() -> Vec<Row> {
    let row = |name: &str, kind: &str, values: &str| Row {
        name: name.to_string(),
        kind: kind.to_string(),
        values: values.to_string(),
        options: None,
    };
    vec![
        row("line", "line", "5,6,7,9,9,5,3,2,2,4,6,7"),
        row("bar", "bar", "5,6,7,2,0,-4,-2,4"),
        row("tristate", "tristate", "1,1,0,1,-1,-1,1,-1,0,0,1,1"),
        row("discrete", "discrete", "4,6,7,7,4,3,2,1,4,4,5,6,7"),
        row("bullet", "bullet", "10,12,12,9,7"),
        row("pie", "pie", "1,1,2"),
        row("box", "box", "4,27,34,52,54,59,61,68,78,82,85,87,91,93,100"),
    ]
}

fn export(container: &ContainerRef, name: &str) -> Result<()> {
    let c = container.borrow();
    if c.surface().is_none() {
        log::warn!("'{name}' produced no chart");
        return Ok(());
    }
    match c.export().with_context(|| format!("exporting '{name}'"))? {
        Exported::Png(bytes) => write_out(&format!("spark_{name}.png"), &bytes),
        Exported::Svg(markup) => write_out(&format!("spark_{name}.svg"), markup.as_bytes()),
    }
}

/// Move the pointer to the middle of the chart and log the tooltip it produces.
fn hover_middle(container: &ContainerRef, name: &str) {
    let c = container.borrow();
    let Some(surface) = c.surface() else { return };
    let (w, h) = {
        let s = surface.borrow();
        (s.pixel_width() as f64, s.pixel_height() as f64)
    };
    let at = PointerEvent::at(c.offset.x + w / 2.0, c.offset.y + h / 2.0);
    c.pointer_enter(at);
    if let Some(ctl) = c.controller() {
        if let Some(tip) = ctl.borrow().tooltip() {
            log::info!("'{name}' tooltip: {}", spark_core::tooltip::visible_text(tip.content()).trim());
        }
    }
    c.pointer_leave();
}

fn write_out(file: &str, bytes: &[u8]) -> Result<()> {
    let mut out = PathBuf::from("target/out");
    std::fs::create_dir_all(&out).with_context(|| format!("creating {}", out.display()))?;
    out.push(file);
    std::fs::write(&out, bytes).with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(())
}
