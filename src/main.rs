use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use restweave::config::Config;
use restweave::{ReqwestTransport, ResourceConfig, ResourceFactory};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Call an action of a declared REST resource
#[derive(Parser, Debug)]
#[command(name = "restweave", version, about, long_about = None)]
struct Args {
    /// Resource file (JSON or YAML)
    #[arg(short, long)]
    resources: Option<PathBuf>,

    /// Resource name
    resource: String,

    /// Action name
    action: String,

    /// Parameters as a JSON object
    #[arg(short, long)]
    params: Option<String>,

    /// Request body as JSON
    #[arg(short, long)]
    body: Option<String>,

    /// Root path or base URL, overriding config and resource file
    #[arg(long)]
    root: Option<String>,

    /// Extra header, `Name: value` (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Remember the resource file and root for later runs
    #[arg(long)]
    save: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, err);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("restweave started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("restweave").join("restweave.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".restweave").join("restweave.log");
    }
    PathBuf::from("restweave.log")
}

fn parse_json(label: &str, raw: Option<&str>) -> Result<Value> {
    match raw {
        Some(raw) => serde_json::from_str(raw).with_context(|| format!("Invalid JSON for --{}", label)),
        None => Ok(Value::Null),
    }
}

fn parse_headers(raw: &[String]) -> Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|header| {
            let Some((name, value)) = header.split_once(':') else {
                bail!("Header '{}' must look like 'Name: value'", header);
            };
            Ok((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut settings = Config::load();

    let Some(resources_file) = settings.effective_resources_file(args.resources.clone()) else {
        bail!("No resource file given; pass --resources <file>");
    };

    let resource_config = ResourceConfig::load(&resources_file)?;
    let root = settings.effective_root_path(args.root.clone(), resource_config.root_path.clone());
    let headers = settings.effective_headers(&resource_config.default_headers, &parse_headers(&args.headers)?);

    let transport = ReqwestTransport::new().context("Failed to create HTTP client")?;
    let factory = ResourceFactory::builder(transport).config(resource_config).build();
    factory.set_default_headers(headers);
    if let Some(root) = &root {
        factory.set_root_path(root.clone());
    }

    let resource = factory.get(&args.resource)?;
    let action = resource.action(&args.action)?;

    let params = parse_json("params", args.params.as_deref())?;
    let body = parse_json("body", args.body.as_deref())?;

    // Positional convention: body first for body-carrying actions
    let result = if action.definition().has_body {
        action.call(body, Some(params), None).await?
    } else {
        action.call(params, None, None).await?
    };

    println!("{}", serde_json::to_string_pretty(&result)?);

    if args.save {
        settings.resources_file = Some(resources_file);
        if args.root.is_some() {
            settings.root_path = args.root;
        }
        settings.save().context("Failed to save settings")?;
    }

    Ok(())
}
