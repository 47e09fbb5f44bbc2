//! # Colonnade CLI
//!
//! Usage:
//!   colonnade article.txt --config columns.json -o layout.json
//!   cat article.txt | colonnade --width 1366 --height 400
//!   colonnade --example > columns.json
//!   colonnade --session
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::rc::Rc;

use colonnade::app::{App, ExecutionState};
use colonnade::config::ColumnsConfig;
use colonnade::layout::columns::ColumnsLayout;
use colonnade::navigation::PageEntry;
use colonnade::pages::{self, SampleDataSource, GROUP_DETAIL, ITEM_DETAIL};
use colonnade::session::persistence::{MemoryPersistence, SuspendingOperation};
use colonnade::session::SessionSnapshot;
use colonnade::ColonnadeError;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_PKG_NAME")))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_config_json());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), ColonnadeError> {
    let mut config = match flag_value(args, "--config") {
        Some(path) => ColumnsConfig::load(path)?,
        None => ColumnsConfig::default(),
    };
    if let Some(width) = flag_value(args, "--width").and_then(|v| v.parse().ok()) {
        config.available_width = width;
    }
    if let Some(height) = flag_value(args, "--height").and_then(|v| v.parse().ok()) {
        config.available_height = height;
    }
    config.validate()?;

    let output = if args.iter().any(|a| a == "--session") {
        run_session(config)?
    } else {
        let input = if args.len() > 1 && !args[1].starts_with('-') {
            fs::read_to_string(&args[1])?
        } else {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        };
        let pagination = colonnade::paginate(&input, &config);
        info!(
            columns = pagination.layout.columns.len(),
            width = pagination.layout.size.width,
            "laid out text"
        );
        serde_json::to_string_pretty(&pagination)?
    };

    match flag_value(args, "-o") {
        Some(path) => {
            fs::write(path, &output)?;
            eprintln!("✓ Written {} bytes to {}", output.len(), path);
        }
        None => println!("{}", output),
    }
    Ok(())
}

/// Browse to an item, suspend, then bring a fresh app back as if the
/// process had been terminated in between.
fn run_session(config: ColumnsConfig) -> Result<String, ColonnadeError> {
    let source = Rc::new(SampleDataSource::sample());
    let store = MemoryPersistence::new();

    let mut app = App::new(pages::registry(source.clone(), config.clone()), store.clone());
    app.launch(ExecutionState::NotRunning)?;
    app.navigate(GROUP_DETAIL, Value::from("Group-1"))?;
    app.navigate(ITEM_DETAIL, Value::from("Group-1-Item-2"))?;
    app.suspend(&SuspendingOperation::new())?;
    let saved = app.snapshot();

    let mut resumed = App::new(pages::registry(source, config.clone()), store);
    resumed.launch(ExecutionState::Terminated)?;
    let restored_page = resumed
        .root_frame()
        .and_then(|frame| frame.current_entry())
        .cloned();
    let layout = resumed.layout_current(config.available());
    info!(page = ?restored_page.as_ref().map(|e| &e.page_type), "session restored");

    Ok(serde_json::to_string_pretty(&SessionReport {
        saved,
        restored_page,
        layout,
    })?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionReport {
    saved: SessionSnapshot,
    restored_page: Option<PageEntry>,
    layout: Option<ColumnsLayout>,
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn example_config_json() -> &'static str {
    r##"{
  "primaryWidth": 560,
  "columnWidth": 560,
  "columnGap": 80,
  "text": {
    "fontSize": 15,
    "lineHeight": 20,
    "advanceEm": 0.5
  },
  "availableWidth": 1366,
  "availableHeight": 600
}
"##
}
