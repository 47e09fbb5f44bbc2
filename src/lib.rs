//! # Colonnade
//!
//! Multi-column text pagination and navigation state for paginated reading
//! apps.
//!
//! Long-form content doesn't scroll here, it flows sideways: a primary text
//! block is filled first, and whatever it cannot seat spills into overflow
//! columns that are stamped out from a template on demand, placed side by
//! side, and thrown away again when the space shrinks.
//!
//! The second half keeps each page's state across navigation: what a page
//! saves when the user leaves it comes back when they return to the same
//! position in the history, even if the process was suspended and
//! terminated in between.
//!
//! ## Architecture
//!
//! ```text
//!   [text]        Line breaking, text shared across a column chain
//!       ↓
//!   [layout]      Geometry, ContentBlock seam, RichTextColumns
//!       ↓
//!   [pages]       Sample pages; the detail page hosts the columns
//!       ↑
//!   [navigation]  Frame history, page state protocol
//!       ↓
//!   [session]     Per-frame state cache, snapshot/restore, persistence
//!       ↓
//!   [app]         Launch and suspend lifecycle
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod layout;
pub mod navigation;
pub mod observe;
pub mod pages;
pub mod session;
pub mod text;

pub use error::ColonnadeError;

use config::ColumnsConfig;
use layout::columns::ColumnsLayout;
use serde::Serialize;

/// The layout of a piece of text, with the lines each column seated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub layout: ColumnsLayout,
    pub lines: Vec<Vec<String>>,
}

/// Lay `text` out in columns using `config`.
///
/// This is the simplest entry point: one flow, one panel, one measure and
/// arrange pass at the configured available size.
pub fn paginate(text: &str, config: &ColumnsConfig) -> Pagination {
    let flow = config.flow(text);
    let mut columns = config.columns_for(&flow);
    let layout = columns.layout(config.available());
    let lines = layout
        .columns
        .iter()
        .map(|column| flow.seated_lines(column.block))
        .collect();
    Pagination { layout, lines }
}

/// Like [`paginate`], with the configuration given as JSON.
pub fn paginate_json(text: &str, config_json: &str) -> Result<Pagination, ColonnadeError> {
    let config = ColumnsConfig::from_json(config_json)?;
    Ok(paginate(text, &config))
}
