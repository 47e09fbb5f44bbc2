//! Column layout configuration.
//!
//! Every field has a default, so `{}` is a valid configuration:
//!
//! ```json
//! {
//!   "primaryWidth": 560,
//!   "columnWidth": 560,
//!   "columnGap": 80,
//!   "text": { "fontSize": 15, "lineHeight": 20, "advanceEm": 0.5 },
//!   "availableWidth": 1366,
//!   "availableHeight": 600
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ColonnadeError;
use crate::layout::columns::RichTextColumns;
use crate::layout::{Margin, Size};
use crate::text::flow::TextFlow;
use crate::text::TextStyle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnsConfig {
    /// Width of the primary block. `None` lets it take the available width.
    pub primary_width: Option<f64>,
    /// Width of every overflow column, margin excluded.
    pub column_width: f64,
    /// Leading margin of each overflow column.
    pub column_gap: f64,
    pub text: TextStyle,
    pub available_width: f64,
    pub available_height: f64,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            primary_width: Some(560.0),
            column_width: 560.0,
            column_gap: 80.0,
            text: TextStyle::default(),
            available_width: 1366.0,
            available_height: 600.0,
        }
    }
}

impl ColumnsConfig {
    /// Parse and [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ColonnadeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ColonnadeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Overflow columns must advance the used width, and the available size
    /// must be finite, or the measure pass would keep adding columns.
    pub fn validate(&self) -> Result<(), ColonnadeError> {
        if !(self.column_width > 0.0) {
            return Err(ColonnadeError::InvalidConfig(format!(
                "columnWidth must be positive, got {}",
                self.column_width
            )));
        }
        if !(self.column_width + self.column_gap > 0.0) {
            return Err(ColonnadeError::InvalidConfig(format!(
                "columnWidth + columnGap must be positive, got {}",
                self.column_width + self.column_gap
            )));
        }
        if !self.available_width.is_finite() || !self.available_height.is_finite() {
            return Err(ColonnadeError::InvalidConfig(
                "availableWidth and availableHeight must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn available(&self) -> Size {
        Size::new(self.available_width, self.available_height)
    }

    /// A flow over `text` using the configured metrics.
    pub fn flow(&self, text: impl Into<String>) -> TextFlow {
        TextFlow::new(text, self.text)
    }

    /// A column panel whose primary block and overflow columns read `flow`.
    pub fn columns_for(&self, flow: &TextFlow) -> RichTextColumns {
        RichTextColumns::with_content(
            Box::new(flow.primary(self.primary_width, Margin::default())),
            Some(Box::new(flow.column_template(
                self.column_width,
                Margin::leading(self.column_gap),
            ))),
        )
    }
}
