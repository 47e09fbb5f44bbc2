//! # Overflow Columns
//!
//! A panel that wraps one primary [`ContentBlock`] and creates as many
//! overflow columns as the content needs, side by side, until either the
//! content is fully seated or horizontal space runs out.
//!
//! Every layout pass is a pair: [`RichTextColumns::measure`] decides how many
//! columns are needed and wires up the overflow chain, then
//! [`RichTextColumns::arrange`] places the resulting children left to right.
//!
//! The chain is recomputed from scratch on every measure:
//!
//! 1. Measure the primary block against the full available size.
//! 2. While the tail of the chain still has unseated content, the columns so
//!    far are narrower than the available width, and a template is set:
//!    reuse the column at this position or stamp a new one out of the
//!    template and link the previous entry to it, then measure it against
//!    whatever width is left.
//! 3. Columns beyond the last position reached are unlinked and dropped.
//!
//! The width check happens *before* a column is added, so the last column
//! may overshoot the available width. It is not clipped.

use serde::Serialize;
use tracing::{debug, trace};

use super::{BlockId, ColumnTemplate, ContentBlock, Rect, Size};
use crate::observe::Listeners;

/// Raised whenever the content block or column template is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutInvalidated;

/// Placement of one chain entry after an arrange pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPlacement {
    pub block: BlockId,
    pub rect: Rect,
    pub has_overflow_content: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow_target: Option<BlockId>,
}

/// Serializable snapshot of a finished layout pass (for debug output).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsLayout {
    pub size: Size,
    pub columns: Vec<ColumnPlacement>,
}

/// Multi-column overflow panel.
#[derive(Default)]
pub struct RichTextColumns {
    content: Option<Box<dyn ContentBlock>>,
    column_template: Option<Box<dyn ColumnTemplate>>,
    /// `None` until the first measure after a reset.
    overflow_columns: Option<Vec<Box<dyn ContentBlock>>>,
    /// Visible children in reading order. Slot 0 is the primary block.
    children: Vec<BlockId>,
    invalidated: Listeners<LayoutInvalidated>,
}

impl std::fmt::Debug for RichTextColumns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RichTextColumns")
            .field("content", &self.content.as_ref().map(|c| c.id()))
            .field("has_template", &self.column_template.is_some())
            .field("children", &self.children)
            .finish()
    }
}

impl RichTextColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(
        content: Box<dyn ContentBlock>,
        column_template: Option<Box<dyn ColumnTemplate>>,
    ) -> Self {
        Self {
            content: Some(content),
            column_template,
            ..Default::default()
        }
    }

    /// Register a callback fired whenever the overflow layout is reset.
    pub fn add_invalidation_listener(
        &mut self,
        callback: impl FnMut(&LayoutInvalidated) + 'static,
    ) {
        self.invalidated.add(callback);
    }

    /// Replace the primary content block, returning the previous one.
    /// The column layout is rebuilt on the next measure.
    pub fn set_content(
        &mut self,
        content: Option<Box<dyn ContentBlock>>,
    ) -> Option<Box<dyn ContentBlock>> {
        let changed = self.content.is_some() || content.is_some();
        let previous = std::mem::replace(&mut self.content, content);
        if changed {
            self.reset_overflow_layout();
        }
        previous
    }

    /// Replace the column template. Always rebuilds unless both are unset.
    pub fn set_column_template(&mut self, column_template: Option<Box<dyn ColumnTemplate>>) {
        let changed = self.column_template.is_some() || column_template.is_some();
        self.column_template = column_template;
        if changed {
            self.reset_overflow_layout();
        }
    }

    pub fn content(&self) -> Option<&dyn ContentBlock> {
        self.content.as_deref()
    }

    /// Visible children in reading order.
    pub fn children(&self) -> &[BlockId] {
        &self.children
    }

    pub fn overflow_columns(&self) -> &[Box<dyn ContentBlock>] {
        self.overflow_columns.as_deref().unwrap_or(&[])
    }

    /// Number of materialized overflow columns.
    pub fn column_count(&self) -> usize {
        self.overflow_columns().len()
    }

    /// The chain in reading order: primary block, then overflow columns.
    pub fn chain(&self) -> impl Iterator<Item = &(dyn ContentBlock + 'static)> + '_ {
        self.content
            .as_deref()
            .into_iter()
            .chain(self.overflow_columns().iter().map(|c| c.as_ref()))
    }

    fn reset_overflow_layout(&mut self) {
        // Dropping the columns releases them; the primary must not keep
        // pointing at one of them.
        self.overflow_columns = None;
        self.children.clear();
        if let Some(content) = self.content.as_mut() {
            content.set_overflow_target(None);
        }
        debug!("overflow layout reset");
        self.invalidated.notify(&LayoutInvalidated);
    }

    /// Measure pass: size the chain to the available space.
    pub fn measure(&mut self, available: Size) -> Size {
        let Self {
            content,
            column_template,
            overflow_columns,
            children,
            ..
        } = self;

        let Some(content) = content.as_mut() else {
            return Size::ZERO;
        };

        // A missing column list means nothing has been registered yet.
        if overflow_columns.is_none() {
            children.clear();
            children.push(content.id());
        }
        let columns = overflow_columns.get_or_insert_with(Vec::new);

        content.measure(available);
        let mut used = content.desired_size();
        let mut has_overflow = content.has_overflow_content();

        let mut index = 0;
        while has_overflow && used.width < available.width {
            let Some(template) = column_template.as_deref() else {
                break;
            };

            if index == columns.len() {
                let column = template.load_content();
                let id = column.id();
                if index == 0 {
                    content.set_overflow_target(Some(id));
                } else {
                    columns[index - 1].set_overflow_target(Some(id));
                }
                trace!(column = index, block = id.raw(), "created overflow column");
                children.push(id);
                columns.push(column);
            }

            let column = &mut columns[index];
            column.measure(Size::new(available.width - used.width, available.height));
            let desired = column.desired_size();
            used.width += desired.width;
            used.height = used.height.max(desired.height);
            has_overflow = column.has_overflow_content();
            index += 1;
        }

        if columns.len() > index {
            if index == 0 {
                content.set_overflow_target(None);
            } else {
                columns[index - 1].set_overflow_target(None);
            }
            while columns.len() > index {
                let removed = columns.remove(index);
                children.remove(index + 1);
                trace!(column = index, block = removed.id().raw(), "dropped overflow column");
            }
        }

        debug!(
            columns = index,
            width = used.width,
            height = used.height,
            unseated = has_overflow,
            "measured rich text columns"
        );
        used
    }

    /// Arrange pass: place children left to right using their desired widths.
    pub fn arrange(&mut self, final_size: Size) -> Size {
        if self.overflow_columns.is_none() {
            return Size::ZERO;
        }

        let mut x = 0.0;
        let mut max_height: f64 = 0.0;
        let columns = self.overflow_columns.iter_mut().flatten();
        for child in self.content.iter_mut().chain(columns) {
            let desired = child.desired_size();
            child.arrange(Rect::new(x, 0.0, desired.width, final_size.height));
            x += desired.width;
            max_height = max_height.max(desired.height);
        }
        Size::new(x, max_height)
    }

    /// Run measure then arrange against the same size.
    pub fn layout(&mut self, available: Size) -> ColumnsLayout {
        let measured = self.measure(available);
        let arranged = self.arrange(Size::new(measured.width, available.height));
        ColumnsLayout {
            size: arranged,
            columns: self
                .chain()
                .map(|block| ColumnPlacement {
                    block: block.id(),
                    rect: block.arranged_rect().unwrap_or_default(),
                    has_overflow_content: block.has_overflow_content(),
                    overflow_target: block.overflow_target(),
                })
                .collect(),
        }
    }
}
