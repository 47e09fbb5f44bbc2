//! # Column Layout
//!
//! Geometry and the seam between the column engine and whatever renders
//! text.
//!
//! The engine never looks at text. It talks to [`ContentBlock`]s: opaque
//! containers that can be measured against an available size and then
//! report how big they want to be and whether any content is still left
//! unseated. Content that doesn't fit in a block spills into the block its
//! overflow link points at. Chaining blocks together that way is what turns
//! one long body of text into a row of columns.
//!
//! ```text
//!  primary ──overflow──▶ column 0 ──overflow──▶ column 1 ──▶ (none)
//! ```
//!
//! Overflow columns are stamped out on demand by a [`ColumnTemplate`]. The
//! engine in [`columns`] owns them from that point on.

pub mod columns;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// A width/height pair in device-independent pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A placed rectangle. `x`/`y` are relative to the parent panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Outer spacing around a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margin {
    /// Leading-edge spacing only, the usual way columns are separated.
    pub fn leading(left: f64) -> Self {
        Self {
            left,
            ..Default::default()
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Identity of a content block. Unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(u64);

impl BlockId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        BlockId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// An externally rendered text container.
///
/// Implementors do the actual text measurement. The column engine only
/// needs the outcome of a measure pass and a place to hang the overflow
/// link.
pub trait ContentBlock {
    fn id(&self) -> BlockId;

    /// Measure against the given space. Afterwards `desired_size` and
    /// `has_overflow_content` reflect the result.
    fn measure(&mut self, available: Size);

    fn desired_size(&self) -> Size;

    /// True when some content could not be seated in this block.
    fn has_overflow_content(&self) -> bool;

    /// The block that receives this block's spillover, if any.
    fn overflow_target(&self) -> Option<BlockId>;

    fn set_overflow_target(&mut self, target: Option<BlockId>);

    /// Record the final placement chosen by the parent panel.
    fn arrange(&mut self, rect: Rect);

    fn arranged_rect(&self) -> Option<Rect>;
}

/// Factory for overflow columns.
pub trait ColumnTemplate {
    /// Create a fresh column. Called exactly once per newly needed column.
    fn load_content(&self) -> Box<dyn ContentBlock>;
}

impl<F> ColumnTemplate for F
where
    F: Fn() -> Box<dyn ContentBlock>,
{
    fn load_content(&self) -> Box<dyn ContentBlock> {
        self()
    }
}
