//! Text shared across a chain of content blocks.
//!
//! A [`TextFlow`] holds one body of text. The primary block seats text from
//! the beginning; every overflow column picks up where the block linking to
//! it stopped. Links are recorded in the flow when a block's overflow target
//! is set, so measuring the chain in order is enough to distribute the text.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use super::{break_into_lines, TextStyle};
use crate::layout::{BlockId, ColumnTemplate, ContentBlock, Margin, Rect, Size};

/// Smallest width an overflow column reports, so each one added to a panel
/// moves the used width forward.
pub const MIN_COLUMN_WIDTH: f64 = 1.0;

#[derive(Debug, Default)]
struct Seated {
    /// Char offset just past the last seated line.
    end: usize,
    lines: Vec<String>,
}

#[derive(Debug)]
struct FlowState {
    text: String,
    style: TextStyle,
    /// target block -> block whose overflow feeds it
    source_of: HashMap<BlockId, BlockId>,
    seated: HashMap<BlockId, Seated>,
}

impl FlowState {
    fn start_for(&self, block: BlockId, role: Role) -> usize {
        match role {
            Role::Primary => 0,
            Role::Overflow => self
                .source_of
                .get(&block)
                .and_then(|source| self.seated.get(source))
                .map(|s| s.end)
                .unwrap_or_else(|| self.text.chars().count()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Primary,
    Overflow,
}

/// One body of text laid out through a chain of [`FlowBlock`]s.
#[derive(Debug, Clone)]
pub struct TextFlow {
    state: Rc<RefCell<FlowState>>,
}

impl TextFlow {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            state: Rc::new(RefCell::new(FlowState {
                text: text.into(),
                style,
                source_of: HashMap::new(),
                seated: HashMap::new(),
            })),
        }
    }

    /// Replace the text. Takes effect on the next measure.
    pub fn set_text(&self, text: impl Into<String>) {
        self.state.borrow_mut().text = text.into();
    }

    /// The block that starts the flow. `width: None` takes whatever width is
    /// available at measure time.
    pub fn primary(&self, width: Option<f64>, margin: Margin) -> FlowBlock {
        FlowBlock::new(self.state.clone(), Role::Primary, width, margin)
    }

    pub fn overflow_column(&self, width: f64, margin: Margin) -> FlowBlock {
        FlowBlock::new(self.state.clone(), Role::Overflow, Some(width), margin)
    }

    /// A template producing fixed-width overflow columns for this flow.
    pub fn column_template(&self, width: f64, margin: Margin) -> FlowColumnTemplate {
        FlowColumnTemplate {
            flow: self.clone(),
            width,
            margin,
        }
    }

    /// Lines seated by `block` during its last measure.
    pub fn seated_lines(&self, block: BlockId) -> Vec<String> {
        self.state
            .borrow()
            .seated
            .get(&block)
            .map(|s| s.lines.clone())
            .unwrap_or_default()
    }
}

/// Content block reading from a shared [`TextFlow`].
#[derive(Debug)]
pub struct FlowBlock {
    id: BlockId,
    state: Rc<RefCell<FlowState>>,
    role: Role,
    width: Option<f64>,
    margin: Margin,
    desired: Size,
    has_overflow: bool,
    target: Option<BlockId>,
    rect: Option<Rect>,
}

impl FlowBlock {
    fn new(state: Rc<RefCell<FlowState>>, role: Role, width: Option<f64>, margin: Margin) -> Self {
        Self {
            id: BlockId::next(),
            state,
            role,
            width,
            margin,
            desired: Size::ZERO,
            has_overflow: false,
            target: None,
            rect: None,
        }
    }
}

impl ContentBlock for FlowBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn measure(&mut self, available: Size) {
        let mut state = self.state.borrow_mut();
        let style = state.style;
        let start = state.start_for(self.id, self.role);

        let content_width = self
            .width
            .unwrap_or_else(|| (available.width - self.margin.horizontal()).max(0.0));
        let content_height = (available.height - self.margin.vertical()).max(0.0);

        let remaining: String = state.text.chars().skip(start).collect();
        let lines = break_into_lines(&remaining, content_width, &style);
        let capacity = if style.line_height > 0.0 {
            (content_height / style.line_height).floor() as usize
        } else {
            lines.len()
        };
        let seated_count = capacity.min(lines.len());
        let seated = &lines[..seated_count];

        self.has_overflow = seated_count < lines.len();
        let mut desired_width = content_width + self.margin.horizontal();
        if self.role == Role::Overflow {
            desired_width = desired_width.max(MIN_COLUMN_WIDTH);
        }
        self.desired = Size::new(
            desired_width,
            seated_count as f64 * style.line_height + self.margin.vertical(),
        );

        let end = start + seated.last().map(|l| l.end).unwrap_or(0);
        trace!(
            block = self.id.raw(),
            start,
            end,
            lines = seated_count,
            "measured flow block"
        );
        state.seated.insert(
            self.id,
            Seated {
                end,
                lines: seated.iter().map(|l| l.text.clone()).collect(),
            },
        );
    }

    fn desired_size(&self) -> Size {
        self.desired
    }

    fn has_overflow_content(&self) -> bool {
        self.has_overflow
    }

    fn overflow_target(&self) -> Option<BlockId> {
        self.target
    }

    fn set_overflow_target(&mut self, target: Option<BlockId>) {
        let mut state = self.state.borrow_mut();
        if let Some(old) = self.target.take() {
            state.source_of.remove(&old);
        }
        if let Some(new) = target {
            state.source_of.insert(new, self.id);
        }
        self.target = target;
    }

    fn arrange(&mut self, rect: Rect) {
        self.rect = Some(rect);
    }

    fn arranged_rect(&self) -> Option<Rect> {
        self.rect
    }
}

impl Drop for FlowBlock {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.seated.remove(&self.id);
            state.source_of.remove(&self.id);
            if let Some(target) = self.target {
                state.source_of.remove(&target);
            }
        }
    }
}

/// Stamps out [`FlowBlock`] overflow columns of a fixed width.
#[derive(Debug, Clone)]
pub struct FlowColumnTemplate {
    flow: TextFlow,
    width: f64,
    margin: Margin,
}

impl ColumnTemplate for FlowColumnTemplate {
    fn load_content(&self) -> Box<dyn ContentBlock> {
        Box::new(self.flow.overflow_column(self.width, self.margin))
    }
}
