//! Integration tests for Colonnade.
//!
//! These exercise the public API end to end. They verify:
//! - Overflow columns are created, linked, reused and dropped as the
//!   available width changes
//! - Text flows from the primary block through every overflow column
//! - Page state survives back/forward navigation and is pruned on new
//!   navigations
//! - Column configurations that cannot make progress are rejected
//! - A suspended session comes back after the process is relaunched

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use colonnade::app::{App, ExecutionState, ROOT_FRAME_KEY};
use colonnade::config::ColumnsConfig;
use colonnade::layout::columns::RichTextColumns;
use colonnade::layout::{BlockId, ColumnTemplate, ContentBlock, Rect, Size};
use colonnade::navigation::{Frame, NavigationMode, Page, PageEntry, PageHost, PageRegistry};
use colonnade::pages::{self, SampleDataSource, GROUPED_ITEMS, GROUP_DETAIL, ITEM_DETAIL};
use colonnade::session::persistence::{MemoryPersistence, SuspendingOperation};
use colonnade::session::{page_key, FrameState, PageState, SessionState};
use colonnade::text::flow::MIN_COLUMN_WIDTH;
use colonnade::text::TextStyle;
use colonnade::ColonnadeError;
use proptest::prelude::*;
use rstest::rstest;
use serde_json::{json, Value};

// ─── Helpers ────────────────────────────────────────────────────

/// A content block with a fixed measure outcome.
struct FixedBlock {
    id: BlockId,
    size: Size,
    overflow: bool,
    desired: Size,
    target: Option<BlockId>,
    rect: Option<Rect>,
}

impl FixedBlock {
    fn new(width: f64, height: f64, overflow: bool) -> Self {
        Self {
            id: BlockId::next(),
            size: Size::new(width, height),
            overflow,
            desired: Size::ZERO,
            target: None,
            rect: None,
        }
    }
}

impl ContentBlock for FixedBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn measure(&mut self, _available: Size) {
        self.desired = self.size;
    }

    fn desired_size(&self) -> Size {
        self.desired
    }

    fn has_overflow_content(&self) -> bool {
        self.overflow
    }

    fn overflow_target(&self) -> Option<BlockId> {
        self.target
    }

    fn set_overflow_target(&mut self, target: Option<BlockId>) {
        self.target = target;
    }

    fn arrange(&mut self, rect: Rect) {
        self.rect = Some(rect);
    }

    fn arranged_rect(&self) -> Option<Rect> {
        self.rect
    }
}

/// A template handing out the given columns in order, then `fallback`.
fn queued_template(queue: &[(f64, bool)], fallback: (f64, bool)) -> Box<dyn ColumnTemplate> {
    let queue = RefCell::new(queue.iter().copied().collect::<VecDeque<_>>());
    Box::new(move || {
        let (width, overflow) = queue.borrow_mut().pop_front().unwrap_or(fallback);
        Box::new(FixedBlock::new(width, 100.0, overflow)) as Box<dyn ContentBlock>
    })
}

/// Links run primary -> column 0 -> ... -> last, the last links nowhere,
/// and the visible children are exactly the chain.
fn assert_chain_consistent(columns: &RichTextColumns) {
    let chain: Vec<_> = columns.chain().collect();
    for pair in chain.windows(2) {
        assert_eq!(pair[0].overflow_target(), Some(pair[1].id()));
    }
    if let Some(last) = chain.last() {
        assert_eq!(last.overflow_target(), None);
    }
    let ids: Vec<_> = chain.iter().map(|b| b.id()).collect();
    assert_eq!(columns.children(), ids.as_slice());
}

fn flow_config(primary: f64, column: f64, gap: f64) -> ColumnsConfig {
    ColumnsConfig {
        primary_width: Some(primary),
        column_width: column,
        column_gap: gap,
        text: TextStyle::default(),
        ..Default::default()
    }
}

type Visits = Rc<RefCell<Vec<(Value, Option<PageState>)>>>;

/// Saves `{"visit": <parameter>}` and logs every load.
struct VisitPage {
    visits: Visits,
    parameter: Value,
}

impl Page for VisitPage {
    fn load_state(&mut self, parameter: &Value, page_state: Option<&PageState>) {
        self.parameter = parameter.clone();
        self.visits
            .borrow_mut()
            .push((parameter.clone(), page_state.cloned()));
    }

    fn save_state(&self, page_state: &mut PageState) {
        page_state.insert("visit".into(), self.parameter.clone());
    }
}

fn visit_registry() -> (Rc<PageRegistry>, Visits) {
    let visits: Visits = Rc::default();
    let mut registry = PageRegistry::new();
    let log = visits.clone();
    registry.register("Visit", move || VisitPage {
        visits: log.clone(),
        parameter: Value::Null,
    });
    (Rc::new(registry), visits)
}

fn visit_host(registry: &PageRegistry, parameter: Value) -> PageHost {
    let page = registry.create("Visit").unwrap();
    PageHost::new(page, PageEntry::new("Visit", parameter))
}

fn sample_app(store: &MemoryPersistence) -> App {
    let source = Rc::new(SampleDataSource::sample());
    App::new(pages::registry(source, ColumnsConfig::default()), store.clone())
}

// ─── Pagination engine ──────────────────────────────────────────

#[test]
fn test_concrete_three_block_scenario() {
    let mut columns = RichTextColumns::with_content(
        Box::new(FixedBlock::new(300.0, 100.0, true)),
        Some(queued_template(&[(450.0, true), (400.0, false)], (400.0, false))),
    );
    let size = columns.measure(Size::new(900.0, 500.0));
    assert_eq!(size.width, 1150.0);
    assert_eq!(columns.column_count(), 2);
    assert_eq!(columns.children().len(), 3);
    assert_chain_consistent(&columns);

    let arranged = columns.arrange(Size::new(size.width, 500.0));
    assert_eq!(arranged.width, 1150.0);
    let rects: Vec<_> = columns.chain().filter_map(|b| b.arranged_rect()).collect();
    assert_eq!(rects[0], Rect::new(0.0, 0.0, 300.0, 500.0));
    assert_eq!(rects[1], Rect::new(300.0, 0.0, 450.0, 500.0));
    assert_eq!(rects[2], Rect::new(750.0, 0.0, 400.0, 500.0));
}

#[rstest]
#[case(0.0, 0)]
#[case(300.0, 0)]
#[case(301.0, 1)]
#[case(700.0, 1)]
#[case(701.0, 2)]
#[case(1100.0, 2)]
#[case(1101.0, 3)]
fn test_column_count_follows_available_width(#[case] width: f64, #[case] expected: usize) {
    let mut columns = RichTextColumns::with_content(
        Box::new(FixedBlock::new(300.0, 100.0, true)),
        Some(queued_template(&[], (400.0, true))),
    );
    columns.measure(Size::new(width, 100.0));
    assert_eq!(columns.column_count(), expected);
    assert_chain_consistent(&columns);
}

#[test]
fn test_missing_template_drops_overflow() {
    let mut columns =
        RichTextColumns::with_content(Box::new(FixedBlock::new(300.0, 80.0, true)), None);
    let size = columns.measure(Size::new(2000.0, 100.0));
    assert_eq!(size, Size::new(300.0, 80.0));
    assert_eq!(columns.children().len(), 1);
    assert!(columns.content().unwrap().has_overflow_content());
}

#[test]
fn test_without_content_nothing_is_laid_out() {
    let mut columns = RichTextColumns::new();
    columns.set_column_template(Some(queued_template(&[], (400.0, true))));
    assert_eq!(columns.measure(Size::new(1000.0, 100.0)), Size::ZERO);
    assert_eq!(columns.arrange(Size::new(1000.0, 100.0)), Size::ZERO);
    assert!(columns.children().is_empty());
}

#[test]
fn test_widening_reuses_existing_columns() {
    let mut columns = RichTextColumns::with_content(
        Box::new(FixedBlock::new(300.0, 100.0, true)),
        Some(queued_template(&[], (400.0, true))),
    );
    columns.measure(Size::new(701.0, 100.0));
    let narrow = columns.children().to_vec();
    columns.measure(Size::new(1500.0, 100.0));
    let wide = columns.children().to_vec();
    assert!(wide.len() > narrow.len());
    assert_eq!(&wide[..narrow.len()], narrow.as_slice());
    assert_chain_consistent(&columns);
}

#[test]
fn test_template_change_invalidates_and_rebuilds() {
    let fired = Rc::new(RefCell::new(0));
    let mut columns = RichTextColumns::with_content(
        Box::new(FixedBlock::new(300.0, 100.0, true)),
        Some(queued_template(&[], (400.0, true))),
    );
    let counter = fired.clone();
    columns.add_invalidation_listener(move |_| *counter.borrow_mut() += 1);

    columns.measure(Size::new(1000.0, 100.0));
    let before = columns.children().to_vec();
    columns.set_column_template(Some(queued_template(&[], (200.0, true))));
    assert_eq!(*fired.borrow(), 1);
    assert!(columns.children().is_empty());
    assert_eq!(columns.content().unwrap().overflow_target(), None);

    columns.measure(Size::new(1000.0, 100.0));
    assert_eq!(columns.column_count(), 4);
    assert_ne!(columns.children()[1], before[1]);
    assert_chain_consistent(&columns);
}

// ─── Text flow ──────────────────────────────────────────────────

#[test]
fn test_paginate_seats_every_word_when_space_allows() {
    let text = "lorem ipsum dolor sit amet ".repeat(40);
    let config = ColumnsConfig {
        available_width: 5000.0,
        available_height: 100.0,
        ..flow_config(200.0, 200.0, 20.0)
    };
    let result = colonnade::paginate(&text, &config);
    assert!(result.layout.columns.len() > 1);
    assert!(!result.layout.columns.last().unwrap().has_overflow_content);

    let seated: String = result.lines.iter().flatten().map(String::as_str).collect();
    let words = |s: &str| s.split_whitespace().map(str::to_owned).collect::<Vec<_>>();
    assert_eq!(words(&seated), words(&text));
}

#[test]
fn test_paginate_json_applies_configuration() {
    let text = "word ".repeat(500);
    let config = |width: u32| {
        format!(
            r#"{{ "availableWidth": {width}, "availableHeight": 200,
                 "columnWidth": 200, "primaryWidth": 200 }}"#
        )
    };
    let narrow = colonnade::paginate_json(&text, &config(800)).unwrap();
    let wide = colonnade::paginate_json(&text, &config(1600)).unwrap();
    assert!(wide.layout.columns.len() > narrow.layout.columns.len());
    assert!(colonnade::paginate_json(&text, "{ nope").is_err());
}

#[test]
fn test_degenerate_columns_are_rejected_or_still_terminate() {
    let text = "word ".repeat(200);
    let err = colonnade::paginate_json(
        &text,
        r#"{ "primaryWidth": 200, "columnWidth": 0, "columnGap": 0,
             "availableWidth": 800, "availableHeight": 10 }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ColonnadeError::InvalidConfig(_)));

    // Built in code, the same configuration skips validation. Each column
    // still takes up some width, so the pass ends at the available width.
    let config = ColumnsConfig {
        primary_width: Some(200.0),
        column_width: 0.0,
        column_gap: 0.0,
        available_width: 800.0,
        available_height: 10.0,
        ..Default::default()
    };
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let pagination = colonnade::paginate(&text, &config);
        let _ = tx.send(pagination.layout.columns.len());
    });
    let count = rx
        .recv_timeout(std::time::Duration::from_secs(5))
        .expect("measure pass did not finish");
    assert!(count > 1);
    assert!(count <= 1 + (600.0 / MIN_COLUMN_WIDTH) as usize);
}

#[test]
fn test_text_change_reflows_through_existing_columns() {
    let config = ColumnsConfig {
        available_width: 3000.0,
        available_height: 100.0,
        ..flow_config(200.0, 200.0, 0.0)
    };
    let flow = config.flow("short");
    let mut columns = config.columns_for(&flow);
    columns.measure(config.available());
    assert_eq!(columns.column_count(), 0);

    flow.set_text("word ".repeat(300));
    columns.measure(config.available());
    assert!(columns.column_count() > 0);
    assert_chain_consistent(&columns);

    flow.set_text("short again");
    columns.measure(config.available());
    assert_eq!(columns.column_count(), 0);
    assert_chain_consistent(&columns);
}

proptest! {
    #[test]
    fn chain_is_consistent_after_every_measure(
        words in 0usize..400,
        widths in proptest::collection::vec(0.0f64..3000.0, 1..6),
        height in 10.0f64..400.0,
        column in 80.0f64..400.0,
        gap in 0.0f64..60.0,
    ) {
        let config = flow_config(column, column, gap);
        let flow = config.flow("word ".repeat(words));
        let mut columns = config.columns_for(&flow);
        for width in widths {
            columns.measure(Size::new(width, height));
            assert_chain_consistent(&columns);
            prop_assert_eq!(columns.children().len(), columns.column_count() + 1);
        }
    }

    #[test]
    fn shrinking_never_adds_columns(
        words in 0usize..400,
        wide in 0.0f64..3000.0,
        shrink in 0.0f64..1.0,
        height in 10.0f64..400.0,
    ) {
        let config = flow_config(250.0, 250.0, 40.0);
        let flow = config.flow("word ".repeat(words));
        let mut columns = config.columns_for(&flow);

        columns.measure(Size::new(wide, height));
        let before = columns.children().to_vec();
        columns.measure(Size::new(wide * shrink, height));
        let after = columns.children().to_vec();

        prop_assert!(after.len() <= before.len());
        prop_assert_eq!(&before[..after.len()], after.as_slice());
    }
}

// ─── Navigation state ───────────────────────────────────────────

#[test]
fn test_back_navigation_restores_exact_state() {
    let (registry, visits) = visit_registry();
    let mut session = SessionState::new();
    let mut frame = Frame::new(registry);
    frame.navigate(&mut session, "Visit", json!({ "id": 1, "tags": ["a", "b"] })).unwrap();
    frame.navigate(&mut session, "Visit", json!(2)).unwrap();
    assert!(frame.go_back(&mut session).unwrap());

    let (_, restored) = visits.borrow().last().cloned().unwrap();
    let restored = restored.unwrap();
    assert_eq!(restored["visit"], json!({ "id": 1, "tags": ["a", "b"] }));
}

#[test]
fn test_new_navigation_prunes_stale_forward_state() {
    let mut frame_state = FrameState::default();
    for depth in [2, 3, 4] {
        let mut state = PageState::new();
        state.insert("depth".into(), json!(depth));
        frame_state.pages.insert(page_key(depth), state);
    }

    let (registry, visits) = visit_registry();
    let mut entering = visit_host(&registry, json!("new"));
    entering.enter(&mut frame_state, 2, NavigationMode::New);
    assert!(frame_state.pages.is_empty());
    assert_eq!(visits.borrow()[0].1, None);

    // A later back navigation to depth 2 finds nothing to restore.
    let mut returning = visit_host(&registry, json!("old"));
    returning.enter(&mut frame_state, 2, NavigationMode::Back);
    assert_eq!(visits.borrow()[1].1, None);

    // Nor does anything deeper.
    let mut deeper = visit_host(&registry, json!("older"));
    deeper.enter(&mut frame_state, 3, NavigationMode::Forward);
    assert_eq!(visits.borrow()[2].1, None);
}

#[test]
fn test_entering_twice_loads_once() {
    let (registry, visits) = visit_registry();
    let mut frame_state = FrameState::default();
    let mut host = visit_host(&registry, Value::Null);
    assert!(host.enter(&mut frame_state, 0, NavigationMode::New));
    assert!(!host.enter(&mut frame_state, 0, NavigationMode::Refresh));
    assert_eq!(visits.borrow().len(), 1);
}

// ─── Application lifecycle ──────────────────────────────────────

#[test]
fn test_suspend_and_relaunch_round_trips_the_session() {
    let store = MemoryPersistence::new();
    let mut first = sample_app(&store);
    first.launch(ExecutionState::NotRunning).unwrap();
    first.navigate(GROUP_DETAIL, json!("Group-3")).unwrap();
    first.navigate(ITEM_DETAIL, json!("Group-3-Item-2")).unwrap();

    let op = SuspendingOperation::new();
    first.suspend(&op).unwrap();
    assert!(op.is_complete());

    let saved = first.snapshot();
    let frame = &saved.frames[ROOT_FRAME_KEY];
    assert_eq!(frame.pages["Page-2"]["SelectedItem"], json!("Group-3-Item-2"));

    let mut second = sample_app(&store);
    second.launch(ExecutionState::Terminated).unwrap();
    assert_eq!(second.snapshot(), saved);

    let current = second.root_frame().unwrap().current_entry().cloned().unwrap();
    assert_eq!(current, PageEntry::new(ITEM_DETAIL, json!("Group-3-Item-2")));
    let layout = second.layout_current(Size::new(1366.0, 300.0)).unwrap();
    assert!(!layout.columns.is_empty());

    assert!(second.go_back().unwrap());
    assert!(second.go_back().unwrap());
    let home = second.root_frame().unwrap().current_entry().cloned().unwrap();
    assert_eq!(home.page_type, GROUPED_ITEMS);
    assert!(second.go_forward().unwrap());
}

#[test]
fn test_unreadable_session_starts_fresh() {
    let store = MemoryPersistence::from_bytes(b"{\"frames\": 42}".to_vec());
    let mut app = sample_app(&store);
    app.launch(ExecutionState::Terminated).unwrap();
    let frame = app.root_frame().unwrap();
    assert_eq!(frame.back_stack_depth(), 0);
    assert_eq!(
        frame.current_entry().map(|e| e.page_type.as_str()),
        Some(GROUPED_ITEMS)
    );
}
