//! Pages and the state protocol run when they become current or stop being
//! current.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use tracing::debug;

use super::{NavigationMode, PageEntry};
use crate::error::ColonnadeError;
use crate::layout::columns::ColumnsLayout;
use crate::layout::Size;
use crate::observe::ObservableMap;
use crate::session::{page_key, FrameState, PageState};

/// A screen that can be navigated to.
///
/// Both hooks default to doing nothing. Whatever `save_state` writes is
/// handed back to `load_state` when the user returns to the same position
/// in the history, including after the process was suspended and restored.
pub trait Page {
    /// Populate the page. `page_state` is `None` on a fresh navigation.
    fn load_state(&mut self, _parameter: &Value, _page_state: Option<&PageState>) {}

    /// Record what is needed to bring the page back later.
    fn save_state(&self, _page_state: &mut PageState) {}

    /// The key-value model the page exposes to its renderer.
    fn view_model(&self) -> Option<&ObservableMap> {
        None
    }

    /// Lay out any paginated content the page hosts.
    fn layout(&mut self, _available: Size) -> Option<ColumnsLayout> {
        None
    }
}

type PageFactory = Box<dyn Fn() -> Box<dyn Page>>;

/// Page type name -> factory.
#[derive(Default)]
pub struct PageRegistry {
    factories: BTreeMap<String, PageFactory>,
}

impl fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, P>(&mut self, page_type: &str, factory: F)
    where
        F: Fn() -> P + 'static,
        P: Page + 'static,
    {
        self.factories.insert(
            page_type.to_string(),
            Box::new(move || Box::new(factory()) as Box<dyn Page>),
        );
    }

    pub fn contains(&self, page_type: &str) -> bool {
        self.factories.contains_key(page_type)
    }

    pub fn create(&self, page_type: &str) -> Result<Box<dyn Page>, ColonnadeError> {
        self.factories
            .get(page_type)
            .map(|factory| factory())
            .ok_or_else(|| ColonnadeError::UnknownPage(page_type.to_string()))
    }
}

/// A live page instance plus the bookkeeping of the state protocol.
pub struct PageHost {
    page: Box<dyn Page>,
    entry: PageEntry,
    /// Set on first entry. A page is only ever loaded once.
    page_key: Option<String>,
}

impl fmt::Debug for PageHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageHost")
            .field("entry", &self.entry)
            .field("page_key", &self.page_key)
            .finish()
    }
}

impl PageHost {
    pub fn new(page: Box<dyn Page>, entry: PageEntry) -> Self {
        Self {
            page,
            entry,
            page_key: None,
        }
    }

    pub fn entry(&self) -> &PageEntry {
        &self.entry
    }

    pub fn page_key(&self) -> Option<&str> {
        self.page_key.as_deref()
    }

    pub fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    pub fn page_mut(&mut self) -> &mut dyn Page {
        self.page.as_mut()
    }

    pub fn into_entry(self) -> PageEntry {
        self.entry
    }

    /// The page became current at back-stack depth `depth`.
    ///
    /// Returns false when the page had already been loaded.
    pub fn enter(&mut self, frame: &mut FrameState, depth: usize, mode: NavigationMode) -> bool {
        if self.page_key.is_some() {
            return false;
        }
        let key = page_key(depth);

        if mode == NavigationMode::New {
            // Whatever was cached at this depth or beyond belongs to a
            // forward history that no longer exists.
            let pruned = frame.prune_from(depth);
            debug!(key = %key, pruned, page = %self.entry.page_type, "entering new page");
            self.page.load_state(&self.entry.parameter, None);
        } else {
            let prior = frame.pages.get(&key);
            debug!(
                key = %key,
                ?mode,
                restored = prior.is_some(),
                page = %self.entry.page_type,
                "re-entering page"
            );
            self.page.load_state(&self.entry.parameter, prior);
        }

        self.page_key = Some(key);
        true
    }

    /// The page stopped being current. Saves a fresh state dictionary over
    /// whatever was stored for its key.
    pub fn leave(&mut self, frame: &mut FrameState) {
        let Some(key) = self.page_key.clone() else {
            return;
        };
        let mut state = PageState::new();
        self.page.save_state(&mut state);
        debug!(key = %key, entries = state.len(), "saved page state");
        frame.pages.insert(key, state);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    pub(crate) type LoadLog = Rc<RefCell<Vec<(Value, Option<PageState>)>>>;

    /// Records every load and saves whatever `next_save` currently holds.
    #[derive(Default)]
    pub(crate) struct RecordingPage {
        pub(crate) loads: LoadLog,
        pub(crate) next_save: Rc<RefCell<PageState>>,
    }

    impl Page for RecordingPage {
        fn load_state(&mut self, parameter: &Value, page_state: Option<&PageState>) {
            self.loads
                .borrow_mut()
                .push((parameter.clone(), page_state.cloned()));
        }

        fn save_state(&self, page_state: &mut PageState) {
            page_state.extend(self.next_save.borrow().clone());
        }
    }

    pub(crate) fn state(v: Value) -> PageState {
        match v {
            Value::Object(map) => map,
            _ => PageState::new(),
        }
    }

    fn host(page: RecordingPage) -> PageHost {
        PageHost::new(Box::new(page), PageEntry::new("Recording", json!("p")))
    }

    #[test]
    fn new_navigation_prunes_and_loads_without_state() {
        let page = RecordingPage::default();
        let loads = page.loads.clone();
        let mut frame = FrameState::default();
        for depth in [2, 3, 4] {
            frame.pages.insert(page_key(depth), state(json!({ "d": depth })));
        }
        frame.pages.insert(page_key(1), state(json!({ "keep": true })));

        let mut host = host(page);
        assert!(host.enter(&mut frame, 2, NavigationMode::New));
        assert_eq!(frame.pages.len(), 1);
        assert!(frame.pages.contains_key("Page-1"));
        assert_eq!(loads.borrow()[0], (json!("p"), None));
        assert_eq!(host.page_key(), Some("Page-2"));
    }

    #[test]
    fn back_navigation_hands_back_saved_state() {
        let mut frame = FrameState::default();
        frame
            .pages
            .insert(page_key(1), state(json!({ "SelectedItem": "Group-1-Item-3" })));
        let page = RecordingPage::default();
        let loads = page.loads.clone();
        let mut host = host(page);
        host.enter(&mut frame, 1, NavigationMode::Back);
        assert_eq!(
            loads.borrow()[0].1,
            Some(state(json!({ "SelectedItem": "Group-1-Item-3" })))
        );
    }

    #[test]
    fn second_enter_is_a_no_op() {
        let page = RecordingPage::default();
        let loads = page.loads.clone();
        let mut frame = FrameState::default();
        let mut host = host(page);
        assert!(host.enter(&mut frame, 0, NavigationMode::New));
        assert!(!host.enter(&mut frame, 0, NavigationMode::Back));
        assert_eq!(loads.borrow().len(), 1);
    }

    #[test]
    fn leave_overwrites_previous_entry() {
        let page = RecordingPage::default();
        let next = page.next_save.clone();
        let mut frame = FrameState::default();
        frame
            .pages
            .insert(page_key(0), state(json!({ "old": 1, "other": 2 })));
        let mut host = host(page);
        host.enter(&mut frame, 0, NavigationMode::Refresh);

        *next.borrow_mut() = state(json!({ "new": 3 }));
        host.leave(&mut frame);
        assert_eq!(frame.pages["Page-0"], state(json!({ "new": 3 })));
    }

    #[test]
    fn leave_before_enter_saves_nothing() {
        let mut frame = FrameState::default();
        let mut host = host(RecordingPage::default());
        host.leave(&mut frame);
        assert!(frame.pages.is_empty());
    }

    #[test]
    fn registry_rejects_unknown_types() {
        let mut registry = PageRegistry::new();
        registry.register("Recording", RecordingPage::default);
        assert!(registry.contains("Recording"));
        assert!(registry.create("Recording").is_ok());
        assert!(matches!(
            registry.create("Missing"),
            Err(ColonnadeError::UnknownPage(name)) if name == "Missing"
        ));
    }
}
