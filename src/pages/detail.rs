use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, warn};

use super::{to_value, SampleDataSource};
use crate::config::ColumnsConfig;
use crate::layout::columns::{ColumnsLayout, RichTextColumns};
use crate::layout::{BlockId, Margin, Size};
use crate::navigation::Page;
use crate::observe::{set_property, Listeners, ObservableMap, PropertyChanged};
use crate::session::PageState;
use crate::text::flow::TextFlow;

const SELECTED_ITEM: &str = "SelectedItem";

/// One item at a time, with its siblings available for flipping through.
///
/// The item's content is paginated into columns. The current selection is
/// what gets saved, so coming back (or resuming) shows the item the user
/// flipped to rather than the one originally navigated to.
#[derive(Debug)]
pub struct ItemDetailPage {
    source: Rc<SampleDataSource>,
    config: ColumnsConfig,
    view_model: ObservableMap,
    selected: Option<String>,
    flow: Option<TextFlow>,
    columns: RichTextColumns,
    property_changed: Listeners<PropertyChanged>,
}

impl ItemDetailPage {
    pub fn new(source: Rc<SampleDataSource>, config: ColumnsConfig) -> Self {
        Self {
            source,
            config,
            view_model: ObservableMap::new(),
            selected: None,
            flow: None,
            columns: RichTextColumns::new(),
            property_changed: Listeners::new(),
        }
    }

    /// Fires with `"SelectedItem"` whenever the selection changes.
    pub fn add_property_listener(&mut self, callback: impl FnMut(&PropertyChanged) + 'static) {
        self.property_changed.add(callback);
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn columns(&self) -> &RichTextColumns {
        &self.columns
    }

    /// Lines seated by `block` in the last layout pass.
    pub fn seated_lines(&self, block: BlockId) -> Vec<String> {
        self.flow
            .as_ref()
            .map(|flow| flow.seated_lines(block))
            .unwrap_or_default()
    }

    /// Show another item. Returns false, keeping the current selection,
    /// when the id is unknown.
    pub fn select(&mut self, item_id: &str) -> bool {
        let Some(item) = self.source.item(item_id) else {
            warn!(item = item_id, "unknown item");
            return false;
        };
        if self.selected.as_deref() == Some(item_id) {
            return true;
        }
        if let Some(group) = self.source.group(&item.group_id) {
            self.view_model.insert("Group", to_value(group));
            self.view_model.insert("Items", to_value(&group.items));
        }
        self.view_model.insert("Item", to_value(item));

        let flow = self.config.flow(item.content.as_str());
        self.columns.set_content(Some(Box::new(
            flow.primary(self.config.primary_width, Margin::default()),
        )));
        self.columns.set_column_template(Some(Box::new(flow.column_template(
            self.config.column_width,
            Margin::leading(self.config.column_gap),
        ))));
        self.flow = Some(flow);
        set_property(
            &mut self.selected,
            Some(item_id.to_string()),
            SELECTED_ITEM,
            &mut self.property_changed,
        );
        debug!(item = item_id, "selected item");
        true
    }
}

impl Page for ItemDetailPage {
    fn load_state(&mut self, parameter: &Value, page_state: Option<&PageState>) {
        let restored = page_state
            .and_then(|state| state.get(SELECTED_ITEM))
            .and_then(Value::as_str);
        let item_id = restored.or_else(|| parameter.as_str()).unwrap_or_default();
        self.select(item_id);
    }

    fn save_state(&self, page_state: &mut PageState) {
        if let Some(selected) = &self.selected {
            page_state.insert(SELECTED_ITEM.into(), Value::String(selected.clone()));
        }
    }

    fn view_model(&self) -> Option<&ObservableMap> {
        Some(&self.view_model)
    }

    fn layout(&mut self, available: Size) -> Option<ColumnsLayout> {
        if self.selected.is_none() {
            return None;
        }
        Some(self.columns.layout(available))
    }
}
