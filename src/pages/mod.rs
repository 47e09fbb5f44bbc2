//! # Sample Pages
//!
//! The three pages of a grouped reading app, backed by
//! [`SampleDataSource`]:
//!
//! ```text
//!  GroupedItems ("AllGroups")
//!       ├──▶ GroupDetail ("Group-<n>")
//!       └──▶ ItemDetail  ("Group-<n>-Item-<m>")
//! ```
//!
//! Each page publishes what it shows through an [`ObservableMap`] view
//! model. The item detail page also lays the selected item's content out in
//! columns.

pub mod data;
mod detail;

pub use data::{SampleDataSource, SampleGroup, SampleItem, ALL_GROUPS};
pub use detail::ItemDetailPage;

use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::config::ColumnsConfig;
use crate::navigation::{Page, PageRegistry};
use crate::observe::ObservableMap;
use crate::session::PageState;

pub const GROUPED_ITEMS: &str = "GroupedItems";
pub const GROUP_DETAIL: &str = "GroupDetail";
pub const ITEM_DETAIL: &str = "ItemDetail";

/// Registry with every sample page, sharing one data source.
pub fn registry(source: Rc<SampleDataSource>, config: ColumnsConfig) -> PageRegistry {
    let mut registry = PageRegistry::new();
    {
        let source = source.clone();
        registry.register(GROUPED_ITEMS, move || GroupedItemsPage::new(source.clone()));
    }
    {
        let source = source.clone();
        registry.register(GROUP_DETAIL, move || GroupDetailPage::new(source.clone()));
    }
    registry.register(ITEM_DETAIL, move || {
        ItemDetailPage::new(source.clone(), config.clone())
    });
    registry
}

/// View-model values are plain JSON. The sample types always serialize.
pub(crate) fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Every group in a collection.
#[derive(Debug)]
pub struct GroupedItemsPage {
    source: Rc<SampleDataSource>,
    view_model: ObservableMap,
}

impl GroupedItemsPage {
    pub fn new(source: Rc<SampleDataSource>) -> Self {
        Self {
            source,
            view_model: ObservableMap::new(),
        }
    }
}

impl Page for GroupedItemsPage {
    fn load_state(&mut self, parameter: &Value, _page_state: Option<&PageState>) {
        let collection = parameter.as_str().unwrap_or_default();
        match self.source.groups(collection) {
            Some(groups) => {
                self.view_model.insert("Groups", to_value(&groups));
            }
            None => warn!(collection, "unknown group collection"),
        }
    }

    fn view_model(&self) -> Option<&ObservableMap> {
        Some(&self.view_model)
    }
}

/// One group and its items.
#[derive(Debug)]
pub struct GroupDetailPage {
    source: Rc<SampleDataSource>,
    view_model: ObservableMap,
}

impl GroupDetailPage {
    pub fn new(source: Rc<SampleDataSource>) -> Self {
        Self {
            source,
            view_model: ObservableMap::new(),
        }
    }
}

impl Page for GroupDetailPage {
    fn load_state(&mut self, parameter: &Value, _page_state: Option<&PageState>) {
        let group_id = parameter.as_str().unwrap_or_default();
        match self.source.group(group_id) {
            Some(group) => {
                self.view_model.insert("Group", to_value(group));
                self.view_model.insert("Items", to_value(&group.items));
            }
            None => warn!(group = group_id, "unknown group"),
        }
    }

    fn view_model(&self) -> Option<&ObservableMap> {
        Some(&self.view_model)
    }
}
