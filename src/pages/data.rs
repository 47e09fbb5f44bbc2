//! Read-only sample data behind the bundled pages.
//!
//! Groups are identified as `Group-<n>`, items as `Group-<n>-Item-<m>`.

use serde::Serialize;

/// The only collection id [`SampleDataSource::groups`] understands.
pub const ALL_GROUPS: &str = "AllGroups";

const LOREM: &str = "Curabitur class aliquam vestibulum nam curae maecenas sed integer \
cras phasellus suspendisse quisque donec dis praesent accumsan bibendum pellentesque \
condimentum adipiscing etiam consequat vivamus dictumst aliquam duis convallis \
scelerisque est parturient ullamcorper aliquet fusce suspendisse nunc hac eleifend \
amet blandit facilisi condimentum commodo scelerisque faucibus aenean ullamcorper \
ante mauris dignissim consectetuer nullam lorem vestibulum habitant conubia elementum \
pellentesque morbi facilisis arcu sollicitudin diam cubilia aptent vestibulum auctor \
eget dapibus pellentesque inceptos leo egestas interdum nulla consectetuer suspendisse \
adipiscing pellentesque proin lobortis sollicitudin augue elit mus congue fermentum \
parturient fringilla euismod feugiat";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleItem {
    pub unique_id: String,
    pub group_id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// Long-form body, laid out in columns on the detail page.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleGroup {
    pub unique_id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub items: Vec<SampleItem>,
}

#[derive(Debug, Clone, Default)]
pub struct SampleDataSource {
    groups: Vec<SampleGroup>,
}

impl SampleDataSource {
    pub fn new(groups: Vec<SampleGroup>) -> Self {
        Self { groups }
    }

    /// Six groups with a growing number of items, each with a few
    /// paragraphs of filler content.
    pub fn sample() -> Self {
        let groups = (1..=6)
            .map(|g| {
                let group_id = format!("Group-{g}");
                let items = (1..=g + 2)
                    .map(|i| SampleItem {
                        unique_id: format!("{group_id}-Item-{i}"),
                        group_id: group_id.clone(),
                        title: format!("Item Title: {i}"),
                        subtitle: format!("Item subtitle: {i}"),
                        description: LOREM.chars().take(120).collect(),
                        content: vec![LOREM; 2 + i % 4].join("\n\n"),
                    })
                    .collect();
                SampleGroup {
                    unique_id: group_id,
                    title: format!("Group Title: {g}"),
                    subtitle: format!("Group subtitle: {g}"),
                    description: LOREM.chars().take(200).collect(),
                    items,
                }
            })
            .collect();
        Self { groups }
    }

    /// Only [`ALL_GROUPS`] names a collection.
    pub fn groups(&self, collection: &str) -> Option<&[SampleGroup]> {
        (collection == ALL_GROUPS).then_some(self.groups.as_slice())
    }

    pub fn group(&self, unique_id: &str) -> Option<&SampleGroup> {
        self.groups.iter().find(|g| g.unique_id == unique_id)
    }

    pub fn item(&self, unique_id: &str) -> Option<&SampleItem> {
        self.groups
            .iter()
            .flat_map(|g| g.items.iter())
            .find(|i| i.unique_id == unique_id)
    }
}
