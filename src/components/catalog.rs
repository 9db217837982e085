//! Catalog Filter - Category tabs over a static project list
//!
//! Holds one piece of state, the selected category, and derives the visible
//! entries from it on every read. The filter is stable (original order) and
//! permissive: selecting a category that no entry carries is allowed and
//! simply shows nothing.
//!
//! # Example
//!
//! ```ignore
//! let filter = CatalogFilter::from_json(include_str!("projects.json"))?;
//!
//! filter.select_category("cloud");
//! for entry in filter.visible_entries() {
//!     render_card(entry);
//! }
//! ```

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use spark_signals::{derived, signal, Derived, Signal};
use tracing::debug;

use crate::error::Result;

/// Key of the pseudo-category that matches every entry.
///
/// Reserved: an entry whose category is literally `all` is only reachable
/// through the `all` tab and never gets a tab of its own.
pub const ALL_CATEGORIES: &str = "all";

// =============================================================================
// TYPES
// =============================================================================

/// One static project entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub link: String,
}

impl CatalogEntry {
    pub fn new(category: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            link: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }
}

/// Selected category: everything, or one named category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryKey {
    #[default]
    All,
    Named(String),
}

impl CategoryKey {
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Named(name) => name,
        }
    }

    /// Whether an entry of `category` passes this selection.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => name == category,
        }
    }
}

impl From<&str> for CategoryKey {
    fn from(key: &str) -> Self {
        if key == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Named(key.to_string())
        }
    }
}

impl From<String> for CategoryKey {
    fn from(key: String) -> Self {
        if key == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Named(key)
        }
    }
}

impl From<CategoryKey> for String {
    fn from(key: CategoryKey) -> Self {
        key.as_str().to_string()
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable filter state for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterView {
    pub selected: CategoryKey,
    pub tabs: Vec<CategoryKey>,
    pub active_tab: Option<usize>,
    pub entries: Vec<CatalogEntry>,
}

// =============================================================================
// REDUCER
// =============================================================================

/// Transitions of the filter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    Select(CategoryKey),
    /// Back to the `all` pseudo-category.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterState {
    pub selected: CategoryKey,
}

impl FilterState {
    pub fn reduce(self, action: FilterAction) -> Self {
        match action {
            FilterAction::Select(selected) => Self { selected },
            FilterAction::Reset => Self::default(),
        }
    }
}

/// Entries passing `selected`, in their original order.
pub fn visible_entries<'a>(entries: &'a [CatalogEntry], selected: &CategoryKey) -> Vec<&'a CatalogEntry> {
    entries
        .iter()
        .filter(|entry| selected.matches(&entry.category))
        .collect()
}

/// Distinct categories in order of first appearance, without the reserved
/// `all` key.
pub fn categories(entries: &[CatalogEntry]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for entry in entries {
        if entry.category != ALL_CATEGORIES && !seen.contains(&entry.category.as_str()) {
            seen.push(&entry.category);
        }
    }
    seen
}

// =============================================================================
// COMPONENT
// =============================================================================

/// Category filter over a fixed catalog.
pub struct CatalogFilter {
    entries: Rc<[CatalogEntry]>,
    state: Signal<FilterState>,
}

impl CatalogFilter {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: Rc::from(entries),
            state: signal(FilterState::default()),
        }
    }

    /// Build from a JSON array of entries.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        debug!(entries = entries.len(), "catalog loaded");
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn selected(&self) -> CategoryKey {
        self.state.get().selected
    }

    /// The state as a signal, for reactive rendering.
    pub fn state_signal(&self) -> Signal<FilterState> {
        self.state.clone()
    }

    /// Apply an action. Returns whether the selection changed.
    pub fn dispatch(&self, action: FilterAction) -> bool {
        let before = self.state.get();
        let after = before.clone().reduce(action);
        if after == before {
            return false;
        }
        debug!(from = %before.selected, to = %after.selected, "category selected");
        self.state.set(after);
        true
    }

    /// Select a category (or `"all"`). Unknown keys are accepted.
    /// Returns whether the selection changed.
    pub fn select_category(&self, key: impl Into<CategoryKey>) -> bool {
        self.dispatch(FilterAction::Select(key.into()))
    }

    /// Select by tab position, `all` being tab 0.
    /// Returns false for an index past the last tab.
    pub fn select_tab(&self, index: usize) -> bool {
        match self.tabs().into_iter().nth(index) {
            Some(key) => {
                self.select_category(key);
                true
            }
            None => false,
        }
    }

    /// Position of the selection in [`tabs`](Self::tabs), if it is one.
    pub fn active_tab(&self) -> Option<usize> {
        let selected = self.selected();
        self.tabs().iter().position(|tab| *tab == selected)
    }

    /// Entries visible under the current selection.
    pub fn visible_entries(&self) -> Vec<&CatalogEntry> {
        visible_entries(&self.entries, &self.state.get().selected)
    }

    /// The visible entries as a derived value that recomputes when the
    /// selection changes.
    pub fn visible_derived(&self) -> Derived<Vec<CatalogEntry>> {
        let entries = self.entries.clone();
        let state = self.state.clone();
        derived(move || {
            visible_entries(&entries, &state.get().selected)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// Distinct categories in first-appearance order.
    pub fn categories(&self) -> Vec<&str> {
        categories(&self.entries)
    }

    /// `all` followed by every category.
    pub fn tabs(&self) -> Vec<CategoryKey> {
        std::iter::once(CategoryKey::All)
            .chain(self.categories().into_iter().map(CategoryKey::from))
            .collect()
    }

    /// Whether `key` is `all` or carried by some entry.
    pub fn is_known(&self, key: &CategoryKey) -> bool {
        match key {
            CategoryKey::All => true,
            CategoryKey::Named(name) => self.entries.iter().any(|entry| entry.category == *name),
        }
    }

    pub fn view(&self) -> FilterView {
        FilterView {
            selected: self.selected(),
            tabs: self.tabs(),
            active_tab: self.active_tab(),
            entries: self.visible_entries().into_iter().cloned().collect(),
        }
    }
}
