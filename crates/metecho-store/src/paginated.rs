//! The per-parent container shared by every list-shaped resource.
//!
//! Each `with_*` transition returns `None` when the action changes nothing,
//! so reducers can hand back the previous `Arc` untouched.

use crate::collection::{IdList, Identified};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Paginated
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub items: IdList<T>,
    /// Cursor URL of the next page, if the server has more.
    pub next: Option<String>,
    /// Slugs the server confirmed do not exist.
    pub not_found: Vec<String>,
    /// Whether the first page has loaded.
    pub fetched: bool,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            items: IdList::default(),
            next: None,
            not_found: Vec::new(),
            fetched: false,
        }
    }
}

impl<T: Identified + Clone> Paginated<T> {
    /// Merge one page of list results.
    ///
    /// `reset` replaces the list and cursor wholesale; otherwise only ids not
    /// yet cached are appended, in server order.
    pub fn with_page(&self, results: Vec<T>, next: Option<String>, reset: bool) -> Self {
        let items = if reset {
            IdList::from_vec(results)
        } else {
            let mut items = self.items.clone();
            for item in results {
                items.push_back(item);
            }
            items
        };
        Self {
            items,
            next,
            not_found: self.not_found.clone(),
            fetched: true,
        }
    }

    /// Prepend a newly created object (lists are newest first).
    ///
    /// An id that is already cached leaves the container untouched, even if
    /// the incoming copy differs.
    pub fn with_created(&self, item: T) -> Option<Self> {
        if self.items.contains(item.id()) {
            return None;
        }
        let mut next = self.clone();
        next.items.push_front(item);
        Some(next)
    }

    /// Record the outcome of a single-object fetch for `slug`.
    pub fn with_fetched(&self, slug: Option<&str>, item: Option<T>) -> Option<Self> {
        match item {
            None => {
                let slug = slug?;
                if self.not_found.iter().any(|s| s == slug) {
                    return None;
                }
                let mut next = self.clone();
                next.not_found.push(slug.to_string());
                Some(next)
            }
            Some(item) if !self.items.contains(item.id()) => {
                let mut next = self.clone();
                next.items.push_back(item);
                Some(next)
            }
            Some(_) => None,
        }
    }

    /// Replace a cached object with a newer copy. Unknown ids are ignored.
    pub fn with_updated(&self, item: T) -> Option<Self> {
        if !self.items.contains(item.id()) {
            return None;
        }
        let mut next = self.clone();
        next.items.replace(item);
        Some(next)
    }

    pub fn is_not_found(&self, slug: &str) -> bool {
        self.not_found.iter().any(|s| s == slug)
    }
}

// ---------------------------------------------------------------------------
// ByParent
// ---------------------------------------------------------------------------

/// Containers keyed by parent id (projects by repository, tasks by project).
pub type ByParent<T> = BTreeMap<String, Arc<Paginated<T>>>;

/// Apply `transition` to the container under `parent` (starting from an
/// empty one). Returns `state` itself when the transition reports no change;
/// otherwise only the touched entry gets a new `Arc`.
pub fn update_parent<T, F>(state: Arc<ByParent<T>>, parent: &str, transition: F) -> Arc<ByParent<T>>
where
    F: FnOnce(&Paginated<T>) -> Option<Paginated<T>>,
{
    let changed = match state.get(parent) {
        Some(current) => transition(current),
        None => transition(&Paginated::default()),
    };
    match changed {
        Some(container) => {
            let mut next = (*state).clone();
            next.insert(parent.to_string(), Arc::new(container));
            Arc::new(next)
        }
        None => state,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
