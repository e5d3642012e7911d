//! Pagination cursors returned inline with list responses.

use serde::{Deserialize, Serialize};

/// Position within a paginated list.
///
/// The locators are opaque: Zendesk returns full URLs, and the client follows
/// them verbatim instead of rebuilding query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub previous_page: Option<String>,
    /// Total record count, when the server reports one.
    #[serde(default)]
    pub count: Option<u64>,
}

impl Page {
    /// Check if there is another page after this one.
    pub fn has_next(&self) -> bool {
        self.next().is_some()
    }

    /// The locator of the next page, or `None` on the final page.
    pub fn next(&self) -> Option<&str> {
        non_empty(&self.next_page)
    }

    pub fn has_previous(&self) -> bool {
        self.previous().is_some()
    }

    pub fn previous(&self) -> Option<&str> {
        non_empty(&self.previous_page)
    }

    /// The total-count hint. `None` means unknown, not zero.
    pub fn count(&self) -> Option<u64> {
        self.count
    }
}

fn non_empty(locator: &Option<String>) -> Option<&str> {
    locator.as_deref().filter(|l| !l.is_empty())
}
