use serde::{Deserialize, Serialize};

/// One ledger line as returned by the page source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub amount: i64,
    pub account_id: String,
}

/// Pagination metadata reported by the source
///
/// `has_more` is known to go false before the data actually ends, so it is
/// informational only. An empty `data` array is what stops a worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub has_more: bool,
}

/// One page of entries for a single offset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub data: Vec<Entry>,
    #[serde(default)]
    pub page: PageInfo,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when the source's `has_more` flag contradicts the page contents
    pub fn flag_disagrees(&self) -> bool {
        self.page.has_more == self.data.is_empty()
    }
}
