//! Pagination types

use serde::{Deserialize, Serialize};

/// How a record type is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFamily {
    /// One `getAll` call returns every record
    BulkFetch,
    /// A `search` opened with a filter, then walked with `searchMoreWithId`
    FilteredSearch,
}

/// One discovered record type and how to fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTypeDescriptor {
    /// Stream name, first letter capitalized
    pub name: String,
    /// Name as it appears on the wire, enumeration casing
    pub soap_name: String,
    /// Fetch family this type belongs to
    pub family: FetchFamily,
    /// Filter type override for types that share another type's filter
    pub search_filter_type_name: Option<String>,
}

impl RecordTypeDescriptor {
    /// A type fetched in one bulk call
    pub fn bulk(name: impl Into<String>, soap_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            soap_name: soap_name.into(),
            family: FetchFamily::BulkFetch,
            search_filter_type_name: None,
        }
    }

    /// A searchable type with its own filter
    pub fn search(name: impl Into<String>, soap_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            soap_name: soap_name.into(),
            family: FetchFamily::FilteredSearch,
            search_filter_type_name: None,
        }
    }

    /// A searchable sub-type that borrows a parent type's filter
    pub fn shared_search(
        name: impl Into<String>,
        soap_name: impl Into<String>,
        filter_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            soap_name: soap_name.into(),
            family: FetchFamily::FilteredSearch,
            search_filter_type_name: Some(filter_type.into()),
        }
    }

    /// The search filter type used for this record type
    pub fn filter_type_name(&self) -> String {
        self.search_filter_type_name
            .clone()
            .unwrap_or_else(|| format!("{}SearchBasic", self.name))
    }

    /// True when the filter is shared and records must be narrowed by
    /// record-type filter
    pub fn shares_filter(&self) -> bool {
        self.search_filter_type_name.is_some()
    }
}

/// Position within an open server-side search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    /// Server-side search handle
    pub search_id: String,
    /// 1-based index of the page last seen
    pub page_index: u32,
    /// Total pages the search matched
    pub total_pages: u32,
}

impl PageCursor {
    /// True while pages remain beyond the one last seen
    pub fn has_more(&self) -> bool {
        self.page_index < self.total_pages
    }

    /// Index of the page to request next
    pub fn next_page(&self) -> u32 {
        self.page_index + 1
    }
}

/// Progress of one search walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// No request issued yet
    Init,
    /// A search is open and pages remain
    Paging(PageCursor),
    /// Every page has been seen, or the search matched nothing
    Done,
}
