//! Search paging strategy

use super::types::{FetchState, PageCursor, RecordTypeDescriptor};
use crate::error::{Error, Result};
use crate::soap::{Envelope, RequestBody, SearchCriteria};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

/// Drives one filtered search from the opening call through the last page.
///
/// `next_request` is pure; the pager only advances when a decoded response
/// is fed back through `observe`. Dropping the pager mid-walk abandons the
/// server-side search, which expires on its own.
#[derive(Debug)]
pub struct SearchPager {
    criteria: SearchCriteria,
    state: FetchState,
}

impl SearchPager {
    /// Start a pager for the given filter block
    pub fn new(criteria: SearchCriteria) -> Self {
        Self {
            criteria,
            state: FetchState::Init,
        }
    }

    /// The next request to issue, or None when the walk is complete.
    pub fn next_request(&self) -> Option<RequestBody> {
        match &self.state {
            FetchState::Init => Some(RequestBody::Search {
                criteria: self.criteria.clone(),
            }),
            FetchState::Paging(cursor) => Some(RequestBody::SearchMoreWithId {
                search_id: cursor.search_id.clone(),
                page_index: cursor.next_page(),
            }),
            FetchState::Done => None,
        }
    }

    /// Advance past the page the envelope describes.
    ///
    /// A search that matched nothing reports zero total pages and completes
    /// immediately without a search handle.
    pub fn observe(&mut self, envelope: &Envelope) -> Result<()> {
        let total_pages = envelope
            .total_pages()
            .ok_or_else(|| Error::envelope("search result missing totalPages"))?;
        if total_pages == 0 {
            debug!("search matched no records");
            self.state = FetchState::Done;
            return Ok(());
        }

        let search_id = envelope
            .search_id()
            .ok_or_else(|| Error::envelope("search result missing searchId"))?;
        // Without the index the cursor cannot advance and the walk would
        // re-request the same page
        let page_index = envelope
            .page_index()
            .ok_or_else(|| Error::envelope("search result missing pageIndex"))?;
        let cursor = PageCursor {
            search_id,
            page_index,
            total_pages,
        };
        debug!(
            page = cursor.page_index,
            total = cursor.total_pages,
            "observed search page"
        );
        self.state = if cursor.has_more() {
            FetchState::Paging(cursor)
        } else {
            FetchState::Done
        };
        Ok(())
    }

    /// True once every page has been seen
    pub fn is_done(&self) -> bool {
        self.state == FetchState::Done
    }
}

/// Build the filter block for a record type's opening search call.
///
/// The date bound applies only when the stream has a replication key, a
/// starting point exists, and the filter type actually exposes a matching
/// field; membership is checked against the filter type's field set, using
/// the filter's own casing on the wire. Shared-filter sub-types additionally
/// narrow by record type.
pub fn build_search_criteria(
    descriptor: &RecordTypeDescriptor,
    filter_fields: &HashSet<String>,
    replication_key: Option<&str>,
    starting: Option<DateTime<Utc>>,
) -> SearchCriteria {
    let date_field = replication_key.and_then(|key| {
        filter_fields
            .iter()
            .find(|field| field.eq_ignore_ascii_case(key))
            .cloned()
    });
    let (date_field, on_or_after) = match (date_field, starting) {
        (Some(field), Some(bound)) => (Some(field), Some(bound)),
        _ => (None, None),
    };

    SearchCriteria {
        filter_type: descriptor.filter_type_name(),
        date_field,
        on_or_after,
        record_type: descriptor.shares_filter().then(|| descriptor.name.clone()),
    }
}
