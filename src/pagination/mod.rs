//! Fetch strategies and search paging
//!
//! Each record type belongs to one fetch family: a single bulk call, or a
//! filtered search walked page by page through the vendor's server-side
//! search handle. The pager here is a small state machine; it decides which
//! request comes next and advances on each decoded response.

mod strategies;
mod types;

pub use strategies::{build_search_criteria, SearchPager};
pub use types::{FetchFamily, FetchState, PageCursor, RecordTypeDescriptor};
