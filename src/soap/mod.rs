//! SOAP request execution
//!
//! Transport, envelope serialization, response decoding, and the
//! retryable/fatal classification of vendor statuses live here. Paging
//! policy does not; see the pagination module.

mod client;
mod envelope;
mod xml;

pub use client::SoapClient;
pub use envelope::{
    build_request, Envelope, RequestBody, SearchCriteria, SearchPreferences, SoapOperation,
};
pub use xml::xml_to_value;

#[cfg(test)]
mod tests;
