//! Request envelopes and response classification
//!
//! Every outbound call is a SOAP envelope carrying a fresh token passport in
//! the header. Search-family calls additionally carry the search preferences
//! block. Responses are decoded to JSON and classified against the vendor
//! status block before any records are handed out.

use super::xml::xml_to_value;
use crate::auth::{TokenPassport, SIGNATURE_ALGORITHM};
use crate::constants::{DEFAULT_PAGE_SIZE, RETRYABLE_ERROR_CODES};
use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const MESSAGES_NS: &str = "urn:messages_2022_2.platform.webservices.netsuite.com";
const CORE_NS: &str = "urn:core_2022_2.platform.webservices.netsuite.com";
const COMMON_NS: &str = "urn:common_2022_2.platform.webservices.netsuite.com";

/// Result elements a successful response can carry, across all operations.
const RESULT_FIELDS: &[&str] = &["getAllResult", "searchResult"];

/// The SOAP operations the connector issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoapOperation {
    GetAll,
    Search,
    SearchMoreWithId,
}

impl SoapOperation {
    /// Operation name as it appears in the request body and SOAPAction header
    pub fn name(&self) -> &'static str {
        match self {
            SoapOperation::GetAll => "getAll",
            SoapOperation::Search => "search",
            SoapOperation::SearchMoreWithId => "searchMoreWithId",
        }
    }

    /// Search-family operations carry the searchPreferences header block
    pub fn uses_search_preferences(&self) -> bool {
        !matches!(self, SoapOperation::GetAll)
    }
}

/// Search preferences carried on every search-family call.
#[derive(Debug, Clone)]
pub struct SearchPreferences {
    pub body_fields_only: bool,
    pub page_size: u32,
    pub return_search_columns: bool,
}

impl Default for SearchPreferences {
    fn default() -> Self {
        Self {
            body_fields_only: true,
            page_size: DEFAULT_PAGE_SIZE,
            return_search_columns: true,
        }
    }
}

/// Filter block for an initial search call.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    /// Search filter type, e.g. `TransactionSearchBasic`
    pub filter_type: String,
    /// Date field to bound with `onOrAfter`, when the filter type exposes one
    pub date_field: Option<String>,
    /// Lower bound for the date field
    pub on_or_after: Option<DateTime<Utc>>,
    /// `contains` filter on `recordType`, for shared filter types
    pub record_type: Option<String>,
}

/// Body of one outbound call.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Bulk fetch of every record of one type
    GetAll { record_type: String },
    /// Open a filtered search
    Search { criteria: SearchCriteria },
    /// Fetch a subsequent page of an open search
    SearchMoreWithId { search_id: String, page_index: u32 },
}

impl RequestBody {
    pub fn operation(&self) -> SoapOperation {
        match self {
            RequestBody::GetAll { .. } => SoapOperation::GetAll,
            RequestBody::Search { .. } => SoapOperation::Search,
            RequestBody::SearchMoreWithId { .. } => SoapOperation::SearchMoreWithId,
        }
    }
}

/// Serialize one call into its envelope document.
pub fn build_request(
    passport: &TokenPassport,
    preferences: Option<&SearchPreferences>,
    body: &RequestBody,
) -> Result<String> {
    let mut writer = Writer::new(Vec::new());

    let mut root = BytesStart::new("soapenv:Envelope");
    root.push_attribute(("xmlns:soapenv", SOAP_ENV_NS));
    root.push_attribute(("xmlns:xsi", XSI_NS));
    root.push_attribute(("xmlns:platformMsgs", MESSAGES_NS));
    root.push_attribute(("xmlns:platformCore", CORE_NS));
    root.push_attribute(("xmlns:platformCommon", COMMON_NS));
    write_start(&mut writer, root)?;

    write_start(&mut writer, BytesStart::new("soapenv:Header"))?;
    write_passport(&mut writer, passport)?;
    if let Some(preferences) = preferences {
        write_preferences(&mut writer, preferences)?;
    }
    write_end(&mut writer, "soapenv:Header")?;

    write_start(&mut writer, BytesStart::new("soapenv:Body"))?;
    match body {
        RequestBody::GetAll { record_type } => {
            write_start(&mut writer, BytesStart::new("platformMsgs:getAll"))?;
            let mut record = BytesStart::new("platformMsgs:record");
            record.push_attribute(("recordType", record_type.as_str()));
            write_empty(&mut writer, record)?;
            write_end(&mut writer, "platformMsgs:getAll")?;
        }
        RequestBody::Search { criteria } => {
            write_start(&mut writer, BytesStart::new("platformMsgs:search"))?;
            write_search_record(&mut writer, criteria)?;
            write_end(&mut writer, "platformMsgs:search")?;
        }
        RequestBody::SearchMoreWithId {
            search_id,
            page_index,
        } => {
            write_start(&mut writer, BytesStart::new("platformMsgs:searchMoreWithId"))?;
            write_text_element(&mut writer, "platformMsgs:searchId", search_id)?;
            write_text_element(
                &mut writer,
                "platformMsgs:pageIndex",
                &page_index.to_string(),
            )?;
            write_end(&mut writer, "platformMsgs:searchMoreWithId")?;
        }
    }
    write_end(&mut writer, "soapenv:Body")?;

    write_end(&mut writer, "soapenv:Envelope")?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::xml(format!("request not valid UTF-8: {e}")))
}

fn write_passport(writer: &mut Writer<Vec<u8>>, passport: &TokenPassport) -> Result<()> {
    write_start(&mut *writer, BytesStart::new("platformMsgs:tokenPassport"))?;
    write_text_element(writer, "platformCore:account", &passport.account)?;
    write_text_element(writer, "platformCore:consumerKey", &passport.consumer_key)?;
    write_text_element(writer, "platformCore:token", &passport.token)?;
    write_text_element(writer, "platformCore:nonce", &passport.nonce)?;
    write_text_element(
        writer,
        "platformCore:timestamp",
        &passport.timestamp.to_string(),
    )?;

    let mut signature = BytesStart::new("platformCore:signature");
    signature.push_attribute(("algorithm", SIGNATURE_ALGORITHM));
    write_start(&mut *writer, signature)?;
    write_text(writer, &passport.signature)?;
    write_end(writer, "platformCore:signature")?;

    write_end(writer, "platformMsgs:tokenPassport")
}

fn write_preferences(writer: &mut Writer<Vec<u8>>, preferences: &SearchPreferences) -> Result<()> {
    write_start(&mut *writer, BytesStart::new("platformMsgs:searchPreferences"))?;
    write_text_element(
        writer,
        "platformMsgs:bodyFieldsOnly",
        &preferences.body_fields_only.to_string(),
    )?;
    write_text_element(
        writer,
        "platformMsgs:pageSize",
        &preferences.page_size.to_string(),
    )?;
    write_text_element(
        writer,
        "platformMsgs:returnSearchColumns",
        &preferences.return_search_columns.to_string(),
    )?;
    write_end(writer, "platformMsgs:searchPreferences")
}

fn write_search_record(writer: &mut Writer<Vec<u8>>, criteria: &SearchCriteria) -> Result<()> {
    let mut record = BytesStart::new("platformMsgs:searchRecord");
    let type_ref = format!("platformCommon:{}", criteria.filter_type);
    record.push_attribute(("xsi:type", type_ref.as_str()));
    write_start(&mut *writer, record)?;

    if let (Some(field), Some(bound)) = (&criteria.date_field, &criteria.on_or_after) {
        let mut filter = BytesStart::new(format!("platformCommon:{field}"));
        filter.push_attribute(("operator", "onOrAfter"));
        filter.push_attribute(("xsi:type", "platformCore:SearchDateField"));
        write_start(&mut *writer, filter)?;
        write_text_element(
            writer,
            "platformCore:searchValue",
            &bound.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;
        write_end(writer, &format!("platformCommon:{field}"))?;
    }

    if let Some(record_type) = &criteria.record_type {
        let mut filter = BytesStart::new("platformCommon:recordType");
        filter.push_attribute(("operator", "contains"));
        filter.push_attribute(("xsi:type", "platformCore:SearchStringField"));
        write_start(&mut *writer, filter)?;
        write_text_element(writer, "platformCore:searchValue", record_type)?;
        write_end(writer, "platformCommon:recordType")?;
    }

    write_end(writer, "platformMsgs:searchRecord")
}

fn write_start(writer: &mut Writer<Vec<u8>>, start: BytesStart<'_>) -> Result<()> {
    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::xml(format!("request write error: {e}")))
}

fn write_empty(writer: &mut Writer<Vec<u8>>, start: BytesStart<'_>) -> Result<()> {
    writer
        .write_event(Event::Empty(start))
        .map_err(|e| Error::xml(format!("request write error: {e}")))
}

fn write_end(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| Error::xml(format!("request write error: {e}")))
}

fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<()> {
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(|e| Error::xml(format!("request write error: {e}")))
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    write_start(&mut *writer, BytesStart::new(name))?;
    write_text(&mut *writer, text)?;
    write_end(writer, name)
}

/// A decoded response envelope.
///
/// Holds the single result element of the response body; accessors expose the
/// record list and the paging fields.
#[derive(Debug, Clone)]
pub struct Envelope {
    result: Value,
}

impl Envelope {
    /// Decode a response document and locate its result element.
    ///
    /// A SOAP fault is surfaced as a fatal API error; a body with no
    /// recognizable result element is malformed.
    pub fn parse(document: &str) -> Result<Self> {
        let tree = xml_to_value(document)?;
        let body = tree
            .pointer("/Envelope/Body")
            .ok_or_else(|| Error::envelope("missing Body element"))?;

        if let Some(fault) = body.get("Fault") {
            let code = fault
                .get("faultcode")
                .and_then(Value::as_str)
                .unwrap_or("SOAP_FAULT");
            let message = fault
                .get("faultstring")
                .and_then(Value::as_str)
                .unwrap_or("unknown fault");
            return Err(Error::fatal_api(code, message));
        }

        let result = find_result(body)
            .ok_or_else(|| Error::envelope("no result element in response body"))?;
        Ok(Self {
            result: result.clone(),
        })
    }

    /// Validate the vendor status block.
    ///
    /// An unsuccessful status becomes a retryable or fatal API error keyed
    /// off the first status detail's code.
    pub fn validate_status(&self) -> Result<()> {
        let status = self
            .result
            .get("status")
            .ok_or_else(|| Error::envelope("result has no status block"))?;

        if status
            .get("isSuccess")
            .map(is_truthy)
            .unwrap_or(false)
        {
            return Ok(());
        }

        let detail = match status.get("statusDetail") {
            Some(Value::Array(details)) => details.first().cloned(),
            Some(detail) if !detail.is_null() => Some(detail.clone()),
            _ => None,
        };
        let (code, message) = match &detail {
            Some(detail) => (
                detail
                    .get("code")
                    .and_then(Value::as_str)
                    .unwrap_or("UNKNOWN"),
                detail
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or(""),
            ),
            None => ("UNKNOWN", ""),
        };

        if RETRYABLE_ERROR_CODES.contains(&code) {
            Err(Error::retryable_api(code, message))
        } else {
            Err(Error::fatal_api(code, message))
        }
    }

    /// The records of this page, always as a list.
    pub fn records(&self) -> Vec<Value> {
        match self.result.pointer("/recordList/record") {
            Some(Value::Array(records)) => records.clone(),
            Some(record) if !record.is_null() => vec![record.clone()],
            _ => Vec::new(),
        }
    }

    /// Search handle for subsequent pages
    pub fn search_id(&self) -> Option<String> {
        let value = self.result.get("searchId")?;
        value
            .as_str()
            .map(str::to_string)
            .or_else(|| value.as_u64().map(|n| n.to_string()))
    }

    /// 1-based index of this page
    pub fn page_index(&self) -> Option<u32> {
        self.result.get("pageIndex").and_then(number_field)
    }

    /// Total pages the search matched; zero when nothing matched
    pub fn total_pages(&self) -> Option<u32> {
        self.result.get("totalPages").and_then(number_field)
    }

    /// Total records the search matched, when the response reports it
    pub fn total_records(&self) -> Option<u64> {
        self.result
            .get("totalRecords")
            .and_then(number_field)
            .map(u64::from)
    }

    /// Best available record count for this response, for metrics.
    ///
    /// Paged responses derive it from the totals: the remainder on the last
    /// page, a full page otherwise. Unpaged responses count the records.
    pub fn approximate_record_count(&self, page_size: u32) -> u64 {
        match (self.total_records(), self.page_index(), self.total_pages()) {
            (Some(total), Some(page), Some(total_pages)) if page == total_pages => {
                total.saturating_sub(u64::from(page - 1) * u64::from(page_size))
            }
            (Some(_), Some(_), Some(_)) => u64::from(page_size),
            _ => self.records().len() as u64,
        }
    }
}

fn find_result(body: &Value) -> Option<&Value> {
    body.as_object()?.values().find_map(|response| {
        let response = response.as_object()?;
        RESULT_FIELDS.iter().find_map(|field| response.get(*field))
    })
}

/// Booleans arrive as attributes or as element text depending on the field
fn is_truthy(value: &Value) -> bool {
    value.as_bool().unwrap_or(value.as_str() == Some("true"))
}

fn number_field(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .and_then(|n| u32::try_from(n).ok())
}
