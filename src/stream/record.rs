//! One extractable stream of records

use crate::error::Result;
use crate::pagination::{
    build_search_criteria, FetchFamily, RecordTypeDescriptor, SearchPager,
};
use crate::schema::{SchemaInferrer, StreamSchema};
use crate::soap::{RequestBody, SoapClient};
use crate::wsdl::TypeRegistry;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::stream::{try_unfold, Stream};
use futures::TryStreamExt;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Identifier field shared by every record type
const PRIMARY_KEYS: &[&str] = &["internalId"];

/// A discovered record type bound to its schema and fetch strategy.
#[derive(Debug, Clone)]
pub struct RecordStream {
    descriptor: RecordTypeDescriptor,
    schema: StreamSchema,
    replication_key: Option<String>,
    replication_key_is_datetime: bool,
    filter_fields: HashSet<String>,
    client: Arc<SoapClient>,
    default_start: Option<DateTime<Utc>>,
}

/// Walk state for one lazy read
struct ReadState {
    pager: Option<SearchPager>,
    buffer: VecDeque<Value>,
    bulk_fetched: bool,
}

impl RecordStream {
    /// Bind a descriptor to its schema.
    ///
    /// Fails with `TypeNotFound` when the record type or its filter type is
    /// missing from the registry; callers skip such streams at discovery.
    pub fn new(
        descriptor: RecordTypeDescriptor,
        registry: &TypeRegistry,
        client: Arc<SoapClient>,
        default_start: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let inferred = SchemaInferrer::new(registry).infer(&descriptor.name)?;

        let filter_fields = match descriptor.family {
            FetchFamily::FilteredSearch => registry.field_names(&descriptor.filter_type_name())?,
            FetchFamily::BulkFetch => HashSet::new(),
        };

        let replication_key_is_datetime = inferred
            .replication_key
            .as_deref()
            .and_then(|key| inferred.schema.get_property(key))
            .map(|property| property.is_date_time())
            .unwrap_or(false);

        debug!(
            stream = %descriptor.name,
            family = ?descriptor.family,
            replication_key = ?inferred.replication_key,
            "constructed stream"
        );

        Ok(Self {
            descriptor,
            schema: inferred.schema,
            replication_key: inferred.replication_key,
            replication_key_is_datetime,
            filter_fields,
            client,
            default_start,
        })
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// The descriptor this stream was built from
    pub fn descriptor(&self) -> &RecordTypeDescriptor {
        &self.descriptor
    }

    /// Declared property tree
    pub fn schema(&self) -> &StreamSchema {
        &self.schema
    }

    /// Incremental cursor field, when the record type has one
    pub fn replication_key(&self) -> Option<&str> {
        self.replication_key.as_deref()
    }

    /// Identifier fields
    pub fn primary_keys(&self) -> &'static [&'static str] {
        PRIMARY_KEYS
    }

    /// Lazily read every record, starting from the given bookmark.
    ///
    /// Nothing is fetched until the stream is polled, and dropping it
    /// abandons the walk without fetching further pages. The bookmark falls
    /// back to the configured start date; with neither, the read is a full
    /// sync.
    pub fn records(
        &self,
        starting: Option<DateTime<Utc>>,
    ) -> impl Stream<Item = Result<Value>> + '_ {
        let starting = starting.or(self.default_start);
        let pager = matches!(self.descriptor.family, FetchFamily::FilteredSearch).then(|| {
            SearchPager::new(build_search_criteria(
                &self.descriptor,
                &self.filter_fields,
                self.replication_key.as_deref(),
                starting,
            ))
        });
        let state = ReadState {
            pager,
            buffer: VecDeque::new(),
            bulk_fetched: false,
        };

        try_unfold(state, move |mut state| async move {
            loop {
                if let Some(record) = state.buffer.pop_front() {
                    return Ok(Some((self.post_process(record), state)));
                }

                let request = match &state.pager {
                    Some(pager) => match pager.next_request() {
                        Some(request) => request,
                        None => return Ok(None),
                    },
                    None => {
                        if state.bulk_fetched {
                            return Ok(None);
                        }
                        RequestBody::GetAll {
                            record_type: self.descriptor.soap_name.clone(),
                        }
                    }
                };

                let envelope = self
                    .client
                    .call_with_retry(&self.descriptor.name, &request)
                    .await?;
                if let Some(pager) = &mut state.pager {
                    pager.observe(&envelope)?;
                }
                state.bulk_fetched = true;
                state.buffer.extend(envelope.records());
            }
        })
    }

    /// Collect the whole stream into memory, for small types and tests
    pub async fn read_all(&self, starting: Option<DateTime<Utc>>) -> Result<Vec<Value>> {
        self.records(starting).try_collect().await
    }

    /// Highest replication-key value among the given records.
    ///
    /// Feeds the stream's bookmark after a read; None when the stream has no
    /// replication key or no record carried a parseable value.
    pub fn latest_bookmark(&self, records: &[Value]) -> Option<DateTime<Utc>> {
        let key = self.replication_key.as_deref()?;
        records
            .iter()
            .filter_map(|record| record.get(key)?.as_str())
            .filter_map(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
            .max()
    }

    /// Normalize the replication key to UTC RFC 3339 so bookmark comparisons
    /// are plain string comparisons downstream
    fn post_process(&self, mut record: Value) -> Value {
        if !self.replication_key_is_datetime {
            return record;
        }
        let Some(key) = self.replication_key.as_deref() else {
            return record;
        };
        if let Some(value) = record.get_mut(key) {
            if let Some(text) = value.as_str() {
                if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                    *value = Value::String(
                        parsed
                            .with_timezone(&Utc)
                            .to_rfc3339_opts(SecondsFormat::Secs, true),
                    );
                }
            }
        }
        record
    }
}
