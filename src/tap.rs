//! Connector entry point
//!
//! `Tap` ties the pieces together: it loads the type registry on first use,
//! discovers the account's record types from the catalog, and hands out
//! bound streams. Streams whose types are missing from the WSDL are logged
//! and skipped rather than failing the whole run.

use crate::config::TapConfig;
use crate::discovery::discover_record_types;
use crate::error::Result;
use crate::soap::SoapClient;
use crate::state::StateManager;
use crate::stream::RecordStream;
use crate::wsdl::{TypeRegistry, WsdlCache};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// One configured connector run.
pub struct Tap {
    config: TapConfig,
    client: Arc<SoapClient>,
    cache: Option<WsdlCache>,
    registry: OnceCell<Arc<TypeRegistry>>,
}

impl Tap {
    /// Build a tap from a validated config.
    pub fn new(config: TapConfig) -> Result<Self> {
        config.validate()?;
        let client = Arc::new(SoapClient::new(&config)?);
        let cache = config
            .cache_wsdl
            .then(|| WsdlCache::new(default_cache_dir()));
        Ok(Self {
            config,
            client,
            cache,
            registry: OnceCell::new(),
        })
    }

    /// Point the WSDL cache somewhere else (tests)
    #[cfg(test)]
    pub(crate) fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        if self.cache.is_some() {
            self.cache = Some(WsdlCache::new(dir.into()));
        }
        self
    }

    /// The type registry, loaded on first use and shared afterwards.
    pub async fn type_registry(&self) -> Result<&Arc<TypeRegistry>> {
        self.registry
            .get_or_try_init(|| async {
                let document = self.fetch_wsdl().await?;
                let registry = TypeRegistry::parse(&document)?;
                Ok(Arc::new(registry))
            })
            .await
    }

    async fn fetch_wsdl(&self) -> Result<String> {
        let url = self.config.wsdl_url();
        if let Some(cache) = &self.cache {
            if let Some(document) = cache.get(&url).await {
                debug!("using cached WSDL");
                return Ok(document);
            }
        }
        let document = self.client.fetch_document(&url).await?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&url, &document).await {
                // Cache trouble must not fail the run
                warn!(error = %e, "could not cache WSDL");
            }
        }
        Ok(document)
    }

    /// Discover the account's streams.
    ///
    /// Fetches the record-type catalog, builds a descriptor per fetchable
    /// type, and binds each to its schema. A type the WSDL cannot resolve is
    /// skipped with a warning.
    pub async fn discover(&self) -> Result<Vec<RecordStream>> {
        let catalog = self
            .client
            .fetch_document(&self.config.core_types_url())
            .await?;
        let descriptors = discover_record_types(&catalog)?;
        let registry = self.type_registry().await?;

        let mut streams = Vec::new();
        for descriptor in descriptors {
            let name = descriptor.name.clone();
            match RecordStream::new(
                descriptor,
                registry,
                Arc::clone(&self.client),
                self.config.start_date,
            ) {
                Ok(stream) => streams.push(stream),
                Err(e) => warn!(stream = %name, error = %e, "skipping stream"),
            }
        }
        info!(streams = streams.len(), "discovery complete");
        Ok(streams)
    }

    /// Read one stream from its bookmark and advance the bookmark afterward.
    pub async fn sync_stream(
        &self,
        stream: &RecordStream,
        state: &StateManager,
    ) -> Result<Vec<Value>> {
        let starting = state.bookmark(stream.name()).await;
        let records = stream.read_all(starting).await?;

        if let Some(bookmark) = stream.latest_bookmark(&records) {
            state.advance(stream.name(), bookmark).await;
            state.save().await?;
        }
        info!(
            stream = %stream.name(),
            records = records.len(),
            "synced stream"
        );
        Ok(records)
    }
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("tap-netsuite-wsdl")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::FetchFamily;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_WSDL: &str = r#"<?xml version="1.0"?>
<definitions xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <types>
    <xsd:schema>
      <complexType name="Account">
        <sequence>
          <element name="acctName" type="xsd:string" minOccurs="0"/>
          <element name="lastModifiedDate" type="xsd:dateTime" minOccurs="0"/>
        </sequence>
        <attribute name="internalId" type="xsd:string"/>
      </complexType>
      <complexType name="AccountSearchBasic">
        <sequence>
          <element name="lastModifiedDate" type="xsd:dateTime" minOccurs="0"/>
        </sequence>
      </complexType>
      <complexType name="Currency">
        <sequence>
          <element name="symbol" type="xsd:string" minOccurs="0"/>
        </sequence>
        <attribute name="internalId" type="xsd:string"/>
      </complexType>
    </xsd:schema>
  </types>
</definitions>
"#;

    const SAMPLE_CATALOG: &str = r#"<?xml version="1.0"?>
<schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <simpleType name="GetAllRecordType">
    <restriction base="xsd:string">
      <enumeration value="currency"/>
    </restriction>
  </simpleType>
  <simpleType name="SearchRecordType">
    <restriction base="xsd:string">
      <enumeration value="account"/>
      <enumeration value="customer"/>
    </restriction>
  </simpleType>
</schema>
"#;

    fn test_config(base_url: &str, cache_wsdl: bool) -> TapConfig {
        TapConfig::from_json(&json!({
            "account": "TSTDRV1749285",
            "consumer_key": "ck",
            "consumer_secret": "cs",
            "token_key": "tk",
            "token_secret": "ts",
            "cache_wsdl": cache_wsdl,
            "base_url": base_url,
        }))
        .unwrap()
    }

    async fn mount_documents(server: &MockServer, wsdl_expect: u64) {
        Mock::given(method("GET"))
            .and(path("/wsdl/v2022_2_0/netsuite.wsdl"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_WSDL))
            .expect(wsdl_expect)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/xsd/platform/v2022_2_0/coreTypes.xsd"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_CATALOG))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_discover_binds_known_streams_and_skips_unknown() {
        let server = MockServer::start().await;
        mount_documents(&server, 1).await;

        let tap = Tap::new(test_config(&server.uri(), false)).unwrap();
        let streams = tap.discover().await.unwrap();

        // Currency and Account resolve; customer and every shared-filter
        // sub-type are absent from this WSDL and get skipped
        let names: Vec<&str> = streams.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Currency", "Account"]);

        let currency = &streams[0];
        assert_eq!(currency.descriptor().family, FetchFamily::BulkFetch);
        let account = &streams[1];
        assert_eq!(account.replication_key(), Some("lastModifiedDate"));
    }

    #[tokio::test]
    async fn test_registry_is_loaded_once() {
        let server = MockServer::start().await;
        mount_documents(&server, 1).await;

        let tap = Tap::new(test_config(&server.uri(), false)).unwrap();
        let first = tap.type_registry().await.unwrap().len();
        let second = tap.type_registry().await.unwrap().len();
        assert_eq!(first, second);
        server.verify().await;
    }

    #[tokio::test]
    async fn test_wsdl_cache_avoids_refetch() {
        let server = MockServer::start().await;
        mount_documents(&server, 1).await;
        let dir = tempfile::tempdir().unwrap();

        let tap = Tap::new(test_config(&server.uri(), true))
            .unwrap()
            .with_cache_dir(dir.path());
        tap.type_registry().await.unwrap();

        // A second tap over the same cache directory never hits the server
        let tap = Tap::new(test_config(&server.uri(), true))
            .unwrap()
            .with_cache_dir(dir.path());
        tap.type_registry().await.unwrap();
        server.verify().await;
    }
}
