//! Tests for SOAP transport and envelope handling

use super::*;
use crate::auth::TokenPassport;
use crate::config::TapConfig;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_passport() -> TokenPassport {
    TokenPassport {
        account: "TSTDRV1749285".to_string(),
        consumer_key: "ck".to_string(),
        token: "tk".to_string(),
        nonce: "12345678901234567890".to_string(),
        timestamp: 1_700_000_000,
        signature: "c2ln".to_string(),
    }
}

fn search_result_page(page: u32, total_pages: u32, records: &str) -> String {
    format!(
        r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <searchResponse xmlns="urn:messages_2022_2.platform.webservices.netsuite.com">
      <platformCore:searchResult xmlns:platformCore="urn:core_2022_2.platform.webservices.netsuite.com">
        <platformCore:status isSuccess="true"/>
        <platformCore:totalRecords>1200</platformCore:totalRecords>
        <platformCore:pageSize>500</platformCore:pageSize>
        <platformCore:totalPages>{total_pages}</platformCore:totalPages>
        <platformCore:pageIndex>{page}</platformCore:pageIndex>
        <platformCore:searchId>WEBSERVICES_789</platformCore:searchId>
        <platformCore:recordList>{records}</platformCore:recordList>
      </platformCore:searchResult>
    </searchResponse>
  </soapenv:Body>
</soapenv:Envelope>"#
    )
}

fn failed_status_response(code: &str) -> String {
    format!(
        r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <getAllResponse xmlns="urn:messages_2022_2.platform.webservices.netsuite.com">
      <platformCore:getAllResult xmlns:platformCore="urn:core_2022_2.platform.webservices.netsuite.com">
        <platformCore:status isSuccess="false">
          <platformCore:statusDetail type="ERROR">
            <platformCore:code>{code}</platformCore:code>
            <platformCore:message>please retry later</platformCore:message>
          </platformCore:statusDetail>
        </platformCore:status>
      </platformCore:getAllResult>
    </getAllResponse>
  </soapenv:Body>
</soapenv:Envelope>"#
    )
}

fn get_all_success() -> String {
    r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <getAllResponse xmlns="urn:messages_2022_2.platform.webservices.netsuite.com">
      <platformCore:getAllResult xmlns:platformCore="urn:core_2022_2.platform.webservices.netsuite.com">
        <platformCore:status isSuccess="true"/>
        <platformCore:recordList>
          <platformCore:record internalId="1"><platformCore:symbol>USD</platformCore:symbol></platformCore:record>
          <platformCore:record internalId="2"><platformCore:symbol>EUR</platformCore:symbol></platformCore:record>
        </platformCore:recordList>
      </platformCore:getAllResult>
    </getAllResponse>
  </soapenv:Body>
</soapenv:Envelope>"#
        .to_string()
}

fn test_config(base_url: &str) -> TapConfig {
    TapConfig::from_json(&json!({
        "account": "TSTDRV1749285",
        "consumer_key": "ck",
        "consumer_secret": "cs",
        "token_key": "tk",
        "token_secret": "ts",
        "base_url": base_url,
    }))
    .unwrap()
}

mod xml_decoding {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_repeated_siblings_become_array() {
        let value = xml_to_value(
            "<root><item>1</item><item>2</item><item>3</item><only>x</only></root>",
        )
        .unwrap();
        assert_eq!(value["root"]["item"], json!([1, 2, 3]));
        assert_eq!(value["root"]["only"], json!("x"));
    }

    #[test]
    fn test_attributes_fold_into_fields() {
        let value = xml_to_value(
            r#"<ns:rec xmlns:ns="urn:x" internalId="123" xsi:type="ns:Account" isInactive="false">
                 <ns:name>Cash</ns:name>
               </ns:rec>"#,
        )
        .unwrap();
        let rec = &value["rec"];
        // Identifiers stay strings, booleans do not
        assert_eq!(rec["internalId"], json!("123"));
        assert_eq!(rec["isInactive"], json!(false));
        assert_eq!(rec["name"], json!("Cash"));
        assert!(rec.get("type").is_none());
        assert!(rec.get("xmlns:ns").is_none());
    }

    #[test]
    fn test_scalar_narrowing() {
        let value = xml_to_value(
            "<r><i>42</i><f>1.5</f><b>true</b><s>INV-001</s><d>2024-01-15T00:00:00Z</d></r>",
        )
        .unwrap();
        assert_eq!(value["r"]["i"], json!(42));
        assert_eq!(value["r"]["f"], json!(1.5));
        assert_eq!(value["r"]["b"], json!(true));
        assert_eq!(value["r"]["s"], json!("INV-001"));
        assert_eq!(value["r"]["d"], json!("2024-01-15T00:00:00Z"));
    }

    #[test]
    fn test_empty_element_is_null() {
        let value = xml_to_value("<r><gone/></r>").unwrap();
        assert_eq!(value["r"]["gone"], json!(null));
    }
}

mod request_building {
    use super::*;
    use pretty_assertions::assert_eq;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_passport_header_is_always_present() {
        let body = RequestBody::GetAll {
            record_type: "currency".to_string(),
        };
        let xml = build_request(&sample_passport(), None, &body).unwrap();
        assert!(xml.contains("<platformCore:account>TSTDRV1749285</platformCore:account>"));
        assert!(xml.contains("<platformCore:nonce>12345678901234567890</platformCore:nonce>"));
        assert!(xml.contains("<platformCore:timestamp>1700000000</platformCore:timestamp>"));
        assert!(xml.contains(r#"<platformCore:signature algorithm="HMAC-SHA256">c2ln"#));
        // Bulk fetches never carry search preferences
        assert!(!xml.contains("searchPreferences"));
        assert!(xml.contains(r#"<platformMsgs:record recordType="currency"/>"#));
    }

    #[test]
    fn test_search_carries_preferences_and_filters() {
        let body = RequestBody::Search {
            criteria: SearchCriteria {
                filter_type: "TransactionSearchBasic".to_string(),
                date_field: Some("lastModifiedDate".to_string()),
                on_or_after: Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()),
                record_type: Some("invoice".to_string()),
            },
        };
        let xml =
            build_request(&sample_passport(), Some(&SearchPreferences::default()), &body).unwrap();

        assert!(xml.contains("<platformMsgs:bodyFieldsOnly>true</platformMsgs:bodyFieldsOnly>"));
        assert!(xml.contains("<platformMsgs:pageSize>500</platformMsgs:pageSize>"));
        assert!(xml
            .contains("<platformMsgs:returnSearchColumns>true</platformMsgs:returnSearchColumns>"));

        assert!(xml.contains(r#"xsi:type="platformCommon:TransactionSearchBasic""#));
        assert!(xml.contains(r#"<platformCommon:lastModifiedDate operator="onOrAfter""#));
        assert!(xml.contains("<platformCore:searchValue>2024-01-15T00:00:00Z</platformCore:searchValue>"));
        assert!(xml.contains(r#"<platformCommon:recordType operator="contains""#));
        assert!(xml.contains("<platformCore:searchValue>invoice</platformCore:searchValue>"));
    }

    #[test]
    fn test_search_without_filters_has_empty_search_record() {
        let body = RequestBody::Search {
            criteria: SearchCriteria {
                filter_type: "CurrencySearchBasic".to_string(),
                ..Default::default()
            },
        };
        let xml =
            build_request(&sample_passport(), Some(&SearchPreferences::default()), &body).unwrap();
        assert!(!xml.contains("onOrAfter"));
        assert!(!xml.contains("contains"));
        assert!(xml.contains(r#"xsi:type="platformCommon:CurrencySearchBasic""#));
    }

    #[test]
    fn test_search_more_with_id_body() {
        let body = RequestBody::SearchMoreWithId {
            search_id: "WEBSERVICES_789".to_string(),
            page_index: 3,
        };
        let xml = build_request(&sample_passport(), Some(&SearchPreferences::default()), &body)
            .unwrap();
        assert!(xml.contains("<platformMsgs:searchId>WEBSERVICES_789</platformMsgs:searchId>"));
        assert!(xml.contains("<platformMsgs:pageIndex>3</platformMsgs:pageIndex>"));
    }
}

mod envelope_decoding {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_search_result_paging_fields() {
        let records =
            "<platformCore:record internalId=\"42\"><platformCore:tranId>INV-1</platformCore:tranId></platformCore:record>";
        let envelope = Envelope::parse(&search_result_page(2, 3, records)).unwrap();
        envelope.validate_status().unwrap();

        assert_eq!(envelope.search_id().as_deref(), Some("WEBSERVICES_789"));
        assert_eq!(envelope.page_index(), Some(2));
        assert_eq!(envelope.total_pages(), Some(3));
        assert_eq!(envelope.total_records(), Some(1200));
        // Not the last page: a full page's worth
        assert_eq!(envelope.approximate_record_count(500), 500);

        let last = Envelope::parse(&search_result_page(3, 3, records)).unwrap();
        assert_eq!(last.approximate_record_count(500), 200);
    }

    #[test]
    fn test_single_record_still_yields_a_list() {
        let records =
            "<platformCore:record internalId=\"42\"><platformCore:tranId>INV-1</platformCore:tranId></platformCore:record>";
        let envelope = Envelope::parse(&search_result_page(1, 1, records)).unwrap();
        let records = envelope.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["internalId"], json!("42"));
        assert_eq!(records[0]["tranId"], json!("INV-1"));
    }

    #[test]
    fn test_empty_record_list() {
        let envelope = Envelope::parse(&search_result_page(1, 0, "")).unwrap();
        assert!(envelope.records().is_empty());
        assert_eq!(envelope.total_pages(), Some(0));
    }

    #[test]
    fn test_transient_status_code_is_retryable() {
        let envelope = Envelope::parse(&failed_status_response("ACCT_TEMP_UNAVAILABLE")).unwrap();
        let err = envelope.validate_status().unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("please retry later"));
    }

    #[test]
    fn test_unknown_status_code_is_fatal() {
        let envelope = Envelope::parse(&failed_status_response("INVALID_LOGIN")).unwrap();
        let err = envelope.validate_status().unwrap_err();
        assert!(!err.is_retryable());
        assert!(matches!(err, Error::FatalApi { ref code, .. } if code == "INVALID_LOGIN"));
    }

    #[test]
    fn test_soap_fault_is_fatal() {
        let fault = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <soapenv:Fault>
      <faultcode>soapenv:Server.userException</faultcode>
      <faultstring>Invalid login attempt.</faultstring>
    </soapenv:Fault>
  </soapenv:Body>
</soapenv:Envelope>"#;
        let err = Envelope::parse(fault).unwrap_err();
        assert!(matches!(err, Error::FatalApi { .. }));
        assert!(err.to_string().contains("Invalid login attempt."));
    }

    #[test]
    fn test_body_without_result_is_malformed() {
        let xml = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body><unexpectedResponse/></soapenv:Body>
</soapenv:Envelope>"#;
        let err = Envelope::parse(xml).unwrap_err();
        assert!(matches!(err, Error::Envelope { .. }));
    }
}

mod transport {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_successful_get_all_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/NetSuitePort_2022_2"))
            .and(body_string_contains("platformMsgs:getAll"))
            .respond_with(ResponseTemplate::new(200).set_body_string(get_all_success()))
            .expect(1)
            .mount(&server)
            .await;

        let client = SoapClient::new(&test_config(&server.uri())).unwrap();
        let body = RequestBody::GetAll {
            record_type: "currency".to_string(),
        };
        let envelope = client.call("Currency", &body).await.unwrap();
        assert_eq!(envelope.records().len(), 2);
    }

    #[tokio::test]
    async fn test_transient_status_is_retried_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(failed_status_response("ACCT_TEMP_UNAVAILABLE")),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(get_all_success()))
            .expect(1)
            .mount(&server)
            .await;

        let client = SoapClient::new(&test_config(&server.uri()))
            .unwrap()
            .with_retry_unit(Duration::from_millis(1));
        let body = RequestBody::GetAll {
            record_type: "currency".to_string(),
        };
        let envelope = client.call_with_retry("Currency", &body).await.unwrap();
        assert_eq!(envelope.records().len(), 2);
    }

    #[tokio::test]
    async fn test_fatal_status_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(failed_status_response("INVALID_LOGIN")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = SoapClient::new(&test_config(&server.uri()))
            .unwrap()
            .with_retry_unit(Duration::from_millis(1));
        let body = RequestBody::GetAll {
            record_type: "currency".to_string(),
        };
        let err = client.call_with_retry("Currency", &body).await.unwrap_err();
        assert!(matches!(err, Error::FatalApi { .. }));
    }

    #[tokio::test]
    async fn test_persistent_transient_status_exhausts_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(failed_status_response("PAYROLL_IN_PROCESS")),
            )
            .expect(5)
            .mount(&server)
            .await;

        let client = SoapClient::new(&test_config(&server.uri()))
            .unwrap()
            .with_retry_unit(Duration::from_millis(1));
        let body = RequestBody::GetAll {
            record_type: "currency".to_string(),
        };
        let err = client.call_with_retry("Currency", &body).await.unwrap_err();
        assert!(matches!(err, Error::MaxRetriesExceeded { max_retries: 5 }));
    }

    #[tokio::test]
    async fn test_http_fault_response_surfaces_fault_string() {
        let server = MockServer::start().await;
        let fault = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <soapenv:Fault>
      <faultcode>soapenv:Server.userException</faultcode>
      <faultstring>Invalid login attempt.</faultstring>
    </soapenv:Fault>
  </soapenv:Body>
</soapenv:Envelope>"#;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string(fault))
            .expect(1)
            .mount(&server)
            .await;

        let client = SoapClient::new(&test_config(&server.uri())).unwrap();
        let body = RequestBody::GetAll {
            record_type: "currency".to_string(),
        };
        let err = client.call("Currency", &body).await.unwrap_err();
        assert!(err.to_string().contains("Invalid login attempt."));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_document_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/xsd/platform/v2022_2_0/coreTypes.xsd"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<schema/>"))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = SoapClient::new(&config).unwrap();
        let text = client.fetch_document(&config.core_types_url()).await.unwrap();
        assert_eq!(text, "<schema/>");
    }
}
