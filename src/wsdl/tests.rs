//! Tests for WSDL parsing and type resolution

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;

const SAMPLE_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<schema xmlns="http://www.w3.org/2001/XMLSchema"
        xmlns:xsd="http://www.w3.org/2001/XMLSchema"
        xmlns:platformCore="urn:core_2022_2.platform.webservices.netsuite.com">
  <complexType name="Account">
    <sequence>
      <element name="acctName" type="xsd:string" minOccurs="0"/>
      <element name="inventory" type="xsd:boolean" minOccurs="0"/>
      <element name="openingBalance" type="xsd:decimal" minOccurs="0"/>
      <element name="lastModifiedDate" type="xsd:dateTime" minOccurs="0"/>
      <element name="subsidiaryList" type="platformCore:RecordRefList" minOccurs="0"/>
    </sequence>
    <attribute name="internalId" type="xsd:string"/>
  </complexType>
  <complexType name="RecordRefList">
    <sequence>
      <element name="recordRef" type="platformCore:RecordRef" minOccurs="0" maxOccurs="unbounded"/>
    </sequence>
  </complexType>
  <complexType name="RecordRef">
    <sequence>
      <element name="name" type="xsd:string" minOccurs="0"/>
    </sequence>
    <attribute name="internalId" type="xsd:string"/>
    <attribute name="externalId" type="xsd:string"/>
  </complexType>
</schema>
"#;

#[test]
fn test_parse_registers_all_named_types() {
    let registry = TypeRegistry::parse(SAMPLE_XSD).unwrap();
    assert_eq!(registry.len(), 3);
    assert!(registry.resolve("Account").is_ok());
    assert!(registry.resolve("RecordRefList").is_ok());
    assert!(registry.resolve("RecordRef").is_ok());
}

#[test]
fn test_resolve_missing_type_is_deterministic() {
    let registry = TypeRegistry::parse(SAMPLE_XSD).unwrap();
    for _ in 0..3 {
        let err = registry.resolve("NoSuchType").unwrap_err();
        assert!(matches!(
            err,
            Error::TypeNotFound { ref type_name } if type_name == "NoSuchType"
        ));
        assert!(!err.is_retryable());
    }
}

#[test]
fn test_fields_capture_elements_and_attributes() {
    let registry = TypeRegistry::parse(SAMPLE_XSD).unwrap();
    let account = registry.resolve("Account").unwrap();

    let name = account.field("acctName").unwrap();
    assert_eq!(name.wire_type, WireType::String);
    assert!(!name.accepts_multiple);

    assert_eq!(
        account.field("inventory").unwrap().wire_type,
        WireType::Boolean
    );
    assert_eq!(
        account.field("openingBalance").unwrap().wire_type,
        WireType::Number
    );
    assert_eq!(
        account.field("lastModifiedDate").unwrap().wire_type,
        WireType::DateTime
    );
    assert_eq!(
        account.field("internalId").unwrap().wire_type,
        WireType::String
    );
    assert_eq!(
        account.field("subsidiaryList").unwrap().wire_type,
        WireType::Complex("RecordRefList".to_string())
    );
}

#[test]
fn test_max_occurs_unbounded_sets_accepts_multiple() {
    let registry = TypeRegistry::parse(SAMPLE_XSD).unwrap();
    let list = registry.resolve("RecordRefList").unwrap();
    assert!(list.field("recordRef").unwrap().accepts_multiple);
}

#[test]
fn test_field_names_membership() {
    let registry = TypeRegistry::parse(SAMPLE_XSD).unwrap();
    let names = registry.field_names("Account").unwrap();
    assert!(names.contains("lastModifiedDate"));
    assert!(names.contains("internalId"));
    assert!(!names.contains("recordType"));
}

#[test]
fn test_field_name_ignore_case() {
    let registry = TypeRegistry::parse(SAMPLE_XSD).unwrap();
    let account = registry.resolve("Account").unwrap();
    assert_eq!(
        account.field_name_ignore_case("lastmodifieddate"),
        Some("lastModifiedDate")
    );
    assert_eq!(account.field_name_ignore_case("nope"), None);
}

#[test]
fn test_wire_type_mapping() {
    assert_eq!(WireType::from_xsd("xsd:string"), WireType::String);
    assert_eq!(WireType::from_xsd("xsd:boolean"), WireType::Boolean);
    assert_eq!(WireType::from_xsd("xsd:long"), WireType::Integer);
    assert_eq!(WireType::from_xsd("xsd:double"), WireType::Number);
    assert_eq!(WireType::from_xsd("xsd:date"), WireType::DateTime);
    assert_eq!(
        WireType::from_xsd("xsd:base64Binary"),
        WireType::Unsupported("base64Binary".to_string())
    );
    assert_eq!(
        WireType::from_xsd("platformCore:RecordRef"),
        WireType::Complex("RecordRef".to_string())
    );
}

#[test]
fn test_empty_document_parses_to_empty_registry() {
    let registry = TypeRegistry::parse("<schema></schema>").unwrap();
    assert!(registry.is_empty());
}
