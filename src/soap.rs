//! SOAP plumbing for the Marketing Cloud partner API.
//!
//! Requests are plain string templates, since the platform is picky about the exact namespace
//! declarations. Responses are parsed into a `serde_json::Value` tree that keeps attributes apart
//! from child elements (`@_` prefix) so records can be deserialized with serde afterwards.

use crate::errors::DashboardError;
use crate::models::auth::AccessToken;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt::Display;

pub const SOAP_ENVELOPE_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
pub const ADDRESSING_NS: &str = "http://schemas.xmlsoap.org/ws/2004/08/addressing";
pub const WSS_UTILITY_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const FUEL_OAUTH_NS: &str = "http://exacttarget.com";
pub const PARTNER_API_NS: &str = "http://exacttarget.com/wsdl/partnerAPI";

/// Prefix for attribute keys in the parsed tree
pub const ATTRIBUTE_PREFIX: &str = "@_";
/// Key for the text of elements that also carry attributes
pub const TEXT_KEY: &str = "#text";

/// Properties requested for every automation, in display order
pub const AUTOMATION_PROPERTIES: [&str; 16] = [
    "Name",
    "Description",
    "CustomerKey",
    "IsActive",
    "CreatedDate",
    "ModifiedDate",
    "Status",
    "ProgramID",
    "CategoryID",
    "LastRunTime",
    "ScheduledTime",
    "LastSaveDate",
    "ModifiedBy",
    "CreatedBy",
    "AutomationType",
    "RecurrenceID",
];

/// Builds the Retrieve envelope for all active automations.
///
/// # Arguments
///
/// * `endpoint` - SOAP service URL, repeated in the `a:To` addressing header
/// * `access_token` - Bearer token; the platform wants it in the `fueloauth` header element too
pub fn build_retrieve_envelope(endpoint: &str, access_token: &AccessToken) -> String {
    let properties: String = AUTOMATION_PROPERTIES
        .iter()
        .map(|p| format!("\n        <Properties>{}</Properties>", p))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<s:Envelope xmlns:s="{soap}" xmlns:a="{addressing}" xmlns:u="{utility}">
  <s:Header>
    <a:Action s:mustUnderstand="1">Retrieve</a:Action>
    <a:To s:mustUnderstand="1">{endpoint}</a:To>
    <fueloauth xmlns="{fuel}">{token}</fueloauth>
  </s:Header>
  <s:Body xmlns:xsi="{xsi}" xmlns:xsd="{xsd}">
    <RetrieveRequestMsg xmlns="{partner}">
      <RetrieveRequest>
        <ObjectType>Automation</ObjectType>{properties}
        <Filter xsi:type="SimpleFilterPart">
          <Property>IsActive</Property>
          <SimpleOperator>equals</SimpleOperator>
          <Value>true</Value>
        </Filter>
      </RetrieveRequest>
    </RetrieveRequestMsg>
  </s:Body>
</s:Envelope>"#,
        soap = SOAP_ENVELOPE_NS,
        addressing = ADDRESSING_NS,
        utility = WSS_UTILITY_NS,
        endpoint = escape(endpoint),
        fuel = FUEL_OAUTH_NS,
        token = escape(access_token.secret()),
        xsi = XSI_NS,
        xsd = XSD_NS,
        partner = PARTNER_API_NS,
        properties = properties,
    )
}

fn malformed<E: Display>(err: E) -> DashboardError {
    DashboardError::MalformedResponse(err.to_string())
}

/// Element that is still open while parsing
struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, DashboardError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut children = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(malformed)?;
            let key = format!(
                "{}{}",
                ATTRIBUTE_PREFIX,
                String::from_utf8_lossy(attribute.key.as_ref())
            );
            let value = attribute.unescape_value().map_err(malformed)?;
            children.insert(key, Value::String(value.into_owned()));
        }
        Ok(Frame {
            name,
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let value = if self.children.is_empty() {
            Value::String(self.text)
        } else {
            let mut children = self.children;
            if !self.text.is_empty() {
                children.insert(TEXT_KEY.to_owned(), Value::String(self.text));
            }
            Value::Object(children)
        };
        (self.name, value)
    }
}

/// Repeated child elements end up as an array, a lone child as a bare value.
fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

/// Parses an XML document into a `Value` tree keyed by local element names.
///
/// Namespace prefixes are dropped from element names (`soap:Body` becomes `Body`) but kept on
/// attribute keys (`@_xsi:type`). Elements without attributes or children become strings.
pub fn parse_document(xml: &str) -> Result<Value, DashboardError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let (name, value) = Frame::open(&start)?.close();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None => root = Some((name, value)),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape().map_err(malformed)?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| malformed("unexpected closing tag"))?;
                let (name, value) = frame.close();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None => root = Some((name, value)),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed("document ended inside an open element"));
    }
    let (name, value) = root.ok_or_else(|| malformed("document has no root element"))?;
    let mut document = Map::new();
    document.insert(name, value);
    Ok(Value::Object(document))
}

/// Looks up a mandatory child element.
pub fn child<'a>(node: &'a Value, name: &str) -> Result<&'a Value, DashboardError> {
    node.get(name)
        .ok_or_else(|| DashboardError::MalformedResponse(format!("missing <{}> element", name)))
}

/// Normalizes a possibly repeated element into a list: absent is empty, a bare value is a
/// list of one.
pub fn coerce_to_sequence(value: Option<Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(single) => vec![single],
    }
}

/// Text content of a parsed element, whether it was a plain string or carried attributes.
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Object(map) => map.get(TEXT_KEY).and_then(text_of),
        Value::Array(items) => items.first().and_then(text_of),
        Value::Null => None,
    }
}

/// serde helper for record fields that are text elements in the response.
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_of))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_carries_namespaces_and_token() {
        let token = AccessToken::new("das.ist.ein.token").unwrap();
        let envelope =
            build_retrieve_envelope("https://mc.example/Service.asmx", &token);

        assert!(envelope.contains(r#"xmlns:s="http://www.w3.org/2003/05/soap-envelope""#));
        assert!(envelope.contains(r#"xmlns:a="http://schemas.xmlsoap.org/ws/2004/08/addressing""#));
        assert!(envelope.contains(r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#));
        assert!(envelope.contains(r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema""#));
        assert!(envelope.contains(r#"<RetrieveRequestMsg xmlns="http://exacttarget.com/wsdl/partnerAPI">"#));
        assert!(envelope
            .contains(r#"<fueloauth xmlns="http://exacttarget.com">das.ist.ein.token</fueloauth>"#));
        assert!(envelope.contains(r#"<a:To s:mustUnderstand="1">https://mc.example/Service.asmx</a:To>"#));
        assert!(envelope.contains("<ObjectType>Automation</ObjectType>"));
        assert!(envelope.contains(r#"<Filter xsi:type="SimpleFilterPart">"#));
        assert_eq!(envelope.matches("<Properties>").count(), 16);
    }

    #[test]
    fn envelope_lists_properties_in_order() {
        let token = AccessToken::new("t").unwrap();
        let envelope = build_retrieve_envelope("https://mc.example/Service.asmx", &token);
        let positions: Vec<usize> = AUTOMATION_PROPERTIES
            .iter()
            .map(|p| envelope.find(&format!("<Properties>{}</Properties>", p)).unwrap())
            .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn envelope_is_well_formed() {
        let token = AccessToken::new("a<b&c").unwrap();
        let envelope = build_retrieve_envelope("https://mc.example/Service.asmx", &token);
        let document = parse_document(&envelope).unwrap();

        let header = &document["Envelope"]["Header"];
        assert_eq!(text_of(&header["fueloauth"]).as_deref(), Some("a<b&c"));
        assert_eq!(
            document["Envelope"]["Body"]["RetrieveRequestMsg"]["RetrieveRequest"]["Properties"]
                .as_array()
                .map(Vec::len),
            Some(16)
        );
    }

    #[test]
    fn attributes_and_children_stay_apart() {
        let document = parse_document(
            r#"<root><item xsi:type="Automation"><Name>First</Name></item><Status code="x">2</Status><Empty/></root>"#,
        )
        .unwrap();

        assert_eq!(
            document,
            json!({
                "root": {
                    "item": { "@_xsi:type": "Automation", "Name": "First" },
                    "Status": { "@_code": "x", "#text": "2" },
                    "Empty": ""
                }
            })
        );
    }

    #[test]
    fn repeated_elements_become_arrays() {
        let document = parse_document("<r><x>1</x><x>2</x><x>3</x></r>").unwrap();
        assert_eq!(document, json!({ "r": { "x": ["1", "2", "3"] } }));
    }

    #[test]
    fn broken_documents_are_malformed() {
        for xml in ["", "<a><b></a>", "<a>", "not xml at all"] {
            assert!(
                matches!(parse_document(xml), Err(DashboardError::MalformedResponse(_))),
                "expected {:?} to be rejected",
                xml
            );
        }
    }

    #[test]
    fn coerce_single_and_missing() {
        assert!(coerce_to_sequence(None).is_empty());
        assert_eq!(coerce_to_sequence(Some(json!({"a": "1"}))).len(), 1);
        assert_eq!(coerce_to_sequence(Some(json!([{"a": "1"}, {"a": "2"}]))).len(), 2);
    }

    #[test]
    fn text_of_variants() {
        assert_eq!(text_of(&json!("2")).as_deref(), Some("2"));
        assert_eq!(text_of(&json!(2)).as_deref(), Some("2"));
        assert_eq!(text_of(&json!(true)).as_deref(), Some("true"));
        assert_eq!(text_of(&json!({"#text": "2", "@_a": "b"})).as_deref(), Some("2"));
        assert_eq!(text_of(&json!({"@_xsi:nil": "true"})), None);
    }
}
