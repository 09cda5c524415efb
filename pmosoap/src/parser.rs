//! Parser SOAP : flux d'octets vers [`Envelope`]

use std::io::{BufReader, Read};

use tracing::{debug, warn};
use xmltree::{Element, XMLNode};

use crate::config::DecoderConfig;
use crate::envelope::Envelope;
use crate::error::{Result, SoapError};
use crate::fault::StructuralFault;
use crate::qname::{QName, is_soap};

/// Decodes a SOAP envelope with default options.
pub fn decode<R: Read>(reader: R) -> Result<Envelope> {
    decode_with(reader, &DecoderConfig::default())
}

/// Decodes a SOAP envelope.
///
/// The root must be `{SOAP_NAMESPACE}Envelope` and its element children
/// must be `Header` or `Body` in the same namespace. `Header` children
/// become the headers; `Body` children become the body, except a `Fault`
/// which becomes the carried error. Unless `reject_duplicates` is set, a
/// repeated `Header`, `Body` or `Fault` replaces the previous one.
pub fn decode_with<R: Read>(reader: R, config: &DecoderConfig) -> Result<Envelope> {
    // xml-rs lit octet par octet
    let nodes = Element::parse_all(BufReader::new(reader))?;
    let root = nodes
        .into_iter()
        .find_map(into_element)
        .ok_or_else(SoapError::missing_root)?;

    if !is_soap(&root, "Envelope") {
        return Err(SoapError::invalid_envelope(QName::of(&root).to_string()));
    }

    let mut envelope = Envelope::new();
    let mut seen_header = false;
    let mut seen_body = false;

    for child in root.children.into_iter().filter_map(into_element) {
        if is_soap(&child, "Header") {
            if seen_header {
                duplicate(config, &child)?;
            }
            seen_header = true;
            envelope.headers = child.children.into_iter().filter_map(into_element).collect();
        } else if is_soap(&child, "Body") {
            if seen_body {
                duplicate(config, &child)?;
            }
            seen_body = true;

            let mut body = Vec::new();
            for elem in child.children.into_iter().filter_map(into_element) {
                if is_soap(&elem, "Fault") {
                    if envelope.error.is_some() {
                        duplicate(config, &elem)?;
                    }
                    envelope.error = Some(StructuralFault::new(elem)?.into());
                } else {
                    body.push(elem);
                }
            }
            envelope.body = body;
        } else {
            return Err(SoapError::invalid_envelope(QName::of(&child).to_string()));
        }
    }

    debug!(
        headers = envelope.headers.len(),
        body = envelope.body.len(),
        fault = envelope.error.is_some(),
        "Decoded SOAP envelope"
    );
    Ok(envelope)
}

fn into_element(node: XMLNode) -> Option<Element> {
    match node {
        XMLNode::Element(elem) => Some(elem),
        _ => None,
    }
}

fn duplicate(config: &DecoderConfig, element: &Element) -> Result<()> {
    let name = QName::of(element).to_string();
    if config.reject_duplicates {
        return Err(SoapError::duplicate(name));
    }
    warn!(element = %name, "Duplicate SOAP element, keeping the last one");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

    #[test]
    fn test_parse_simple_action() {
        let xml = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <u:Play xmlns:u="urn:schemas-upnp-org:service:AVTransport:1">
      <InstanceID>0</InstanceID>
      <Speed>1</Speed>
    </u:Play>
  </s:Body>
</s:Envelope>"#;

        let envelope = decode(xml.as_bytes()).unwrap();
        assert!(envelope.headers().is_empty());
        assert_eq!(envelope.body().len(), 1);
        assert_eq!(envelope.body()[0].name, "Play");
        assert_eq!(
            envelope.body()[0].namespace.as_deref(),
            Some("urn:schemas-upnp-org:service:AVTransport:1")
        );
        assert!(!envelope.is_fault());
    }

    #[test]
    fn test_missing_body_is_empty() {
        let xml = format!(r#"<Envelope xmlns="{SOAP_NS}"><Header><Token/></Header></Envelope>"#);
        let envelope = decode(xml.as_bytes()).unwrap();
        assert_eq!(envelope.headers().len(), 1);
        assert!(envelope.body().is_empty());
    }

    #[test]
    fn test_root_must_be_soap_envelope() {
        let err = decode("<Foo/>".as_bytes()).unwrap_err();
        assert!(matches!(err, SoapError::InvalidEnvelope { .. }));
        assert_eq!(err.element(), Some("Foo"));

        // bon nom local, mauvais namespace
        let err = decode(r#"<Envelope xmlns="urn:other"/>"#.as_bytes()).unwrap_err();
        assert_eq!(err.element(), Some("{urn:other}Envelope"));
    }

    #[test]
    fn test_unknown_child_rejected() {
        let xml = format!(r#"<Envelope xmlns="{SOAP_NS}"><Body/><Extra/></Envelope>"#);
        let err = decode(xml.as_bytes()).unwrap_err();
        assert!(err.is_invalid_envelope());
        assert_eq!(err.element(), Some(format!("{{{SOAP_NS}}}Extra").as_str()));
    }

    #[test]
    fn test_unqualified_header_rejected() {
        let xml = format!(r#"<s:Envelope xmlns:s="{SOAP_NS}"><Header/></s:Envelope>"#);
        let err = decode(xml.as_bytes()).unwrap_err();
        assert_eq!(err.element(), Some("Header"));
    }

    #[test]
    fn test_malformed_xml() {
        let err = decode("<Envelope><Body></Envelope>".as_bytes()).unwrap_err();
        assert!(matches!(err, SoapError::MalformedXml(_)));
    }

    #[test]
    fn test_duplicate_header_last_wins() {
        let xml = format!(
            r#"<Envelope xmlns="{SOAP_NS}"><Header><A/></Header><Header><B/><C/></Header></Envelope>"#
        );
        let envelope = decode(xml.as_bytes()).unwrap();
        let names: Vec<_> = envelope.headers().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["B", "C"]);
    }

    #[test]
    fn test_duplicate_fault_last_wins() {
        let xml = format!(
            r#"<Envelope xmlns="{SOAP_NS}"><Body><Fault><faultstring>one</faultstring></Fault><Fault><faultstring>two</faultstring></Fault></Body></Envelope>"#
        );
        let envelope = decode(xml.as_bytes()).unwrap();
        assert!(envelope.body().is_empty());
        assert_eq!(envelope.error().unwrap().message(), "two");
    }

    #[test]
    fn test_reject_duplicates() {
        let config = DecoderConfig {
            reject_duplicates: true,
        };
        let xml = format!(r#"<Envelope xmlns="{SOAP_NS}"><Body><A/></Body><Body><B/></Body></Envelope>"#);
        let err = decode_with(xml.as_bytes(), &config).unwrap_err();
        assert!(matches!(err, SoapError::Duplicate { .. }));
        assert_eq!(err.element(), Some(format!("{{{SOAP_NS}}}Body").as_str()));
    }

    #[test]
    fn test_fault_is_extracted_from_body() {
        let xml = format!(
            r#"<Envelope xmlns="{SOAP_NS}"><Body><Before/><Fault><faultcode>Server</faultcode></Fault><After/></Body></Envelope>"#
        );
        let envelope = decode(xml.as_bytes()).unwrap();
        let names: Vec<_> = envelope.body().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Before", "After"]);
        assert!(envelope.error().unwrap().is_structural());
    }

    /// Compte les appels à `read` sur le flux d'origine
    struct CountingReader<'a> {
        data: &'a [u8],
        reads: &'a std::cell::Cell<usize>,
    }

    impl Read for CountingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.reads.set(self.reads.get() + 1);
            self.data.read(buf)
        }
    }

    #[test]
    fn test_source_is_read_in_blocks() {
        let xml = format!(
            r#"<Envelope xmlns="{SOAP_NS}"><Header><Token>0123456789</Token></Header><Body><Stop/></Body></Envelope>"#
        );
        let reads = std::cell::Cell::new(0);
        let reader = CountingReader {
            data: xml.as_bytes(),
            reads: &reads,
        };

        let envelope = decode(reader).unwrap();
        assert_eq!(envelope.body().len(), 1);
        assert!(reads.get() < 8, "{} reads for {} bytes", reads.get(), xml.len());
    }
}
