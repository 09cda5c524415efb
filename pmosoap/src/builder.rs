//! Construction de documents SOAP à partir d'une [`Envelope`]

use std::collections::HashMap;
use std::io::{self, Write};

use tracing::debug;
use xmltree::{Element, Namespace, XMLNode};

use crate::SOAP_NAMESPACE;
use crate::config::EncoderConfig;
use crate::envelope::Envelope;
use crate::error::{Result, SoapError};
use crate::fault::{CarriedError, soap_element};

/// Serializable SOAP document produced by the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapDocument {
    root: Element,
    config: EncoderConfig,
}

impl SoapDocument {
    /// The `Envelope` root element
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// Writes the document with the options it was encoded with.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        self.write_with(writer, &self.config)
    }

    pub fn write_with<W: Write>(&self, writer: W, config: &EncoderConfig) -> Result<()> {
        self.root.write_with_config(writer, config.emitter_config())?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(buf)
    }

    pub fn to_xml_string(&self) -> Result<String> {
        String::from_utf8(self.to_bytes()?)
            .map_err(|e| SoapError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

/// Encodes with default options. See [`encode_with`].
pub fn encode(envelope: &Envelope) -> SoapDocument {
    encode_with(envelope, &EncoderConfig::default())
}

/// Encodes an envelope into a new document.
///
/// The result always has one `Header` and one `Body`, in that order. The
/// carried error, if any, is rendered as the last child of `Body`. Nodes
/// are cloned; `envelope` is not modified.
pub fn encode_with(envelope: &Envelope, config: &EncoderConfig) -> SoapDocument {
    assemble(
        envelope.headers.iter().cloned(),
        envelope.body.iter().cloned(),
        envelope
            .error
            .as_ref()
            .map(|e| e.to_element(&config.prefix)),
        config,
    )
}

/// Same as [`encode_with`] but moves the nodes instead of cloning them.
pub fn encode_owned(envelope: Envelope, config: &EncoderConfig) -> SoapDocument {
    let (headers, body, error) = envelope.into_parts();
    assemble(
        headers,
        body,
        error.map(|e: CarriedError| e.into_element(&config.prefix)),
        config,
    )
}

fn assemble(
    headers: impl IntoIterator<Item = Element>,
    body: impl IntoIterator<Item = Element>,
    fault: Option<Element>,
    config: &EncoderConfig,
) -> SoapDocument {
    let prefix = config.prefix.as_str();

    // liaisons visibles sous Header et Body : seulement le préfixe SOAP
    let scope = Scope::from([(prefix.to_string(), SOAP_NAMESPACE.to_string())]);
    let attach = |mut elem: Element| {
        declare_namespaces(&mut elem, &scope);
        XMLNode::Element(elem)
    };

    // Header
    let mut header = soap_element(prefix, "Header");
    header.children.extend(headers.into_iter().map(attach));
    let header_count = header.children.len();

    // Body, le Fault en dernier
    let mut body_elem = soap_element(prefix, "Body");
    body_elem.children.extend(body.into_iter().map(attach));
    let body_count = body_elem.children.len();
    let has_fault = fault.is_some();
    if let Some(fault) = fault {
        body_elem.children.push(attach(fault));
    }

    // Envelope
    let mut envelope = soap_element(prefix, "Envelope");
    let mut namespaces = Namespace::empty();
    namespaces.put(prefix, SOAP_NAMESPACE);
    envelope.namespaces = Some(namespaces);
    envelope.children.push(XMLNode::Element(header));
    envelope.children.push(XMLNode::Element(body_elem));

    debug!(
        headers = header_count,
        body = body_count,
        fault = has_fault,
        "Encoded SOAP envelope"
    );

    SoapDocument {
        root: envelope,
        config: config.clone(),
    }
}

/// Prefix to URI bindings in scope; `""` is the default namespace.
type Scope = HashMap<String, String>;

/// Declares on `elem` and its descendants every binding the emitter needs.
///
/// The emitter only writes the `namespaces` an element carries, so an
/// element built in memory with a `namespace` but no declaration would be
/// written unqualified. A binding is added only where the one in scope
/// differs, so parsed elements, which already carry theirs, get nothing.
/// An element in no namespace under a default namespace gets an
/// `xmlns=""` attribute, the emitter never writing that declaration.
fn declare_namespaces(elem: &mut Element, parent: &Scope) {
    let mut scope = parent.clone();
    if let Some(namespaces) = &elem.namespaces {
        for (prefix, uri) in namespaces {
            // pas émis, voir l'attribut xmlns="" plus bas
            if prefix == "xml" || prefix == "xmlns" || (prefix.is_empty() && uri.is_empty()) {
                continue;
            }
            scope.insert(prefix.to_string(), uri.to_string());
        }
    }

    match elem.namespace.clone().filter(|ns| !ns.is_empty()) {
        Some(uri) => {
            let prefix = elem.prefix.clone().unwrap_or_default();
            if scope.get(&prefix) != Some(&uri) {
                elem.namespaces
                    .get_or_insert_with(Namespace::empty)
                    .force_put(prefix.as_str(), uri.as_str());
                scope.insert(prefix, uri);
            }
        }
        None => {
            // un préfixe sans namespace ne peut pas être déclaré
            elem.prefix = None;
            if scope.get("").is_some_and(|uri| !uri.is_empty()) {
                elem.attributes.insert("xmlns".to_string(), String::new());
                scope.insert(String::new(), String::new());
            }
        }
    }

    for child in elem.children.iter_mut() {
        if let XMLNode::Element(child) = child {
            declare_namespaces(child, &scope);
        }
    }
}
