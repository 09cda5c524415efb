//! Structures de l'enveloppe SOAP

use std::io::Read;

use xmltree::Element;

use crate::builder::{self, SoapDocument};
use crate::config::{DecoderConfig, EncoderConfig};
use crate::error::Result;
use crate::fault::CarriedError;
use crate::parser;

/// Enveloppe SOAP complète
///
/// Holds the `Header` children, the non-Fault `Body` children and at most
/// one carried error. Both sequences are always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub(crate) headers: Vec<Element>,
    pub(crate) body: Vec<Element>,
    pub(crate) error: Option<CarriedError>,
}

impl Envelope {
    /// Crée une enveloppe vide
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        headers: Vec<Element>,
        body: Vec<Element>,
        error: Option<CarriedError>,
    ) -> Self {
        Self {
            headers,
            body,
            error,
        }
    }

    /// Decodes an envelope from a byte stream with default options.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        parser::decode(reader)
    }

    pub fn from_bytes(xml: &[u8]) -> Result<Self> {
        parser::decode(xml)
    }

    pub fn from_reader_with<R: Read>(reader: R, config: &DecoderConfig) -> Result<Self> {
        parser::decode_with(reader, config)
    }

    pub fn with_header(mut self, header: Element) -> Self {
        self.headers.push(header);
        self
    }

    pub fn with_body(mut self, element: Element) -> Self {
        self.body.push(element);
        self
    }

    /// Replaces the carried error.
    pub fn with_error(mut self, error: impl Into<CarriedError>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn headers(&self) -> &[Element] {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Vec<Element> {
        &mut self.headers
    }

    pub fn body(&self) -> &[Element] {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Vec<Element> {
        &mut self.body
    }

    pub fn error(&self) -> Option<&CarriedError> {
        self.error.as_ref()
    }

    pub fn set_error(&mut self, error: Option<CarriedError>) {
        self.error = error;
    }

    pub fn take_error(&mut self) -> Option<CarriedError> {
        self.error.take()
    }

    /// True when the envelope carries an error.
    pub fn is_fault(&self) -> bool {
        self.error.is_some()
    }

    /// Builds a document, leaving `self` untouched.
    pub fn to_document(&self) -> SoapDocument {
        builder::encode(self)
    }

    pub fn to_document_with(&self, config: &EncoderConfig) -> SoapDocument {
        builder::encode_with(self, config)
    }

    /// Builds a document by moving the nodes out of the envelope.
    pub fn into_document(self, config: &EncoderConfig) -> SoapDocument {
        builder::encode_owned(self, config)
    }

    pub fn into_parts(self) -> (Vec<Element>, Vec<Element>, Option<CarriedError>) {
        (self.headers, self.body, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::GenericFault;

    #[test]
    fn test_new_envelope_is_empty() {
        let envelope = Envelope::new();
        assert!(envelope.headers().is_empty());
        assert!(envelope.body().is_empty());
        assert!(!envelope.is_fault());
    }

    #[test]
    fn test_builder_keeps_order() {
        let envelope = Envelope::new()
            .with_header(Element::new("First"))
            .with_header(Element::new("Second"))
            .with_body(Element::new("Play"));

        let names: Vec<_> = envelope.headers().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
        assert_eq!(envelope.body()[0].name, "Play");
    }

    #[test]
    fn test_single_carried_error() {
        let mut envelope = Envelope::new()
            .with_error(GenericFault::new("a", 1, "first", ""))
            .with_error(GenericFault::new("b", 2, "second", ""));

        assert_eq!(envelope.error().unwrap().message(), "second");
        assert!(envelope.take_error().is_some());
        assert!(!envelope.is_fault());
    }
}
