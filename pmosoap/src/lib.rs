//! # pmosoap - enveloppes SOAP 1.1
//!
//! Decoding and encoding of SOAP 1.1 envelopes on top of `xmltree`.
//!
//! ## Fonctionnalités
//!
//! - Parsing d'enveloppes SOAP avec validation de la structure
//! - Extraction des `Header`, du `Body` et du `Fault`
//! - Construction de documents à partir d'une [`Envelope`]
//! - Round-trip exact des Faults reçus
//! - Décompression gzip des requêtes HTTP
//!
//! ## Architecture
//!
//! - [`Envelope`] : headers, body and an optional [`CarriedError`]
//! - [`decode`] : byte stream to [`Envelope`]
//! - [`encode`] : [`Envelope`] to [`SoapDocument`]
//! - [`from_request`] : HTTP request body to [`Envelope`]
//! - [`SoapAction`] : RPC action carried by the body
//!
//! ## Example
//!
//! ```
//! use pmosoap::{Envelope, GenericFault};
//!
//! let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
//!   <s:Body>
//!     <u:Stop xmlns:u="urn:schemas-upnp-org:service:AVTransport:1"/>
//!   </s:Body>
//! </s:Envelope>"#;
//!
//! let envelope = Envelope::from_bytes(xml.as_bytes())?;
//! assert!(envelope.headers().is_empty());
//! assert_eq!(envelope.body()[0].name, "Stop");
//!
//! // Réponse en erreur
//! let response = Envelope::new().with_error(GenericFault::new("pmosoap::Busy", 1, "busy", ""));
//! let xml = response.to_document().to_xml_string()?;
//! assert!(xml.contains("<soap:faultstring>busy</soap:faultstring>"));
//! # Ok::<(), pmosoap::SoapError>(())
//! ```

mod action;
mod builder;
mod config;
mod envelope;
mod error;
mod fault;
mod parser;
pub mod qname;
mod request;

pub use action::SoapAction;
pub use builder::{SoapDocument, encode, encode_owned, encode_with};
pub use config::{DecoderConfig, EncoderConfig, SoapConfig};
pub use envelope::Envelope;
pub use error::{MISSING_ELEMENT, Result, SoapError};
pub use fault::{CarriedError, GenericFault, StructuralFault};
pub use parser::{decode, decode_with};
pub use qname::QName;
pub use request::{CONTENT_ENCODING, InboundRequest, from_request, from_request_with};

/// SOAP 1.1 envelope namespace
pub const SOAP_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
