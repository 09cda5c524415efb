//! SOAP Faults : erreur portée par une enveloppe
//!
//! A [`CarriedError`] is either a [`StructuralFault`], which keeps a parsed
//! `Fault` element verbatim so that it is re-emitted unchanged, or a
//! [`GenericFault`], which is only turned into a `Fault` element when the
//! envelope is encoded.

use std::error::Error as StdError;
use std::fmt;

use xmltree::{Element, XMLNode};

use crate::SOAP_NAMESPACE;
use crate::error::{Result, SoapError};
use crate::qname::{QName, child_elements, is_soap, text_of};

/// Builds an empty `{SOAP_NAMESPACE}local` element using `prefix`.
pub(crate) fn soap_element(prefix: &str, local: &str) -> Element {
    let mut elem = Element::new(local);
    elem.namespace = Some(SOAP_NAMESPACE.to_string());
    if !prefix.is_empty() {
        elem.prefix = Some(prefix.to_string());
    }
    elem
}

fn soap_text_element(prefix: &str, local: &str, text: &str) -> Element {
    let mut elem = soap_element(prefix, local);
    if !text.is_empty() {
        elem.children.push(XMLNode::Text(text.to_string()));
    }
    elem
}

/// A `Fault` element read from an inbound envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralFault {
    element: Element,
}

impl StructuralFault {
    /// Wraps `element`, which must be `{SOAP_NAMESPACE}Fault`.
    pub fn new(element: Element) -> Result<Self> {
        if !is_soap(&element, "Fault") {
            return Err(SoapError::invalid_envelope(QName::of(&element).to_string()));
        }
        Ok(Self { element })
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn into_element(self) -> Element {
        self.element
    }

    // SOAP 1.1 laisse les enfants du Fault non qualifiés : on cherche par nom local
    fn child_text(&self, local: &str) -> Option<String> {
        child_elements(&self.element)
            .find(|e| e.name == local)
            .map(text_of)
    }

    /// Text of the `faultcode` child
    pub fn fault_code(&self) -> Option<String> {
        self.child_text("faultcode")
    }

    /// Text of the `faultstring` child
    pub fn fault_string(&self) -> Option<String> {
        self.child_text("faultstring")
    }

    /// Text of the `detail` child
    pub fn detail(&self) -> Option<String> {
        self.child_text("detail")
    }
}

impl fmt::Display for StructuralFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SOAP Fault {}: {}",
            self.fault_code().unwrap_or_default(),
            self.fault_string().unwrap_or_default()
        )
    }
}

impl StdError for StructuralFault {}

/// An application error to be rendered as a synthesized `Fault`.
///
/// The `faultcode` is `{kind}.{code}`, the `faultstring` is `message` and
/// `detail` holds the full diagnostic text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericFault {
    pub kind: String,
    pub code: i64,
    pub message: String,
    pub detail: String,
}

impl GenericFault {
    pub fn new(
        kind: impl Into<String>,
        code: i64,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            code,
            message: message.into(),
            detail: detail.into(),
        }
    }

    /// Captures any error value, with code `0`.
    ///
    /// `kind` is the Rust type name of `E`; `detail` is the debug
    /// representation followed by the `source()` chain.
    pub fn from_error<E: StdError + 'static>(err: &E) -> Self {
        let mut detail = format!("{:?}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            detail.push_str("\nCaused by: ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::new(std::any::type_name::<E>(), 0, err.to_string(), detail)
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// `faultcode` text: `{kind}.{code}`
    pub fn fault_code(&self) -> String {
        format!("{}.{}", self.kind, self.code)
    }

    /// Recovers a generic fault from a parsed `Fault` whose `faultcode`
    /// has the `{kind}.{code}` shape.
    pub fn from_fault(fault: &StructuralFault) -> Option<Self> {
        let fault_code = fault.fault_code()?;
        let (kind, code) = fault_code.trim().rsplit_once('.')?;
        let code = code.parse::<i64>().ok()?;
        if kind.is_empty() {
            return None;
        }
        Some(Self::new(
            kind,
            code,
            fault.fault_string().unwrap_or_default(),
            fault.detail().unwrap_or_default(),
        ))
    }

    /// Synthesizes the `Fault` element: `faultcode`, `faultstring` and
    /// `detail`, in that order.
    ///
    /// Text is trimmed so that the emitted fault reads back unchanged.
    pub fn to_element(&self, prefix: &str) -> Element {
        let mut fault = soap_element(prefix, "Fault");
        for (local, text) in [
            ("faultcode", self.fault_code()),
            ("faultstring", self.message.clone()),
            ("detail", self.detail.clone()),
        ] {
            fault.children.push(XMLNode::Element(soap_text_element(
                prefix,
                local,
                text.trim(),
            )));
        }
        fault
    }
}

impl fmt::Display for GenericFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.fault_code(), self.message)
    }
}

impl StdError for GenericFault {}

impl From<anyhow::Error> for GenericFault {
    fn from(err: anyhow::Error) -> Self {
        GenericFault::new("anyhow::Error", 0, err.to_string(), format!("{:?}", err))
    }
}

/// Error carried by an [`Envelope`](crate::Envelope).
#[derive(Debug, Clone, PartialEq)]
pub enum CarriedError {
    /// Parsed `Fault`, re-emitted verbatim
    StructuralFault(StructuralFault),
    /// Application error, rendered at encode time
    GenericFault(GenericFault),
}

impl CarriedError {
    pub fn is_structural(&self) -> bool {
        matches!(self, CarriedError::StructuralFault(_))
    }

    /// Human-readable message (`faultstring`)
    pub fn message(&self) -> String {
        match self {
            CarriedError::StructuralFault(f) => f.fault_string().unwrap_or_default(),
            CarriedError::GenericFault(g) => g.message.clone(),
        }
    }

    /// The `Fault` element for this error; structural faults are cloned as is.
    pub fn to_element(&self, prefix: &str) -> Element {
        match self {
            CarriedError::StructuralFault(f) => f.element().clone(),
            CarriedError::GenericFault(g) => g.to_element(prefix),
        }
    }

    pub fn into_element(self, prefix: &str) -> Element {
        match self {
            CarriedError::StructuralFault(f) => f.into_element(),
            CarriedError::GenericFault(g) => g.to_element(prefix),
        }
    }

    /// Generic view of the error, recovered from the fault code when structural.
    pub fn to_generic(&self) -> Option<GenericFault> {
        match self {
            CarriedError::StructuralFault(f) => GenericFault::from_fault(f),
            CarriedError::GenericFault(g) => Some(g.clone()),
        }
    }
}

impl fmt::Display for CarriedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarriedError::StructuralFault(fault) => fault.fmt(f),
            CarriedError::GenericFault(fault) => fault.fmt(f),
        }
    }
}

impl StdError for CarriedError {}

impl From<StructuralFault> for CarriedError {
    fn from(fault: StructuralFault) -> Self {
        CarriedError::StructuralFault(fault)
    }
}

impl From<GenericFault> for CarriedError {
    fn from(fault: GenericFault) -> Self {
        CarriedError::GenericFault(fault)
    }
}

impl From<anyhow::Error> for CarriedError {
    fn from(err: anyhow::Error) -> Self {
        CarriedError::GenericFault(err.into())
    }
}
