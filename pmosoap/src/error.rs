use std::io;

/// Marker used in diagnostics when the document has no root element.
pub const MISSING_ELEMENT: &str = "<missing>";

/// Erreurs de décodage et d'encodage SOAP
#[derive(thiserror::Error, Debug)]
pub enum SoapError {
    /// The input bytes are not well-formed XML.
    #[error("Malformed XML: {0}")]
    MalformedXml(#[from] xmltree::ParseError),

    /// Well-formed XML that is not a SOAP 1.1 envelope.
    #[error("Invalid SOAP envelope: {}", .element.as_deref().unwrap_or(MISSING_ELEMENT))]
    InvalidEnvelope { element: Option<String> },

    /// A second `Header`, `Body` or `Fault` while duplicates are rejected.
    #[error("Duplicate SOAP element: {element}")]
    Duplicate { element: String },

    #[error("XML write error: {0}")]
    Emit(#[from] xmltree::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SoapError {
    pub fn invalid_envelope(element: impl Into<String>) -> Self {
        SoapError::InvalidEnvelope {
            element: Some(element.into()),
        }
    }

    pub fn missing_root() -> Self {
        SoapError::InvalidEnvelope { element: None }
    }

    pub fn duplicate(element: impl Into<String>) -> Self {
        SoapError::Duplicate {
            element: element.into(),
        }
    }

    /// True for every envelope-shape violation, strict duplicates included.
    pub fn is_invalid_envelope(&self) -> bool {
        matches!(
            self,
            SoapError::InvalidEnvelope { .. } | SoapError::Duplicate { .. }
        )
    }

    /// Offending element name in Clark notation, if any.
    pub fn element(&self) -> Option<&str> {
        match self {
            SoapError::InvalidEnvelope { element } => element.as_deref(),
            SoapError::Duplicate { element } => Some(element),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for SoapError {
    fn from(err: serde_yaml::Error) -> Self {
        SoapError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SoapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_envelope_display() {
        let err = SoapError::invalid_envelope("Foo");
        assert_eq!(err.to_string(), "Invalid SOAP envelope: Foo");
        assert_eq!(err.element(), Some("Foo"));
        assert!(err.is_invalid_envelope());
    }

    #[test]
    fn test_missing_root_display() {
        let err = SoapError::missing_root();
        assert_eq!(err.to_string(), "Invalid SOAP envelope: <missing>");
        assert_eq!(err.element(), None);
    }

    #[test]
    fn test_duplicate_is_invalid_envelope() {
        let err = SoapError::duplicate("{http://schemas.xmlsoap.org/soap/envelope/}Body");
        assert!(err.is_invalid_envelope());
        assert!(err.to_string().contains("Body"));
    }

    #[test]
    fn test_io_is_not_invalid_envelope() {
        let err = SoapError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(!err.is_invalid_envelope());
    }
}
