//! Décodage d'une enveloppe depuis une requête HTTP entrante

use std::io::Read;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::config::DecoderConfig;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::parser;

pub const CONTENT_ENCODING: &str = "Content-Encoding";

/// Inbound request as seen by the decoder: a header lookup and a body stream.
pub trait InboundRequest {
    type Body: Read;

    /// Value of the header `name`, if present and valid text.
    fn header(&self, name: &str) -> Option<&str>;

    fn into_body(self) -> Self::Body;
}

impl<B: Read> InboundRequest for http::Request<B> {
    type Body = B;

    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn into_body(self) -> B {
        http::Request::into_body(self)
    }
}

/// Decodes the request body, inflating it first when `Content-Encoding`
/// is exactly `gzip`.
pub fn from_request<Q: InboundRequest>(request: Q) -> Result<Envelope> {
    from_request_with(request, &DecoderConfig::default())
}

pub fn from_request_with<Q: InboundRequest>(
    request: Q,
    config: &DecoderConfig,
) -> Result<Envelope> {
    // comparaison exacte, "GZIP" ou "x-gzip" sont lus tels quels
    let gzip = request.header(CONTENT_ENCODING) == Some("gzip");
    let body = request.into_body();
    if gzip {
        debug!("Inflating gzip SOAP request body");
        parser::decode_with(GzDecoder::new(body), config)
    } else {
        parser::decode_with(body, config)
    }
}
