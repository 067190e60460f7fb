//! Parse and traverse capabilities

use crate::config::ParserConfig;
use crate::error::{Error, Result};

/// Trait for XML parser backends.
///
/// A backend parses bytes under a [`ParserConfig`] into its own document
/// representation, then traverses that document to report how much text it
/// produced. Streaming backends may defer all real work to `traverse`.
pub trait XmlParser: Send + Sync {
    /// Parsed document, possibly borrowing the input
    type Document<'input>;

    /// Short, stable backend name used in variant labels
    fn name(&self) -> &'static str;

    /// Whether this backend can honor `config` exactly
    fn supports(&self, config: &ParserConfig) -> bool;

    /// Parse `xml` under `config`
    fn parse<'input>(
        &self,
        xml: &'input [u8],
        config: &ParserConfig,
    ) -> Result<Self::Document<'input>>;

    /// Fully traverse `document`, returning the total length in bytes of the
    /// text content inside the document element
    fn traverse(&self, document: Self::Document<'_>) -> Result<usize>;
}

/// Object-safe form of [`XmlParser`] used by parser variants.
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, config: &ParserConfig) -> bool;

    /// Parse then traverse in one call
    fn parse_and_traverse(&self, xml: &[u8], config: &ParserConfig) -> Result<usize>;
}

impl<P: XmlParser> Backend for P {
    fn name(&self) -> &'static str {
        XmlParser::name(self)
    }

    fn supports(&self, config: &ParserConfig) -> bool {
        XmlParser::supports(self, config)
    }

    fn parse_and_traverse(&self, xml: &[u8], config: &ParserConfig) -> Result<usize> {
        if !XmlParser::supports(self, config) {
            return Err(Error::unsupported(format!(
                "{} cannot run with {}",
                XmlParser::name(self),
                config
            )));
        }
        let document = self.parse(xml, config)?;
        self.traverse(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DocumentModel, DtdProcessing};

    /// Counts every byte between the first `>` and the last `<`
    struct InnerBytes;

    impl XmlParser for InnerBytes {
        type Document<'input> = &'input [u8];

        fn name(&self) -> &'static str {
            "inner-bytes"
        }

        fn supports(&self, config: &ParserConfig) -> bool {
            config.document_model == DocumentModel::Streaming
        }

        fn parse<'input>(&self, xml: &'input [u8], _config: &ParserConfig) -> Result<&'input [u8]> {
            let open = xml.iter().position(|b| *b == b'>');
            let close = xml.iter().rposition(|b| *b == b'<');
            match (open, close) {
                (Some(open), Some(close)) if open < close => Ok(&xml[open + 1..close]),
                _ => Err(Error::malformed("no element content")),
            }
        }

        fn traverse(&self, document: &[u8]) -> Result<usize> {
            Ok(document.len())
        }
    }

    #[test]
    fn backend_runs_parse_then_traverse() {
        let backend: &dyn Backend = &InnerBytes;
        let len = backend
            .parse_and_traverse(b"<a>hello</a>", &ParserConfig::default())
            .unwrap();
        assert_eq!(len, 5);
        assert_eq!(backend.name(), "inner-bytes");
    }

    #[test]
    fn backend_propagates_parse_errors() {
        let err = InnerBytes
            .parse_and_traverse(b"no markup", &ParserConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::MalformedDocument);
    }

    #[test]
    fn backend_refuses_unsupported_config() {
        let config = ParserConfig::default()
            .with_dtd_processing(DtdProcessing::Parse)
            .with_document_model(DocumentModel::Tree);
        let err = InnerBytes.parse_and_traverse(b"<a/>", &config).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }
}
