//! roxmltree adapter for the parser backend abstraction
//!
//! roxmltree always builds a read-only tree and never fetches external
//! resources. DTD processing maps onto `ParsingOptions::allow_dtd`; when it
//! is allowed, the crate's own entity reference limits stay in force.

use roxmltree::{Document, Error as RoxError, ParsingOptions};
use xml_parser_traits::{DocumentModel, Error, ParserConfig, Result, XmlParser};

/// roxmltree backed parser
#[derive(Debug, Clone, Copy, Default)]
pub struct RoxmltreeParser;

impl RoxmltreeParser {
    pub fn new() -> Self {
        Self
    }
}

impl XmlParser for RoxmltreeParser {
    type Document<'input> = Document<'input>;

    fn name(&self) -> &'static str {
        "roxmltree"
    }

    fn supports(&self, config: &ParserConfig) -> bool {
        config.document_model == DocumentModel::Tree && !config.resolves_external()
    }

    fn parse<'input>(
        &self,
        xml: &'input [u8],
        config: &ParserConfig,
    ) -> Result<Document<'input>> {
        tracing::debug!(%config, bytes = xml.len(), "roxmltree parse");
        let text = std::str::from_utf8(xml)
            .map_err(|e| Error::malformed(format!("input is not UTF-8: {e}")))?;

        let mut opt = ParsingOptions::default();
        opt.allow_dtd = config.parses_dtd();
        Document::parse_with_options(text, opt).map_err(convert_error)
    }

    fn traverse(&self, document: Document<'_>) -> Result<usize> {
        Ok(document
            .root_element()
            .descendants()
            .filter(|node| node.is_text())
            .filter_map(|node| node.text())
            .map(str::len)
            .sum())
    }
}

fn convert_error(err: RoxError) -> Error {
    let message = err.to_string();
    match err {
        RoxError::DtdDetected => Error::external_disallowed(message),
        RoxError::EntityReferenceLoop(_) => Error::expansion_rejected(message),
        RoxError::NodesLimitReached => Error::resource_exhausted(message),
        _ => Error::malformed(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xml_parser_traits::{DtdProcessing, ErrorKind, ExternalEntityResolution};

    fn tree() -> ParserConfig {
        ParserConfig::default().with_document_model(DocumentModel::Tree)
    }

    #[test]
    fn supports_tree_without_resolver() {
        let parser = RoxmltreeParser::new();
        assert!(parser.supports(&tree()));
        assert!(parser.supports(&tree().with_dtd_processing(DtdProcessing::Parse)));
        assert!(!parser.supports(&ParserConfig::default()));
        assert!(!parser.supports(
            &tree().with_external_entities(ExternalEntityResolution::Enabled)
        ));
    }

    #[test]
    fn error_mapping() {
        assert_eq!(
            convert_error(RoxError::DtdDetected).kind(),
            ErrorKind::ExternalEntityDisallowed
        );
        assert_eq!(
            convert_error(RoxError::NodesLimitReached).kind(),
            ErrorKind::ResourceExhausted
        );
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let err = RoxmltreeParser::new()
            .parse(b"<a>\xff</a>", &tree())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    }
}
