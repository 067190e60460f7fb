//! xml-rs adapter for the parser backend abstraction
//!
//! The xml-rs event reader always reads the internal DTD subset and applies
//! its own expansion limits; neither can be switched off and it never
//! resolves external entities. The only configuration it honors is
//! therefore `dtd=parse resolver=disabled model=streaming`.

use xml::reader::{EventReader, ParserConfig as ReaderConfig, XmlEvent};
use xml_parser_traits::{
    DocumentModel, DtdProcessing, Error, ExternalEntityResolution, ParserConfig, Result,
    XmlParser,
};

/// xml-rs wording for its own expansion and size limits. Every other
/// message, including `Unexpected entity` for an undeclared reference, is a
/// syntax error.
const LIMIT_MARKERS: &[&str] = &[
    "entity too big",
    "allowed by the parser's configuration",
    "configured limit",
];

/// xml-rs backed parser
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlRsParser;

impl XmlRsParser {
    pub fn new() -> Self {
        Self
    }
}

impl XmlParser for XmlRsParser {
    type Document<'input> = EventReader<&'input [u8]>;

    fn name(&self) -> &'static str {
        "xml-rs"
    }

    fn supports(&self, config: &ParserConfig) -> bool {
        config.dtd_processing == DtdProcessing::Parse
            && config.external_entities == ExternalEntityResolution::Disabled
            && config.document_model == DocumentModel::Streaming
    }

    fn parse<'input>(
        &self,
        xml: &'input [u8],
        config: &ParserConfig,
    ) -> Result<EventReader<&'input [u8]>> {
        tracing::debug!(%config, bytes = xml.len(), "xml-rs parse");
        Ok(ReaderConfig::new()
            .trim_whitespace(false)
            .whitespace_to_characters(false)
            .cdata_to_characters(false)
            .create_reader(xml))
    }

    fn traverse(&self, reader: EventReader<&[u8]>) -> Result<usize> {
        let mut depth = 0usize;
        let mut produced = 0usize;
        for event in reader {
            match event.map_err(|e| classify(&e.to_string()))? {
                XmlEvent::StartElement { .. } => depth += 1,
                XmlEvent::EndElement { .. } => depth = depth.saturating_sub(1),
                XmlEvent::Characters(text) | XmlEvent::CData(text) | XmlEvent::Whitespace(text)
                    if depth > 0 =>
                {
                    produced += text.len();
                }
                XmlEvent::EndDocument => break,
                _ => {}
            }
        }
        Ok(produced)
    }
}

/// xml-rs reports every failure as a positioned message, so the kind is
/// recovered from its wording
fn classify(message: &str) -> Error {
    let lower = message.to_ascii_lowercase();
    if LIMIT_MARKERS.iter().any(|marker| lower.contains(marker)) {
        Error::expansion_rejected(message)
    } else {
        Error::malformed(message)
    }
}
