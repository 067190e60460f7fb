//! quick-xml adapter for the parser backend abstraction
//!
//! quick-xml is a tokenizer: it reports the DOCTYPE as an opaque event and
//! leaves entity references inside text untouched. This adapter supplies the
//! missing DTD layer (internal subset entity declarations plus recursive
//! reference expansion) so the crate can be driven the way a full XML reader
//! would be, both as a streaming reader and as a tree builder.
//!
//! Expansion is not capped here. With DTD processing enabled every reference
//! is expanded as far as it goes.

pub mod dtd;
pub mod expand;
pub mod tree;
pub mod walk;

use xml_parser_traits::{DocumentModel, ParserConfig, Result, XmlParser};

pub use tree::TextTree;
use walk::Visitor;

/// Parsed document for the quick-xml backend
#[derive(Debug)]
pub enum QuickXmlDocument<'input> {
    /// Streaming model; nothing is read until traversal
    Stream {
        xml: &'input [u8],
        config: ParserConfig,
    },
    /// Tree model; fully materialized during parse
    Tree(TextTree),
}

/// quick-xml backed parser
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickXmlParser;

impl QuickXmlParser {
    pub fn new() -> Self {
        Self
    }
}

/// Streaming visitor that only counts text
#[derive(Debug, Default)]
struct TextCounter(usize);

impl Visitor for TextCounter {
    fn start_element(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        Ok(())
    }

    fn text(&mut self, chunk: &str) -> Result<()> {
        self.0 += chunk.len();
        Ok(())
    }
}

impl XmlParser for QuickXmlParser {
    type Document<'input> = QuickXmlDocument<'input>;

    fn name(&self) -> &'static str {
        "quick-xml"
    }

    fn supports(&self, _config: &ParserConfig) -> bool {
        true
    }

    fn parse<'input>(
        &self,
        xml: &'input [u8],
        config: &ParserConfig,
    ) -> Result<QuickXmlDocument<'input>> {
        tracing::debug!(%config, bytes = xml.len(), "quick-xml parse");
        match config.document_model {
            DocumentModel::Streaming => Ok(QuickXmlDocument::Stream {
                xml,
                config: *config,
            }),
            DocumentModel::Tree => {
                let mut tree = TextTree::default();
                walk::walk(xml, config, &mut tree)?;
                Ok(QuickXmlDocument::Tree(tree))
            }
        }
    }

    fn traverse(&self, document: QuickXmlDocument<'_>) -> Result<usize> {
        match document {
            QuickXmlDocument::Stream { xml, config } => {
                let mut counter = TextCounter::default();
                walk::walk(xml, &config, &mut counter)?;
                Ok(counter.0)
            }
            QuickXmlDocument::Tree(tree) => Ok(tree.text_len()),
        }
    }
}
