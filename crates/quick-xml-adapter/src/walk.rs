//! Event loop shared by the streaming reader and the tree builder

use quick_xml::events::Event;
use quick_xml::Reader;
use xml_parser_traits::{Error, ParserConfig, Result};

use crate::dtd::EntityTable;
use crate::expand::Expander;

/// Receives the structure and the expanded character data of a document
pub trait Visitor {
    fn start_element(&mut self, name: &str) -> Result<()>;

    fn end_element(&mut self) -> Result<()>;

    /// One chunk of character data inside the document element
    fn text(&mut self, chunk: &str) -> Result<()>;
}

/// Read `xml` to the end, reporting every element and every text chunk to
/// `visitor`. Character data outside the document element is not reported.
pub fn walk<V: Visitor>(xml: &[u8], config: &ParserConfig, visitor: &mut V) -> Result<()> {
    let mut reader = Reader::from_reader(xml);
    let mut expander = Expander::new(EntityTable::default(), *config);
    let mut buf = Vec::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::DocType(doctype)) => {
                if config.parses_dtd() {
                    let entities = EntityTable::parse(utf8(&doctype)?);
                    tracing::debug!(entities = entities.len(), "read internal subset");
                    expander = Expander::new(entities, *config);
                }
            }
            Ok(Event::Start(start)) => {
                depth += 1;
                visitor.start_element(utf8(start.name().as_ref())?)?;
            }
            Ok(Event::Empty(empty)) => {
                visitor.start_element(utf8(empty.name().as_ref())?)?;
                visitor.end_element()?;
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                visitor.end_element()?;
            }
            Ok(Event::Text(text)) if depth > 0 => {
                expander.expand(utf8(&text)?, &mut |chunk| visitor.text(chunk))?;
            }
            Ok(Event::CData(cdata)) if depth > 0 => {
                visitor.text(utf8(&cdata)?)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(quick_xml::Error::Io(err)) => return Err(Error::other(err.to_string())),
            Err(err) => {
                return Err(Error::malformed(format!(
                    "{err} (at byte {})",
                    reader.buffer_position()
                )))
            }
        }
        buf.clear();
    }

    if depth > 0 {
        return Err(Error::malformed("unexpected end of document inside an element"));
    }
    Ok(())
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|err| Error::malformed(err.to_string()))
}
