//! General entity reference expansion

use std::path::Path;

use xml_parser_traits::{Error, ParserConfig, Result};

use crate::dtd::{Entity, EntityTable};

/// Expands references in character data against an [`EntityTable`].
///
/// Expansion is depth-first and unbounded: every literal chunk of every
/// replacement text is handed to the sink as it is reached. The only checks
/// are well-formedness ones (undeclared names, recursion).
#[derive(Debug, Default)]
pub struct Expander {
    entities: EntityTable,
    config: ParserConfig,
}

impl Expander {
    pub fn new(entities: EntityTable, config: ParserConfig) -> Self {
        Self { entities, config }
    }

    /// Expand `text`, feeding each literal chunk to `sink`
    pub fn expand<F>(&self, text: &str, sink: &mut F) -> Result<()>
    where
        F: FnMut(&str) -> Result<()>,
    {
        let mut open = Vec::new();
        self.expand_text(text, &mut open, sink)
    }

    fn expand_text<'s, F>(&'s self, text: &str, open: &mut Vec<&'s str>, sink: &mut F) -> Result<()>
    where
        F: FnMut(&str) -> Result<()>,
    {
        let mut rest = text;
        while let Some(amp) = rest.find('&') {
            if amp > 0 {
                sink(&rest[..amp])?;
            }
            let after = &rest[amp + 1..];
            let semi = after
                .find(';')
                .ok_or_else(|| Error::malformed("unterminated entity reference"))?;
            self.expand_reference(&after[..semi], open, sink)?;
            rest = &after[semi + 1..];
        }
        if !rest.is_empty() {
            sink(rest)?;
        }
        Ok(())
    }

    fn expand_reference<'s, F>(
        &'s self,
        name: &str,
        open: &mut Vec<&'s str>,
        sink: &mut F,
    ) -> Result<()>
    where
        F: FnMut(&str) -> Result<()>,
    {
        if let Some(code) = name.strip_prefix('#') {
            let ch = char_reference(code)?;
            let mut buf = [0u8; 4];
            return sink(&*ch.encode_utf8(&mut buf));
        }
        if let Some(replacement) = predefined(name) {
            return sink(replacement);
        }
        if !self.config.parses_dtd() {
            // Without the DTD there is nothing to expand the reference into.
            return Ok(());
        }

        let (key, entity) = self
            .entities
            .get(name)
            .ok_or_else(|| Error::malformed(format!("reference to undeclared entity '{name}'")))?;
        if open.contains(&key) {
            return Err(Error::malformed(format!(
                "recursive reference to entity '{key}'"
            )));
        }

        open.push(key);
        let result = match entity {
            Entity::Internal(value) => self.expand_text(value, open, sink),
            Entity::External(system_id) => {
                if !self.config.resolves_external() {
                    Err(Error::external_disallowed(format!(
                        "entity '{key}' refers to external resource '{system_id}'"
                    )))
                } else {
                    let content = resolve_external(system_id)?;
                    self.expand_text(strip_text_declaration(&content), open, sink)
                }
            }
        };
        open.pop();
        result
    }
}

fn predefined(name: &str) -> Option<&'static str> {
    match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => None,
    }
}

fn char_reference(code: &str) -> Result<char> {
    let value = match code.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => code.parse::<u32>(),
    }
    .map_err(|_| Error::malformed(format!("invalid character reference '&#{code};'")))?;
    char::from_u32(value)
        .ok_or_else(|| Error::malformed(format!("character reference '&#{code};' is not a character")))
}

/// Read a local external entity. Only `file:` URIs and plain paths resolve.
fn resolve_external(system_id: &str) -> Result<String> {
    let path = match system_id.strip_prefix("file://") {
        Some(path) => path,
        None if system_id.contains("://") => {
            return Err(Error::other(format!(
                "no resolver for system identifier '{system_id}'"
            )));
        }
        None => system_id,
    };
    tracing::debug!(path, "resolving external entity");
    Ok(std::fs::read_to_string(Path::new(path))?)
}

fn strip_text_declaration(content: &str) -> &str {
    if content.starts_with("<?xml") {
        if let Some(end) = content.find("?>") {
            return &content[end + 2..];
        }
    }
    content
}
