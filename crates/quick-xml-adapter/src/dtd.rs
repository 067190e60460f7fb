//! Internal subset entity declarations

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// `<!ENTITY name "value">`, `<!ENTITY name SYSTEM "uri">` and
/// `<!ENTITY name PUBLIC "id" "uri">`. Parameter entities are matched so they
/// can be skipped.
const ENTITY_DECL: &str = r#"<!ENTITY\s+(?P<pe>%\s+)?(?P<name>[^\s%"'>]+)\s+(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?:SYSTEM|PUBLIC\s+(?:"[^"]*"|'[^']*'))\s+(?:"(?P<sys_dq>[^"]*)"|'(?P<sys_sq>[^']*)'))"#;

fn entity_decl() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(ENTITY_DECL).expect("entity declaration pattern compiles"))
}

/// A declared general entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    /// Replacement text, still carrying its own references
    Internal(String),
    /// System identifier of an external parsed entity
    External(String),
}

/// General entities declared in a document's internal subset
#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    entities: HashMap<String, Entity>,
}

impl EntityTable {
    /// Collect the general entity declarations found in `doctype`.
    ///
    /// When a name is declared more than once the first declaration binds.
    pub fn parse(doctype: &str) -> Self {
        let mut entities = HashMap::new();
        for caps in entity_decl().captures_iter(doctype) {
            if caps.name("pe").is_some() {
                continue;
            }
            let Some(name) = caps.name("name") else {
                continue;
            };
            let entity = if let Some(value) = caps.name("dq").or_else(|| caps.name("sq")) {
                Entity::Internal(value.as_str().to_string())
            } else if let Some(uri) = caps.name("sys_dq").or_else(|| caps.name("sys_sq")) {
                Entity::External(uri.as_str().to_string())
            } else {
                continue;
            };
            entities.entry(name.as_str().to_string()).or_insert(entity);
        }
        Self { entities }
    }

    /// Look up an entity, returning the stored name alongside it
    pub fn get(&self, name: &str) -> Option<(&str, &Entity)> {
        self.entities
            .get_key_value(name)
            .map(|(key, entity)| (key.as_str(), entity))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_internal_and_external_declarations() {
        let table = EntityTable::parse(
            r#" lolz [
<!ENTITY lol "lol1" >
<!ELEMENT lolz (#PCDATA)>
<!ENTITY lol1 '&lol;&lol;'>
<!ENTITY ext SYSTEM "file:///tmp/ext.txt">
<!ENTITY pub PUBLIC "-//X//EN" "ext.dtd">
<!ENTITY % param "ignored">
]"#,
        );
        assert_eq!(table.len(), 4);
        assert_eq!(table.get("lol").unwrap().1, &Entity::Internal("lol1".into()));
        assert_eq!(
            table.get("lol1").unwrap().1,
            &Entity::Internal("&lol;&lol;".into())
        );
        assert_eq!(
            table.get("ext").unwrap().1,
            &Entity::External("file:///tmp/ext.txt".into())
        );
        assert_eq!(table.get("pub").unwrap().1, &Entity::External("ext.dtd".into()));
        assert!(table.get("param").is_none());
    }

    #[test]
    fn first_declaration_binds() {
        let table = EntityTable::parse(r#"<!ENTITY a "first"><!ENTITY a "second">"#);
        assert_eq!(table.get("a").unwrap().1, &Entity::Internal("first".into()));
    }

    #[test]
    fn empty_subset() {
        assert!(EntityTable::parse(" html").is_empty());
    }
}
