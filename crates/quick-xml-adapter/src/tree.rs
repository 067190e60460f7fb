//! Materialized element tree

use xml_parser_traits::{Error, Result};

use crate::walk::Visitor;

/// An element and the character data directly inside it
#[derive(Debug, Clone, Default)]
pub struct ElementNode {
    pub name: String,
    pub text: String,
    pub children: Vec<usize>,
}

/// Whole-document tree, built with every entity fully expanded into owned
/// strings before anything is traversed
#[derive(Debug, Clone, Default)]
pub struct TextTree {
    nodes: Vec<ElementNode>,
    root: Option<usize>,
    open: Vec<usize>,
}

impl TextTree {
    pub fn root(&self) -> Option<&ElementNode> {
        self.root.map(|index| &self.nodes[index])
    }

    pub fn node(&self, index: usize) -> &ElementNode {
        &self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first sum of the text length of every element
    pub fn text_len(&self) -> usize {
        let mut total = 0;
        let mut pending: Vec<usize> = self.root.into_iter().collect();
        while let Some(index) = pending.pop() {
            let node = &self.nodes[index];
            total += node.text.len();
            pending.extend(node.children.iter().rev());
        }
        total
    }
}

impl Visitor for TextTree {
    fn start_element(&mut self, name: &str) -> Result<()> {
        let index = self.nodes.len();
        self.nodes.push(ElementNode {
            name: name.to_string(),
            ..ElementNode::default()
        });
        match self.open.last() {
            Some(&parent) => self.nodes[parent].children.push(index),
            None if self.root.is_none() => self.root = Some(index),
            None => return Err(Error::malformed("more than one document element")),
        }
        self.open.push(index);
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        self.open.pop();
        Ok(())
    }

    fn text(&mut self, chunk: &str) -> Result<()> {
        let Some(&current) = self.open.last() else {
            return Ok(());
        };
        let text = &mut self.nodes[current].text;
        let held = text.len();
        text.try_reserve(chunk.len()).map_err(|err| {
            Error::resource_exhausted(format!("cannot grow text node beyond {held} bytes: {err}"))
        })?;
        text.push_str(chunk);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::walk;
    use xml_parser_traits::{DtdProcessing, ErrorKind, ParserConfig};

    fn build(xml: &str) -> Result<TextTree> {
        let mut tree = TextTree::default();
        let config = ParserConfig::default().with_dtd_processing(DtdProcessing::Parse);
        walk(xml.as_bytes(), &config, &mut tree)?;
        Ok(tree)
    }

    #[test]
    fn builds_nested_elements() {
        let tree = build("<a>one<b>two</b><c/>three</a>").unwrap();
        assert_eq!(tree.len(), 3);
        let root = tree.root().unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.text, "onethree");
        assert_eq!(tree.node(root.children[0]).text, "two");
        assert_eq!(tree.node(root.children[1]).name, "c");
        assert_eq!(tree.text_len(), 11);
    }

    #[test]
    fn materializes_expanded_entities() {
        let tree = build("<!DOCTYPE a [<!ENTITY e \"ab\"><!ENTITY f \"&e;&e;&e;\">]><a>&f;</a>").unwrap();
        assert_eq!(tree.root().unwrap().text, "ababab");
    }

    #[test]
    fn rejects_second_document_element() {
        let err = build("<a/><b/>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    }
}
