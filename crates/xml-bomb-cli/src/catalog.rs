//! Compiled-in catalog of parser variants

use std::sync::Arc;

use quick_xml_adapter::QuickXmlParser;
use roxmltree_adapter::RoxmltreeParser;
use xml_bomb_harness::ParserVariant;
use xml_parser_traits::{
    Backend, DocumentModel, DtdProcessing, ExternalEntityResolution, ParserConfig, Result,
};
use xml_rs_adapter::XmlRsParser;

fn config(dtd: DtdProcessing, resolver: ExternalEntityResolution, model: DocumentModel) -> ParserConfig {
    ParserConfig::new(dtd, resolver, model)
}

/// Every preset, in report order
pub fn catalog() -> Result<Vec<ParserVariant>> {
    use DocumentModel::{Streaming, Tree};
    use DtdProcessing::{None as NoDtd, Parse};
    use ExternalEntityResolution::{Disabled, Enabled};

    let quick_xml: Arc<dyn Backend> = Arc::new(QuickXmlParser::new());
    let roxmltree: Arc<dyn Backend> = Arc::new(RoxmltreeParser::new());
    let xml_rs: Arc<dyn Backend> = Arc::new(XmlRsParser::new());

    let presets = [
        ("quick-xml streaming / dtd-none", &quick_xml, config(NoDtd, Disabled, Streaming)),
        ("quick-xml streaming / dtd-parse", &quick_xml, config(Parse, Disabled, Streaming)),
        (
            "quick-xml streaming / dtd-parse / resolver-enabled",
            &quick_xml,
            config(Parse, Enabled, Streaming),
        ),
        ("quick-xml tree / dtd-none", &quick_xml, config(NoDtd, Disabled, Tree)),
        ("quick-xml tree / dtd-parse", &quick_xml, config(Parse, Disabled, Tree)),
        ("roxmltree tree / dtd-prohibited", &roxmltree, config(NoDtd, Disabled, Tree)),
        ("roxmltree tree / dtd-allowed", &roxmltree, config(Parse, Disabled, Tree)),
        ("xml-rs event-reader / default", &xml_rs, config(Parse, Disabled, Streaming)),
    ];

    presets
        .into_iter()
        .map(|(name, backend, config)| ParserVariant::new(name, Arc::clone(backend), config))
        .collect()
}

/// The preset called `name`, if any
pub fn find(name: &str) -> Result<Option<ParserVariant>> {
    Ok(catalog()?.into_iter().find(|variant| variant.name() == name))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_preset_is_supported() {
        let variants = catalog().unwrap();
        assert_eq!(variants.len(), 8);
        for variant in &variants {
            assert!(variant.backend().supports(variant.config()), "{}", variant.name());
        }
    }

    #[test]
    fn names_are_unique() {
        let variants = catalog().unwrap();
        let names: HashSet<&str> = variants.iter().map(ParserVariant::name).collect();
        assert_eq!(names.len(), variants.len());
    }

    #[test]
    fn hardened_default_comes_first() {
        let first = &catalog().unwrap()[0];
        assert_eq!(first.config(), &ParserConfig::hardened());
    }

    #[test]
    fn find_by_name() {
        let variant = find("roxmltree tree / dtd-allowed").unwrap().unwrap();
        assert_eq!(variant.backend_name(), "roxmltree");
        assert!(variant.config().parses_dtd());
        assert!(find("nope").unwrap().is_none());
    }
}
