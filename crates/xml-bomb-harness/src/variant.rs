//! Named parser presets

use std::fmt;
use std::sync::Arc;

use xml_parser_traits::{Backend, Error, ParserConfig, Result};

/// One backend with one fixed configuration, e.g.
/// "quick-xml streaming / DTD parse". Variants are data: the harness runs
/// every variant through the same code path.
#[derive(Clone)]
pub struct ParserVariant {
    name: String,
    backend: Arc<dyn Backend>,
    config: ParserConfig,
}

impl ParserVariant {
    /// Fails with [`Error::Unsupported`] if `backend` cannot honor `config`
    pub fn new<S: Into<String>>(
        name: S,
        backend: Arc<dyn Backend>,
        config: ParserConfig,
    ) -> Result<Self> {
        let name = name.into();
        if !backend.supports(&config) {
            return Err(Error::unsupported(format!(
                "variant '{}': {} cannot run with {}",
                name,
                backend.name(),
                config
            )));
        }
        Ok(Self {
            name,
            backend,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

impl fmt::Debug for ParserVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserVariant")
            .field("name", &self.name)
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xml_parser_traits::{DocumentModel, DtdProcessing};

    struct StreamingOnly;

    impl Backend for StreamingOnly {
        fn name(&self) -> &'static str {
            "streaming-only"
        }

        fn supports(&self, config: &ParserConfig) -> bool {
            config.document_model == DocumentModel::Streaming
        }

        fn parse_and_traverse(&self, _xml: &[u8], _config: &ParserConfig) -> Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn accepts_supported_config() {
        let config = ParserConfig::default().with_dtd_processing(DtdProcessing::Parse);
        let variant = ParserVariant::new("s/parse", Arc::new(StreamingOnly), config).unwrap();
        assert_eq!(variant.name(), "s/parse");
        assert_eq!(variant.backend_name(), "streaming-only");
        assert_eq!(variant.config(), &config);
    }

    #[test]
    fn rejects_unsupported_config() {
        let config = ParserConfig::default().with_document_model(DocumentModel::Tree);
        let err = ParserVariant::new("s/tree", Arc::new(StreamingOnly), config).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
        assert!(err.to_string().contains("s/tree"));
    }
}
