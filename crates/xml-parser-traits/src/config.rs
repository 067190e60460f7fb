//! Parser configuration options

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Whether the parser processes the document type declaration
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DtdProcessing {
    /// The DTD is skipped or rejected; its entities are never expanded
    #[default]
    None,
    /// The DTD is parsed and its general entities are expanded
    Parse,
}

/// Whether external entities (`SYSTEM` / `PUBLIC` identifiers) may be fetched
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ExternalEntityResolution {
    #[default]
    Disabled,
    Enabled,
}

/// Shape of the parsed result
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DocumentModel {
    /// Events are visited as they are read
    #[default]
    Streaming,
    /// The whole document is materialized before traversal
    Tree,
}

/// Configuration applied to a backend for one parse.
///
/// These are the only options a backend is asked to honor. The defaults are
/// the hardened settings: no DTD processing and no external resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParserConfig {
    pub dtd_processing: DtdProcessing,
    pub external_entities: ExternalEntityResolution,
    pub document_model: DocumentModel,
}

impl ParserConfig {
    pub fn new(
        dtd_processing: DtdProcessing,
        external_entities: ExternalEntityResolution,
        document_model: DocumentModel,
    ) -> Self {
        Self {
            dtd_processing,
            external_entities,
            document_model,
        }
    }

    /// Streaming configuration with DTD processing and external resolution off
    pub fn hardened() -> Self {
        Self::default()
    }

    /// DTD processing and external resolution both explicitly enabled
    pub fn permissive(document_model: DocumentModel) -> Self {
        Self::new(
            DtdProcessing::Parse,
            ExternalEntityResolution::Enabled,
            document_model,
        )
    }

    pub fn with_dtd_processing(mut self, dtd_processing: DtdProcessing) -> Self {
        self.dtd_processing = dtd_processing;
        self
    }

    pub fn with_external_entities(mut self, external_entities: ExternalEntityResolution) -> Self {
        self.external_entities = external_entities;
        self
    }

    pub fn with_document_model(mut self, document_model: DocumentModel) -> Self {
        self.document_model = document_model;
        self
    }

    pub fn parses_dtd(&self) -> bool {
        self.dtd_processing == DtdProcessing::Parse
    }

    pub fn resolves_external(&self) -> bool {
        self.external_entities == ExternalEntityResolution::Enabled
    }
}

impl fmt::Display for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dtd={} resolver={} model={}",
            self.dtd_processing, self.external_entities, self.document_model
        )
    }
}
