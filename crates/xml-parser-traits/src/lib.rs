//! Core trait abstractions for XML parser backends.
//!
//! This crate defines the configuration record, the error taxonomy and the
//! parse/traverse capability that every backend adapter implements so that
//! the harness can drive heterogeneous parsers through one interface.

pub mod config;
pub mod error;
pub mod parser;

pub use config::{DocumentModel, DtdProcessing, ExternalEntityResolution, ParserConfig};
pub use error::{Error, ErrorKind, Result};
pub use parser::{Backend, XmlParser};
