//! The adapter boundary: nothing a backend does escapes past `attempt`

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use xml_parser_traits::ErrorKind;

use crate::outcome::Outcome;
use crate::payload::Payload;
use crate::variant::ParserVariant;

/// Apply `variant` to `payload` once.
///
/// Errors and panics raised by the backend are converted to
/// [`Outcome::Failed`]. No budget is applied here.
pub fn attempt(variant: &ParserVariant, payload: &Payload) -> Outcome {
    tracing::debug!(variant = variant.name(), tier = %payload.tier(), "attempting payload");
    attempt_document(variant, payload.as_bytes())
}

/// Apply `variant` to an arbitrary document, e.g. one handed to a worker
/// process
pub fn attempt_document(variant: &ParserVariant, xml: &[u8]) -> Outcome {
    tracing::debug!(variant = variant.name(), bytes = xml.len(), "attempting parse");
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        variant.backend().parse_and_traverse(xml, variant.config())
    }));

    match result {
        Ok(Ok(produced)) => Outcome::completed(produced as u64),
        Ok(Err(err)) => Outcome::from(&err),
        Err(panic_info) => Outcome::failed(
            ErrorKind::Unknown,
            format!("backend panicked: {}", panic_message(panic_info.as_ref())),
        ),
    }
}

pub(crate) fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
