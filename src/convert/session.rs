use super::diag::Diagnostics;
use super::dispatch::convert_document;
use super::emit::{emit_document, EmitOptions};
use super::error::ConvertError;
use super::model::Element;
use super::reader::parse_document;

/// Result of one successful conversion: the emitted mapper markup plus the
/// non-fatal diagnostics gathered along the way. An empty diagnostics list
/// means the document converted cleanly.
#[derive(Debug)]
pub struct ConversionOutcome {
    pub xml: String,
    pub diagnostics: Vec<String>,
}

/// Orchestrates one sqlMap document → one mapper document conversion:
/// load, dispatch, emit. Each call owns fresh registries, so sessions can
/// run on as many documents (or threads) as the caller likes.
#[derive(Debug, Default)]
pub struct ConversionSession {
    emit: EmitOptions,
}

impl ConversionSession {
    pub fn new() -> ConversionSession {
        ConversionSession::default()
    }

    pub fn with_emit_options(emit: EmitOptions) -> ConversionSession {
        ConversionSession { emit }
    }

    pub fn convert(&self, source: &str) -> Result<ConversionOutcome, ConvertError> {
        self.convert_bytes(source.as_bytes())
    }

    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<ConversionOutcome, ConvertError> {
        let (mapper, diagnostics) = self.convert_tree(bytes)?;
        Ok(ConversionOutcome {
            xml: emit_document(&mapper, &self.emit),
            diagnostics,
        })
    }

    /// Converts without emitting, for callers that want the tree itself or
    /// plan to re-emit with different format hints.
    pub fn convert_tree(&self, bytes: &[u8]) -> Result<(Element, Vec<String>), ConvertError> {
        let root = parse_document(bytes)?;
        let mut diags = Diagnostics::default();
        let mapper = convert_document(&root, &mut diags)?;
        log::debug!(
            "converted <{}> with {} diagnostics",
            root.name,
            diags.entries().len()
        );
        Ok((mapper, diags.into_entries()))
    }
}
