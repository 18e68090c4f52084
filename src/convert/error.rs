use thiserror::Error;

/// Fatal conversion failures. Anything recoverable is reported through
/// [`crate::convert::Diagnostics`] instead and does not interrupt the pass.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed sqlMap document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("sqlMap document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("document has no root element")]
    MissingRoot,

    #[error("document ended before the root element was closed")]
    TruncatedDocument,

    #[error("statement `{statement}` references undeclared parameter map `{id}`")]
    UnknownParameterMap { statement: String, id: String },

    #[error("statement `{statement}` has `?` placeholders with no parameter to bind")]
    UnresolvedPlaceholder { statement: String },
}
