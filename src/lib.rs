//! Converts iBATIS sqlMap XML documents into MyBatis 3 mapper documents.
//!
//! The crate is a library with no file-system or CLI surface: a driver
//! hands [`ConversionSession::convert`] one document's bytes and gets back
//! either the finished mapper markup (plus any non-fatal diagnostics) or a
//! fatal [`ConvertError`]. Sessions share no state, so batch drivers can
//! convert files in parallel with one session per file.

pub mod convert;
pub use convert::*;
