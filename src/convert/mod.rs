pub mod diag;
pub mod dispatch;
pub mod emit;
pub mod error;
pub mod model;
pub mod placeholder;
pub mod procedure;
pub mod reader;
pub mod registry;
pub mod result_map;
pub mod session;
pub mod statement;

pub use diag::Diagnostics;
pub use emit::{emit_document, EmitOptions};
pub use error::ConvertError;
pub use model::{Attr, Element, Node};
pub use placeholder::rewrite_placeholders;
pub use procedure::{ParamDescriptor, ParamMode, ParameterMap, ParameterMapRegistry};
pub use reader::parse_document;
pub use registry::TypeAliasRegistry;
pub use session::{ConversionOutcome, ConversionSession};
