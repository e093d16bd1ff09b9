//! Exports runtime values, closures included, as parseable source text.
//!
//! Scalars and arrays are rendered structurally from the [`Value`] model.
//! Closures cannot be serialized from runtime state alone, so the exporter
//! re-reads the declaring file, parses it, finds the literal node at the
//! recorded line, rewrites every name in it to its fully qualified form, and
//! prints the result as context-free source. When any of that fails the
//! closure degrades to a commented placeholder instead of failing the export.

pub mod config;
pub mod error;
pub mod export;
pub mod handle;
pub mod php;
pub mod value;

pub use config::{FormatterConfig, FormatterMode};
pub use error::{ExportError, ExportResult};
pub use export::{describe_closure, ClosureExporter, VarExporter};
pub use handle::{BoundMethod, ClosureHandle};
pub use value::{Key, Value, ValuePath};
