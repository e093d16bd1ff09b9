//! PHP-subset source frontend: lexing, parsing, node location, per-file
//! resolution context, name resolution, and re-rendering.

pub mod ast;
pub mod context;
mod error;
pub mod finder;
mod lexer;
pub mod parser;
pub mod printer;
pub mod resolver;

pub use context::FileContext;
pub use error::PhpError;
pub use finder::{Ancestor, FoundClosure, NodeFinder};
pub use parser::parse_source;
pub use printer::print_expr;
pub use resolver::NameResolver;
