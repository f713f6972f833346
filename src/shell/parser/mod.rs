pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;

pub use ast::{Command, Next, Pipeline};
pub use lexer::{tokenize, Token};
pub use parser::{parse, ParseError, Parser};
