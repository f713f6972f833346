pub mod builtins;
pub mod error;
pub mod executor;
pub mod parser;
mod readline;
pub mod session;
#[allow(clippy::module_inception)]
mod shell;
pub mod signals;

pub use error::ShellError;
pub use session::Session;
pub use shell::Shell;
