use std::io::Write;

use super::BuiltinError;
use crate::shell::session::Session;

pub(super) fn run(session: &Session, out: &mut dyn Write) -> Result<(), BuiltinError> {
    writeln!(out, "{}", session.cwd().display()).map_err(BuiltinError::io("pwd"))
}
