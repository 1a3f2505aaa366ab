//! Command dispatch.

pub mod config_cmd;
pub mod scorers;
pub mod select;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler. Completions are handled by the
/// caller since they need the clap command tree.
pub fn dispatch(cmd: &Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Select(args) => select::handle_select(args, global),
        Command::Candidates(args) => select::handle_candidates(args, global),
        Command::Scorers => scorers::handle(global),
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(_) => Ok(()),
    }
}
