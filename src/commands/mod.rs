//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod list_command;
pub mod samples_command;
pub mod render_command;
pub mod average_command;

pub use command_traits::{Command, CommandFactory};
pub use list_command::ListCommand;
pub use samples_command::SamplesCommand;
pub use render_command::RenderCommand;
pub use average_command::AverageCommand;

use clap::ArgMatches;
use crate::compositor::CompositeResult;
use crate::utils::logger::Logger;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
pub struct PlumekitCommandFactory;

impl PlumekitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        PlumekitCommandFactory
    }
}

impl Default for PlumekitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for PlumekitCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger)
        -> CompositeResult<Box<dyn Command + 'a>> {
        // Determine which command to run based on args
        if args.get_flag("list") {
            Ok(Box::new(ListCommand::new(args, logger)?))
        } else if args.get_flag("samples") {
            Ok(Box::new(SamplesCommand::new(args, logger)?))
        } else if args.get_flag("export") {
            Ok(Box::new(AverageCommand::new(args, logger)?))
        } else {
            // Default to rendering an overlay
            Ok(Box::new(RenderCommand::new(args, logger)?))
        }
    }
}
