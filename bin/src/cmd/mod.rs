//! CLI subcommand modules.
//!
//! This module contains the implementations for all contango CLI subcommands.

pub(crate) mod analyze;
pub(crate) mod transforms;
