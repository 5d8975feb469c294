//! Command handlers, one module per subcommand.

pub mod batch;
pub mod catalog;
pub mod check;
pub mod config_cmd;
pub mod run;
