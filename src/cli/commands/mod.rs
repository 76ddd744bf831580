//! One module per subcommand.

pub mod delete;
pub mod generate;
pub mod get;
pub mod init;
pub mod list;
pub mod rename;
pub mod set;
