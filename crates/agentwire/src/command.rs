pub mod handler;
pub mod occurrence;
pub mod table;

pub use handler::{boxed_command_future, Command, CommandExecute, CommandFuture, FnCommand, PayloadShape};
pub use occurrence::{parse_payload, CommandOccurrence, Payload};
pub use table::CommandTable;
