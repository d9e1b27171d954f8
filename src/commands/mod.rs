pub mod handlers;
pub mod parser;

pub use handlers::run;
pub use parser::{Cli, Command};
