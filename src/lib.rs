//! Moderately simple framework for command-line tools with nested
//! subcommands.
//!
//! A tool is a tree of [`Command`]s. Each command declares options and
//! positional parameters, and either runs an action of its own or routes to
//! a subcommand; subcommands inherit the options of every command above
//! them.
//!
//! ```
//! use cmdtree::{Command, OptionDefinition};
//!
//! let root = Command::new("greet")
//!     .usage("greet [options] <name>")
//!     .summary("say hello")
//!     .option(OptionDefinition::flag('l', "loud", "shout instead"))
//!     .param("name")
//!     .action(|opts, args, _cmd| {
//!         let mut line = format!("hello, {}", args["name"]);
//!         if opts.flag("loud") {
//!             line = line.to_uppercase();
//!         }
//!         println!("{line}");
//!         Ok(())
//!     });
//!
//! assert!(root.run(&["-l", "world"]).is_ok());
//! ```

mod args;
mod cmd;
mod def;
mod error;
mod help;
mod opts;
mod parse;

pub use crate::{
    args::ArgumentList,
    cmd::{Cmd, Command},
    def::{ArgumentMode, OptionDefinition, ParamDefinition, Value},
    error::{Error, Exit, Result},
    opts::Options,
    parse::{ParseDelegate, Parser, RawToken, ScanControl},
};
