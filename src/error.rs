use std::process;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong between a raw token list and a finished
/// command invocation.
///
/// All variants except [`Error::Exit`] are plain data errors. When one of
/// them surfaces from a dispatch level, [`crate::Cmd::run`] writes a single
/// diagnostic line (`"<command-name>: <message>"`) to stderr and converts it
/// into a failing [`Exit`]. `Exit` values pass through dispatch unchanged.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("illegal option -- {0}")]
    IllegalOption(String),

    #[error("option requires an argument -- {0}")]
    OptionRequiresAnArgument(String),

    #[error("invalid value {value:?} for {option} option")]
    IllegalOptionValue { option: String, value: String },

    #[error("invalid value {value:?} for {param} parameter")]
    IllegalParamValue { param: String, value: String },

    #[error("incorrect number of arguments given: expected {expected}, but got {actual}")]
    ArgumentCountMismatch { expected: usize, actual: usize },

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{input}' is ambiguous:\n  {}", .candidates.join(" "))]
    AmbiguousCommand { input: String, candidates: Vec<String> },

    #[error("no command given")]
    NoCommandGiven,

    #[error("not implemented")]
    NotImplemented,

    #[error("no help available")]
    NoHelpAvailable,

    /// A request to unwind the dispatch stack without further diagnostics.
    #[error("exit ({})", if .0.error { "failure" } else { "success" })]
    Exit(Exit),
}

impl Error {
    /// Exit intent for voluntary, successful termination (e.g. after
    /// printing help).
    pub fn exit_success() -> Error {
        Error::Exit(Exit::success())
    }
}

/// The intent to stop the whole invocation, carrying the success/failure
/// flag and the diagnostic that was already written to stderr (if any).
///
/// Whether this actually terminates the process is the top-level caller's
/// choice: [`crate::Command::run`] merely returns it ("soft exit", for
/// embedding and tests), [`crate::Command::run_or_exit`] turns it into
/// [`process::exit`] ("hard exit").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exit {
    error: bool,
    message: Option<String>,
}

impl Exit {
    pub fn success() -> Exit {
        Exit { error: false, message: None }
    }

    pub fn failure(message: impl Into<String>) -> Exit {
        Exit { error: true, message: Some(message.into()) }
    }

    pub fn is_error(&self) -> bool {
        self.error
    }

    /// The already-emitted diagnostic line, for inspection in tests and
    /// embedding callers.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn status(&self) -> i32 {
        if self.error {
            1
        } else {
            0
        }
    }

    pub fn exit(self) -> ! {
        process::exit(self.status())
    }
}
