use std::fmt;


pub const UNCLASSIFIED_FAILURE_MESSAGE: &str =
    "Something error when connecting server. Please check your internet connection.";

// Why a single user action failed. `Display` gives the exact text for the status region.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ActionError {
    // Server understood the request and said no (`status: "error"`).
    Application(String),
    // Server replied with something that is neither "ok" nor "error".
    Unclassified,
    // Request never produced a usable reply: network failure or undecodable body.
    Transport(String),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Application(message) => write!(f, "{}", message),
            ActionError::Unclassified => write!(f, "{}", UNCLASSIFIED_FAILURE_MESSAGE),
            ActionError::Transport(error) => write!(f, "Error: {}", error),
        }
    }
}

// A command that could not even be turned into a request.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CommandError {
    NoRoom,
    // An answer was given by slot number while no question is shown.
    NoQuestion,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NoRoom => write!(f, "Create or join a room first"),
            CommandError::NoQuestion => write!(f, "There is no question to answer"),
        }
    }
}
