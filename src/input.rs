//! Parsing of command-line input into editor actions.

use std::path::PathBuf;

use mdpad_editor::EditorCommand;

/// One line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Dispatch to the document controller
    Command(EditorCommand),
    /// Print the document
    Print,
    /// Print line/word/character counts and block layout
    Stats,
    /// Print recent log messages
    Log,
    Quit,
    /// Text to append to the document as a new line
    Append(String),
    /// Unrecognized `:` command
    Unknown(String),
}

/// Parse one line (without its trailing newline).
pub fn parse(line: &str) -> Input {
    let Some(command) = line.strip_prefix(':') else {
        return Input::Append(line.to_string());
    };

    let (name, arg) = match command.trim().split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim())),
        None => (command.trim(), None),
    };

    match (name, arg) {
        ("undo" | "u", None) => Input::Command(EditorCommand::Undo),
        ("redo" | "r", None) => Input::Command(EditorCommand::Redo),
        ("w", None) => Input::Command(EditorCommand::Save),
        ("w", Some(path)) => Input::Command(EditorCommand::SaveAs(PathBuf::from(path))),
        ("e", Some(path)) => Input::Command(EditorCommand::Open(PathBuf::from(path))),
        ("new", None) => Input::Command(EditorCommand::NewDocument),
        ("p", None) => Input::Print,
        ("stats", None) => Input::Stats,
        ("log", None) => Input::Log,
        ("q", None) => Input::Quit,
        // "::text" appends a line starting with ':'
        _ if command.starts_with(':') => Input::Append(command.to_string()),
        _ => Input::Unknown(line.to_string()),
    }
}
