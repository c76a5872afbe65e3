pub mod cli;
pub mod command;
pub mod config;
pub mod editor;

pub use command::Command;
pub use editor::{Editor, EditorError, Outcome};
