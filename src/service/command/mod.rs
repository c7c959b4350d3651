pub mod text;

pub use text::{help_text, parse, Command};
