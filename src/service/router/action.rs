use std::fmt;

use super::Route;

/// Something the reader can ask for; also what an error page offers to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Open(Route),
    ChangeSection(String),
    LoadMore,
    Refresh,
    Back,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Open(route) => write!(f, "open #{route}"),
            Action::ChangeSection(section) => write!(f, "section {section}"),
            Action::LoadMore => write!(f, "more"),
            Action::Refresh => write!(f, "refresh"),
            Action::Back => write!(f, "back"),
        }
    }
}
