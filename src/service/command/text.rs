use crate::service::router::{Action, Route};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Action),
    Help,
    Quit,
}

pub fn help_text() -> &'static str {
    "Commands: open <route> | #<route> | article <id> | section <name> | more | refresh | home | login | back | help | quit"
}

/// Turn a typed line into a command.
pub fn parse(text: &str) -> Result<Command, String> {
    let text = text.trim();
    if text.starts_with('#') {
        return open(text);
    }

    let mut parts = text.split_whitespace();
    let cmd = parts
        .next()
        .ok_or_else(|| "No command provided. Try: ".to_string() + help_text())?
        .to_ascii_lowercase();

    let command = match cmd.as_str() {
        "open" | "go" => {
            let route = parts.next().unwrap_or("");
            return open(route);
        }
        "article" => {
            let nid = parts.next().ok_or("article id required, e.g., article 42")?;
            Command::Run(Action::Open(Route::Article(nid.to_string())))
        }
        "section" => {
            let section = parts.next().ok_or("section name required, e.g., section sports")?;
            Command::Run(Action::ChangeSection(section.to_string()))
        }
        "more" => Command::Run(Action::LoadMore),
        "refresh" => Command::Run(Action::Refresh),
        "home" | "main" => Command::Run(Action::Open(Route::Main)),
        "login" => Command::Run(Action::Open(Route::Login)),
        "back" => Command::Run(Action::Back),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command `{other}`. {}", help_text())),
    };

    Ok(command)
}

fn open(fragment: &str) -> Result<Command, String> {
    let route = Route::parse(fragment).map_err(|e| e.to_string())?;
    Ok(Command::Run(Action::Open(route)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation() {
        assert_eq!(
            parse("#article/42").unwrap(),
            Command::Run(Action::Open(Route::Article("42".into())))
        );
        assert_eq!(
            parse("open login").unwrap(),
            Command::Run(Action::Open(Route::Login))
        );
        assert_eq!(parse("open").unwrap(), Command::Run(Action::Open(Route::Main)));
        assert_eq!(
            parse("Section sports").unwrap(),
            Command::Run(Action::ChangeSection("sports".into()))
        );
        assert_eq!(parse("more").unwrap(), Command::Run(Action::LoadMore));
        assert_eq!(parse("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn reports_bad_input() {
        assert!(parse("").is_err());
        assert!(parse("section").unwrap_err().contains("section name required"));
        assert!(parse("#nowhere").unwrap_err().contains("no screen"));
        assert!(parse("dance").unwrap_err().starts_with("unknown command"));
    }
}
