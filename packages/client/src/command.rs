//! Terminal input parsing.

use thiserror::Error;

pub const HELP: &str = "\
Commands:
  <text>                post a message
  /typing               announce that you are typing
  /stop                 clear your typing indicator
  /pm <user-id> <text>  send a private message
  /edit <id> <text>     edit one of your messages
  /delete <id>          delete one of your messages
  /who                  show who is online
  /history              show the local message history
  /help                 show this help
  /quit                 leave
";

/// One line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Post(String),
    TypingStart,
    TypingStop,
    Private { target_user_id: i64, body: String },
    Edit { id: i64, content: String },
    Delete { id: i64 },
    Who,
    History,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown command '{0}', try /help")]
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Post(line.to_string()));
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name {
            "typing" => Ok(Command::TypingStart),
            "stop" => Ok(Command::TypingStop),
            "pm" => {
                let (target_user_id, body) =
                    id_and_text(args).ok_or(CommandError::Usage("/pm <user-id> <text>"))?;
                Ok(Command::Private {
                    target_user_id,
                    body,
                })
            }
            "edit" => {
                let (id, content) =
                    id_and_text(args).ok_or(CommandError::Usage("/edit <id> <text>"))?;
                Ok(Command::Edit { id, content })
            }
            "delete" => {
                let id = args
                    .parse()
                    .map_err(|_| CommandError::Usage("/delete <id>"))?;
                Ok(Command::Delete { id })
            }
            "who" => Ok(Command::Who),
            "history" => Ok(Command::History),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn id_and_text(args: &str) -> Option<(i64, String)> {
    let (id, text) = args.split_once(char::is_whitespace)?;
    let id = id.parse().ok()?;
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some((id, text.to_string()))
}
