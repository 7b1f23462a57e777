use quiz_core::model::SessionMode;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  <n> <choice>      answer question n (choice as letter or number), e.g. `2 b`
  select <n> <c>    same as above
  mode [practice|exam]
                    switch mode; without an argument toggles
  reveal            show every correct answer (practice only)
  reset             clear all answers
  export            write the results file
  show              redraw the quiz
  help              this text
  quit              leave";

/// One line of learner input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `number` is 1-based, `choice` is a 0-based index.
    Select { number: usize, choice: usize },
    Mode(Option<SessionMode>),
    Reveal,
    Reset,
    Export,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("nothing to do; type `help` for commands")]
    Empty,
    #[error("unknown command `{0}`; type `help` for commands")]
    Unknown(String),
    #[error("expected `<question> <choice>`, e.g. `1 a`")]
    MalformedSelect,
    #[error("not a question number: {0}")]
    BadNumber(String),
    #[error("not a choice: {0}")]
    BadChoice(String),
    #[error("unknown mode `{0}`; use practice or exam")]
    BadMode(String),
}

impl Command {
    /// Parse a single input line.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` describing what could not be understood.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };
        let rest: Vec<&str> = words.collect();

        let command = match head.to_ascii_lowercase().as_str() {
            "select" | "s" => parse_select(&rest)?,
            "mode" | "m" => match rest.as_slice() {
                [] => Command::Mode(None),
                [mode] => Command::Mode(Some(
                    mode.parse()
                        .map_err(|_| CommandError::BadMode((*mode).to_owned()))?,
                )),
                _ => return Err(CommandError::BadMode(rest.join(" "))),
            },
            "reveal" | "r" => Command::Reveal,
            "reset" => Command::Reset,
            "export" | "e" => Command::Export,
            "show" | "ls" => Command::Show,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            _ if head.starts_with(|c: char| c.is_ascii_digit()) => {
                let mut all = vec![head];
                all.extend(rest);
                parse_select(&all)?
            }
            _ => return Err(CommandError::Unknown(head.to_owned())),
        };
        Ok(command)
    }
}

fn parse_select(words: &[&str]) -> Result<Command, CommandError> {
    let [number, choice] = words else {
        return Err(CommandError::MalformedSelect);
    };
    let number = number
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| CommandError::BadNumber((*number).to_owned()))?;
    let choice = parse_choice(choice).ok_or_else(|| CommandError::BadChoice((*choice).to_owned()))?;
    Ok(Command::Select { number, choice })
}

/// `a`/`A` is 0; `1` is 0 as well.
fn parse_choice(raw: &str) -> Option<usize> {
    if let Ok(n) = raw.parse::<usize>() {
        return n.checked_sub(1);
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some(usize::from(c.to_ascii_lowercase() as u8 - b'a'))
        }
        _ => None,
    }
}

/// Label shown next to a choice: `a`..`z`, then numbers.
#[must_use]
pub fn choice_label(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map_or_else(|| (index + 1).to_string(), |i| char::from(b'a' + i).to_string())
}
