use std::collections::VecDeque;
use std::io::{self, BufRead};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Insert(i64),
    Remove(i64),
    Find(i64),
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing key after command {0}")]
    MissingKey(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Read error: {0}")]
    Io(#[from] io::Error),
}

impl CommandError {
    /// Whether the menu can keep reading commands after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidKey(_))
    }
}

/// Whitespace separated tokens read lazily, one line at a time.
pub struct Tokens<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    fn next_token(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        while self.pending.is_empty() {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(line.split_whitespace().map(str::to_owned));
        }

        Ok(self.pending.pop_front())
    }

    /// Reads the next command, `None` means exit (`0` or end of input).
    pub fn next_command(&mut self) -> Result<Option<Command>, CommandError> {
        let Some(op) = self.next_token()? else {
            return Ok(None);
        };

        let make: fn(i64) -> Command = match op.as_str() {
            "0" => return Ok(None),
            "1" => Command::Insert,
            "2" => Command::Remove,
            "3" => Command::Find,
            _ => return Err(CommandError::UnknownCommand(op)),
        };

        let key = self
            .next_token()?
            .ok_or_else(|| CommandError::MissingKey(op))?;
        let key = key.parse::<i64>().map_err(|_| CommandError::InvalidKey(key))?;

        Ok(Some(make(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Tokens<&[u8]> {
        Tokens::new(input.as_bytes())
    }

    #[test]
    fn commands() {
        let mut t = tokens("1 5\n2 -3\n  3\n  8\n0\n1 7");
        assert_eq!(t.next_command().unwrap(), Some(Command::Insert(5)));
        assert_eq!(t.next_command().unwrap(), Some(Command::Remove(-3)));
        assert_eq!(t.next_command().unwrap(), Some(Command::Find(8)));
        assert_eq!(t.next_command().unwrap(), None);
        // reading may continue after 0, the caller decides to stop
        assert_eq!(t.next_command().unwrap(), Some(Command::Insert(7)));
        assert_eq!(t.next_command().unwrap(), None);
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokens("").next_command().unwrap(), None);
        assert_eq!(tokens("\n \n").next_command().unwrap(), None);
    }

    #[test]
    fn errors() {
        let err = tokens("9 1").next_command().unwrap_err();
        assert!(matches!(&err, CommandError::UnknownCommand(op) if op == "9"));
        assert!(!err.is_recoverable());

        let err = tokens("1").next_command().unwrap_err();
        assert!(matches!(&err, CommandError::MissingKey(op) if op == "1"));
        assert!(!err.is_recoverable());

        let mut t = tokens("3 abc 3 4");
        let err = t.next_command().unwrap_err();
        assert!(matches!(&err, CommandError::InvalidKey(key) if key == "abc"));
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Invalid key: abc");
        assert_eq!(t.next_command().unwrap(), Some(Command::Find(4)));
    }
}
