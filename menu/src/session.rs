use core::fmt;

use splay_tree::SplayTree;
use tracing::debug;

use crate::command::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Holds the key at the root after the insert.
    Added(i64),
    Removed(i64),
    Found(i64),
    NotFound(i64),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added(key) => write!(f, "Added\nKey: {key}"),
            Self::Removed(key) => write!(f, "Removed\nKey: {key}"),
            Self::Found(key) => write!(f, "Key: {key}"),
            Self::NotFound(key) => write!(f, "Key {key} not found"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    tree: SplayTree<i64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &SplayTree<i64> {
        &self.tree
    }

    pub fn execute(&mut self, command: Command) -> Outcome {
        let outcome = match command {
            Command::Insert(key) => Outcome::Added(*self.tree.insert(key)),
            Command::Remove(key) => {
                if self.tree.remove(&key) {
                    Outcome::Removed(key)
                } else {
                    Outcome::NotFound(key)
                }
            }
            Command::Find(key) => match self.tree.find(&key) {
                Some(found) => Outcome::Found(*found),
                None => Outcome::NotFound(key),
            },
        };
        debug!(?command, ?outcome, len = self.tree.len(), "executed");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenarios() {
        let mut session = Session::new();
        for k in [5, 3, 8, 1, 4] {
            assert_eq!(session.execute(Command::Insert(k)), Outcome::Added(k));
        }
        assert_eq!(session.tree().root(), Some(&4));

        assert_eq!(session.execute(Command::Find(8)), Outcome::Found(8));
        assert_eq!(session.tree().root(), Some(&8));

        assert_eq!(session.execute(Command::Remove(3)), Outcome::Removed(3));
        assert_eq!(session.execute(Command::Find(3)), Outcome::NotFound(3));
        assert_eq!(session.execute(Command::Remove(99)), Outcome::NotFound(99));
        assert_eq!(session.tree().len(), 4);
    }

    #[test]
    fn display() {
        assert_eq!(Outcome::Added(4).to_string(), "Added\nKey: 4");
        assert_eq!(Outcome::Removed(-2).to_string(), "Removed\nKey: -2");
        assert_eq!(Outcome::Found(7).to_string(), "Key: 7");
        assert_eq!(Outcome::NotFound(7).to_string(), "Key 7 not found");
    }
}
