//! Commands (side effects) produced by device updates
//!
//! Devices never render, play sounds or talk to the network themselves. They
//! return `Cmd` values which the owner of the grid hands to its presentation
//! and sync layers.

use crate::Position;
use serde::{Deserialize, Serialize};

/// A side effect requested by a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cmd {
    /// No operation
    None,

    /// Batch multiple commands
    Batch(Vec<Cmd>),

    /// Render the "transfer stopped / topped up" cue at a position
    FilledEffect { pos: Position },

    /// Block state changed; re-render, re-evaluate and resync observers
    BlockUpdate { pos: Position },

    /// A refill actuator was triggered
    ActivateRefill { pos: Position },
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        // Flatten nested batches and filter out None
        let mut flattened: Vec<Cmd> = cmds
            .into_iter()
            .flat_map(|cmd| match cmd {
                Cmd::None => vec![],
                Cmd::Batch(inner) => inner,
                other => vec![other],
            })
            .collect();

        match flattened.len() {
            0 => Cmd::None,
            1 => flattened.remove(0),
            _ => Cmd::Batch(flattened),
        }
    }

    /// Create a filled-effect command
    pub fn filled(pos: Position) -> Self {
        Cmd::FilledEffect { pos }
    }

    /// Create a block update command
    pub fn block_update(pos: Position) -> Self {
        Cmd::BlockUpdate { pos }
    }

    /// Check if this is a None command
    pub fn is_none(&self) -> bool {
        matches!(self, Cmd::None)
    }

    /// Iterate over the leaf commands, depth first
    pub fn iter(&self) -> CmdIter<'_> {
        CmdIter { stack: vec![self] }
    }

    /// Count leaf commands matching a predicate
    pub fn count(&self, pred: impl Fn(&Cmd) -> bool) -> usize {
        self.iter().filter(|c| pred(*c)).count()
    }
}

/// Depth-first iterator over leaf commands
pub struct CmdIter<'a> {
    stack: Vec<&'a Cmd>,
}

impl<'a> Iterator for CmdIter<'a> {
    type Item = &'a Cmd;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(cmd) = self.stack.pop() {
            match cmd {
                Cmd::None => continue,
                Cmd::Batch(inner) => self.stack.extend(inner.iter().rev()),
                leaf => return Some(leaf),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_batch() {
        let pos = Position::new(0, 0, 0);
        let cmd = Cmd::batch(vec![Cmd::None, Cmd::filled(pos), Cmd::None]);

        // Should flatten to single command
        assert_eq!(cmd, Cmd::FilledEffect { pos });
    }

    #[test]
    fn test_cmd_batch_nested() {
        let a = Position::new(0, 0, 0);
        let b = Position::new(1, 0, 0);
        let cmd = Cmd::batch(vec![
            Cmd::batch(vec![Cmd::filled(a), Cmd::block_update(a)]),
            Cmd::block_update(b),
        ]);

        if let Cmd::Batch(cmds) = &cmd {
            assert_eq!(cmds.len(), 3);
        } else {
            panic!("Expected Batch");
        }

        let leaves: Vec<_> = cmd.iter().cloned().collect();
        assert_eq!(
            leaves,
            vec![Cmd::filled(a), Cmd::block_update(a), Cmd::block_update(b)]
        );
        assert_eq!(cmd.count(|c| matches!(c, Cmd::BlockUpdate { .. })), 2);
    }

    #[test]
    fn test_empty_batch_is_none() {
        assert!(Cmd::batch(vec![Cmd::None, Cmd::batch(vec![])]).is_none());
    }
}
