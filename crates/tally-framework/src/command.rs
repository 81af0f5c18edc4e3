//! The closed set of commands the bot answers.

use tally_core::UserId;

use crate::event::CommandInvocation;

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// How many times a user has said a trigger word. Without a target the
    /// invoker is asked about.
    Count {
        /// User to look up.
        target: Option<UserId>,
    },
    /// Everyone's counts, highest first.
    Leaderboard,
}

impl Command {
    /// Registered name of [`Command::Count`].
    pub const COUNT: &'static str = "count";
    /// Registered name of [`Command::Leaderboard`].
    pub const LEADERBOARD: &'static str = "leaderboard";

    /// Parses an invocation, returning `None` for unknown command names.
    ///
    /// Arguments a command does not take are ignored.
    pub fn parse(invocation: &CommandInvocation) -> Option<Self> {
        match invocation.name.as_str() {
            Self::COUNT => Some(Self::Count {
                target: invocation.target.clone(),
            }),
            Self::LEADERBOARD => Some(Self::Leaderboard),
            _ => None,
        }
    }

    /// Returns the registered command name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Count { .. } => Self::COUNT,
            Self::Leaderboard => Self::LEADERBOARD,
        }
    }
}
