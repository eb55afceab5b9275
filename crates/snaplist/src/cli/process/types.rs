//! CLI enum types for the process command.

use clap::ValueEnum;
use snaplist_core::CollisionPolicy;

/// What to do when the output directory already holds the chosen file name.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Collision {
    /// Replace the existing file
    Overwrite,
    /// Append _2, _3, ... until the name is free
    Uniquify,
    /// Fail the image
    Fail,
}

impl From<Collision> for CollisionPolicy {
    fn from(value: Collision) -> Self {
        match value {
            Collision::Overwrite => CollisionPolicy::Overwrite,
            Collision::Uniquify => CollisionPolicy::Uniquify,
            Collision::Fail => CollisionPolicy::Fail,
        }
    }
}

impl std::fmt::Display for Collision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collision::Overwrite => write!(f, "overwrite"),
            Collision::Uniquify => write!(f, "uniquify"),
            Collision::Fail => write!(f, "fail"),
        }
    }
}
