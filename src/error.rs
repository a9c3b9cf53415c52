//! Errors surfaced by the pool and the script bridge.

use thiserror::Error;

use crate::components::handle::Handle;
use crate::components::property::PropertyKey;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    /// Every slot is in use.
    #[error("entity pool exhausted ({capacity} slots in use)")]
    PoolExhausted { capacity: usize },

    /// The handle refers to a freed or never-allocated slot.
    #[error("invalid or stale entity handle {0}")]
    InvalidHandle(Handle),

    /// Group index outside `[0, groups)`.
    #[error("collision group {group} out of range (pool has {groups} groups)")]
    InvalidGroup { group: i64, groups: u16 },

    #[error("unknown entity property '{0}'")]
    UnknownProperty(String),

    #[error("property '{key}' expects {expected}")]
    PropertyType { key: PropertyKey, expected: &'static str },

    #[error("property '{0}' is read-only")]
    ReadOnlyProperty(PropertyKey),

    /// The 64-bit creation counter ran out.
    #[error("entity uid space exhausted")]
    UidExhausted,
}

pub type PoolResult<T> = Result<T, PoolError>;
