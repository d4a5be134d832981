//! Infrastructure shared across the pool, query and solver layers: the append-only
//! arena allocator, the chunked sparse [`mapping::Mapping`], the typed ids, and the
//! libsolv-style [`idqueue::IdQueue`].

pub(crate) mod arena;
pub(crate) mod id;
pub(crate) mod idqueue;
pub(crate) mod mapping;

pub use arena::ArenaId;
pub use id::{ReldepId, RepoId, SolvableId, StringId};
