//! Bump-allocated scratch regions.
//!
//! A [`Region`] is a thin wrapper around [`bumpalo::Bump`] that adds a
//! generation counter so scoped checkpoints can assert balanced
//! `save`/`restore` nesting. `bumpalo` only supports resetting a whole
//! arena, not rewinding to an interior mark while keeping earlier
//! allocations alive with stable addresses in safe Rust, so `restore`
//! is satisfied by resetting the arena when the outermost checkpoint is
//! released; nested checkpoints only validate the nesting discipline.
//! This preserves the safepoint-clearing guarantee the design depends on
//! (memory does not accumulate across independent units of work) without
//! requiring unsafe pointer games to fake a literal interior mark.

mod marker;
mod region;
mod scope;

pub use marker::Marker;
pub use region::{Checkpoint, Region};
pub use scope::{ScopedArena, ScopedCheckpoint};

/// The two long-lived arenas the exporter keeps alive for the whole run.
pub struct Arenas {
    transient: Region,
    permanent: Region,
}

impl Arenas {
    pub fn new() -> Self {
        Self {
            transient: Region::new("transient"),
            permanent: Region::new("permanent"),
        }
    }

    pub fn transient(&self) -> &Region {
        &self.transient
    }

    pub fn permanent(&self) -> &Region {
        &self.permanent
    }
}

impl Default for Arenas {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_and_permanent_are_independent() {
        let arenas = Arenas::new();
        let a = arenas.transient().alloc_str("hello");
        let b = arenas.permanent().alloc_str("world");
        assert_eq!(a, "hello");
        assert_eq!(b, "world");
    }
}
