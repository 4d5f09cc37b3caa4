use crate::region::Region;

/// RAII guard that saves a checkpoint on construction and restores it on
/// drop, regardless of how the scope is exited (including unwinding).
/// Mirrors the `ARENA_SAVEPOINT()`/`FILE_READ_DEFER` scoped-macro idiom
/// from the reference implementation.
pub struct ScopedCheckpoint<'a> {
    region: &'a Region,
    checkpoint: Option<crate::region::Checkpoint>,
}

impl<'a> ScopedCheckpoint<'a> {
    pub fn new(region: &'a Region) -> Self {
        Self {
            region,
            checkpoint: Some(region.save()),
        }
    }

    pub fn region(&self) -> &'a Region {
        self.region
    }
}

impl Drop for ScopedCheckpoint<'_> {
    fn drop(&mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            self.region.restore(checkpoint);
        }
    }
}

/// A scoped switch between two arenas, exposing whichever one is
/// "current" for the duration of the scope. Used where the source swaps
/// `context.current_arena` between the transient and permanent regions.
pub struct ScopedArena<'a> {
    active: &'a Region,
}

impl<'a> ScopedArena<'a> {
    pub fn enter(active: &'a Region) -> Self {
        Self { active }
    }

    pub fn arena(&self) -> &'a Region {
        self.active
    }
}
