/// Unique identifier for a body at the physics boundary.
///
/// The game layer never touches Rapier handles directly; every body it
/// creates is tagged with an `EntityId` so contact events can be routed
/// back to game objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// Monotonic source of entity ids for one simulation session.
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Hand out the next unique id. Ids are never reused within a session.
    pub fn next(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut ids = IdAllocator::new();
        let a = ids.next();
        let b = ids.next();
        assert_ne!(a, b);
        assert!(b.0 > a.0);
    }
}
