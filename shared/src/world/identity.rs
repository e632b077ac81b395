/// Runtime-assigned identity of a replicated entity. Stable for the entity's
/// lifetime inside one runtime context only.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct EntityId(u64);

impl EntityId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Identity of a behavior, unique within the entity it is attached to.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct BehaviorId(u16);

impl BehaviorId {
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

/// Names the template an entity was instantiated from.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct PrefabId(u32);

impl PrefabId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Snapshot-wide key of a behavior: the entity identity at capture time plus
/// the behavior's local identity.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct BehaviorKey {
    pub entity: EntityId,
    pub behavior: BehaviorId,
}

impl BehaviorKey {
    pub fn new(entity: EntityId, behavior: BehaviorId) -> Self {
        Self { entity, behavior }
    }
}
