use crate::{
    BehaviorId, Capabilities, EntityId, OpaqueState, PrefabId, Tick, Transform, Vec2, Vec3,
};

/// The live simulation a snapshot is captured from and reproduced into.
///
/// Entities are owned by the context and addressed by [`EntityId`]. A spawn
/// is split in two: [`RuntimeContext::instantiate`] creates a pending entity
/// that can be configured, [`RuntimeContext::attach`] hands it over to the
/// simulation.
pub trait RuntimeContext {
    type Entity: ReplicatedEntity;

    fn current_tick(&self) -> Tick;

    /// Advances the simulation by exactly one tick.
    fn step(&mut self);

    fn entity(&self, entity_id: &EntityId) -> Option<&Self::Entity>;

    fn entity_mut(&mut self, entity_id: &EntityId) -> Option<&mut Self::Entity>;

    fn live_entities(&self) -> Vec<EntityId>;

    /// Pending entities the transport restored on its own, awaiting `attach`.
    fn resumed_entities(&self) -> Vec<EntityId>;

    /// `None` when the entity's template is not registered with this context.
    fn resolve_prefab(&self, entity: &Self::Entity) -> Option<PrefabId>;

    /// Creates a pending entity from `prefab` placed at `transform`. `None`
    /// when the prefab cannot be resolved to a creatable template.
    fn instantiate(&mut self, prefab: &PrefabId, transform: &Transform) -> Option<EntityId>;

    /// Moves a pending entity to `desired`. Returns false when the context
    /// refuses, leaving the entity under `current`.
    fn reassign_identity(&mut self, current: &EntityId, desired: EntityId) -> bool;

    fn attach(&mut self, entity_id: &EntityId);
}

pub trait ReplicatedEntity {
    fn identity(&self) -> EntityId;

    fn behavior_ids(&self) -> Vec<BehaviorId>;

    fn behavior(&self, behavior_id: &BehaviorId) -> Option<&dyn NetworkBehavior>;

    fn behavior_mut(&mut self, behavior_id: &BehaviorId) -> Option<&mut dyn NetworkBehavior>;

    /// Union of the capabilities of every attached behavior.
    fn capabilities(&self) -> Capabilities {
        self.behavior_ids()
            .iter()
            .filter_map(|behavior_id| self.behavior(behavior_id))
            .fold(Capabilities::empty(), |caps, behavior| {
                caps | behavior.capabilities()
            })
    }

    /// First behavior that declared any of `capabilities`, in attachment order.
    fn find_behavior(&self, capabilities: Capabilities) -> Option<BehaviorId> {
        self.behavior_ids().into_iter().find(|behavior_id| {
            self.behavior(behavior_id)
                .map(|behavior| behavior.capabilities().intersects(capabilities))
                .unwrap_or(false)
        })
    }
}

/// A sub-component attached to an entity. Accessors only need to return
/// `Some` for the capabilities the behavior declares.
pub trait NetworkBehavior {
    fn id(&self) -> BehaviorId;

    fn capabilities(&self) -> Capabilities;

    fn transform(&self) -> Option<&dyn TransformBehavior> {
        None
    }

    fn transform_mut(&mut self) -> Option<&mut dyn TransformBehavior> {
        None
    }

    fn physics_body(&self) -> Option<&dyn PhysicsBody> {
        None
    }

    fn physics_body_mut(&mut self) -> Option<&mut dyn PhysicsBody> {
        None
    }

    fn physics_body_2d(&self) -> Option<&dyn PhysicsBody2D> {
        None
    }

    fn physics_body_2d_mut(&mut self) -> Option<&mut dyn PhysicsBody2D> {
        None
    }

    fn state_migratable(&self) -> Option<&dyn StateMigratable> {
        None
    }

    fn state_migratable_mut(&mut self) -> Option<&mut dyn StateMigratable> {
        None
    }
}

/// Position-only behaviors report `Quat::IDENTITY` and ignore rotation writes.
pub trait TransformBehavior {
    fn read_transform(&self) -> Transform;

    fn write_transform(&mut self, transform: &Transform);
}

pub trait PhysicsBody {
    fn read_velocity(&self) -> Vec3;

    fn read_angular_velocity(&self) -> Vec3;

    fn write_velocity(&mut self, velocity: Vec3);

    fn write_angular_velocity(&mut self, angular_velocity: Vec3);
}

pub trait PhysicsBody2D {
    fn read_velocity(&self) -> Vec2;

    fn read_angular_velocity(&self) -> f32;

    fn write_velocity(&mut self, velocity: Vec2);

    fn write_angular_velocity(&mut self, angular_velocity: f32);
}

/// Implemented by behaviors whose values must survive a host migration.
///
/// Networked state is restored on the respawned entity by the reproducer.
/// Local state never travels over the network and is restored separately,
/// possibly into a different context than the one it was recorded from.
pub trait StateMigratable {
    fn get_state(&self) -> OpaqueState;

    fn set_state(&mut self, state: OpaqueState);

    fn get_local_state(&self) -> OpaqueState;

    fn set_local_state(&mut self, state: OpaqueState);

    /// Called once per remapped entity after a whole respawn batch completes.
    fn on_identity_remapped(&mut self, _old: EntityId, _new: EntityId) {}
}
