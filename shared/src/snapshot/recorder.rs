use log::{debug, warn};

use crate::{
    BehaviorId, BehaviorKey, Capabilities, EntityId, MigratedState, ReplicatedEntity,
    RuntimeContext, Snapshot, Transform, Vec3, Velocity,
};

/// Captures every live entity of `context` into a detached [`Snapshot`].
pub fn capture<C: RuntimeContext>(context: &C) -> Snapshot {
    capture_filtered(context, |_| true)
}

/// Captures the live entities of `context` for which `predicate` holds.
///
/// Entities whose prefab cannot be resolved are left out, since they could
/// not be respawned later. Missing capabilities fall back to defaults. The
/// context is never mutated.
pub fn capture_filtered<C, P>(context: &C, mut predicate: P) -> Snapshot
where
    C: RuntimeContext,
    P: FnMut(&C::Entity) -> bool,
{
    let mut snapshot = Snapshot::new(context.current_tick());

    for entity_id in context.live_entities() {
        let Some(entity) = context.entity(&entity_id) else {
            warn!("Live entity {:?} could not be found, skipping it", entity_id);
            continue;
        };
        if !predicate(entity) {
            continue;
        }
        let Some(prefab_id) = context.resolve_prefab(entity) else {
            debug!(
                "Entity {:?} has no registered prefab, leaving it out of the snapshot",
                entity_id
            );
            continue;
        };

        snapshot.record_entity(entity_id, prefab_id, read_transform(entity));

        if let Some(velocity) = read_velocity(entity) {
            snapshot.record_velocity(entity_id, velocity);
        }

        for behavior_id in entity.behavior_ids() {
            let Some(behavior) = entity.behavior(&behavior_id) else {
                continue;
            };
            if !behavior
                .capabilities()
                .contains(Capabilities::STATE_MIGRATABLE)
            {
                continue;
            }
            let Some(migratable) = behavior.state_migratable() else {
                warn_missing_accessor(&entity_id, &behavior_id, "state migratable");
                continue;
            };
            snapshot.record_state(
                BehaviorKey::new(entity_id, behavior_id),
                MigratedState::new(migratable.get_state(), migratable.get_local_state()),
            );
        }
    }

    debug!(
        "Captured {} entities and {} behavior states at tick {}",
        snapshot.len(),
        snapshot.state_count(),
        snapshot.capture_tick()
    );

    snapshot
}

/// Combined position+rotation wins over position only. Entities with
/// neither sit at the identity transform.
pub(crate) fn read_transform<E: ReplicatedEntity + ?Sized>(entity: &E) -> Transform {
    if let Some(transform) = read_transform_from(entity, Capabilities::POSITION_ROTATION) {
        return transform;
    }
    if let Some(transform) = read_transform_from(entity, Capabilities::POSITION) {
        return Transform::from_position(transform.position);
    }
    Transform::IDENTITY
}

fn read_transform_from<E: ReplicatedEntity + ?Sized>(
    entity: &E,
    capability: Capabilities,
) -> Option<Transform> {
    let behavior_id = entity.find_behavior(capability)?;
    let behavior = entity.behavior(&behavior_id)?;
    match behavior.transform() {
        Some(transform) => Some(transform.read_transform()),
        None => {
            warn_missing_accessor(&entity.identity(), &behavior_id, "transform");
            None
        }
    }
}

/// 3D bodies take precedence. A planar body's scalar angular velocity is
/// stored as the z component. A body that exposes no accessor is passed
/// over like a missing one.
pub(crate) fn read_velocity<E: ReplicatedEntity + ?Sized>(entity: &E) -> Option<Velocity> {
    read_velocity_3d(entity).or_else(|| read_velocity_2d(entity))
}

fn read_velocity_3d<E: ReplicatedEntity + ?Sized>(entity: &E) -> Option<Velocity> {
    let behavior_id = entity.find_behavior(Capabilities::PHYSICS_3D)?;
    let behavior = entity.behavior(&behavior_id)?;
    match behavior.physics_body() {
        Some(body) => Some(Velocity::new(
            body.read_velocity(),
            body.read_angular_velocity(),
        )),
        None => {
            warn_missing_accessor(&entity.identity(), &behavior_id, "3D physics body");
            None
        }
    }
}

fn read_velocity_2d<E: ReplicatedEntity + ?Sized>(entity: &E) -> Option<Velocity> {
    let behavior_id = entity.find_behavior(Capabilities::PHYSICS_2D)?;
    let behavior = entity.behavior(&behavior_id)?;
    match behavior.physics_body_2d() {
        Some(body) => Some(Velocity::new(
            Vec3::from_planar(body.read_velocity()),
            Vec3::new(0.0, 0.0, body.read_angular_velocity()),
        )),
        None => {
            warn_missing_accessor(&entity.identity(), &behavior_id, "2D physics body");
            None
        }
    }
}

pub(crate) fn warn_missing_accessor(
    entity_id: &EntityId,
    behavior_id: &BehaviorId,
    capability: &str,
) {
    warn!(
        "Behavior {:?} on entity {:?} declares a {} capability but exposes no accessor for it",
        behavior_id,
        entity_id,
        capability
    );
}
