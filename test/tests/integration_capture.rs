/// INTEGRATION TESTS: Capturing a running context
///
/// Covers which entities end up in a snapshot and how transforms,
/// velocities and behavior state are read from their capabilities.

use reprise_shared::{
    capture, capture_filtered, opaque_state, BehaviorId, BehaviorKey, Capabilities, EntityId,
    PrefabId, Quat, Snapshot, Transform, Vec3,
};
use reprise_test::{
    assert_no_orphans, assert_vec3_eq, init_logger, TestBehavior, TestEntityBuilder, TestWorld,
};

const PROP: u32 = 1;
const PLAYER: u32 = 2;

fn scenario_world() -> TestWorld {
    let mut world = TestWorld::at_tick(100);
    world.register_prefab(PrefabId::new(PROP), &[(1, Capabilities::POSITION_ROTATION)]);
    world.register_prefab(
        PrefabId::new(PLAYER),
        &[
            (1, Capabilities::POSITION_ROTATION),
            (2, Capabilities::PHYSICS_3D),
            (3, Capabilities::STATE_MIGRATABLE),
        ],
    );

    world.spawn(
        EntityId::new(1),
        TestEntityBuilder::new(PROP)
            .transform(1, Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY)
            .build(),
    );
    world.spawn(
        EntityId::new(2),
        TestEntityBuilder::new(PLAYER)
            .transform(1, Vec3::new(4.0, 5.0, 6.0), Quat::new(0.0, 0.7071, 0.0, 0.7071))
            .body(2, Vec3::new(0.0, 0.0, 9.0), Vec3::new(0.0, 1.0, 0.0))
            .migratable(3, opaque_state!["hp", 42], opaque_state!["selected"])
            .build(),
    );
    world.spawn(
        EntityId::new(3),
        TestEntityBuilder::unregistered()
            .transform(1, Vec3::new(7.0, 8.0, 9.0), Quat::IDENTITY)
            .build(),
    );

    world
}

#[test]
fn scenario_capture_leaves_out_unresolvable_entity() {
    init_logger();
    let world = scenario_world();

    let snapshot = capture(&world);

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.prefabs().len(), 2);
    assert!(snapshot.contains(&EntityId::new(1)));
    assert!(snapshot.contains(&EntityId::new(2)));
    assert!(!snapshot.contains(&EntityId::new(3)));

    assert_eq!(snapshot.state_count(), 1);
    let key = BehaviorKey::new(EntityId::new(2), BehaviorId::new(3));
    assert_eq!(snapshot.state_of(&key), Some(&opaque_state!["hp", 42]));
    assert_eq!(snapshot.local_state_of(&key), Some(&opaque_state!["selected"]));

    assert_eq!(snapshot.capture_tick(), 100);
    assert_no_orphans(&snapshot);
}

#[test]
fn capture_records_transform_and_velocity() {
    let world = scenario_world();

    let snapshot = capture(&world);

    let prop = snapshot.transform_of(&EntityId::new(1)).unwrap();
    assert_vec3_eq!(prop.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(snapshot.velocity_of(&EntityId::new(1)), None);

    let player = snapshot.transform_of(&EntityId::new(2)).unwrap();
    assert_eq!(player.rotation, Quat::new(0.0, 0.7071, 0.0, 0.7071));
    let velocity = snapshot.velocity_of(&EntityId::new(2)).unwrap();
    assert_vec3_eq!(velocity.linear, Vec3::new(0.0, 0.0, 9.0));
    assert_vec3_eq!(velocity.angular, Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(snapshot.velocity_count(), 1);
}

#[test]
fn capture_does_not_touch_the_context() {
    let world = scenario_world();

    let _ = capture(&world);

    assert!(world.events().is_empty());
    assert_eq!(world.entity_count(), 3);
}

#[test]
fn position_rotation_wins_over_position_only() {
    let mut world = TestWorld::new();
    world.register_prefab(PrefabId::new(PROP), &[]);
    world.spawn(
        EntityId::new(1),
        TestEntityBuilder::new(PROP)
            .behavior(
                TestBehavior::new(1, Capabilities::POSITION)
                    .with_transform(Transform::from_position(Vec3::new(5.0, 5.0, 5.0))),
            )
            .transform(2, Vec3::new(1.0, 1.0, 1.0), Quat::new(1.0, 0.0, 0.0, 0.0))
            .build(),
    );

    let snapshot = capture(&world);

    let transform = snapshot.transform_of(&EntityId::new(1)).unwrap();
    assert_vec3_eq!(transform.position, Vec3::new(1.0, 1.0, 1.0));
    assert_eq!(transform.rotation, Quat::new(1.0, 0.0, 0.0, 0.0));
}

#[test]
fn position_only_reports_identity_rotation() {
    let mut world = TestWorld::new();
    world.register_prefab(PrefabId::new(PROP), &[]);
    world.spawn(
        EntityId::new(1),
        TestEntityBuilder::new(PROP)
            .behavior(TestBehavior::new(1, Capabilities::POSITION).with_transform(
                Transform::new(Vec3::new(2.0, 0.0, 0.0), Quat::new(0.0, 0.0, 1.0, 0.0)),
            ))
            .build(),
    );

    let snapshot = capture(&world);

    let transform = snapshot.transform_of(&EntityId::new(1)).unwrap();
    assert_vec3_eq!(transform.position, Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(transform.rotation, Quat::IDENTITY);
}

#[test]
fn entity_without_transform_sits_at_identity() {
    let mut world = TestWorld::new();
    world.register_prefab(PrefabId::new(PROP), &[]);
    world.spawn(
        EntityId::new(1),
        TestEntityBuilder::new(PROP)
            .migratable(1, opaque_state![1], opaque_state![])
            .build(),
    );

    let snapshot = capture(&world);

    assert_eq!(
        snapshot.transform_of(&EntityId::new(1)),
        Some(&Transform::IDENTITY)
    );
    assert_eq!(snapshot.velocity_of(&EntityId::new(1)), None);
}

#[test]
fn planar_angular_velocity_is_stored_as_z() {
    let mut world = TestWorld::new();
    world.register_prefab(PrefabId::new(PROP), &[]);
    world.spawn(
        EntityId::new(1),
        TestEntityBuilder::new(PROP)
            .behavior(
                TestBehavior::new(1, Capabilities::PHYSICS_2D)
                    .with_velocity(Vec3::new(3.0, 4.0, 0.0), Vec3::new(0.0, 0.0, 1.5)),
            )
            .build(),
    );

    let snapshot = capture(&world);

    let velocity = snapshot.velocity_of(&EntityId::new(1)).unwrap();
    assert_vec3_eq!(velocity.linear, Vec3::new(3.0, 4.0, 0.0));
    assert_vec3_eq!(velocity.angular, Vec3::new(0.0, 0.0, 1.5));
}

#[test]
fn physics_3d_wins_over_physics_2d() {
    let mut world = TestWorld::new();
    world.register_prefab(PrefabId::new(PROP), &[]);
    world.spawn(
        EntityId::new(1),
        TestEntityBuilder::new(PROP)
            .behavior(
                TestBehavior::new(1, Capabilities::PHYSICS_2D)
                    .with_velocity(Vec3::new(1.0, 1.0, 0.0), Vec3::ZERO),
            )
            .body(2, Vec3::new(0.0, -9.8, 0.0), Vec3::ZERO)
            .build(),
    );

    let snapshot = capture(&world);

    let velocity = snapshot.velocity_of(&EntityId::new(1)).unwrap();
    assert_vec3_eq!(velocity.linear, Vec3::new(0.0, -9.8, 0.0));
}

#[test]
fn planar_body_is_read_when_3d_body_has_no_accessor() {
    let mut world = TestWorld::new();
    world.register_prefab(PrefabId::new(PROP), &[]);
    world.spawn(
        EntityId::new(1),
        TestEntityBuilder::new(PROP)
            .behavior(
                TestBehavior::new(1, Capabilities::PHYSICS_3D)
                    .with_velocity(Vec3::new(0.0, -9.8, 0.0), Vec3::ZERO)
                    .withholding(Capabilities::PHYSICS_3D),
            )
            .behavior(
                TestBehavior::new(2, Capabilities::PHYSICS_2D)
                    .with_velocity(Vec3::new(2.0, 3.0, 0.0), Vec3::new(0.0, 0.0, 0.5)),
            )
            .build(),
    );

    let snapshot = capture(&world);

    let velocity = snapshot.velocity_of(&EntityId::new(1)).unwrap();
    assert_vec3_eq!(velocity.linear, Vec3::new(2.0, 3.0, 0.0));
    assert_vec3_eq!(velocity.angular, Vec3::new(0.0, 0.0, 0.5));
}

#[test]
fn body_without_accessor_records_no_velocity() {
    let mut world = TestWorld::new();
    world.register_prefab(PrefabId::new(PROP), &[]);
    world.spawn(
        EntityId::new(1),
        TestEntityBuilder::new(PROP)
            .behavior(
                TestBehavior::new(1, Capabilities::PHYSICS_3D)
                    .withholding(Capabilities::PHYSICS_3D),
            )
            .build(),
    );

    let snapshot = capture(&world);

    assert!(snapshot.contains(&EntityId::new(1)));
    assert_eq!(snapshot.velocity_of(&EntityId::new(1)), None);
}

#[test]
fn filtered_capture_only_keeps_matching_entities() {
    let world = scenario_world();

    let snapshot = capture_filtered(&world, |entity| entity.behaviors().len() > 1);

    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.contains(&EntityId::new(2)));
    assert_no_orphans(&snapshot);
}

#[test]
fn empty_context_gives_empty_snapshot() {
    let world = TestWorld::at_tick(12);

    let snapshot: Snapshot = capture(&world);

    assert!(snapshot.is_empty());
    assert!(!snapshot.is_reproducible());
    assert_eq!(snapshot.capture_tick(), 12);
}
