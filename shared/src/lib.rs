//! # Reprise Shared
//! Records the replicated entities of a running simulation and reproduces
//! them inside a fresh runtime context, preserving transforms, velocities
//! and behavior state.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use naia_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr, MTU_SIZE_BITS};

mod packing;
mod snapshot;
mod tick;
mod types;
mod world;

pub use packing::{
    bit_packing::{
        clamp, max_value, min_value, pack, try_clamp, try_max_value, try_min_value, try_pack,
        try_unpack, unpack, FieldWidth,
    },
    error::PackingError,
    quantize::{
        pack_angle, pack_euler_compact, pack_euler_wide, pack_rgba, unpack_angle,
        unpack_euler_compact, unpack_euler_wide, unpack_rgba, Vec2Quantizer, Vec3Quantizer,
    },
};
pub use snapshot::{
    config::{IdentityPolicy, SnapshotConfig},
    error::SnapshotError,
    local_state::{apply_local_state, try_apply_local_state, try_apply_local_state_remapped},
    manager::SnapshotManager,
    opaque_state::{OpaqueState, StateError, StateValue},
    recorder::{capture, capture_filtered},
    reproducer::{reproduce, try_reproduce, ReproduceReport, SpawnHooks},
    snapshot::{MigratedState, Snapshot},
};
pub use tick::{
    elapsed_ticks, has_reached, remaining_ticks, tick_diff, tick_greater_than, tick_less_than,
    try_tick_diff, TickClock, TickError,
};
pub use types::Tick;
pub use world::{
    capability::Capabilities,
    identity::{BehaviorId, BehaviorKey, EntityId, PrefabId},
    math::{Quat, Transform, Vec2, Vec3, Velocity},
    world_type::{
        NetworkBehavior, PhysicsBody, PhysicsBody2D, ReplicatedEntity, RuntimeContext,
        StateMigratable, TransformBehavior,
    },
};
