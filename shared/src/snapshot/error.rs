use thiserror::Error;

use crate::Tick;

/// Errors that can occur while recording or reproducing a snapshot
///
/// Expected omissions (unregistered prefabs, missing capabilities) are not
/// errors: they are logged and simply absent from the result. These variants
/// cover misuse and broken invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// A recorded attribute belongs to an entity without a recorded prefab
    #[error("Snapshot invariant violated: {attribute} recorded for entity {entity_id} which has no prefab")]
    InvariantViolation {
        entity_id: u64,
        attribute: &'static str,
    },

    /// Local state was already applied with `clear_after` and released
    #[error("Local state of this snapshot was already consumed")]
    LocalStateConsumed,

    /// The context did not advance while catching up to the capture tick
    #[error("Runtime context stalled at tick {current} while catching up to tick {target}")]
    TickStalled { current: Tick, target: Tick },

    /// The context is further behind the capture tick than allowed
    #[error("Runtime context is {outstanding} ticks behind the snapshot, limit is {limit}")]
    CatchUpTooFar { outstanding: u16, limit: u16 },

    /// The manager has no snapshot to work with
    #[error("No snapshot has been recorded")]
    NothingRecorded,
}
