/// How a respawned entity's identity relates to the identity it was recorded under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Accept the identity the context assigns and notify behaviors of the
    /// `old -> new` mapping once the batch completes.
    #[default]
    Remap,
    /// Overwrite the new identity with the recorded one. The context may
    /// already have handed that identity to something else; collisions are
    /// not detected here.
    ForceMatch,
}

/// Tuning knobs for recording and reproducing snapshots.
#[derive(Clone, Debug)]
pub struct SnapshotConfig {
    /// Identity policy used by `SnapshotManager::reproduce`.
    pub identity_policy: IdentityPolicy,
    /// Upper bound on ticks stepped while waiting for the context to reach
    /// the capture tick.
    /// - **Constraint**: `max_catch_up_ticks <= 32 767` (½ of the `u16` range),
    ///   beyond that the wrapping comparison cannot tell behind from ahead.
    pub max_catch_up_ticks: u16,
    /// Deliver `on_identity_remapped` after a respawn batch.
    pub notify_remaps: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            identity_policy: IdentityPolicy::Remap,
            max_catch_up_ticks: 32_767,
            notify_remaps: true,
        }
    }
}
