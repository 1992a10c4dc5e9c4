use std::collections::HashSet;

use cadence_shared::{GameEngine, InputDescriptor, ObjectId, PlayerId, StepCount, WorldSync};

use crate::client_config::ClientConfig;
use crate::ClientError;

mod extrapolate;
mod frame_sync;
mod interpolate;

pub use extrapolate::{ExtrapolateConfig, ExtrapolateStrategy};
pub use frame_sync::{FrameSyncConfig, FrameSyncStrategy};
pub use interpolate::{InterpolateConfig, InterpolateStrategy};

/// Allowed step drift band, in steps relative to the strategy's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftBand {
    pub max_lead: i64,
    pub max_lag: i64,
}

/// Per-strategy step drift tolerances. `client_reset` is the lag beyond
/// which re-enactment is hopeless and the client snaps its step count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftThresholds {
    pub on_server_sync: DriftBand,
    pub on_every_step: DriftBand,
    pub client_reset: u32,
}

/// Which drift check is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftCheck {
    OnServerSync,
    OnEveryStep,
}

/// Result of handing a sync to a strategy.
pub enum SyncOutcome {
    /// The sync mutated the world; run the on-sync drift check.
    Applied,
    /// The sync is not applicable yet; retry it later.
    Deferred(WorldSync),
    /// The sync is stale and was discarded.
    Ignored,
}

/// The three reconciliation strategies as a tagged sum: one of these is
/// chosen at client construction and owns all strategy-specific state.
pub enum SyncStrategy {
    Extrapolate(ExtrapolateStrategy),
    Interpolate(InterpolateStrategy),
    FrameSync(FrameSyncStrategy),
}

impl SyncStrategy {
    /// Resolves a strategy by its configured name. An unknown name is fatal:
    /// the client refuses to start.
    pub fn from_name(name: &str, config: &ClientConfig) -> Result<Self, ClientError> {
        match name {
            "extrapolate" => Ok(Self::Extrapolate(ExtrapolateStrategy::new(
                config.extrapolate.clone(),
            ))),
            "interpolate" => Ok(Self::Interpolate(InterpolateStrategy::new(
                config.interpolate.clone(),
            ))),
            "frameSync" => Ok(Self::FrameSync(FrameSyncStrategy::new(
                config.frame_sync.clone(),
            ))),
            _ => Err(ClientError::UnknownSyncStrategy {
                name: name.to_string(),
            }),
        }
    }

    pub fn apply_sync(
        &mut self,
        game: &mut GameEngine,
        sync: WorldSync,
        required: bool,
        my_player_id: PlayerId,
    ) -> SyncOutcome {
        match self {
            Self::Extrapolate(strategy) => strategy.apply_sync(game, sync, required, my_player_id),
            Self::Interpolate(strategy) => strategy.apply_sync(game, sync, required, my_player_id),
            Self::FrameSync(strategy) => strategy.apply_sync(game, sync, required, my_player_id),
        }
    }

    pub fn drift_thresholds(&self) -> &'static DriftThresholds {
        match self {
            Self::Extrapolate(_) => ExtrapolateStrategy::STEP_DRIFT_THRESHOLDS,
            Self::Interpolate(_) => InterpolateStrategy::STEP_DRIFT_THRESHOLDS,
            Self::FrameSync(_) => FrameSyncStrategy::STEP_DRIFT_THRESHOLDS,
        }
    }

    /// The step the client should currently be at, given the latest known
    /// server step. Extrapolating clients lead the server; interpolating
    /// clients trail it.
    pub fn target_step(&self, server_step: StepCount) -> i64 {
        match self {
            Self::Extrapolate(strategy) => {
                i64::from(server_step) + i64::from(strategy.config().rtt_estimate)
            }
            Self::Interpolate(strategy) => {
                i64::from(server_step) - i64::from(strategy.config().client_step_hold)
            }
            Self::FrameSync(strategy) => {
                i64::from(server_step) - i64::from(strategy.config().client_step_lag)
            }
        }
    }

    /// Whether the local simulation runs physics. Interpolating clients do
    /// not simulate; they only play back bent server state.
    pub fn runs_physics(&self) -> bool {
        !matches!(self, Self::Interpolate(_))
    }

    /// Whether inputs are applied locally (prediction) in addition to being
    /// sent to the server.
    pub fn handles_inputs(&self) -> bool {
        !matches!(self, Self::Interpolate(_))
    }

    /// Offers a locally produced input for later re-enactment.
    pub fn buffer_input(&mut self, input: &InputDescriptor) {
        if let Self::Extrapolate(strategy) = self {
            strategy.buffer_input(input);
        }
    }

    /// How many syncs may queue before the oldest is force-applied.
    pub fn syncs_buffer_length(&self) -> usize {
        match self {
            Self::Extrapolate(strategy) => strategy.config().syncs_buffer_length,
            Self::Interpolate(_) => 5,
            Self::FrameSync(strategy) => strategy.config().world_buffer_length,
        }
    }

    /// True until the first sync applies; local additions that could
    /// conflict with server state are held off until then.
    pub fn need_first_sync(&self) -> bool {
        match self {
            Self::Extrapolate(strategy) => strategy.need_first_sync(),
            Self::Interpolate(strategy) => strategy.need_first_sync(),
            Self::FrameSync(strategy) => strategy.need_first_sync(),
        }
    }
}

/// Destroy handling shared by all strategies: on a full update, every
/// non-shadow object absent from the sync is removed; explicit destroy
/// events remove server-space objects only.
pub(crate) fn apply_destroys(
    game: &mut GameEngine,
    destroy_ids: Vec<ObjectId>,
    full_sweep: Option<&HashSet<ObjectId>>,
) {
    let client_id_space = game.client_id_space();
    if let Some(synced_ids) = full_sweep {
        let mut stale: Vec<ObjectId> = Vec::new();
        game.world().for_each(|id, _| {
            if id < client_id_space && !synced_ids.contains(&id) {
                stale.push(id);
            }
            true
        });
        for id in stale {
            let _ = game.remove_object_from_world(id);
        }
    }
    for id in destroy_ids {
        if id >= client_id_space {
            continue;
        }
        if game.world().contains(id) {
            let _ = game.remove_object_from_world(id);
        }
    }
}
