use std::collections::{BTreeMap, HashSet};

use log::warn;

use cadence_shared::{
    GameEngine, InputDescriptor, ObjectId, PlayerId, StepCount, SyncEventKind, WorldSync,
};

use crate::strategy::{apply_destroys, DriftBand, DriftThresholds, SyncOutcome};

#[derive(Debug, Clone, PartialEq)]
pub struct ExtrapolateConfig {
    /// Syncs that may queue before the oldest is force-applied.
    pub syncs_buffer_length: usize,
    /// Hard cap on how many past steps a single sync may re-enact.
    pub max_reenact_steps: u32,
    /// Steps of lead the client holds over the latest server step.
    pub rtt_estimate: u32,
    /// Nominal extrapolation headroom, in steps. Accepted for configuration
    /// parity; the drift discipline keys off `rtt_estimate`.
    pub extrapolate: u32,
    /// Bending percentage for objects owned by the local player.
    pub local_obj_bending: f32,
    /// Bending percentage for remote objects.
    pub remote_obj_bending: f32,
    /// Steps over which a correction is smoothed.
    pub bending_increments: u32,
}

impl Default for ExtrapolateConfig {
    fn default() -> Self {
        Self {
            syncs_buffer_length: 5,
            max_reenact_steps: 60,
            rtt_estimate: 2,
            extrapolate: 2,
            local_obj_bending: 0.1,
            remote_obj_bending: 0.6,
            bending_increments: 10,
        }
    }
}

/// Client-side prediction. The client simulates ahead of the server; when a
/// sync arrives it adopts the server snapshot, re-enacts its buffered
/// movement inputs forward to "now", and bends each object from its
/// pre-sync state toward the re-enacted state.
pub struct ExtrapolateStrategy {
    config: ExtrapolateConfig,
    need_first_sync: bool,
    /// Locally produced inputs by step, kept for re-enactment.
    recent_inputs: BTreeMap<StepCount, Vec<InputDescriptor>>,
}

impl ExtrapolateStrategy {
    pub const STEP_DRIFT_THRESHOLDS: &'static DriftThresholds = &DriftThresholds {
        on_server_sync: DriftBand {
            max_lead: 1,
            max_lag: 3,
        },
        on_every_step: DriftBand {
            max_lead: 7,
            max_lag: 4,
        },
        client_reset: 40,
    };

    pub fn new(config: ExtrapolateConfig) -> Self {
        Self {
            config,
            need_first_sync: true,
            recent_inputs: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &ExtrapolateConfig {
        &self.config
    }

    pub fn need_first_sync(&self) -> bool {
        self.need_first_sync
    }

    pub fn buffer_input(&mut self, input: &InputDescriptor) {
        self.recent_inputs
            .entry(input.step)
            .or_default()
            .push(input.clone());
    }

    pub fn buffered_input_steps(&self) -> Vec<StepCount> {
        self.recent_inputs.keys().copied().collect()
    }

    pub fn apply_sync(
        &mut self,
        game: &mut GameEngine,
        sync: WorldSync,
        required: bool,
        my_player_id: PlayerId,
    ) -> SyncOutcome {
        let client_step = game.world().step_count;
        let server_step = sync.step_count;
        // a sync from the client's future can only apply once forced
        if server_step > client_step && !required {
            return SyncOutcome::Deferred(sync);
        }
        self.need_first_sync = false;

        let mut synced_ids: HashSet<ObjectId> = HashSet::new();
        let mut destroy_ids: Vec<ObjectId> = Vec::new();

        for (id, events) in sync.objects {
            for event in events {
                match event.kind {
                    SyncEventKind::ObjectDestroy => destroy_ids.push(id),
                    SyncEventKind::ObjectCreate | SyncEventKind::ObjectUpdate => {
                        synced_ids.insert(id);
                        let server_object = event.object;
                        if let Some(shadow_id) = game.find_local_shadow(server_object.as_ref()) {
                            // the twin of a local shadow arrived: adopt it,
                            // seeded with the shadow's state for bending
                            if !game.world().contains(id) {
                                let mut adopted = server_object;
                                if let Some(shadow) = game.world().get(shadow_id) {
                                    adopted.save_state(Some(shadow));
                                }
                                game.add_object_to_world(adopted);
                            }
                            if game.remove_object_from_world(shadow_id).is_err() {
                                warn!("shadow {shadow_id} vanished before reclamation");
                            }
                        } else if game.world().contains(id) {
                            if let Some(local) = game.world_mut().get_mut(id) {
                                local.save_state(None);
                                local.sync_to(server_object.as_ref());
                            }
                        } else {
                            game.add_object_to_world(server_object);
                        }
                    }
                }
            }
        }

        // re-enact from the server step back up to where the client was
        let reenact_start =
            server_step.max(client_step.saturating_sub(self.config.max_reenact_steps));
        game.world_mut().step_count = reenact_start;
        while game.world().step_count < client_step {
            let step = game.world().step_count;
            if let Some(inputs) = self.recent_inputs.get(&step) {
                for input in inputs {
                    if !input.options.movement {
                        continue;
                    }
                    game.process_input(input, my_player_id, false);
                }
            }
            game.step(true, None, None, false);
        }

        // inputs at or before the adopted server step are settled history
        self.recent_inputs.retain(|step, _| *step > server_step);

        // bend every non-shadow object from its pre-sync state toward the
        // re-enacted state
        let client_id_space = game.client_id_space();
        let local_bending = self.config.local_obj_bending;
        let remote_bending = self.config.remote_obj_bending;
        let increments = self.config.bending_increments;
        game.world_mut().for_each_mut(|id, object| {
            if id >= client_id_space {
                return true;
            }
            let is_local = object.player_id() == my_player_id;
            let percent = if is_local {
                local_bending
            } else {
                remote_bending
            };
            object.bend_from_saved_to_current(percent, is_local, increments);
            true
        });

        apply_destroys(
            game,
            destroy_ids,
            sync.full_update.then_some(&synced_ids),
        );
        SyncOutcome::Applied
    }
}
