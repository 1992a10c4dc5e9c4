use std::collections::HashSet;

use cadence_shared::{GameEngine, ObjectId, PlayerId, SyncEventKind, WorldSync};

use crate::strategy::{apply_destroys, DriftBand, DriftThresholds, SyncOutcome};

#[derive(Debug, Clone, PartialEq)]
pub struct InterpolateConfig {
    /// Steps the client holds behind the latest server step, so there is
    /// always a fresh snapshot to interpolate toward.
    pub client_step_hold: u32,
    pub local_obj_bending: f32,
    pub remote_obj_bending: f32,
    pub bending_increments: u32,
}

impl Default for InterpolateConfig {
    fn default() -> Self {
        Self {
            client_step_hold: 6,
            local_obj_bending: 1.0,
            remote_obj_bending: 1.0,
            bending_increments: 6,
        }
    }
}

/// No local simulation: physics and input prediction are disabled, and each
/// arriving snapshot becomes a bending target. With full bending, every
/// step moves objects smoothly toward the latest server state.
pub struct InterpolateStrategy {
    config: InterpolateConfig,
    need_first_sync: bool,
}

impl InterpolateStrategy {
    pub const STEP_DRIFT_THRESHOLDS: &'static DriftThresholds = &DriftThresholds {
        on_server_sync: DriftBand {
            max_lead: 1,
            max_lag: 3,
        },
        on_every_step: DriftBand {
            max_lead: 7,
            max_lag: 4,
        },
        client_reset: 20,
    };

    pub fn new(config: InterpolateConfig) -> Self {
        Self {
            config,
            need_first_sync: true,
        }
    }

    pub fn config(&self) -> &InterpolateConfig {
        &self.config
    }

    pub fn need_first_sync(&self) -> bool {
        self.need_first_sync
    }

    pub fn apply_sync(
        &mut self,
        game: &mut GameEngine,
        sync: WorldSync,
        required: bool,
        my_player_id: PlayerId,
    ) -> SyncOutcome {
        // an interpolating client trails the server; a sync that is not
        // from its future is stale and cannot be interpolated toward
        if sync.step_count <= game.world().step_count && !required {
            return SyncOutcome::Ignored;
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
                        if game.world().contains(id) {
                            if let Some(local) = game.world_mut().get_mut(id) {
                                let is_local = local.player_id() == my_player_id;
                                let percent = if is_local {
                                    self.config.local_obj_bending
                                } else {
                                    self.config.remote_obj_bending
                                };
                                local.save_state(None);
                                local.sync_to(event.object.as_ref());
                                local.bend_from_saved_to_current(
                                    percent,
                                    is_local,
                                    self.config.bending_increments,
                                );
                            }
                        } else {
                            game.add_object_to_world(event.object);
                        }
                    }
                }
            }
        }

        apply_destroys(
            game,
            destroy_ids,
            sync.full_update.then_some(&synced_ids),
        );
        SyncOutcome::Applied
    }
}
