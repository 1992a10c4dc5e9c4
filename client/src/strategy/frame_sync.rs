use std::collections::HashSet;

use cadence_shared::{GameEngine, ObjectId, PlayerId, SyncEventKind, WorldSync};

use crate::strategy::{apply_destroys, DriftBand, DriftThresholds, SyncOutcome};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameSyncConfig {
    /// Syncs that may queue before the oldest is force-applied.
    pub world_buffer_length: usize,
    /// Steps the client renders behind the latest server frame.
    pub client_step_lag: u32,
}

impl Default for FrameSyncConfig {
    fn default() -> Self {
        Self {
            world_buffer_length: 60,
            client_step_lag: 0,
        }
    }
}

/// Trust the server every frame: each synced object is created or adopted
/// directly, with no bending and no re-enactment. Suited to small worlds
/// where a sync per frame is affordable.
pub struct FrameSyncStrategy {
    config: FrameSyncConfig,
    need_first_sync: bool,
}

impl FrameSyncStrategy {
    pub const STEP_DRIFT_THRESHOLDS: &'static DriftThresholds = &DriftThresholds {
        on_server_sync: DriftBand {
            max_lead: 1,
            max_lag: 2,
        },
        on_every_step: DriftBand {
            max_lead: 4,
            max_lag: 4,
        },
        client_reset: 10,
    };

    pub fn new(config: FrameSyncConfig) -> Self {
        Self {
            config,
            need_first_sync: true,
        }
    }

    pub fn config(&self) -> &FrameSyncConfig {
        &self.config
    }

    pub fn need_first_sync(&self) -> bool {
        self.need_first_sync
    }

    pub fn apply_sync(
        &mut self,
        game: &mut GameEngine,
        sync: WorldSync,
        _required: bool,
        _my_player_id: PlayerId,
    ) -> SyncOutcome {
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
                                local.sync_to(event.object.as_ref());
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
