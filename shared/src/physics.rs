use crate::game_object::GameObject;
use crate::world::World;

/// A stepped integrator. The engine passes the timestep in seconds and a
/// filter; bodies for which the filter returns `false` must not be advanced
/// (during re-enactment this excludes client shadow objects).
///
/// Implementers may represent bodies however they like; authoritative fields
/// flow back through each object's `sync_to`.
pub trait Physics {
    fn step(&mut self, world: &mut World, dt_seconds: f32, filter: &dyn Fn(&dyn GameObject) -> bool);
}
