use std::collections::HashMap;

use crate::game_object::GameObject;
use crate::types::{ObjectId, PlayerId, StepCount};

/// Filter for [`World::query`]. Every populated criterion must match.
/// Component criteria test for presence by component name.
#[derive(Default)]
pub struct ObjectQuery {
    pub id: Option<ObjectId>,
    pub player_id: Option<PlayerId>,
    pub class_name: Option<&'static str>,
    pub components: Vec<String>,
}

impl ObjectQuery {
    fn matches(&self, object: &dyn GameObject) -> bool {
        if let Some(id) = self.id {
            if object.id() != id {
                return false;
            }
        }
        if let Some(player_id) = self.player_id {
            if object.player_id() != player_id {
                return false;
            }
        }
        if let Some(class_name) = self.class_name {
            if object.class_name() != class_name {
                return false;
            }
        }
        self.components
            .iter()
            .all(|name| object.base().has_component(name))
    }
}

/// In-memory map of object id to object, plus the session counters.
///
/// Iteration order is unspecified; every algorithm built on top must
/// tolerate any order.
pub struct World {
    pub step_count: StepCount,
    pub player_count: u32,
    id_count: ObjectId,
    objects: HashMap<ObjectId, Box<dyn GameObject>>,
}

impl World {
    pub fn new() -> Self {
        Self {
            step_count: 0,
            player_count: 0,
            id_count: 0,
            objects: HashMap::new(),
        }
    }

    /// Returns the smallest unused id at or above the id counter, bumping
    /// the counter past any collision.
    pub fn new_id(&mut self) -> ObjectId {
        while self.objects.contains_key(&self.id_count) {
            self.id_count += 1;
        }
        let id = self.id_count;
        self.id_count += 1;
        id
    }

    /// Rebases the id counter. Clients call this with their id space offset
    /// so locally created shadows never collide with server ids.
    pub fn set_id_count(&mut self, id_count: ObjectId) {
        self.id_count = id_count;
    }

    pub fn insert(&mut self, object: Box<dyn GameObject>) {
        self.objects.insert(object.id(), object);
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<Box<dyn GameObject>> {
        self.objects.remove(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&dyn GameObject> {
        self.objects.get(&id).map(|object| object.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut (dyn GameObject + 'static)> {
        self.objects.get_mut(&id).map(|object| object.as_mut())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    pub fn query(&self, query: &ObjectQuery) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|(_, object)| query.matches(object.as_ref()))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn query_one(&self, query: &ObjectQuery) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| query.matches(object.as_ref()))
            .map(|(id, _)| *id)
    }

    /// Visits every object. Return `false` from the callback to stop early.
    pub fn for_each(&self, mut callback: impl FnMut(ObjectId, &dyn GameObject) -> bool) {
        for (id, object) in &self.objects {
            if !callback(*id, object.as_ref()) {
                return;
            }
        }
    }

    /// Mutable variant of [`for_each`](Self::for_each).
    pub fn for_each_mut(
        &mut self,
        mut callback: impl FnMut(ObjectId, &mut dyn GameObject) -> bool,
    ) {
        for (id, object) in &mut self.objects {
            if !callback(*id, object.as_mut()) {
                return;
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physical_object::PhysicalObject2D;

    fn object_with_id(id: ObjectId, player_id: PlayerId) -> Box<dyn GameObject> {
        let mut object = PhysicalObject2D::new();
        object.base.id = id;
        object.base.player_id = player_id;
        Box::new(object)
    }

    #[test]
    fn new_id_skips_collisions() {
        let mut world = World::new();
        world.insert(object_with_id(0, 0));
        world.insert(object_with_id(1, 0));
        assert_eq!(world.new_id(), 2);
        assert_eq!(world.new_id(), 3);
    }

    #[test]
    fn no_two_objects_share_an_id() {
        let mut world = World::new();
        for _ in 0..10 {
            let id = world.new_id();
            world.insert(object_with_id(id, 0));
        }
        assert_eq!(world.len(), 10);
    }

    #[test]
    fn query_filters_by_player_and_class() {
        let mut world = World::new();
        world.insert(object_with_id(1, 7));
        world.insert(object_with_id(2, 7));
        world.insert(object_with_id(3, 9));

        let query = ObjectQuery {
            player_id: Some(7),
            ..ObjectQuery::default()
        };
        let mut found = world.query(&query);
        found.sort_unstable();
        assert_eq!(found, vec![1, 2]);

        let query = ObjectQuery {
            class_name: Some("NoSuchClass"),
            ..ObjectQuery::default()
        };
        assert_eq!(world.query_one(&query), None);
    }

    #[test]
    fn query_by_component_presence() {
        let mut world = World::new();
        let mut object = PhysicalObject2D::new();
        object.base.id = 5;
        object.base.set_component("Health", Box::new(100u32));
        world.insert(Box::new(object));
        world.insert(object_with_id(6, 0));

        let query = ObjectQuery {
            components: vec!["Health".to_string()],
            ..ObjectQuery::default()
        };
        assert_eq!(world.query(&query), vec![5]);
    }

    #[test]
    fn for_each_stops_on_false() {
        let mut world = World::new();
        for id in 0..5 {
            world.insert(object_with_id(id, 0));
        }
        let mut visited = 0;
        world.for_each(|_, _| {
            visited += 1;
            visited < 3
        });
        assert_eq!(visited, 3);
    }
}
