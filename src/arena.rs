//! Generation-checked entity storage.
//!
//! Slots never move, so an [`EntityHandle`] stays valid until its entity is
//! removed; after that the slot's generation changes and the old handle
//! resolves to nothing. During a sweep an entity is checked out of its slot
//! so its behavior can borrow the rest of the world mutably.

use crate::entities::{Entity, EntityKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
enum SlotState {
    Free,
    Occupied(Entity),
    CheckedOut,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    state: SlotState,
}

#[derive(Debug, Default)]
pub struct EntityArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, entity: Entity) -> EntityHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.state = SlotState::Occupied(entity);
            return EntityHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            state: SlotState::Occupied(entity),
        });
        EntityHandle {
            index,
            generation: 0,
        }
    }

    fn slot(&self, handle: EntityHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
    }

    fn slot_mut(&mut self, handle: EntityHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.slot(handle)
            .is_some_and(|slot| !matches!(slot.state, SlotState::Free))
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        match &self.slot(handle)?.state {
            SlotState::Occupied(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        match &mut self.slot_mut(handle)?.state {
            SlotState::Occupied(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn remove(&mut self, handle: EntityHandle) -> Option<Entity> {
        let slot = self.slot_mut(handle)?;
        if !matches!(slot.state, SlotState::Occupied(_)) {
            return None;
        }
        let SlotState::Occupied(entity) = std::mem::replace(&mut slot.state, SlotState::Free)
        else {
            return None;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(entity)
    }

    /// Moves the entity out for the duration of one behavior call. The slot
    /// stays reserved until [`EntityArena::restore`].
    pub fn checkout(&mut self, handle: EntityHandle) -> Option<Entity> {
        let slot = self.slot_mut(handle)?;
        match std::mem::replace(&mut slot.state, SlotState::CheckedOut) {
            SlotState::Occupied(entity) => Some(entity),
            other => {
                slot.state = other;
                None
            }
        }
    }

    pub fn restore(&mut self, handle: EntityHandle, entity: Entity) {
        if let Some(slot) = self.slot_mut(handle) {
            debug_assert!(matches!(slot.state, SlotState::CheckedOut));
            slot.state = SlotState::Occupied(entity);
        }
    }

    /// Snapshot of live handles in slot order.
    pub fn handles(&self) -> Vec<EntityHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| match &slot.state {
            SlotState::Occupied(entity) => Some((
                EntityHandle {
                    index: index as u32,
                    generation: slot.generation,
                },
                entity,
            )),
            _ => None,
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityHandle, &mut Entity)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| {
                let generation = slot.generation;
                match &mut slot.state {
                    SlotState::Occupied(entity) => Some((
                        EntityHandle {
                            index: index as u32,
                            generation,
                        },
                        entity,
                    )),
                    _ => None,
                }
            })
    }

    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.iter().filter(move |(_, entity)| entity.kind() == kind)
    }

    pub fn find(&self, kind: EntityKind, id: &str) -> Option<EntityHandle> {
        self.of_kind(kind)
            .find(|(_, entity)| entity.id() == id)
            .map(|(handle, _)| handle)
    }

    /// Entities of `kind` that still count as alive.
    pub fn live_count(&self, kind: EntityKind) -> usize {
        self.of_kind(kind).filter(|(_, e)| e.is_alive()).count()
    }

    /// Removes every entity whose destroy flag is set.
    pub fn compact(&mut self) -> Vec<Entity> {
        let doomed: Vec<EntityHandle> = self
            .iter()
            .filter(|(_, entity)| entity.is_destroyed())
            .map(|(handle, _)| handle)
            .collect();
        doomed
            .into_iter()
            .filter_map(|handle| self.remove(handle))
            .collect()
    }

    pub fn clear(&mut self) {
        for handle in self.handles() {
            let _ = self.remove(handle);
        }
    }
}
