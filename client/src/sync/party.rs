//! Friend and party caches.
//!
//! Both hold denormalized copies of name and appearance hash, refreshed
//! opportunistically whenever the matching entity is updated. They are
//! best-effort caches for UI display, never sources of truth; the canonical
//! entity lives in the [`crate::EntityTable`] while subscribed.

use std::collections::HashMap;

use meadow_shared::EntityId;

use crate::world::entity::Entity;

/// Account identity, assigned by the account service. Distinct from the
/// per-session entity id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccountId(u64);

impl AccountId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FriendRecord {
    pub name: Option<String>,
    pub crc: Option<u32>,
    /// The friend's current entity, while they are in this world.
    pub entity: Option<EntityId>,
}

/// Friends keyed by account id, with a reverse entity binding so entity
/// updates can refresh the record without a scan.
#[derive(Default)]
pub struct FriendList {
    friends: HashMap<AccountId, FriendRecord>,
    by_entity: HashMap<EntityId, AccountId>,
}

impl FriendList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, account: AccountId) {
        self.friends.entry(account).or_default();
    }

    pub fn remove(&mut self, account: AccountId) {
        if let Some(record) = self.friends.remove(&account) {
            if let Some(entity) = record.entity {
                self.by_entity.remove(&entity);
            }
        }
    }

    /// Binds a friend's account to their current entity. Replaces any
    /// previous binding for the account.
    pub fn bind_entity(&mut self, account: AccountId, entity: EntityId) {
        let Some(record) = self.friends.get_mut(&account) else {
            return;
        };
        if let Some(previous) = record.entity.replace(entity) {
            self.by_entity.remove(&previous);
        }
        self.by_entity.insert(entity, account);
    }

    pub fn unbind_entity(&mut self, entity: EntityId) {
        if let Some(account) = self.by_entity.remove(&entity) {
            if let Some(record) = self.friends.get_mut(&account) {
                record.entity = None;
            }
        }
    }

    pub fn get(&self, account: AccountId) -> Option<&FriendRecord> {
        self.friends.get(&account)
    }

    pub fn contains(&self, account: AccountId) -> bool {
        self.friends.contains_key(&account)
    }

    pub fn len(&self) -> usize {
        self.friends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.friends.is_empty()
    }

    /// Opportunistic refresh from an entity update.
    pub fn refresh_from(&mut self, entity: &Entity) {
        let Some(account) = self.by_entity.get(&entity.id) else {
            return;
        };
        if let Some(record) = self.friends.get_mut(account) {
            if entity.name.is_some() {
                record.name = entity.name.clone();
            }
            if entity.crc.is_some() {
                record.crc = entity.crc;
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PartyRecord {
    pub name: Option<String>,
    pub crc: Option<u32>,
}

/// Current party members, keyed by entity id. A member whose entity scrolls
/// out of subscription keeps this record; only the spatial one is lost.
#[derive(Default)]
pub struct PartyList {
    members: HashMap<EntityId, PartyRecord>,
}

impl PartyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&mut self, id: EntityId) {
        self.members.entry(id).or_default();
    }

    pub fn remove_member(&mut self, id: EntityId) {
        self.members.remove(&id);
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&PartyRecord> {
        self.members.get(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn refresh_from(&mut self, entity: &Entity) {
        if let Some(record) = self.members.get_mut(&entity.id) {
            if entity.name.is_some() {
                record.name = entity.name.clone();
            }
            if entity.crc.is_some() {
                record.crc = entity.crc;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meadow_shared::EntityKind;

    #[test]
    fn friend_refresh_requires_a_binding() {
        let mut friends = FriendList::new();
        let account = AccountId::new(99);
        friends.add(account);

        let mut entity = Entity::new(EntityId::new(4), EntityKind::Pony, 0.0, 0.0);
        entity.name = Some("Minty".to_string());
        entity.crc = Some(42);

        friends.refresh_from(&entity);
        assert_eq!(friends.get(account).unwrap().name, None);

        friends.bind_entity(account, EntityId::new(4));
        friends.refresh_from(&entity);
        let record = friends.get(account).unwrap();
        assert_eq!(record.name.as_deref(), Some("Minty"));
        assert_eq!(record.crc, Some(42));
    }

    #[test]
    fn rebinding_clears_the_old_reverse_entry() {
        let mut friends = FriendList::new();
        let account = AccountId::new(1);
        friends.add(account);
        friends.bind_entity(account, EntityId::new(10));
        friends.bind_entity(account, EntityId::new(20));

        let mut entity = Entity::new(EntityId::new(10), EntityKind::Pony, 0.0, 0.0);
        entity.name = Some("Stale".to_string());
        friends.refresh_from(&entity);
        assert_eq!(friends.get(account).unwrap().name, None);
    }

    #[test]
    fn party_record_survives_without_its_entity() {
        let mut party = PartyList::new();
        let id = EntityId::new(6);
        party.add_member(id);

        let mut entity = Entity::new(id, EntityKind::Pony, 0.0, 0.0);
        entity.name = Some("Breeze".to_string());
        party.refresh_from(&entity);

        // the entity being dropped from the world does not touch the record
        assert_eq!(party.get(id).unwrap().name.as_deref(), Some("Breeze"));
    }
}
