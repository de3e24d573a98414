use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use async_trait::async_trait;

use stayhub_auth::User;
use stayhub_bookings::Booking;
use stayhub_core::{BookingId, PropertyId, UserId};
use stayhub_properties::{Property, PropertyFilter};

use super::{BookingStore, PropertyStore, StoreError, StoreResult, UserStore};

/// In-memory keyed store for tests/dev.
///
/// One instance holds one collection; concurrent writers of the same key are
/// last-write-wins.
#[derive(Debug)]
pub struct InMemoryStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> InMemoryStore<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    fn read<R>(&self, f: impl FnOnce(&HashMap<K, V>) -> R) -> StoreResult<R> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))?;
        Ok(f(&map))
    }

    fn write<R>(&self, f: impl FnOnce(&mut HashMap<K, V>) -> R) -> StoreResult<R> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))?;
        Ok(f(&mut map))
    }

    fn get(&self, key: &K) -> StoreResult<Option<V>> {
        self.read(|map| map.get(key).cloned())
    }

    fn get_many(&self, keys: &[K]) -> StoreResult<Vec<V>> {
        self.read(|map| keys.iter().filter_map(|k| map.get(k).cloned()).collect())
    }

    fn upsert(&self, key: K, value: V) -> StoreResult<V> {
        self.write(|map| {
            map.insert(key, value.clone());
            value
        })
    }

    fn remove(&self, key: &K) -> StoreResult<bool> {
        self.write(|map| map.remove(key).is_some())
    }

    fn select<O>(&self, keep: impl Fn(&V) -> bool, order: impl Fn(&V) -> O) -> StoreResult<Vec<V>>
    where
        O: Ord,
    {
        let mut values: Vec<V> = self.read(|map| map.values().filter(|v| keep(v)).cloned().collect())?;
        values.sort_by_key(|v| order(v));
        Ok(values)
    }
}

#[async_trait]
impl PropertyStore for InMemoryStore<PropertyId, Property> {
    async fn find_by_id(&self, id: PropertyId) -> StoreResult<Option<Property>> {
        self.get(&id)
    }

    async fn find_many(&self, ids: &[PropertyId]) -> StoreResult<Vec<Property>> {
        self.get_many(ids)
    }

    async fn search(&self, filter: &PropertyFilter) -> StoreResult<Vec<Property>> {
        self.select(|p| filter.matches(p), |p| (p.created_at, p.id))
    }

    async fn save(&self, property: Property) -> StoreResult<Property> {
        self.upsert(property.id, property)
    }

    async fn delete(&self, id: PropertyId) -> StoreResult<bool> {
        self.remove(&id)
    }
}

#[async_trait]
impl BookingStore for InMemoryStore<BookingId, Booking> {
    async fn find_by_id(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        self.get(&id)
    }

    async fn list_by_user(&self, user: UserId) -> StoreResult<Vec<Booking>> {
        self.select(|b| b.user == user, |b| (b.created_at, b.id))
    }

    async fn list_all(&self) -> StoreResult<Vec<Booking>> {
        self.select(|_| true, |b| (b.created_at, b.id))
    }

    async fn save(&self, booking: Booking) -> StoreResult<Booking> {
        self.upsert(booking.id, booking)
    }

    async fn delete(&self, id: BookingId) -> StoreResult<bool> {
        self.remove(&id)
    }
}

#[async_trait]
impl UserStore for InMemoryStore<UserId, User> {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        self.get(&id)
    }

    async fn find_many(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        self.get_many(ids)
    }

    async fn list_all(&self) -> StoreResult<Vec<User>> {
        self.select(|_| true, |u| (u.created_at, u.id))
    }

    async fn save(&self, user: User) -> StoreResult<User> {
        // Check and insert under one write lock so two writers cannot both
        // claim the same email.
        self.write(|map| {
            let taken = map.values().any(|u| u.id != user.id && u.email == user.email);
            if taken {
                return Err(StoreError::Duplicate("email"));
            }
            map.insert(user.id, user.clone());
            Ok(user)
        })?
    }

    async fn delete(&self, id: UserId) -> StoreResult<bool> {
        self.remove(&id)
    }
}
