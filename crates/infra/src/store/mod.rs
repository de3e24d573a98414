//! Storage abstractions for users, listings and bookings.
//!
//! Handlers depend on these traits only (`Arc<dyn PropertyStore>` etc.), so
//! the authorization paths can be exercised against the in-memory store and
//! run unchanged against Postgres.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use stayhub_auth::User;
use stayhub_bookings::Booking;
use stayhub_core::{BookingId, PropertyId, UserId};
use stayhub_properties::{Property, PropertyFilter};

pub use in_memory::InMemoryStore;
pub use postgres::{PostgresStore, PostgresStoreOptions};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("duplicate value for unique field '{0}'")]
    Duplicate(&'static str),

    /// A stored record could not be mapped back into the domain.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn find_by_id(&self, id: PropertyId) -> StoreResult<Option<Property>>;

    /// Fetch several listings at once; unknown ids are skipped.
    async fn find_many(&self, ids: &[PropertyId]) -> StoreResult<Vec<Property>>;

    /// Listings matching `filter`, oldest first.
    async fn search(&self, filter: &PropertyFilter) -> StoreResult<Vec<Property>>;

    /// Insert or replace by id.
    async fn save(&self, property: Property) -> StoreResult<Property>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: PropertyId) -> StoreResult<bool>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_by_id(&self, id: BookingId) -> StoreResult<Option<Booking>>;

    /// Bookings made by `user`, oldest first.
    async fn list_by_user(&self, user: UserId) -> StoreResult<Vec<Booking>>;

    async fn list_all(&self) -> StoreResult<Vec<Booking>>;

    async fn save(&self, booking: Booking) -> StoreResult<Booking>;

    async fn delete(&self, id: BookingId) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn find_many(&self, ids: &[UserId]) -> StoreResult<Vec<User>>;

    async fn list_all(&self) -> StoreResult<Vec<User>>;

    /// Insert or replace by id. Emails are unique across users.
    async fn save(&self, user: User) -> StoreResult<User>;

    async fn delete(&self, id: UserId) -> StoreResult<bool>;
}
