use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;

use stayhub_auth::User;
use stayhub_bookings::Booking;
use stayhub_core::{BookingId, PropertyId, UserId};
use stayhub_infra::{
    BookingStore, InMemoryStore, PostgresStore, PropertyStore, StoreResult, UserStore,
};
use stayhub_properties::Property;

use crate::config::StorageConfig;

/// Storage handles shared by all handlers.
#[derive(Clone)]
pub struct AppServices {
    pub properties: Arc<dyn PropertyStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub users: Arc<dyn UserStore>,
}

impl AppServices {
    pub fn in_memory() -> Self {
        Self {
            properties: Arc::new(InMemoryStore::<PropertyId, Property>::new()),
            bookings: Arc::new(InMemoryStore::<BookingId, Booking>::new()),
            users: Arc::new(InMemoryStore::<UserId, User>::new()),
        }
    }

    pub fn postgres(store: PostgresStore) -> Self {
        let store = Arc::new(store);
        Self {
            properties: store.clone(),
            bookings: store.clone(),
            users: store,
        }
    }

    /// Profiles for `ids`, keyed by id. Ids without a profile are absent.
    pub async fn users_by_id(&self, ids: impl IntoIterator<Item = UserId>) -> StoreResult<HashMap<UserId, User>> {
        let ids = dedup(ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self.users.find_many(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    /// Listings for `ids`, keyed by id. Deleted listings are absent.
    pub async fn properties_by_id(
        &self,
        ids: impl IntoIterator<Item = PropertyId>,
    ) -> StoreResult<HashMap<PropertyId, Property>> {
        let ids = dedup(ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let properties = self.properties.find_many(&ids).await?;
        Ok(properties.into_iter().map(|p| (p.id, p)).collect())
    }
}

fn dedup<T: Ord>(ids: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut ids: Vec<T> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Build the storage layer selected by configuration.
pub async fn build_services(storage: &StorageConfig) -> anyhow::Result<AppServices> {
    match storage {
        StorageConfig::InMemory => {
            tracing::info!("using in-memory stores");
            Ok(AppServices::in_memory())
        }
        StorageConfig::Postgres { database_url, options } => {
            let store = PostgresStore::connect(database_url, options.clone())
                .await
                .context("failed to connect to postgres")?;
            store.ensure_schema().await.context("failed to prepare schema")?;
            tracing::info!(
                max_connections = options.max_connections,
                "using postgres stores"
            );
            Ok(AppServices::postgres(store))
        }
    }
}
