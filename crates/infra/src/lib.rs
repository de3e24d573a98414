//! Infrastructure layer: persistence adapters behind injectable store traits.

pub mod store;

pub use store::{
    BookingStore, InMemoryStore, PostgresStore, PostgresStoreOptions, PropertyStore, StoreError,
    StoreResult, UserStore,
};
