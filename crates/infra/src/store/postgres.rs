//! Postgres-backed stores.
//!
//! One pool serves all three collections. Queries are built at runtime
//! (no compile-time checked macros) so the crate builds without a database.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use stayhub_auth::{Role, User};
use stayhub_bookings::{Booking, PaymentStatus};
use stayhub_core::{BookingId, PropertyId, UserId};
use stayhub_properties::{Property, PropertyFilter};

use super::{BookingStore, PropertyStore, StoreError, StoreResult, UserStore};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const PROPERTY_COLUMNS: &str = "id, title, description, price, location, images, amenities, host, \
                                availability, ratings, created_at, updated_at";
const BOOKING_COLUMNS: &str = "id, property, user_id, check_in_date, check_out_date, guests, \
                               total_amount, payment_status, created_at, updated_at";
const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresStoreOptions {
    pub max_connections: u32,
    /// Upper bound on waiting for a pooled connection; lookups that cannot
    /// get one fail instead of hanging the request.
    pub acquire_timeout: Duration,
}

impl Default for PostgresStoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str, options: PostgresStoreOptions) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        tracing::info!("postgres schema ensured");
        Ok(())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return match db.constraint() {
                    Some("users_email_key") => StoreError::Duplicate("email"),
                    _ => StoreError::Duplicate("id"),
                };
            }
        }
        StoreError::Backend(err.to_string())
    }
}

fn property_from_row(row: &PgRow) -> StoreResult<Property> {
    Ok(Property {
        id: PropertyId::from_uuid(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        location: row.try_get("location")?,
        images: row.try_get("images")?,
        amenities: row.try_get("amenities")?,
        host: UserId::from_uuid(row.try_get("host")?),
        availability: row.try_get("availability")?,
        ratings: row.try_get("ratings")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn booking_from_row(row: &PgRow) -> StoreResult<Booking> {
    let guests: i32 = row.try_get("guests")?;
    let status: String = row.try_get("payment_status")?;
    Ok(Booking {
        id: BookingId::from_uuid(row.try_get("id")?),
        property: PropertyId::from_uuid(row.try_get("property")?),
        user: UserId::from_uuid(row.try_get("user_id")?),
        check_in_date: row.try_get("check_in_date")?,
        check_out_date: row.try_get("check_out_date")?,
        guests: u32::try_from(guests)
            .map_err(|_| StoreError::Corrupt(format!("negative guest count {guests}")))?,
        total_amount: row.try_get("total_amount")?,
        payment_status: PaymentStatus::parse(&status)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown payment status '{status}'")))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: UserId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: Role::parse(&role).ok_or_else(|| StoreError::Corrupt(format!("unknown role '{role}'")))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Escape LIKE metacharacters so user input matches literally.
fn like_pattern(raw: &str) -> String {
    let escaped = raw
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl PropertyStore for PostgresStore {
    async fn find_by_id(&self, id: PropertyId) -> StoreResult<Option<Property>> {
        let row = sqlx::query(&format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(property_from_row).transpose()
    }

    async fn find_many(&self, ids: &[PropertyId]) -> StoreResult<Vec<Property>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(property_from_row).collect()
    }

    async fn search(&self, filter: &PropertyFilter) -> StoreResult<Vec<Property>> {
        let amenities = (!filter.amenities.is_empty()).then(|| filter.amenities.clone());
        let rows = sqlx::query(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties \
             WHERE ($1::text IS NULL OR location ILIKE $1) \
               AND ($2::float8 IS NULL OR price >= $2) \
               AND ($3::float8 IS NULL OR price <= $3) \
               AND ($4::text[] IS NULL OR amenities @> $4) \
             ORDER BY created_at, id"
        ))
        .bind(filter.location.as_deref().map(like_pattern))
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(amenities)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(property_from_row).collect()
    }

    async fn save(&self, property: Property) -> StoreResult<Property> {
        // host and created_at are write-once.
        sqlx::query(&format!(
            "INSERT INTO properties ({PROPERTY_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (id) DO UPDATE SET \
               title = EXCLUDED.title, description = EXCLUDED.description, \
               price = EXCLUDED.price, location = EXCLUDED.location, \
               images = EXCLUDED.images, amenities = EXCLUDED.amenities, \
               availability = EXCLUDED.availability, ratings = EXCLUDED.ratings, \
               updated_at = EXCLUDED.updated_at"
        ))
        .bind(property.id.as_uuid())
        .bind(&property.title)
        .bind(&property.description)
        .bind(property.price)
        .bind(&property.location)
        .bind(&property.images)
        .bind(&property.amenities)
        .bind(property.host.as_uuid())
        .bind(property.availability)
        .bind(property.ratings)
        .bind(property.created_at)
        .bind(property.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(property)
    }

    async fn delete(&self, id: PropertyId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BookingStore for PostgresStore {
    async fn find_by_id(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        let row = sqlx::query(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(booking_from_row).transpose()
    }

    async fn list_by_user(&self, user: UserId) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(booking_from_row).collect()
    }

    async fn list_all(&self) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query(&format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(booking_from_row).collect()
    }

    async fn save(&self, booking: Booking) -> StoreResult<Booking> {
        let guests = i32::try_from(booking.guests)
            .map_err(|_| StoreError::Corrupt(format!("guest count {} out of range", booking.guests)))?;
        // property, user_id and created_at are write-once.
        sqlx::query(&format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (id) DO UPDATE SET \
               check_in_date = EXCLUDED.check_in_date, check_out_date = EXCLUDED.check_out_date, \
               guests = EXCLUDED.guests, total_amount = EXCLUDED.total_amount, \
               payment_status = EXCLUDED.payment_status, updated_at = EXCLUDED.updated_at"
        ))
        .bind(booking.id.as_uuid())
        .bind(booking.property.as_uuid())
        .bind(booking.user.as_uuid())
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(guests)
        .bind(booking.total_amount)
        .bind(booking.payment_status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn delete(&self, id: BookingId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_many(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn list_all(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn save(&self, user: User) -> StoreResult<User> {
        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET \
               name = EXCLUDED.name, email = EXCLUDED.email, role = EXCLUDED.role, \
               updated_at = EXCLUDED.updated_at"
        ))
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete(&self, id: UserId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
