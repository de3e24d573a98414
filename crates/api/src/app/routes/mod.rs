use axum::{routing::get, Router};

pub mod bookings;
pub mod common;
pub mod properties;
pub mod system;
pub mod users;

/// Router for everything under `/api`.
///
/// Handlers that need a caller take [`Authenticated`](crate::context::Authenticated);
/// the public listing routes do not.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/properties", properties::router())
        .nest("/bookings", bookings::router())
        .nest("/users", users::router())
}
