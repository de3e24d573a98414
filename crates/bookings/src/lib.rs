//! Bookings domain module.
//!
//! Deterministic rules for reservations against property listings (no IO,
//! no HTTP, no storage).

pub mod booking;

pub use booking::{Booking, NewBooking, PaymentStatus};
