use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stayhub_core::{BookingId, DomainError, DomainResult, Entity, Owned, PropertyId, UserId};

/// Payment state of a booking. Payment processing itself happens elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Pending" => Some(PaymentStatus::Pending),
            "Completed" => Some(PaymentStatus::Completed),
            "Failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// A reservation of a property by a guest.
///
/// # Invariants
/// - `user` is the booking guest, stamped from the creating identity.
/// - `check_out_date` is strictly after `check_in_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub property: PropertyId,
    pub user: UserId,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: u32,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking request body. The guest is never taken from here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub property_id: PropertyId,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub guests: Option<u32>,
    pub total_amount: Option<f64>,
}

impl Booking {
    /// Build a booking for `user`. The caller is responsible for checking
    /// that `new.property_id` resolves to an existing listing.
    pub fn create(user: UserId, new: NewBooking, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut errors = Vec::new();

        let check_in_date = new.check_in_date.unwrap_or_else(|| {
            errors.push("Check-in date is required".to_string());
            NaiveDate::MIN
        });
        let check_out_date = new.check_out_date.unwrap_or_else(|| {
            errors.push("Check-out date is required".to_string());
            NaiveDate::MIN
        });
        if new.check_in_date.is_some() && new.check_out_date.is_some() && check_out_date <= check_in_date {
            errors.push("Check-out date must be after check-in date".to_string());
        }
        let guests = match new.guests {
            Some(g) if g >= 1 => g,
            Some(_) => {
                errors.push("At least one guest is required".to_string());
                0
            }
            None => {
                errors.push("Number of guests is required".to_string());
                0
            }
        };
        let total_amount = match new.total_amount {
            Some(a) if a.is_finite() && a >= 0.0 => a,
            Some(_) => {
                errors.push("Total amount must be a non-negative number".to_string());
                0.0
            }
            None => {
                errors.push("Total amount is required".to_string());
                0.0
            }
        };
        DomainError::collect(errors)?;

        Ok(Self {
            id: BookingId::new(),
            property: new.property_id,
            user,
            check_in_date,
            check_out_date,
            guests,
            total_amount,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Booking {
    type Id = BookingId;

    fn id(&self) -> &BookingId {
        &self.id
    }
}

impl Owned for Booking {
    fn owner_id(&self) -> Option<&UserId> {
        Some(&self.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request() -> NewBooking {
        NewBooking {
            property_id: PropertyId::new(),
            check_in_date: Some(date(2025, 7, 1)),
            check_out_date: Some(date(2025, 7, 4)),
            guests: Some(2),
            total_amount: Some(360.0),
        }
    }

    #[test]
    fn create_stamps_guest_and_pending_payment() {
        let guest = UserId::new();
        let booking = Booking::create(guest, request(), Utc::now()).unwrap();

        assert_eq!(booking.user, guest);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert_eq!(booking.check_out_date, date(2025, 7, 4));
    }

    #[test]
    fn payload_user_field_is_ignored() {
        let property = PropertyId::new();
        let body = serde_json::json!({
            "propertyId": property.to_string(),
            "checkInDate": "2025-07-01",
            "checkOutDate": "2025-07-02",
            "guests": 1,
            "totalAmount": 80.5,
            "user": UserId::new().to_string(),
        });
        let new: NewBooking = serde_json::from_value(body).unwrap();

        let guest = UserId::new();
        let booking = Booking::create(guest, new, Utc::now()).unwrap();
        assert_eq!(booking.user, guest);
        assert_eq!(booking.property, property);
    }

    #[test]
    fn rejects_inverted_stay_and_empty_party() {
        let mut new = request();
        new.check_out_date = new.check_in_date;
        new.guests = Some(0);

        let err = Booking::create(UserId::new(), new, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            DomainError::validation(
                "Check-out date must be after check-in date, At least one guest is required"
            )
        );
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let new = NewBooking {
            property_id: PropertyId::new(),
            check_in_date: None,
            check_out_date: None,
            guests: None,
            total_amount: Some(-1.0),
        };

        let err = Booking::create(UserId::new(), new, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            DomainError::validation(
                "Check-in date is required, Check-out date is required, \
                 Number of guests is required, Total amount must be a non-negative number"
            )
        );
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let booking = Booking::create(UserId::new(), request(), Utc::now()).unwrap();
        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["checkInDate"], "2025-07-01");
        assert_eq!(json["paymentStatus"], "Pending");
    }
}
