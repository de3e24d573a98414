use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Value, json};

use stayhub_auth::User;
use stayhub_bookings::Booking;
use stayhub_core::{PropertyId, UserId};
use stayhub_properties::Property;

use crate::app::errors::ApiError;

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(format!("serialize response: {e}")))
}

fn user_summary(user: &User) -> Value {
    json!({
        "id": user.id.to_string(),
        "name": user.name,
        "email": user.email,
    })
}

/// Replace the reference stored under `field` with `embedded`, when known.
fn embed(mut doc: Value, field: &str, embedded: Option<Value>) -> Value {
    if let (Some(obj), Some(embedded)) = (doc.as_object_mut(), embedded) {
        obj.insert(field.to_string(), embedded);
    }
    doc
}

/// Listing with its host's public profile embedded.
pub fn property_to_json(property: &Property, hosts: &HashMap<UserId, User>) -> Result<Value, ApiError> {
    let doc = to_json(property)?;
    Ok(embed(doc, "host", hosts.get(&property.host).map(user_summary)))
}

/// Booking as its guest sees it: listing title, location and price embedded.
pub fn own_booking_to_json(
    booking: &Booking,
    properties: &HashMap<PropertyId, Property>,
) -> Result<Value, ApiError> {
    let doc = to_json(booking)?;
    let property = properties.get(&booking.property).map(|p| {
        json!({
            "id": p.id.to_string(),
            "title": p.title,
            "location": p.location,
            "price": p.price,
        })
    });
    Ok(embed(doc, "property", property))
}

/// Booking as an admin sees it: listing title and guest profile embedded.
pub fn admin_booking_to_json(
    booking: &Booking,
    properties: &HashMap<PropertyId, Property>,
    users: &HashMap<UserId, User>,
) -> Result<Value, ApiError> {
    let doc = to_json(booking)?;
    let property = properties.get(&booking.property).map(|p| {
        json!({
            "id": p.id.to_string(),
            "title": p.title,
        })
    });
    let doc = embed(doc, "property", property);
    Ok(embed(doc, "user", users.get(&booking.user).map(user_summary)))
}

pub fn message(text: &str) -> Value {
    json!({ "message": text })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use stayhub_auth::{IdentityContext, ProfileUpdate, Role};
    use stayhub_bookings::NewBooking;
    use stayhub_properties::NewProperty;

    use super::*;

    fn host_profile() -> User {
        let identity = IdentityContext::new(UserId::new(), Some(Role::User));
        User::create_profile(
            &identity,
            ProfileUpdate {
                name: Some("Hilde".into()),
                email: Some("hilde@example.com".into()),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn listing(host: UserId) -> Property {
        Property::create(
            host,
            NewProperty {
                title: Some("Fjord view".into()),
                description: Some("Quiet".into()),
                price: Some(120.0),
                location: Some("Bergen".into()),
                images: Some(vec!["a.jpg".into()]),
                amenities: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn booking(user: UserId, property: PropertyId) -> Booking {
        Booking::create(
            user,
            NewBooking {
                property_id: property,
                check_in_date: NaiveDate::from_ymd_opt(2025, 5, 1),
                check_out_date: NaiveDate::from_ymd_opt(2025, 5, 3),
                guests: Some(2),
                total_amount: Some(240.0),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn host_is_embedded_when_the_profile_exists() {
        let host = host_profile();
        let property = listing(host.id);
        let hosts = HashMap::from([(host.id, host.clone())]);

        let json = property_to_json(&property, &hosts).unwrap();
        assert_eq!(json["host"]["name"], "Hilde");
        assert_eq!(json["host"]["email"], "hilde@example.com");

        let bare = property_to_json(&property, &HashMap::new()).unwrap();
        assert_eq!(bare["host"], host.id.to_string());
    }

    #[test]
    fn admin_view_embeds_listing_and_guest() {
        let guest = host_profile();
        let property = listing(UserId::new());
        let booking = booking(guest.id, property.id);

        let properties = HashMap::from([(property.id, property.clone())]);
        let users = HashMap::from([(guest.id, guest)]);
        let json = admin_booking_to_json(&booking, &properties, &users).unwrap();

        assert_eq!(json["property"]["title"], "Fjord view");
        assert!(json["property"].get("price").is_none());
        assert_eq!(json["user"]["name"], "Hilde");
    }

    #[test]
    fn own_view_embeds_price_and_location() {
        let property = listing(UserId::new());
        let booking = booking(UserId::new(), property.id);
        let properties = HashMap::from([(property.id, property)]);

        let json = own_booking_to_json(&booking, &properties).unwrap();
        assert_eq!(json["property"]["location"], "Bergen");
        assert_eq!(json["property"]["price"], 120.0);
    }
}
