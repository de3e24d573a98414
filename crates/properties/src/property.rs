use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stayhub_core::{DomainError, DomainResult, Entity, Owned, PropertyId, UserId};

/// A rental listing.
///
/// # Invariants
/// - `host` is stamped from the creating identity and never reassigned.
/// - `images` is never empty.
/// - `price` is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub host: UserId,
    pub availability: bool,
    pub ratings: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing fields supplied by the host on creation.
///
/// There is no owner field: any `host` in the payload is dropped during
/// deserialization and the owner comes from the caller's identity.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewProperty {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
}

/// Partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub availability: Option<bool>,
}

impl Property {
    pub fn create(host: UserId, new: NewProperty, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut errors = Vec::new();

        let title = required_text(new.title, "Property title is required", &mut errors);
        let description = required_text(new.description, "Property description is required", &mut errors);
        let price = match new.price {
            Some(p) => check_price(p, &mut errors),
            None => {
                errors.push("Property price is required".to_string());
                0.0
            }
        };
        let location = required_text(new.location, "Location is required", &mut errors);
        let images = check_images(new.images.unwrap_or_default(), &mut errors);
        DomainError::collect(errors)?;

        Ok(Self {
            id: PropertyId::new(),
            title,
            description,
            price,
            location,
            images,
            amenities: clean_list(new.amenities.unwrap_or_default()),
            host,
            availability: true,
            ratings: 0.0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply `patch` atomically: either every field is valid and applied, or
    /// nothing changes.
    pub fn apply(&mut self, patch: PropertyPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut errors = Vec::new();

        let title = patch
            .title
            .map(|t| required_text(Some(t), "Property title cannot be empty", &mut errors));
        let description = patch
            .description
            .map(|d| required_text(Some(d), "Property description cannot be empty", &mut errors));
        let price = patch.price.map(|p| check_price(p, &mut errors));
        let location = patch
            .location
            .map(|l| required_text(Some(l), "Location cannot be empty", &mut errors));
        let images = patch.images.map(|i| check_images(i, &mut errors));
        DomainError::collect(errors)?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(location) = location {
            self.location = location;
        }
        if let Some(images) = images {
            self.images = images;
        }
        if let Some(amenities) = patch.amenities {
            self.amenities = clean_list(amenities);
        }
        if let Some(availability) = patch.availability {
            self.availability = availability;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Property {
    type Id = PropertyId;

    fn id(&self) -> &PropertyId {
        &self.id
    }
}

impl Owned for Property {
    fn owner_id(&self) -> Option<&UserId> {
        Some(&self.host)
    }
}

fn required_text(value: Option<String>, message: &str, errors: &mut Vec<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            errors.push(message.to_string());
            String::new()
        }
    }
}

fn check_price(price: f64, errors: &mut Vec<String>) -> f64 {
    if price.is_finite() && price >= 0.0 {
        price
    } else {
        errors.push("Property price must be a non-negative number".to_string());
        0.0
    }
}

fn check_images(images: Vec<String>, errors: &mut Vec<String>) -> Vec<String> {
    let images = clean_list(images);
    if images.is_empty() {
        errors.push("At least one image is required".to_string());
    }
    images
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
