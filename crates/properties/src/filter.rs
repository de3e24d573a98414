//! Listing search filters.

use serde::Deserialize;

use stayhub_core::{DomainError, DomainResult};

use crate::Property;

/// Raw query-string parameters, as received.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyQuery {
    pub location: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// Comma-separated amenity names.
    pub amenities: Option<String>,
}

/// Parsed listing filter. Every present criterion must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    /// Case-insensitive substring of the location.
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Amenities the listing must all offer.
    pub amenities: Vec<String>,
}

impl PropertyFilter {
    pub fn from_query(query: PropertyQuery) -> DomainResult<Self> {
        let location = query
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        let amenities = query
            .amenities
            .map(|a| {
                a.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            location,
            min_price: parse_price(query.min_price, "minPrice")?,
            max_price: parse_price(query.max_price, "maxPrice")?,
            amenities,
        })
    }

    pub fn matches(&self, property: &Property) -> bool {
        if let Some(location) = &self.location {
            if !property
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| property.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| property.price > max) {
            return false;
        }
        self.amenities
            .iter()
            .all(|wanted| property.amenities.iter().any(|a| a == wanted))
    }
}

fn parse_price(raw: Option<String>, field: &str) -> DomainResult<Option<f64>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .map(Some)
            .ok_or_else(|| DomainError::validation(format!("{field} must be a number"))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;
    use stayhub_core::UserId;

    use super::*;
    use crate::NewProperty;

    fn property(location: &str, price: f64, amenities: &[&str]) -> Property {
        Property::create(
            UserId::new(),
            NewProperty {
                title: Some("t".into()),
                description: Some("d".into()),
                price: Some(price),
                location: Some(location.into()),
                images: Some(vec!["i.jpg".into()]),
                amenities: Some(amenities.iter().map(|a| a.to_string()).collect()),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn query(location: Option<&str>, min: Option<&str>, max: Option<&str>, amenities: Option<&str>) -> PropertyQuery {
        PropertyQuery {
            location: location.map(Into::into),
            min_price: min.map(Into::into),
            max_price: max.map(Into::into),
            amenities: amenities.map(Into::into),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = PropertyFilter::from_query(PropertyQuery::default()).unwrap();
        assert!(filter.matches(&property("Anywhere", 1.0, &[])));
    }

    #[test]
    fn location_is_case_insensitive_substring() {
        let filter = PropertyFilter::from_query(query(Some("lisb"), None, None, None)).unwrap();
        assert!(filter.matches(&property("Old Town, LISBON", 50.0, &[])));
        assert!(!filter.matches(&property("Porto", 50.0, &[])));
    }

    #[test]
    fn amenities_must_all_be_present() {
        let filter = PropertyFilter::from_query(query(None, None, None, Some("wifi, pool"))).unwrap();
        assert_eq!(filter.amenities, vec!["wifi".to_string(), "pool".to_string()]);
        assert!(filter.matches(&property("x", 1.0, &["pool", "wifi", "parking"])));
        assert!(!filter.matches(&property("x", 1.0, &["wifi"])));
    }

    #[test]
    fn rejects_non_numeric_prices() {
        let err = PropertyFilter::from_query(query(None, Some("cheap"), None, None)).unwrap_err();
        assert_eq!(err, DomainError::validation("minPrice must be a number"));
    }

    proptest! {
        #[test]
        fn price_bounds_are_inclusive(price in 0.0f64..10_000.0, lo in 0.0f64..10_000.0, hi in 0.0f64..10_000.0) {
            let filter = PropertyFilter {
                min_price: Some(lo),
                max_price: Some(hi),
                ..Default::default()
            };
            let listing = property("x", price, &[]);
            prop_assert_eq!(filter.matches(&listing), lo <= price && price <= hi);
        }
    }
}
