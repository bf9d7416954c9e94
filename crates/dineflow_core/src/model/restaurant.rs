//! Restaurant record.

use crate::model::now_epoch_ms;
use crate::model::validation::{require_name, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type RestaurantId = Uuid;

/// A restaurant owning exactly one menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    /// Closed restaurants still serve their menu but reject new orders.
    pub is_open: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Restaurant {
    /// Creates an open restaurant with a generated stable ID.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: address.into(),
            phone: None,
            is_open: true,
            created_at: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_name(&self.name, "restaurant")
    }
}

#[cfg(test)]
mod tests {
    use super::Restaurant;
    use crate::model::validation::ValidationError;

    #[test]
    fn new_restaurant_is_open() {
        let restaurant = Restaurant::new("Luigi's", "1 Main St");
        assert!(restaurant.is_open);
        assert!(restaurant.created_at > 0);
    }

    #[test]
    fn blank_name_fails_validation() {
        let restaurant = Restaurant::new("   ", "1 Main St");
        assert_eq!(
            restaurant.validate(),
            Err(ValidationError::BlankName {
                entity: "restaurant"
            })
        );
    }
}
