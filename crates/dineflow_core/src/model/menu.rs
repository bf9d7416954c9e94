//! Menu catalog model: menu -> categories -> items.
//!
//! # Invariants
//! - A restaurant has at most one menu; `version` is opaque and passed through.
//! - Category names are unique per menu, compared case-insensitively.
//! - Item tags are lowercase, deduplicated and sorted.
//! - Item prices are never negative.

use crate::model::money::Money;
use crate::model::restaurant::RestaurantId;
use crate::model::validation::{require_name, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type MenuId = Uuid;
pub type CategoryId = Uuid;
pub type ItemId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: MenuId,
    pub restaurant_id: RestaurantId,
    pub version: u32,
    /// Ordered by `position`.
    pub categories: Vec<MenuCategory>,
}

impl Menu {
    pub fn new(restaurant_id: RestaurantId, version: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            restaurant_id,
            version,
            categories: Vec::new(),
        }
    }

    /// Looks up one item across all categories.
    pub fn find_item(&self, item_id: ItemId) -> Option<&MenuItem> {
        self.categories
            .iter()
            .flat_map(|category| category.items.iter())
            .find(|item| item.id == item_id)
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|category| category.items.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: CategoryId,
    pub menu_id: MenuId,
    pub name: String,
    pub position: u32,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: ItemId,
    pub menu_id: MenuId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub tags: Vec<String>,
    /// Opaque image payload supplied by the admin client. Never decoded.
    pub image_base64: Option<String>,
    pub is_available: bool,
}

impl MenuItem {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_name(&self.name, "menu item")?;
        if self.price.is_negative() {
            return Err(ValidationError::NegativePrice(self.price));
        }
        Ok(())
    }
}

/// Input for adding an item; the category is addressed by name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
}

impl NewMenuItem {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_name(&self.name, "menu item")?;
        require_name(&self.category, "category")?;
        if self.price.is_negative() {
            return Err(ValidationError::NegativePrice(self.price));
        }
        Ok(())
    }

    /// Builds the persisted record for a resolved category.
    pub fn into_item(self, menu_id: MenuId, category_id: CategoryId) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4(),
            menu_id,
            category_id,
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            tags: normalize_tags(&self.tags),
            image_base64: self.image_base64,
            is_available: true,
        }
    }
}

/// Partial update for an existing item. `None` keeps the current value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    /// Moves the item to the named category, creating it when missing.
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_base64: Option<String>,
    pub is_available: Option<bool>,
}

impl MenuItemPatch {
    /// Applies every field except `category`, which needs storage to resolve.
    pub fn apply_to(&self, item: &mut MenuItem) {
        if let Some(name) = &self.name {
            item.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            item.description = description.trim().to_string();
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(tags) = &self.tags {
            item.tags = normalize_tags(tags);
        }
        if let Some(image) = &self.image_base64 {
            item.image_base64 = Some(image.clone());
        }
        if let Some(is_available) = self.is_available {
            item.is_available = is_available;
        }
    }
}

/// Normalizes one tag value: trimmed, lowercase, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates tag values into sorted order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_tags, MenuItemPatch, NewMenuItem};
    use crate::model::money::Money;
    use crate::model::validation::ValidationError;
    use uuid::Uuid;

    fn draft() -> NewMenuItem {
        NewMenuItem {
            name: "  Margherita ".to_string(),
            description: "Tomato, basil".to_string(),
            price: Money(1200),
            category: "Pizza".to_string(),
            tags: vec!["Veg".to_string(), "veg ".to_string(), " ".to_string()],
            image_base64: None,
        }
    }

    #[test]
    fn into_item_trims_and_normalizes() {
        let item = draft().into_item(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(item.name, "Margherita");
        assert_eq!(item.tags, vec!["veg".to_string()]);
        assert!(item.is_available);
    }

    #[test]
    fn negative_price_fails_validation() {
        let mut item = draft().into_item(Uuid::new_v4(), Uuid::new_v4());
        item.price = Money(-1);
        assert_eq!(item.validate(), Err(ValidationError::NegativePrice(Money(-1))));
    }

    #[test]
    fn draft_requires_category_name() {
        let mut item = draft();
        item.category = " ".to_string();
        assert_eq!(
            item.validate(),
            Err(ValidationError::BlankName { entity: "category" })
        );
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let mut item = draft().into_item(Uuid::new_v4(), Uuid::new_v4());
        let patch = MenuItemPatch {
            price: Some(Money(1350)),
            is_available: Some(false),
            ..MenuItemPatch::default()
        };
        patch.apply_to(&mut item);
        assert_eq!(item.price, Money(1350));
        assert!(!item.is_available);
        assert_eq!(item.name, "Margherita");
    }

    #[test]
    fn normalize_tags_sorts_and_dedups() {
        let tags = vec!["Spicy".to_string(), "hot".to_string(), "SPICY".to_string()];
        assert_eq!(normalize_tags(&tags), vec!["hot", "spicy"]);
    }
}
