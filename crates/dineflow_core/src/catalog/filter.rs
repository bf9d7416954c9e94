//! Menu item filter and price sort.
//!
//! # Invariants
//! - Output is a subset of the input; with sorting, a permutation of that subset.
//! - Sorting is stable: equal prices keep input order.
//! - Blank search text and blank tags are ignored, not matched literally.

use crate::model::menu::{normalize_tag, CategoryId, Menu, MenuItem};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSort {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

/// Browse-screen filter options. The default keeps everything in menu order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuFilter {
    pub category: Option<CategoryId>,
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
    pub tag: Option<String>,
    pub available_only: bool,
    pub sort: PriceSort,
}

/// Items of `menu` ordered by category position, then by item order.
pub fn flatten_menu(menu: &Menu) -> Vec<MenuItem> {
    let mut categories = menu.categories.iter().collect::<Vec<_>>();
    categories.sort_by_key(|category| category.position);
    categories
        .into_iter()
        .flat_map(|category| category.items.iter().cloned())
        .collect()
}

/// Applies `filter` to `items` and returns matching items.
pub fn filter_items(items: &[MenuItem], filter: &MenuFilter) -> Vec<MenuItem> {
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase);
    let tag = filter.tag.as_deref().and_then(normalize_tag);

    let mut matched = items
        .iter()
        .filter(|item| filter.category.map_or(true, |id| item.category_id == id))
        .filter(|item| !filter.available_only || item.is_available)
        .filter(|item| tag.as_ref().map_or(true, |tag| item.tags.contains(tag)))
        .filter(|item| {
            needle
                .as_deref()
                .map_or(true, |needle| matches_search(item, needle))
        })
        .cloned()
        .collect::<Vec<_>>();

    match filter.sort {
        PriceSort::Unsorted => {}
        PriceSort::Ascending => matched.sort_by(|a, b| a.price.cmp(&b.price)),
        PriceSort::Descending => matched.sort_by(|a, b| b.price.cmp(&a.price)),
    }

    matched
}

fn matches_search(item: &MenuItem, needle: &str) -> bool {
    item.name.to_lowercase().contains(needle) || item.description.to_lowercase().contains(needle)
}
