//! Menu/category/item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the menu hierarchy and item tags.
//! - Load a full menu tree (categories by position, items by insertion order).
//!
//! # Invariants
//! - One menu row per restaurant; re-creating a menu only bumps `version`.
//! - Item writes replace the full tag set in the same transaction.
//! - A category created for an item update is rolled back with a failed update.
//! - Deleting an item also removes offers targeting it.

use crate::model::menu::{CategoryId, ItemId, Menu, MenuCategory, MenuId, MenuItem};
use crate::model::money::Money;
use crate::model::restaurant::RestaurantId;
use crate::model::validation::require_name;
use crate::repo::shared::{
    bool_to_int, check_row, ensure_tables, parse_bool, parse_u32, parse_uuid, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    menu_id,
    category_id,
    name,
    description,
    price,
    image_base64,
    is_available
FROM menu_items";

/// Repository interface for the menu catalog.
pub trait MenuRepository {
    /// Creates the restaurant's menu, or updates the version of the existing one.
    ///
    /// Returns the id of the stored menu, which is the existing id on update.
    fn upsert_menu(&self, menu: &Menu) -> RepoResult<MenuId>;
    fn get_menu(&self, menu_id: MenuId) -> RepoResult<Option<Menu>>;
    fn get_menu_for_restaurant(&self, restaurant_id: RestaurantId) -> RepoResult<Option<Menu>>;
    /// Finds a category by case-insensitive name, creating it at the end when missing.
    fn ensure_category(&self, menu_id: MenuId, name: &str) -> RepoResult<CategoryId>;
    fn get_category(&self, category_id: CategoryId) -> RepoResult<Option<MenuCategory>>;
    fn add_item(&self, item: &MenuItem) -> RepoResult<ItemId>;
    /// Rewrites `item`, first moving it into the `category` named (created on
    /// demand) when one is given. Both happen in one transaction.
    ///
    /// Returns the category the stored item belongs to.
    fn update_item(&self, item: &MenuItem, category: Option<&str>) -> RepoResult<CategoryId>;
    fn delete_item(&self, menu_id: MenuId, item_id: ItemId) -> RepoResult<()>;
    fn get_item(&self, item_id: ItemId) -> RepoResult<Option<MenuItem>>;
}

/// SQLite-backed menu repository.
pub struct SqliteMenuRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMenuRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(
            conn,
            &[
                "menus",
                "menu_categories",
                "menu_items",
                "menu_item_tags",
                "offers",
            ],
        )?;
        Ok(Self { conn })
    }

    fn load_menu(&self, column: &str, id: String) -> RepoResult<Option<Menu>> {
        let header = self
            .conn
            .query_row(
                &format!("SELECT id, restaurant_id, version FROM menus WHERE {column} = ?1;"),
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>("id")?,
                        row.get::<_, String>("restaurant_id")?,
                        row.get::<_, i64>("version")?,
                    ))
                },
            )
            .optional()?;

        let Some((menu_id_text, restaurant_id_text, version)) = header else {
            return Ok(None);
        };

        let menu_id = parse_uuid(&menu_id_text, "menus.id")?;
        let categories = self.load_categories(&menu_id_text)?;
        Ok(Some(Menu {
            id: menu_id,
            restaurant_id: parse_uuid(&restaurant_id_text, "menus.restaurant_id")?,
            version: parse_u32(version, "menus.version")?,
            categories,
        }))
    }

    fn load_categories(&self, menu_id: &str) -> RepoResult<Vec<MenuCategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, menu_id, name, position
             FROM menu_categories
             WHERE menu_id = ?1
             ORDER BY position ASC, id ASC;",
        )?;
        let mut rows = stmt.query([menu_id])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(self.parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn parse_category_row(&self, row: &Row<'_>) -> RepoResult<MenuCategory> {
        let id_text: String = row.get("id")?;
        let menu_id_text: String = row.get("menu_id")?;
        let name: String = row.get("name")?;
        check_row(require_name(&name, "category"), "menu_categories")?;
        Ok(MenuCategory {
            id: parse_uuid(&id_text, "menu_categories.id")?,
            menu_id: parse_uuid(&menu_id_text, "menu_categories.menu_id")?,
            name,
            position: parse_u32(row.get("position")?, "menu_categories.position")?,
            items: self.load_items(&id_text)?,
        })
    }

    fn load_items(&self, category_id: &str) -> RepoResult<Vec<MenuItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL} WHERE category_id = ?1 ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([category_id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(self.conn, row)?);
        }
        Ok(items)
    }
}

impl MenuRepository for SqliteMenuRepository<'_> {
    fn upsert_menu(&self, menu: &Menu) -> RepoResult<MenuId> {
        self.conn.execute(
            "INSERT INTO menus (id, restaurant_id, version)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (restaurant_id) DO UPDATE SET
                version = excluded.version,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                menu.id.to_string(),
                menu.restaurant_id.to_string(),
                i64::from(menu.version),
            ],
        )?;

        let stored: String = self.conn.query_row(
            "SELECT id FROM menus WHERE restaurant_id = ?1;",
            [menu.restaurant_id.to_string()],
            |row| row.get(0),
        )?;
        parse_uuid(&stored, "menus.id")
    }

    fn get_menu(&self, menu_id: MenuId) -> RepoResult<Option<Menu>> {
        self.load_menu("id", menu_id.to_string())
    }

    fn get_menu_for_restaurant(&self, restaurant_id: RestaurantId) -> RepoResult<Option<Menu>> {
        self.load_menu("restaurant_id", restaurant_id.to_string())
    }

    fn ensure_category(&self, menu_id: MenuId, name: &str) -> RepoResult<CategoryId> {
        let tx = self.conn.unchecked_transaction()?;
        let category_id = resolve_category(&tx, menu_id, name)?;
        tx.commit()?;
        Ok(category_id)
    }

    fn get_category(&self, category_id: CategoryId) -> RepoResult<Option<MenuCategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, menu_id, name, position
             FROM menu_categories
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([category_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.parse_category_row(row)?));
        }
        Ok(None)
    }

    fn add_item(&self, item: &MenuItem) -> RepoResult<ItemId> {
        item.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO menu_items (
                id,
                menu_id,
                category_id,
                name,
                description,
                price,
                image_base64,
                is_available
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                item.id.to_string(),
                item.menu_id.to_string(),
                item.category_id.to_string(),
                item.name.as_str(),
                item.description.as_str(),
                item.price.cents(),
                item.image_base64.as_deref(),
                bool_to_int(item.is_available),
            ],
        )?;
        replace_tags(&tx, item)?;
        tx.commit()?;

        Ok(item.id)
    }

    fn update_item(&self, item: &MenuItem, category: Option<&str>) -> RepoResult<CategoryId> {
        item.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let category_id = match category {
            Some(name) => resolve_category(&tx, item.menu_id, name)?,
            None => item.category_id,
        };
        let changed = tx.execute(
            "UPDATE menu_items
             SET
                category_id = ?3,
                name = ?4,
                description = ?5,
                price = ?6,
                image_base64 = ?7,
                is_available = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1 AND menu_id = ?2;",
            params![
                item.id.to_string(),
                item.menu_id.to_string(),
                category_id.to_string(),
                item.name.as_str(),
                item.description.as_str(),
                item.price.cents(),
                item.image_base64.as_deref(),
                bool_to_int(item.is_available),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "menu item",
                id: item.id,
            });
        }
        replace_tags(&tx, item)?;
        tx.commit()?;

        Ok(category_id)
    }

    fn delete_item(&self, menu_id: MenuId, item_id: ItemId) -> RepoResult<()> {
        let item_id_text = item_id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "DELETE FROM menu_items WHERE id = ?1 AND menu_id = ?2;",
            params![item_id_text.as_str(), menu_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "menu item",
                id: item_id,
            });
        }
        tx.execute(
            "DELETE FROM offers WHERE target_kind = 'item' AND target_id = ?1;",
            [item_id_text.as_str()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get_item(&self, item_id: ItemId) -> RepoResult<Option<MenuItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([item_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(self.conn, row)?));
        }
        Ok(None)
    }
}

/// Finds a category by case-insensitive name, appending a new one when missing.
fn resolve_category(tx: &Transaction<'_>, menu_id: MenuId, name: &str) -> RepoResult<CategoryId> {
    let name = name.trim();
    require_name(name, "category")?;
    let menu_id_text = menu_id.to_string();

    let existing: Option<String> = tx
        .query_row(
            "SELECT id FROM menu_categories
             WHERE menu_id = ?1 AND name = ?2 COLLATE NOCASE;",
            params![menu_id_text.as_str(), name],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id_text) = existing {
        return parse_uuid(&id_text, "menu_categories.id");
    }

    let category_id = Uuid::new_v4();
    tx.execute(
        "INSERT INTO menu_categories (id, menu_id, name, position)
         SELECT ?1, ?2, ?3, COALESCE(MAX(position) + 1, 0)
         FROM menu_categories
         WHERE menu_id = ?2;",
        params![category_id.to_string(), menu_id_text.as_str(), name],
    )?;
    Ok(category_id)
}

fn replace_tags(tx: &Transaction<'_>, item: &MenuItem) -> RepoResult<()> {
    let item_id = item.id.to_string();
    tx.execute(
        "DELETE FROM menu_item_tags WHERE item_id = ?1;",
        [item_id.as_str()],
    )?;
    for tag in &item.tags {
        tx.execute(
            "INSERT OR IGNORE INTO menu_item_tags (item_id, tag) VALUES (?1, ?2);",
            params![item_id.as_str(), tag.as_str()],
        )?;
    }
    Ok(())
}

fn parse_item_row(conn: &Connection, row: &Row<'_>) -> RepoResult<MenuItem> {
    let id_text: String = row.get("id")?;
    let menu_id_text: String = row.get("menu_id")?;
    let category_id_text: String = row.get("category_id")?;

    let item = MenuItem {
        id: parse_uuid(&id_text, "menu_items.id")?,
        menu_id: parse_uuid(&menu_id_text, "menu_items.menu_id")?,
        category_id: parse_uuid(&category_id_text, "menu_items.category_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        price: Money::from_cents(row.get("price")?),
        tags: load_tags(conn, &id_text)?,
        image_base64: row.get("image_base64")?,
        is_available: parse_bool(row.get("is_available")?, "menu_items.is_available")?,
    };
    check_row(item.validate(), "menu_items")?;
    Ok(item)
}

fn load_tags(conn: &Connection, item_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT tag FROM menu_item_tags
         WHERE item_id = ?1
         ORDER BY tag ASC;",
    )?;
    let mut rows = stmt.query([item_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}
