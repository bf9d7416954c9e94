//! Restaurant repository contracts and SQLite implementation.

use crate::model::restaurant::{Restaurant, RestaurantId};
use crate::repo::shared::{
    bool_to_int, check_row, ensure_tables, parse_bool, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const RESTAURANT_SELECT_SQL: &str = "SELECT
    id,
    name,
    address,
    phone,
    is_open,
    created_at
FROM restaurants";

/// Repository interface for restaurant records.
pub trait RestaurantRepository {
    fn create_restaurant(&self, restaurant: &Restaurant) -> RepoResult<RestaurantId>;
    fn get_restaurant(&self, id: RestaurantId) -> RepoResult<Option<Restaurant>>;
    /// All restaurants sorted by name.
    fn list_restaurants(&self) -> RepoResult<Vec<Restaurant>>;
    fn set_open(&self, id: RestaurantId, is_open: bool) -> RepoResult<()>;
}

/// SQLite-backed restaurant repository.
pub struct SqliteRestaurantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRestaurantRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["restaurants"])?;
        Ok(Self { conn })
    }
}

impl RestaurantRepository for SqliteRestaurantRepository<'_> {
    fn create_restaurant(&self, restaurant: &Restaurant) -> RepoResult<RestaurantId> {
        restaurant.validate()?;

        self.conn.execute(
            "INSERT INTO restaurants (id, name, address, phone, is_open, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                restaurant.id.to_string(),
                restaurant.name.trim(),
                restaurant.address.trim(),
                restaurant.phone.as_deref(),
                bool_to_int(restaurant.is_open),
                restaurant.created_at,
            ],
        )?;

        Ok(restaurant.id)
    }

    fn get_restaurant(&self, id: RestaurantId) -> RepoResult<Option<Restaurant>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESTAURANT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_restaurant_row(row)?));
        }
        Ok(None)
    }

    fn list_restaurants(&self) -> RepoResult<Vec<Restaurant>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RESTAURANT_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut restaurants = Vec::new();
        while let Some(row) = rows.next()? {
            restaurants.push(parse_restaurant_row(row)?);
        }
        Ok(restaurants)
    }

    fn set_open(&self, id: RestaurantId, is_open: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE restaurants SET is_open = ?2 WHERE id = ?1;",
            params![id.to_string(), bool_to_int(is_open)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "restaurant",
                id,
            });
        }
        Ok(())
    }
}

fn parse_restaurant_row(row: &Row<'_>) -> RepoResult<Restaurant> {
    let id_text: String = row.get("id")?;
    let restaurant = Restaurant {
        id: parse_uuid(&id_text, "restaurants.id")?,
        name: row.get("name")?,
        address: row.get("address")?,
        phone: row.get("phone")?,
        is_open: parse_bool(row.get("is_open")?, "restaurants.is_open")?,
        created_at: row.get("created_at")?,
    };
    check_row(restaurant.validate(), "restaurants")?;
    Ok(restaurant)
}
