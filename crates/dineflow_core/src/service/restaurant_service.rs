//! Restaurant admin use-cases.

use crate::model::restaurant::{Restaurant, RestaurantId};
use crate::repo::restaurant_repo::{RestaurantRepository, SqliteRestaurantRepository};
use crate::repo::shared::{RepoError, RepoResult};
use log::info;
use rusqlite::Connection;

/// Use-case service wrapper for restaurant records.
pub struct RestaurantService<R: RestaurantRepository> {
    repo: R,
}

pub type SqliteRestaurantService<'conn> = RestaurantService<SqliteRestaurantRepository<'conn>>;

impl<'conn> SqliteRestaurantService<'conn> {
    pub fn from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(SqliteRestaurantRepository::try_new(conn)?))
    }
}

impl<R: RestaurantRepository> RestaurantService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an open restaurant and returns the stored record.
    pub fn create_restaurant(
        &self,
        name: impl Into<String>,
        address: impl Into<String>,
        phone: Option<String>,
    ) -> RepoResult<Restaurant> {
        let mut restaurant = Restaurant::new(name.into().trim(), address.into().trim());
        restaurant.phone = phone
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let id = self.repo.create_restaurant(&restaurant)?;
        info!("event=restaurant_create module=service status=ok restaurant_id={id}");
        Ok(restaurant)
    }

    pub fn get_restaurant(&self, id: RestaurantId) -> RepoResult<Option<Restaurant>> {
        self.repo.get_restaurant(id)
    }

    pub fn list_restaurants(&self) -> RepoResult<Vec<Restaurant>> {
        self.repo.list_restaurants()
    }

    /// Opens or closes a restaurant for new orders.
    pub fn set_open(&self, id: RestaurantId, is_open: bool) -> RepoResult<Restaurant> {
        self.repo.set_open(id, is_open)?;
        self.repo.get_restaurant(id)?.ok_or(RepoError::NotFound {
            entity: "restaurant",
            id,
        })
    }
}
