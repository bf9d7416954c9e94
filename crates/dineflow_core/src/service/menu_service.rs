//! Menu admin and browse use-cases.
//!
//! # Responsibility
//! - Create/version menus for existing restaurants.
//! - Add, patch and delete items, resolving categories by name.
//! - Serve filtered, sorted item lists for the browse screen.
//!
//! # Invariants
//! - Items are only mutated through the menu that owns them.
//! - Category names are resolved case-insensitively and created on demand.

use crate::catalog::filter::{filter_items, flatten_menu, MenuFilter};
use crate::model::menu::{ItemId, Menu, MenuId, MenuItem, MenuItemPatch, NewMenuItem};
use crate::model::restaurant::RestaurantId;
use crate::model::validation::ValidationError;
use crate::repo::menu_repo::{MenuRepository, SqliteMenuRepository};
use crate::repo::restaurant_repo::{RestaurantRepository, SqliteRestaurantRepository};
use crate::repo::shared::{RepoError, RepoResult};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from menu service operations.
#[derive(Debug)]
pub enum MenuServiceError {
    RestaurantNotFound(RestaurantId),
    /// No menu exists for the restaurant (or with the given menu id).
    MenuNotFound(String),
    ItemNotFound(ItemId),
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for MenuServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RestaurantNotFound(id) => write!(f, "restaurant not found: {id}"),
            Self::MenuNotFound(key) => write!(f, "menu not found: {key}"),
            Self::ItemNotFound(id) => write!(f, "menu item not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MenuServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MenuServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound {
                entity: "menu item",
                id,
            } => Self::ItemNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Menu service facade over menu and restaurant repositories.
pub struct MenuService<M: MenuRepository, R: RestaurantRepository> {
    menus: M,
    restaurants: R,
}

pub type SqliteMenuService<'conn> =
    MenuService<SqliteMenuRepository<'conn>, SqliteRestaurantRepository<'conn>>;

impl<'conn> SqliteMenuService<'conn> {
    pub fn from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteMenuRepository::try_new(conn)?,
            SqliteRestaurantRepository::try_new(conn)?,
        ))
    }
}

impl<M: MenuRepository, R: RestaurantRepository> MenuService<M, R> {
    pub fn new(menus: M, restaurants: R) -> Self {
        Self { menus, restaurants }
    }

    /// Creates the restaurant's menu, or re-versions the existing one.
    pub fn create_menu(
        &self,
        restaurant_id: RestaurantId,
        version: u32,
    ) -> Result<Menu, MenuServiceError> {
        if self.restaurants.get_restaurant(restaurant_id)?.is_none() {
            return Err(MenuServiceError::RestaurantNotFound(restaurant_id));
        }

        let menu_id = self.menus.upsert_menu(&Menu::new(restaurant_id, version))?;
        info!(
            "event=menu_create module=service status=ok menu_id={menu_id} version={version}"
        );
        self.get_menu(menu_id)
    }

    pub fn get_menu(&self, menu_id: MenuId) -> Result<Menu, MenuServiceError> {
        self.menus
            .get_menu(menu_id)?
            .ok_or_else(|| MenuServiceError::MenuNotFound(menu_id.to_string()))
    }

    /// Full menu with categories and items.
    pub fn get_menu_for_restaurant(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Menu, MenuServiceError> {
        self.menus
            .get_menu_for_restaurant(restaurant_id)?
            .ok_or_else(|| MenuServiceError::MenuNotFound(format!("restaurant {restaurant_id}")))
    }

    /// Adds an item under the named category, creating the category if needed.
    pub fn add_item(
        &self,
        menu_id: MenuId,
        draft: NewMenuItem,
    ) -> Result<MenuItem, MenuServiceError> {
        if self.menus.get_menu(menu_id)?.is_none() {
            return Err(MenuServiceError::MenuNotFound(menu_id.to_string()));
        }

        // A rejected draft must not leave an empty category behind.
        draft.validate().map_err(MenuServiceError::Validation)?;

        let category_id = self.menus.ensure_category(menu_id, &draft.category)?;
        let item = draft.into_item(menu_id, category_id);
        self.menus.add_item(&item)?;
        info!(
            "event=menu_item_add module=service status=ok menu_id={menu_id} item_id={}",
            item.id
        );
        Ok(item)
    }

    /// Applies a partial update to one item of `menu_id`.
    pub fn update_item(
        &self,
        menu_id: MenuId,
        item_id: ItemId,
        patch: &MenuItemPatch,
    ) -> Result<MenuItem, MenuServiceError> {
        let mut item = self.owned_item(menu_id, item_id)?;
        patch.apply_to(&mut item);
        item.validate().map_err(MenuServiceError::Validation)?;
        item.category_id = self.menus.update_item(&item, patch.category.as_deref())?;
        info!("event=menu_item_update module=service status=ok item_id={item_id}");
        Ok(item)
    }

    pub fn delete_item(&self, menu_id: MenuId, item_id: ItemId) -> Result<(), MenuServiceError> {
        self.menus.delete_item(menu_id, item_id)?;
        info!("event=menu_item_delete module=service status=ok item_id={item_id}");
        Ok(())
    }

    /// Flattens the restaurant's menu and applies the browse filter.
    pub fn browse(
        &self,
        restaurant_id: RestaurantId,
        filter: &MenuFilter,
    ) -> Result<Vec<MenuItem>, MenuServiceError> {
        let menu = self.get_menu_for_restaurant(restaurant_id)?;
        Ok(filter_items(&flatten_menu(&menu), filter))
    }

    fn owned_item(&self, menu_id: MenuId, item_id: ItemId) -> Result<MenuItem, MenuServiceError> {
        match self.menus.get_item(item_id)? {
            Some(item) if item.menu_id == menu_id => Ok(item),
            _ => Err(MenuServiceError::ItemNotFound(item_id)),
        }
    }
}
