use dineflow_core::db::open_db_in_memory;
use dineflow_core::repo::menu_repo::{MenuRepository, SqliteMenuRepository};
use dineflow_core::{
    Menu, MenuFilter, MenuItemPatch, MenuServiceError, Money, NewMenuItem, PriceSort, RepoError,
    SqliteMenuService, SqliteRestaurantService, ValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn draft(name: &str, cents: i64, category: &str, tags: &[&str]) -> NewMenuItem {
    NewMenuItem {
        name: name.to_string(),
        description: format!("{name} from the oven"),
        price: Money(cents),
        category: category.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        image_base64: None,
    }
}

fn seed_menu(conn: &Connection) -> (Uuid, Menu) {
    let restaurants = SqliteRestaurantService::from_connection(conn).unwrap();
    let restaurant = restaurants
        .create_restaurant("Luigi's", "1 Main St", Some(" 555-0100 ".to_string()))
        .unwrap();
    let menus = SqliteMenuService::from_connection(conn).unwrap();
    let menu = menus.create_menu(restaurant.id, 1).unwrap();
    (restaurant.id, menu)
}

#[test]
fn restaurant_create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteRestaurantService::from_connection(&conn).unwrap();

    let created = service
        .create_restaurant("  Luigi's ", "1 Main St", Some("  ".to_string()))
        .unwrap();
    let loaded = service.get_restaurant(created.id).unwrap().unwrap();

    assert_eq!(loaded.name, "Luigi's");
    assert_eq!(loaded.phone, None);
    assert!(loaded.is_open);
}

#[test]
fn restaurant_requires_name() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteRestaurantService::from_connection(&conn).unwrap();

    let err = service.create_restaurant(" ", "nowhere", None).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::BlankName { .. })
    ));
}

#[test]
fn set_open_toggles_and_reports_missing_restaurant() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteRestaurantService::from_connection(&conn).unwrap();
    let restaurant = service.create_restaurant("Luigi's", "1 Main St", None).unwrap();

    let closed = service.set_open(restaurant.id, false).unwrap();
    assert!(!closed.is_open);

    let missing = service.set_open(Uuid::new_v4(), true).unwrap_err();
    assert!(matches!(missing, RepoError::NotFound { entity: "restaurant", .. }));
}

#[test]
fn create_menu_requires_existing_restaurant() {
    let conn = open_db_in_memory().unwrap();
    let menus = SqliteMenuService::from_connection(&conn).unwrap();

    let missing = Uuid::new_v4();
    let err = menus.create_menu(missing, 1).unwrap_err();
    assert!(matches!(err, MenuServiceError::RestaurantNotFound(id) if id == missing));
}

#[test]
fn create_menu_twice_keeps_id_and_bumps_version() {
    let conn = open_db_in_memory().unwrap();
    let (restaurant_id, first) = seed_menu(&conn);
    let menus = SqliteMenuService::from_connection(&conn).unwrap();

    let second = menus.create_menu(restaurant_id, 7).unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.version, 7);
}

#[test]
fn add_item_creates_categories_once_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let (restaurant_id, menu) = seed_menu(&conn);
    let menus = SqliteMenuService::from_connection(&conn).unwrap();

    menus
        .add_item(menu.id, draft("Margherita", 1200, "Pizza", &["Veg"]))
        .unwrap();
    menus
        .add_item(menu.id, draft("Diavola", 1400, "pizza", &["spicy"]))
        .unwrap();
    menus
        .add_item(menu.id, draft("Tiramisu", 650, "Dessert", &[]))
        .unwrap();

    let loaded = menus.get_menu_for_restaurant(restaurant_id).unwrap();
    let names: Vec<&str> = loaded
        .categories
        .iter()
        .map(|category| category.name.as_str())
        .collect();
    assert_eq!(names, vec!["Pizza", "Dessert"]);
    assert_eq!(loaded.categories[0].items.len(), 2);
    assert_eq!(loaded.categories[0].items[0].tags, vec!["veg".to_string()]);
    assert_eq!(loaded.item_count(), 3);
}

#[test]
fn rejected_item_leaves_no_empty_category() {
    let conn = open_db_in_memory().unwrap();
    let (restaurant_id, menu) = seed_menu(&conn);
    let menus = SqliteMenuService::from_connection(&conn).unwrap();

    let err = menus
        .add_item(menu.id, draft("Broken", -5, "Specials", &[]))
        .unwrap_err();
    assert!(matches!(
        err,
        MenuServiceError::Validation(ValidationError::NegativePrice(_))
    ));

    let loaded = menus.get_menu_for_restaurant(restaurant_id).unwrap();
    assert!(loaded.categories.is_empty());
}

#[test]
fn update_item_patches_fields_and_moves_category() {
    let conn = open_db_in_memory().unwrap();
    let (restaurant_id, menu) = seed_menu(&conn);
    let menus = SqliteMenuService::from_connection(&conn).unwrap();
    let item = menus
        .add_item(menu.id, draft("Garlic Bread", 450, "Pizza", &[]))
        .unwrap();

    let patch = MenuItemPatch {
        price: Some(Money(500)),
        category: Some("Sides".to_string()),
        tags: Some(vec!["Veg".to_string()]),
        ..MenuItemPatch::default()
    };
    let updated = menus.update_item(menu.id, item.id, &patch).unwrap();
    assert_eq!(updated.price, Money(500));
    assert_eq!(updated.name, "Garlic Bread");

    let loaded = menus.get_menu_for_restaurant(restaurant_id).unwrap();
    let sides = loaded
        .categories
        .iter()
        .find(|category| category.name == "Sides")
        .unwrap();
    assert_eq!(sides.items[0].id, item.id);
    assert_eq!(sides.items[0].tags, vec!["veg".to_string()]);
}

#[test]
fn update_item_through_foreign_menu_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let (_, menu) = seed_menu(&conn);
    let (_, other_menu) = seed_menu(&conn);
    let menus = SqliteMenuService::from_connection(&conn).unwrap();
    let item = menus
        .add_item(menu.id, draft("Margherita", 1200, "Pizza", &[]))
        .unwrap();

    let err = menus
        .update_item(other_menu.id, item.id, &MenuItemPatch::default())
        .unwrap_err();
    assert!(matches!(err, MenuServiceError::ItemNotFound(id) if id == item.id));
}

#[test]
fn failed_item_update_does_not_create_its_category() {
    let conn = open_db_in_memory().unwrap();
    let (_, menu) = seed_menu(&conn);
    let menus = SqliteMenuService::from_connection(&conn).unwrap();
    let item = menus
        .add_item(menu.id, draft("Margherita", 1200, "Pizza", &[]))
        .unwrap();
    // Another client removes the item between read and write.
    conn.execute("DELETE FROM menu_items WHERE id = ?1;", [item.id.to_string()])
        .unwrap();

    let repo = SqliteMenuRepository::try_new(&conn).unwrap();
    let err = repo.update_item(&item, Some("Desserts")).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id, .. } if id == item.id));

    let desserts: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM menu_categories WHERE name = 'Desserts';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(desserts, 0);
}

#[test]
fn delete_item_removes_it_and_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let (restaurant_id, menu) = seed_menu(&conn);
    let menus = SqliteMenuService::from_connection(&conn).unwrap();
    let item = menus
        .add_item(menu.id, draft("Margherita", 1200, "Pizza", &[]))
        .unwrap();

    menus.delete_item(menu.id, item.id).unwrap();
    let loaded = menus.get_menu_for_restaurant(restaurant_id).unwrap();
    assert_eq!(loaded.item_count(), 0);

    let err = menus.delete_item(menu.id, item.id).unwrap_err();
    assert!(matches!(err, MenuServiceError::ItemNotFound(_)));
}

#[test]
fn browse_filters_and_sorts_by_price() {
    let conn = open_db_in_memory().unwrap();
    let (restaurant_id, menu) = seed_menu(&conn);
    let menus = SqliteMenuService::from_connection(&conn).unwrap();
    menus
        .add_item(menu.id, draft("Margherita", 1200, "Pizza", &["veg"]))
        .unwrap();
    let diavola = menus
        .add_item(menu.id, draft("Diavola", 1400, "Pizza", &["spicy"]))
        .unwrap();
    menus
        .add_item(menu.id, draft("Caprese", 900, "Salads", &["veg"]))
        .unwrap();
    menus
        .update_item(
            menu.id,
            diavola.id,
            &MenuItemPatch {
                is_available: Some(false),
                ..MenuItemPatch::default()
            },
        )
        .unwrap();

    let veg_cheapest_first = menus
        .browse(
            restaurant_id,
            &MenuFilter {
                tag: Some("VEG".to_string()),
                sort: PriceSort::Ascending,
                ..MenuFilter::default()
            },
        )
        .unwrap();
    let names: Vec<&str> = veg_cheapest_first
        .iter()
        .map(|item| item.name.as_str())
        .collect();
    assert_eq!(names, vec!["Caprese", "Margherita"]);

    let available = menus
        .browse(
            restaurant_id,
            &MenuFilter {
                available_only: true,
                ..MenuFilter::default()
            },
        )
        .unwrap();
    assert_eq!(available.len(), 2);

    let searched = menus
        .browse(
            restaurant_id,
            &MenuFilter {
                search: Some("DIAV".to_string()),
                ..MenuFilter::default()
            },
        )
        .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].id, diavola.id);
}

#[test]
fn browse_without_menu_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let restaurants = SqliteRestaurantService::from_connection(&conn).unwrap();
    let restaurant = restaurants.create_restaurant("Empty", "", None).unwrap();
    let menus = SqliteMenuService::from_connection(&conn).unwrap();

    let err = menus
        .browse(restaurant.id, &MenuFilter::default())
        .unwrap_err();
    assert!(matches!(err, MenuServiceError::MenuNotFound(_)));
}
