use dineflow_core::db::open_db_in_memory;
use dineflow_core::{
    Cart, CartTotals, Discount, MenuItem, Money, NewMenuItem, OfferServiceError, OfferTarget,
    OrderServiceError, PricingPolicy, SqliteMenuService, SqliteOfferService, SqliteOrderService,
    SqliteRestaurantService, UnitPrice, ValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

struct Seeded {
    restaurant_id: Uuid,
    pizza: MenuItem,
    calzone: MenuItem,
    soda: MenuItem,
}

fn seed(conn: &Connection) -> Seeded {
    let restaurant = SqliteRestaurantService::from_connection(conn)
        .unwrap()
        .create_restaurant("Luigi's", "1 Main St", None)
        .unwrap();
    let menus = SqliteMenuService::from_connection(conn).unwrap();
    let menu = menus.create_menu(restaurant.id, 1).unwrap();
    let add = |name: &str, cents: i64, category: &str| {
        menus
            .add_item(
                menu.id,
                NewMenuItem {
                    name: name.to_string(),
                    price: Money(cents),
                    category: category.to_string(),
                    ..NewMenuItem::default()
                },
            )
            .unwrap()
    };

    Seeded {
        restaurant_id: restaurant.id,
        pizza: add("Margherita", 1000, "Pizza"),
        calzone: add("Calzone", 1500, "Pizza"),
        soda: add("Soda", 250, "Drinks"),
    }
}

#[test]
fn create_offer_requires_existing_target() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let offers = SqliteOfferService::from_connection(&conn).unwrap();

    let target = OfferTarget::Item(Uuid::new_v4());
    let err = offers
        .create_offer(target, Discount::Percent(10), "ghost")
        .unwrap_err();
    assert!(matches!(err, OfferServiceError::TargetNotFound(t) if t == target));
}

#[test]
fn create_offer_rejects_invalid_discounts() {
    let conn = open_db_in_memory().unwrap();
    let seeded = seed(&conn);
    let offers = SqliteOfferService::from_connection(&conn).unwrap();
    let target = OfferTarget::Item(seeded.pizza.id);

    let err = offers
        .create_offer(target, Discount::Percent(0), "nothing")
        .unwrap_err();
    assert!(matches!(
        err,
        OfferServiceError::Validation(ValidationError::PercentOutOfRange(0))
    ));

    let err = offers
        .create_offer(target, Discount::Flat(Money(-100)), "negative")
        .unwrap_err();
    assert!(matches!(
        err,
        OfferServiceError::Validation(ValidationError::NonPositiveFlat(_))
    ));
}

#[test]
fn listing_offers_respects_active_flag() {
    let conn = open_db_in_memory().unwrap();
    let seeded = seed(&conn);
    let offers = SqliteOfferService::from_connection(&conn).unwrap();

    let offer = offers
        .create_offer(
            OfferTarget::Item(seeded.pizza.id),
            Discount::Percent(20),
            "Pizza night",
        )
        .unwrap();
    offers.set_active(offer.id, false).unwrap();

    assert!(offers.offers_for_item(seeded.pizza.id, true).unwrap().is_empty());
    let all = offers.offers_for_item(seeded.pizza.id, false).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Pizza night");
    assert!(!all[0].is_active);
}

#[test]
fn price_book_takes_best_single_offer_per_item() {
    let conn = open_db_in_memory().unwrap();
    let seeded = seed(&conn);
    let offers = SqliteOfferService::from_connection(&conn).unwrap();

    offers
        .create_offer(
            OfferTarget::Category(seeded.pizza.category_id),
            Discount::Percent(10),
            "Pizza week",
        )
        .unwrap();
    offers
        .create_offer(
            OfferTarget::Item(seeded.calzone.id),
            Discount::Flat(Money(300)),
            "Calzone deal",
        )
        .unwrap();
    offers
        .create_offer(
            OfferTarget::Item(seeded.soda.id),
            Discount::Flat(Money(1000)),
            "Free soda",
        )
        .unwrap();

    let book = offers
        .price_book(&[seeded.pizza.clone(), seeded.calzone.clone(), seeded.soda.clone()])
        .unwrap();

    assert_eq!(
        book[&seeded.pizza.id],
        UnitPrice {
            list: Money(1000),
            discount: Money(100)
        }
    );
    // 300 flat beats 10% of 1500.
    assert_eq!(book[&seeded.calzone.id].discount, Money(300));
    // Capped at the list price.
    assert_eq!(book[&seeded.soda.id].discount, Money(250));
    assert_eq!(book[&seeded.soda.id].effective(), Money::ZERO);
}

#[test]
fn quote_prices_cart_with_offers_tax_and_fee() {
    let conn = open_db_in_memory().unwrap();
    let seeded = seed(&conn);
    SqliteOfferService::from_connection(&conn)
        .unwrap()
        .create_offer(
            OfferTarget::Item(seeded.pizza.id),
            Discount::Percent(10),
            "Pizza week",
        )
        .unwrap();
    let orders = SqliteOrderService::from_connection(&conn).unwrap();

    let mut cart = Cart::new();
    cart.set_quantity(seeded.pizza.id, 2).unwrap();
    let totals = orders
        .quote(seeded.restaurant_id, &cart, &PricingPolicy::default())
        .unwrap();

    // taxable 1800 at 8.25% = 148.5, rounded half up.
    assert_eq!(
        totals,
        CartTotals {
            subtotal: Money(2000),
            discount: Money(200),
            tax: Money(149),
            delivery_fee: Money(299),
            total: Money(2248),
        }
    );
}

#[test]
fn quote_of_empty_cart_is_all_zero() {
    let conn = open_db_in_memory().unwrap();
    let seeded = seed(&conn);
    let orders = SqliteOrderService::from_connection(&conn).unwrap();

    let totals = orders
        .quote(seeded.restaurant_id, &Cart::new(), &PricingPolicy::default())
        .unwrap();
    assert_eq!(totals, CartTotals::default());
}

#[test]
fn quote_rejects_items_from_other_menus() {
    let conn = open_db_in_memory().unwrap();
    let seeded = seed(&conn);
    let other = seed(&conn);
    let orders = SqliteOrderService::from_connection(&conn).unwrap();

    let mut cart = Cart::new();
    cart.add(other.pizza.id).unwrap();
    let err = orders
        .quote(seeded.restaurant_id, &cart, &PricingPolicy::default())
        .unwrap_err();
    assert!(matches!(err, OrderServiceError::UnknownItem(id) if id == other.pizza.id));
}

#[test]
fn newer_offers_list_first() {
    let conn = open_db_in_memory().unwrap();
    let seeded = seed(&conn);
    let offers = SqliteOfferService::from_connection(&conn).unwrap();
    let target = OfferTarget::Item(seeded.pizza.id);

    let older = offers
        .create_offer(target, Discount::Percent(10), "lunch")
        .unwrap();
    let newer = offers
        .create_offer(target, Discount::Percent(20), "happy hour")
        .unwrap();
    // Offer timestamps have whole-second resolution.
    conn.execute("UPDATE offers SET created_at = 1000;", []).unwrap();

    let listed = offers.offers_for_item(seeded.pizza.id, false).unwrap();
    let ids = listed.iter().map(|offer| offer.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![newer.id, older.id]);
}
