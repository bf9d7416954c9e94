use axum::{extract::State, http::StatusCode, response::IntoResponse};
use dineflow_core::{
    Cart, CartLine, Discount, MenuFilter, MenuItemPatch, NewMenuItem, OfferTarget, Order,
    OrderListQuery, OrderStatus, SqliteMenuService, SqliteOfferService, SqliteOrderService,
    SqliteRestaurantService, UnknownStatus, step_of,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    error::AppError,
    extract::{Json, Path, Query},
    state::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurant {
    name: String,
    #[serde(default)]
    address: String,
    phone: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRestaurantOpen {
    is_open: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenu {
    restaurant_id: Uuid,
    #[serde(default)]
    version: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOffer {
    target: OfferTarget,
    discount: Discount,
    #[serde(default)]
    title: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOfferActive {
    is_active: bool,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferListParams {
    active_only: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    restaurant_id: Uuid,
    #[serde(default)]
    lines: Vec<CartLine>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    restaurant_id: Uuid,
    #[serde(default)]
    lines: Vec<CartLine>,
    note: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderListParams {
    restaurant_id: Option<Uuid>,
    status: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    status: String,
}

/// Order plus its progress step, `-1` when cancelled.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    order: Order,
    step_index: i32,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let step_index = step_of(order.status).as_index();
        Self { order, step_index }
    }
}

fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
    raw.parse()
        .map_err(|err: UnknownStatus| AppError::BadRequest(err.to_string()))
}

pub async fn create_restaurant_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateRestaurant>,
) -> Result<impl IntoResponse, AppError> {
    let restaurant = state
        .run(move |conn| {
            let service = SqliteRestaurantService::from_connection(conn)?;
            Ok(service.create_restaurant(payload.name, payload.address, payload.phone)?)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(restaurant)))
}

pub async fn get_restaurant_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let restaurant = state
        .run(move |conn| {
            SqliteRestaurantService::from_connection(conn)?
                .get_restaurant(id)?
                .ok_or_else(|| AppError::NotFound(format!("restaurant not found: {id}")))
        })
        .await?;

    Ok(Json(restaurant))
}

pub async fn list_restaurants_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let restaurants = state
        .run(|conn| Ok(SqliteRestaurantService::from_connection(conn)?.list_restaurants()?))
        .await?;

    Ok(Json(restaurants))
}

/// Closed restaurants keep serving their menu but reject new orders.
pub async fn set_restaurant_open_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRestaurantOpen>,
) -> Result<impl IntoResponse, AppError> {
    let restaurant = state
        .run(move |conn| {
            let service = SqliteRestaurantService::from_connection(conn)?;
            Ok(service.set_open(id, payload.is_open)?)
        })
        .await?;

    Ok(Json(restaurant))
}

pub async fn create_menu_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateMenu>,
) -> Result<impl IntoResponse, AppError> {
    let menu = state
        .run(move |conn| {
            let service = SqliteMenuService::from_connection(conn)?;
            Ok(service.create_menu(payload.restaurant_id, payload.version)?)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(menu)))
}

pub async fn get_menu_handler(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let menu = state
        .run(move |conn| {
            let service = SqliteMenuService::from_connection(conn)?;
            Ok(service.get_menu_for_restaurant(restaurant_id)?)
        })
        .await?;

    Ok(Json(menu))
}

/// Browse view: `?category=&search=&tag=&availableOnly=&sort=ascending|descending`.
pub async fn browse_menu_handler(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Query(filter): Query<MenuFilter>,
) -> Result<impl IntoResponse, AppError> {
    let items = state
        .run(move |conn| {
            let service = SqliteMenuService::from_connection(conn)?;
            Ok(service.browse(restaurant_id, &filter)?)
        })
        .await?;

    Ok(Json(items))
}

pub async fn add_item_handler(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
    Json(payload): Json<NewMenuItem>,
) -> Result<impl IntoResponse, AppError> {
    let item = state
        .run(move |conn| {
            let service = SqliteMenuService::from_connection(conn)?;
            Ok(service.add_item(menu_id, payload)?)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Fields missing from the body keep their stored value.
pub async fn update_item_handler(
    State(state): State<AppState>,
    Path((menu_id, item_id)): Path<(Uuid, Uuid)>,
    Json(patch): Json<MenuItemPatch>,
) -> Result<impl IntoResponse, AppError> {
    let item = state
        .run(move |conn| {
            let service = SqliteMenuService::from_connection(conn)?;
            Ok(service.update_item(menu_id, item_id, &patch)?)
        })
        .await?;

    Ok(Json(item))
}

pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path((menu_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    state
        .run(move |conn| {
            let service = SqliteMenuService::from_connection(conn)?;
            Ok(service.delete_item(menu_id, item_id)?)
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_offer_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateOffer>,
) -> Result<impl IntoResponse, AppError> {
    let offer = state
        .run(move |conn| {
            let service = SqliteOfferService::from_connection(conn)?;
            Ok(service.create_offer(payload.target, payload.discount, payload.title)?)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(offer)))
}

pub async fn set_offer_active_handler(
    State(state): State<AppState>,
    Path(offer_id): Path<Uuid>,
    Json(payload): Json<SetOfferActive>,
) -> Result<impl IntoResponse, AppError> {
    state
        .run(move |conn| {
            let service = SqliteOfferService::from_connection(conn)?;
            Ok(service.set_active(offer_id, payload.is_active)?)
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn item_offers_handler(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Query(params): Query<OfferListParams>,
) -> Result<impl IntoResponse, AppError> {
    let offers = state
        .run(move |conn| {
            let service = SqliteOfferService::from_connection(conn)?;
            Ok(service.offers_for_item(item_id, params.active_only)?)
        })
        .await?;

    Ok(Json(offers))
}

pub async fn category_offers_handler(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Query(params): Query<OfferListParams>,
) -> Result<impl IntoResponse, AppError> {
    let offers = state
        .run(move |conn| {
            let service = SqliteOfferService::from_connection(conn)?;
            Ok(service.offers_for_category(category_id, params.active_only)?)
        })
        .await?;

    Ok(Json(offers))
}

pub async fn quote_handler(
    State(state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pricing = state.pricing;
    let totals = state
        .run(move |conn| {
            let cart = Cart::from_lines(&payload.lines)?;
            let service = SqliteOrderService::from_connection(conn)?;
            Ok(service.quote(payload.restaurant_id, &cart, &pricing)?)
        })
        .await?;

    Ok(Json(totals))
}

pub async fn place_order_handler(
    State(state): State<AppState>,
    Json(payload): Json<PlaceOrder>,
) -> Result<impl IntoResponse, AppError> {
    let pricing = state.pricing;
    let order = state
        .run(move |conn| {
            let cart = Cart::from_lines(&payload.lines)?;
            let service = SqliteOrderService::from_connection(conn)?;
            Ok(service.place_order(payload.restaurant_id, &cart, &pricing, payload.note)?)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(OrderView::from(order))))
}

pub async fn get_order_handler(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = state
        .run(move |conn| {
            let service = SqliteOrderService::from_connection(conn)?;
            Ok(service.get_order(order_id)?)
        })
        .await?;

    Ok(Json(OrderView::from(order)))
}

/// Kitchen list, newest first.
pub async fn list_orders_handler(
    State(state): State<AppState>,
    Query(params): Query<OrderListParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = OrderListQuery {
        restaurant_id: params.restaurant_id,
        status: params.status.as_deref().map(parse_status).transpose()?,
        limit: params.limit,
        offset: params.offset.unwrap_or(0),
    };
    let orders = state
        .run(move |conn| {
            let service = SqliteOrderService::from_connection(conn)?;
            Ok(service.list_by_status(&query)?)
        })
        .await?;

    Ok(Json(
        orders.into_iter().map(OrderView::from).collect::<Vec<_>>(),
    ))
}

pub async fn update_status_handler(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<StatusUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let next = parse_status(&payload.status)?;
    let order = state
        .run(move |conn| {
            let service = SqliteOrderService::from_connection(conn)?;
            Ok(service.update_status(order_id, next)?)
        })
        .await?;

    Ok(Json(OrderView::from(order)))
}

pub async fn cancel_order_handler(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = state
        .run(move |conn| {
            let service = SqliteOrderService::from_connection(conn)?;
            Ok(service.cancel(order_id)?)
        })
        .await?;

    Ok(Json(OrderView::from(order)))
}
