//! Cart route handlers.
//!
//! The cart lives entirely in the server-side session; every handler loads
//! the snapshot, applies one reducer from [`bakehouse_core::cart`], stores
//! the result, and echoes the full cart back so the frontend never has to
//! recompute totals.

use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use bakehouse_core::Price;
use bakehouse_core::cart::{Cart, CartItem, CartTotals, CustomCakeSpec};

use crate::error::{AppError, Result};
use crate::models::session_keys;
use crate::routes::auth::session_error;

/// Form for adding an item.
///
/// Catalogue items carry their product `id`; custom cakes omit it and get a
/// fresh line id so two custom cakes never merge.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub price: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub custom: Option<CustomCakeSpec>,
}

const fn default_quantity() -> u32 {
    1
}

/// Form for changing a line quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityForm {
    pub id: String,
    pub direction: QuantityDirection,
}

/// Which way to move a line quantity.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityDirection {
    Increase,
    Decrease,
}

/// Form for removing a line.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub id: String,
}

/// Full cart echoed back after every operation.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub totals: CartTotals,
}

impl CartResponse {
    fn from_cart(cart: &Cart) -> Self {
        Self {
            success: true,
            items: cart.items().to_vec(),
            item_count: cart.item_count(),
            totals: cart.totals(),
        }
    }
}

/// Load the cart snapshot from the session; a missing key is an empty cart.
async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get(session_keys::CART)
        .await
        .map_err(session_error)?
        .unwrap_or_default())
}

/// Store the cart snapshot back into the session.
async fn store_cart(session: &Session, cart: &Cart) -> Result<()> {
    session
        .insert(session_keys::CART, cart)
        .await
        .map_err(session_error)
}

/// Show the current cart.
///
/// GET /api/cart
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartResponse>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartResponse::from_cart(&cart)))
}

/// Add an item to the cart.
///
/// POST /api/cart/add
#[instrument(skip(session, form), fields(name = %form.name))]
pub async fn add(session: Session, Json(form): Json<AddToCartForm>) -> Result<Json<CartResponse>> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Item name is required".to_owned()));
    }
    if form.price.is_sign_negative() {
        return Err(AppError::BadRequest("Price cannot be negative".to_owned()));
    }
    if form.quantity == 0 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_owned(),
        ));
    }

    let id = match (&form.id, &form.custom) {
        // Custom cakes always get a fresh line id
        (_, Some(_)) => format!("custom-{}", chrono::Utc::now().timestamp_millis()),
        (Some(id), None) if !id.trim().is_empty() => id.trim().to_owned(),
        _ => return Err(AppError::BadRequest("Item id is required".to_owned())),
    };

    let item = CartItem {
        id,
        name: name.to_owned(),
        unit_price: Price::new(form.price),
        quantity: form.quantity,
        custom: form.custom,
    };

    let cart = load_cart(&session).await?.add(item);
    store_cart(&session, &cart).await?;

    Ok(Json(CartResponse::from_cart(&cart)))
}

/// Bump a line quantity up or down.
///
/// POST /api/cart/update
#[instrument(skip(session, form), fields(id = %form.id))]
pub async fn update(
    session: Session,
    Json(form): Json<UpdateQuantityForm>,
) -> Result<Json<CartResponse>> {
    let cart = load_cart(&session).await?;
    let cart = match form.direction {
        QuantityDirection::Increase => cart.increase_qty(&form.id),
        QuantityDirection::Decrease => cart.decrease_qty(&form.id),
    };
    store_cart(&session, &cart).await?;

    Ok(Json(CartResponse::from_cart(&cart)))
}

/// Remove a line from the cart.
///
/// POST /api/cart/remove
#[instrument(skip(session, form), fields(id = %form.id))]
pub async fn remove(session: Session, Json(form): Json<RemoveForm>) -> Result<Json<CartResponse>> {
    let cart = load_cart(&session).await?.remove(&form.id);
    store_cart(&session, &cart).await?;

    Ok(Json(CartResponse::from_cart(&cart)))
}

/// Empty the cart.
///
/// POST /api/cart/clear
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartResponse>> {
    let cart = load_cart(&session).await?.clear();
    store_cart(&session, &cart).await?;

    Ok(Json(CartResponse::from_cart(&cart)))
}
