//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (database)
//!
//! # Auth (strict rate limit)
//! POST /api/auth/register              - Create an account
//! POST /api/auth/login                 - Login
//! POST /api/auth/logout                - Logout (destroys the session)
//!
//! # Profile (requires auth)
//! GET  /api/users/me                   - Current profile
//! PUT  /api/users/update-profile/{id}  - Partial profile update
//! PUT  /api/users/upload-profile-pic   - Upload/replace picture (multipart)
//! DELETE /api/users/remove-profile-pic - Remove picture
//! DELETE /api/users/delete-account     - Delete account
//! POST /api/users/add-address          - Set the full address
//! PUT  /api/users/update-address       - Edit the address (merge)
//! PATCH /api/users/add-phone           - Set the phone number
//!
//! # Admin password reset (strict rate limit, unauthenticated)
//! POST /api/admin/forgot-password      - Issue a reset code
//! POST /api/admin/verify-otp           - Verify the code
//! POST /api/admin/reset-password       - Set the new password
//!
//! # Cart (session-scoped)
//! GET  /api/cart                       - Current cart with totals
//! POST /api/cart/add                   - Add an item
//! POST /api/cart/update                - Increase/decrease a line quantity
//! POST /api/cart/remove                - Remove a line
//! POST /api/cart/clear                 - Empty the cart
//!
//! # Contact
//! POST /api/contact/contact-us         - Store a contact message
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod profile;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::services::avatar::MAX_AVATAR_BYTES;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(profile::me))
        .route("/update-profile/{id}", put(profile::update_profile))
        .route(
            "/upload-profile-pic",
            put(profile::upload_profile_pic)
                // Multipart body cap; the store enforces the same limit
                .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + 16 * 1024)),
        )
        .route("/remove-profile-pic", delete(profile::remove_profile_pic))
        .route("/delete-account", delete(profile::delete_account))
        .route("/add-address", post(profile::add_address))
        .route("/update-address", put(profile::update_address))
        .route("/add-phone", patch(profile::add_phone))
}

/// Create the admin password-reset routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/forgot-password", post(admin::forgot_password))
        .route("/verify-otp", post(admin::verify_otp))
        .route("/reset-password", post(admin::reset_password))
        .layer(auth_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the contact routes router.
pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/contact-us", post(contact::contact_us))
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/admin", admin_routes())
        .nest(
            "/api",
            Router::new()
                .nest("/users", profile_routes())
                .nest("/cart", cart_routes())
                .nest("/contact", contact_routes())
                .layer(api_rate_limiter()),
        )
}
