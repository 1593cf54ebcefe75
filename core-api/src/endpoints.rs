//! Endpoint catalog for the restaurant client API.
//!
//! Paths are relative to the configured base URL and joined by the
//! pipeline at dispatch time.

// Auth
pub const AUTH_LOGIN: &str = "/restaurants/v1/client/auth/login";
pub const AUTH_LOGOUT: &str = "/restaurants/v1/client/auth/logout";
pub const AUTH_PROFILE: &str = "/restaurants/v1/client/auth/profile";
pub const AUTH_REGISTER: &str = "/restaurants/v1/client/auth/register";
pub const AUTH_RESET_PASSWORD: &str = "/restaurants/v1/client/auth/reset-password";
pub const AUTH_CHANGE_PASSWORD: &str = "/restaurants/v1/client/auth/change-password";
pub const AUTH_UPDATE_PROFILE: &str = "/restaurants/v1/client/auth/update-profile";
pub const AUTH_REFRESH_TOKEN: &str = "/restaurants/v1/client/auth/refresh-token";

// Branch
pub const BRANCH: &str = "/restaurants/v1/client/branch";

pub fn branch(id: &str) -> String {
    format!("/restaurants/v1/client/branch/{}", id)
}

// Item
pub const ITEM: &str = "/restaurants/v1/client/item";
pub const ITEM_BEST_SELLER: &str = "/restaurants/v1/client/item/best-seller";

pub fn item(id: &str) -> String {
    format!("/restaurants/v1/client/item/{}", id)
}

// Cart
pub const CART_ME: &str = "/restaurants/v1/client/cart/me";

// Order
pub const ORDER: &str = "/restaurants/v1/client/order";
pub const ORDER_ME: &str = "/restaurants/v1/client/order/me";

pub fn order(id: &str) -> String {
    format!("/restaurants/v1/client/order/{}", id)
}

// Notification
pub const NOTIFICATION_RECEIVED: &str = "/restaurants/v1/client/notification/received";

pub fn notification(id: &str) -> String {
    format!("/restaurants/v1/client/notification/{}", id)
}

// Health check
pub const HEALTH_ROOT: &str = "/restaurants/v1";
pub const HEALTH_SERVICES: &str = "/restaurants/v1/health";
