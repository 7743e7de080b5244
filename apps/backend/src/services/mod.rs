pub mod analytics;
pub mod auth;
pub mod durability;
pub mod notify;
pub mod search;
