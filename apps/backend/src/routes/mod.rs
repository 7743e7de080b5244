pub mod account;
pub mod admin;
pub mod answers;
pub mod auth;
pub mod content;
pub mod progress;
pub mod search;
pub mod users;
