pub mod commands;
pub mod error;
pub mod models;
pub mod session;
pub mod store;
pub mod validate;
