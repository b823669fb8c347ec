pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod ops;
pub mod session;
pub mod startup;
pub mod store;
pub mod utils;
