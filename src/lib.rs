pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod rate_limit;
pub mod redemption;
pub mod sanitize;
pub mod server;
pub mod services;
pub mod tenancy;
pub mod types;
