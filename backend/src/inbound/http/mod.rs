//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.

pub mod auth;
pub mod catalogue;
pub mod dto;
pub mod error;
pub mod health;
pub mod recipes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod short_links;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
