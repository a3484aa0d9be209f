//! Client library for the Daxko Operations partner API: OAuth2 token
//! grants, single-sign-on redirect registration, and generic REST
//! dispatch.

pub mod auth;
pub mod config;
pub mod error;
pub mod rest;
pub mod services;

pub use config::PartnerCredentials;
pub use error::{Error, Result};
pub use reqwest::{Method, StatusCode};

pub(crate) const USER_AGENT: &str = "daxko-rs/0.1.0";
