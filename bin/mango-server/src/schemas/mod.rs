//! Request / response bodies of the HTTP API.

pub mod admin;
pub mod chat;
pub mod knowledge;
