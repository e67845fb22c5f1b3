//! HTTP API handlers for nbmn-web

pub mod auth;
pub mod data;
pub mod feeds;
pub mod health;
pub mod home;
pub mod movies;
pub mod nights;
pub mod overrides;
pub mod people;
