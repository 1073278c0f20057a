pub mod accounts;
pub mod api;
pub mod backend;
pub mod catalog;
pub mod client;
pub mod config;
pub mod domain;
pub mod event_sourcing;
pub mod metrics;
pub mod models;
