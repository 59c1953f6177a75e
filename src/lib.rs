#![warn(missing_docs)]
//! Galtick watches the community-run Elite Dangerous galaxy tick feed and
//! announces new ticks to a Discord channel.

pub mod bot;
pub mod config;
pub mod dispatch;
pub mod http_client;
pub mod models;
pub mod monitor;
pub mod notification;
pub mod providers;
