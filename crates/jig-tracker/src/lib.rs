//! Command-line front end for tester jig tracking

pub mod alert;
pub mod app;
pub mod config;
pub mod docs;
pub mod download;
pub mod history;
pub mod recommend;
pub mod render;
pub mod search;
pub mod session;
pub mod shortage;
pub mod store;
