// Library for tests to access modules

pub mod adapter;
pub mod config;
pub mod error;
pub mod models;
pub mod permission;
pub mod presentation;
pub mod routes;
pub mod scanner;
pub mod session;
pub mod store;
pub mod version;
pub mod workflow;
