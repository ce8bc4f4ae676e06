pub mod config;
pub mod db;
pub mod entities;
pub mod handler;
pub mod openapi;
pub mod repo;
pub mod schema;
pub mod service;
pub mod state;
pub mod telemetry;
