pub mod config;
pub mod db;
pub mod dispatch;
pub mod dto;
pub mod entity;
pub mod error;
pub mod filters;
pub mod jobs;
pub mod migration;
pub mod models;
pub mod money;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
