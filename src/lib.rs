pub mod app;
pub mod auth;
pub mod config;
pub mod demo_seeder;
pub mod error;
pub mod install;
pub mod slug;
pub mod tools;
pub mod db {
    pub mod content_store;
    pub mod memory_store;
    pub mod models;
    pub mod settings_repository;
}
pub mod api {
    pub mod errors;
    pub mod links;
    pub mod routes;
}
