pub mod config;
pub mod credentials;
pub mod errors;
pub mod models;
pub mod providers;
pub mod tools;
