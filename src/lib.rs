pub mod competition;
pub mod config;
pub mod export;
pub mod feed;
pub mod http_cache;
pub mod http_client;
pub mod loader;
pub mod logging;
pub mod model;
pub mod names;
pub mod persist;
pub mod provider;
pub mod score;
pub mod standings;
pub mod state;
pub mod validate;
pub mod view;
