pub mod analytics;
pub mod backend;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod elo;
pub mod export;
pub mod football_api;
pub mod http_cache;
pub mod http_client;
pub mod logging;
pub mod model;
pub mod odds;
pub mod pnl;
pub mod store;
pub mod sync;
pub mod value_bets;
