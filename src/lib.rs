pub mod annotator;
pub mod collector;
pub mod config;
pub mod error;
pub mod features;
pub mod handler;
pub mod model;
pub mod page;
pub mod routes;
pub mod scorer;
pub mod transport;
pub mod types;
