pub mod codec;
pub mod config;
pub mod domain;
pub mod messaging;
pub mod metrics;
pub mod pipeline;
pub mod schema;
pub mod server;
pub mod utils;
