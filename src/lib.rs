// Library root: exposes the index builder for integration tests and
// downstream consumers. The binary entry point is src/main.rs.

pub mod builder;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod logger;
pub mod record;
pub mod store;
