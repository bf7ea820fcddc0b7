//! Content schemas, schema checks, and data migrations for the scpb content
//! lake (articles, products, team members, export statistics).
pub mod check;
pub mod cli;
pub mod config;
pub mod document;
pub mod migration;
pub mod preview;
pub mod schema;
pub mod store;
