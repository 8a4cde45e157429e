//! ThemTube catalog store
//!
//! User and video records live in PostgreSQL. Handlers and the ingestion
//! pipeline depend on the `UserStore` / `VideoCatalog` traits so they can also
//! run against the in-memory store in tests.

pub mod db;

pub use db::*;
