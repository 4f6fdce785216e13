//! Request extractors applied ahead of handlers.

pub mod auth;
