//! Bearer-token identity.
//!
//! Accounts live in an external identity service; this server only
//! verifies the HS256 access tokens it issues and reads the resolved
//! identity from their claims.

pub mod jwt;
