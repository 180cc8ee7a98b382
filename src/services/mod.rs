//! Server-side services.

pub mod dashboard;
