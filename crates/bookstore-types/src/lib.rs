//! bookstore-types: domain model and outbound ports shared by every crate.

pub mod domain;
pub mod ports;
