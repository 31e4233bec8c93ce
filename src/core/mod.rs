//! Core business logic, independent of the HTTP layer.

pub mod access;
pub mod account;
pub mod events;
pub mod ledger;
pub mod localtime;
pub mod location;
pub mod stay;
