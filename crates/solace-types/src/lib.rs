//! Shared record and request types for the Solace journal store.

pub mod api;
pub mod models;
