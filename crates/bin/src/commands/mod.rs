//! Command implementations.

pub mod bootstrap;
pub mod logout;
pub mod status;
pub mod stores;
pub mod switch_store;
