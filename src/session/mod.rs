pub mod auth;

pub mod cookies;

pub mod interface;

pub mod manager;

#[allow(clippy::module_inception)]
pub(crate) mod session;
