pub mod headers;

pub mod http_client;

pub mod model;

#[cfg(test)]
pub(crate) mod fake;
