//! Feedwire library exports for testing

pub mod api;
pub mod core;
pub mod dom;
pub mod host;
pub mod script;

#[cfg(test)]
pub mod test_support;
