pub mod error;

pub mod cache;
pub mod client;
pub mod config;
pub mod credentials;
pub mod environment;
pub mod mfa;
pub mod request;
pub mod session;

pub mod cmd;

#[cfg(test)]
pub(crate) mod dev;
