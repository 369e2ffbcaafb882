//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.
//! All of them share one [`Store`](crate::store::Store), so ownership checks and
//! the write gate see the same repositories.

pub mod device_service;
pub mod hub_service;
pub mod ownership;
pub mod reading_service;
pub mod sensor_service;

#[cfg(test)]
pub(crate) mod test_support;
