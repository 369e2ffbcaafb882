//! # sensorhub-domain
//!
//! Pure domain model for the sensorhub IoT registry.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the ownership hierarchy: **Hubs** (owned by a user) contain
//!   **Devices**, which carry **Sensors**, which accumulate **Readings**
//! - Define the **Principal** an operation runs on behalf of
//! - Enforce field invariants and the per-sensor-type value bounds
//!   (the validation engine)
//! - Express create / partial-update / full-update attributes as plain structs
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod kind;
pub mod time;
pub mod update;
pub mod validation;

pub mod device;
pub mod hub;
pub mod principal;
pub mod reading;
pub mod sensor;
