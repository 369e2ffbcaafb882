//! # sensorhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `HubRepository`, `DeviceRepository`, `SensorRepository`: CRUD with
//!     cascading deletes
//!   - `ReadingRepository`: append-only batches and time-range queries
//! - Bundle the repositories with a shared write gate ([`store::Store`]) so
//!   every write validates and persists as one indivisible step
//! - Resolve ownership along the Reading → Sensor → Device → Hub chain
//! - Define **driving/inbound ports** as use-case structs: one access-scoped
//!   service per entity type (list, get, update, delete *mine*)
//!
//! ## Dependency rule
//! Depends on `sensorhub-domain` only (plus `tokio::sync` for the write gate).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod store;
