//! Repository bundle shared by every service.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Serializes writes across the whole registry.
///
/// A write checks its preconditions (parent exists, key is free) and then
/// persists; holding the gate over both makes the pair indivisible with
/// respect to every other write.
#[derive(Debug, Clone, Default)]
pub struct WriteGate(Arc<Mutex<()>>);

impl WriteGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive write access.
    pub async fn enter(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}

/// The four repositories plus the write gate they share.
pub struct Store<H, D, S, R> {
    pub hubs: Arc<H>,
    pub devices: Arc<D>,
    pub sensors: Arc<S>,
    pub readings: Arc<R>,
    pub write_gate: WriteGate,
}

impl<H, D, S, R> Store<H, D, S, R> {
    /// Bundle the repositories behind a fresh write gate.
    pub fn new(hubs: H, devices: D, sensors: S, readings: R) -> Self {
        Self {
            hubs: Arc::new(hubs),
            devices: Arc::new(devices),
            sensors: Arc::new(sensors),
            readings: Arc::new(readings),
            write_gate: WriteGate::new(),
        }
    }
}

impl<H, D, S, R> Clone for Store<H, D, S, R> {
    fn clone(&self) -> Self {
        Self {
            hubs: Arc::clone(&self.hubs),
            devices: Arc::clone(&self.devices),
            sensors: Arc::clone(&self.sensors),
            readings: Arc::clone(&self.readings),
            write_gate: self.write_gate.clone(),
        }
    }
}
