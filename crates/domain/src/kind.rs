//! The four entity types of the registry hierarchy.

use std::fmt;

/// Which level of the User → Hub → Device → Sensor → Reading tree an
/// identifier or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Hub,
    Device,
    Sensor,
    Reading,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hub => "hub",
            Self::Device => "device",
            Self::Sensor => "sensor",
            Self::Reading => "reading",
        })
    }
}
