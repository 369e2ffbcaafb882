//! Update semantics shared by hubs, devices, and sensors.

use crate::error::ValidationError;

/// How a set of changes is applied to an existing entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Only supplied fields change; everything else is preserved.
    Partial,
    /// Every required field must be supplied. Optional fields that are not
    /// supplied keep their current value.
    Full,
}

impl UpdateMode {
    /// Enforce presence of a required field under this mode.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when `value` is `None` in
    /// [`UpdateMode::Full`].
    pub fn require<T>(self, value: Option<T>, field: &'static str) -> Result<Option<T>, ValidationError> {
        match (self, value) {
            (Self::Full, None) => Err(ValidationError::MissingField(field)),
            (_, value) => Ok(value),
        }
    }
}
