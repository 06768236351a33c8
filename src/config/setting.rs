//! Three-state setting values for provider configuration.
//!
//! Merge and finalize-time defaulting need to tell "never set" apart from
//! "explicitly cleared", so plain `Option` is not enough. A [`Setting`] is
//! either `Unset` or carries a value; optional fields use
//! `Setting<Option<T>>`, where `Value(None)` means "explicitly absent".

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A configuration value that distinguishes "never set" from a set value.
///
/// In YAML, an absent key deserializes to `Unset` (via `#[serde(default)]`
/// on the field), while a present key deserializes to `Value`. For
/// `Setting<Option<T>>` a `null` value becomes `Value(None)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Setting<T> {
    /// The field was never assigned.
    #[default]
    Unset,
    /// The field carries a value (possibly an explicit "absent").
    Value(T),
}

impl<T> Setting<T> {
    /// Returns true if the field was never assigned.
    pub fn is_unset(&self) -> bool {
        matches!(self, Setting::Unset)
    }

    /// Returns true if the field carries a value.
    pub fn is_set(&self) -> bool {
        !self.is_unset()
    }

    /// Returns the contained value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Setting::Unset => None,
            Setting::Value(v) => Some(v),
        }
    }

    /// Replaces an unset field with `default`. Set fields are left alone.
    pub fn set_default(&mut self, default: T) {
        if self.is_unset() {
            *self = Setting::Value(default);
        }
    }

    /// Last-write-wins merge: `other` overrides `self` when set.
    pub fn merged(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        match other {
            Setting::Value(v) => Setting::Value(v.clone()),
            Setting::Unset => self.clone(),
        }
    }
}

impl<T> Setting<Option<T>> {
    /// Flattened accessor: `None` when the field is unset or explicitly absent.
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Setting::Value(Some(v)) => Some(v),
            _ => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Setting<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Setting::Value)
    }
}

impl<T> Serialize for Setting<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Setting::Unset => serializer.serialize_none(),
            Setting::Value(v) => v.serialize(serializer),
        }
    }
}
