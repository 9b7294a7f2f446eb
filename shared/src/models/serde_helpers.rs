//! Common serde helpers for rows coming back from the table service
//!
//! The hosted tables return `null` for unset array/bool columns, so list
//! fields tolerate both a missing key and an explicit null.

use serde::{Deserialize, Deserializer};

/// Deserialize a value that treats null as `Default::default()`
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Distinguish an absent field from an explicit `null` in partial updates.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]` on an
/// `Option<Option<T>>`: missing key -> `None`, `null` -> `Some(None)`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
