use std::sync::Arc;

use crate::value::Value;

/// Swaps one type for another while a graph is written or read.
///
/// A type for which [`surrogate_type`](Self::surrogate_type) returns a path
/// travels over the wire with that type's contract. Writing converts each
/// value with [`to_serializable`](Self::to_serializable); reading converts
/// back with [`from_serializable`](Self::from_serializable). Both are
/// expected to be pure.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use dcs_contract::SerializationSurrogate;
/// use dcs_contract::value::Value;
///
/// /// Sends `geo::Point` values as `"x,y"` strings.
/// struct PointAsText;
///
/// impl SerializationSurrogate for PointAsText {
///     fn surrogate_type(&self, type_path: &str) -> Option<Arc<str>> {
///         (type_path == "geo::Point").then(|| Arc::from("String"))
///     }
///
///     fn to_serializable(&self, value: &Value, _surrogate_type: &str) -> Value {
///         value.clone()
///     }
///
///     fn from_serializable(&self, value: Value, _original_type: &str) -> Value {
///         value
///     }
/// }
///
/// assert!(PointAsText.surrogate_type("geo::Point").is_some());
/// assert!(PointAsText.surrogate_type("geo::Line").is_none());
/// ```
pub trait SerializationSurrogate: Send + Sync {
    /// The type to serialize in place of `type_path`, if any.
    fn surrogate_type(&self, type_path: &str) -> Option<Arc<str>>;

    /// Converts a value of the original type into the surrogate type.
    fn to_serializable(&self, value: &Value, surrogate_type: &str) -> Value;

    /// Converts a read surrogate value back into the original type.
    fn from_serializable(&self, value: Value, original_type: &str) -> Value;
}
