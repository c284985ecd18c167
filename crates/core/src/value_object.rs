//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; two
/// instances with the same values are the same value. A `FeeBreakdown` of
/// `{ fee: 25, net: 475 }` is a value object; a `Listing` with an id is an
/// entity.
///
/// To "modify" a value object, construct a new one. The trait bounds keep
/// implementations cheap to copy and easy to assert on in tests.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
