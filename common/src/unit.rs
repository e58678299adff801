//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an issuance of something time-boxed.
#[derive(Clone, Copy, Debug)]
pub struct Issuance;

/// Marker type describing an expiration of something time-boxed.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
