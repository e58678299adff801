//! Client of the CribbUp HTTP JSON API.
//!
//! [`Api`] talks to the server on behalf of a [`Session`], whose token is
//! kept in memory and persisted into a [`TokenStorage`]. [`SessionContext`]
//! tracks the signed in user, while [`Search`], [`FavoriteToggle`] and
//! [`Notices`] carry the state of the views built on top of them.

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod context;
pub mod error;
pub mod favorite;
#[cfg(test)]
mod fixture;
pub mod model;
pub mod notice;
pub mod search;
pub mod session;
pub mod storage;
pub mod token;

pub use self::{
    api::Api,
    context::{Access, SessionContext, State},
    error::Error,
    favorite::FavoriteToggle,
    notice::{Notice, Notices},
    search::Search,
    session::Session,
    storage::{FileStorage, MemoryStorage, TokenStorage},
};
