//! Domain definitions.

pub mod favorite;
pub mod property;
pub mod user;

pub use self::{favorite::Favorite, user::User};
