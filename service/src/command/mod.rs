//! [`Command`] definition.

pub mod add_favorite;
pub mod authorize_user_session;
pub mod create_user;
pub mod create_user_session;
pub mod remove_favorite;
pub mod update_user_profile;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_favorite::AddFavorite, authorize_user_session::AuthorizeUserSession,
    create_user::CreateUser, create_user_session::CreateUserSession,
    remove_favorite::RemoveFavorite, update_user_profile::UpdateUserProfile,
};
