//! Data exchanged with the server.

use secrecy::SecretString;
use serde::Deserialize;
use service::domain::{favorite, property, user};

/// Profile of a user.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique name of the user.
    pub username: user::Username,

    /// First name of the user.
    pub first_name: String,

    /// Last name of the user.
    pub last_name: String,

    /// Email of the user.
    pub email: String,

    /// Indicator whether the user is an administrator.
    pub is_admin: bool,
}

/// Data to sign up a new user with.
#[derive(Clone, Debug)]
pub struct NewUser {
    /// Desired unique name.
    pub username: String,

    /// Password to sign in with.
    pub password: SecretString,

    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Email.
    pub email: String,
}

/// Changes to a user profile. Only the provided fields are changed.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    /// New first name.
    pub first_name: Option<String>,

    /// New last name.
    pub last_name: Option<String>,

    /// New email.
    pub email: Option<String>,

    /// New password.
    pub password: Option<SecretString>,
}

/// Property saved into the favorites of a user.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Favorite {
    /// ID of the property.
    pub property_id: property::Id,

    /// Snapshot of the property listing.
    #[serde(flatten)]
    pub attributes: favorite::Attributes,
}

/// Single page of properties found in a location.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Total number of found properties.
    pub total_results: u32,

    /// Total number of pages.
    pub total_pages: u32,

    /// Properties on this page.
    pub properties: Vec<property::Summary>,

    /// Number of this page, starting from `1`.
    pub current_page: u32,

    /// Number of properties on a page.
    pub results_per_page: u32,
}
