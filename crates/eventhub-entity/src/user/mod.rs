//! User profile as read from the auth collaborator's table.

pub mod profile;

pub use profile::UserProfile;
