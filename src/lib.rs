//! Enrollment site for the Solarys sports club: a public landing page where
//! students pick a team and enroll, and a password-protected dashboard where
//! the club reviews and removes enrollments.

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod admin;
pub mod auth;
pub mod backend;
pub mod config;
pub mod enrollments;
pub mod landing;
pub mod msg;
pub mod schema;
pub mod settings;
pub mod state;
pub mod template;
pub mod util_resp;
pub mod validation;
pub mod widgets;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[cfg(test)]
mod test;
