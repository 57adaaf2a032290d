//! # Registrar CLI
//!
//! Administrative tools for the Registrar API: account creation and demo
//! data seeding.
//!
//! ```ignore
//! use registrar_cli::seeder::{seed_all, SeedConfig};
//!
//! let summary = seed_all(&pool, SeedConfig::default()).await?;
//! ```

pub mod accounts;
pub mod seeder;
