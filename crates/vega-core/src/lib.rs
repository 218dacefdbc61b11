//! Core library for Vega Video.
//!
//! Contains the avatar catalog, the script source, the three-step creation
//! wizard, and the client for the lip-sync video vendor. This crate knows
//! nothing about HTTP serving or terminals; the server and CLI drive the
//! [`wizard::Wizard`] through its public operations.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use vega_core::cancel::CancelToken;
//! use vega_core::catalog::Catalog;
//! use vega_core::client::LipsyncClient;
//! use vega_core::config::GenerationSettings;
//! use vega_core::script::PlaceholderScript;
//! use vega_core::wizard::Wizard;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = GenerationSettings::from_env();
//! let client = LipsyncClient::new(&settings)?;
//!
//! let mut wizard = Wizard::new(Arc::new(Catalog::builtin()));
//! wizard.select_avatar(1)?;
//! wizard.advance_to_script()?;
//! wizard.use_generated_script(&PlaceholderScript)?;
//!
//! let status = wizard
//!     .generate(&settings.defaults, &client, &CancelToken::never())
//!     .await?;
//! println!("{}", status.headline());
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod generation;
pub mod script;
pub mod wizard;

#[cfg(test)]
mod testing;
