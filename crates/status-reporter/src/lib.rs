//! Project status reporter binary support.
//!
//! - [`cli`]: clap definitions
//! - [`commands`]: `serve`, `report` and `view`
//! - [`gmail_auth`]: installed-app OAuth flow that writes the Gmail token file

pub mod cli;
pub mod commands;
pub mod gmail_auth;
