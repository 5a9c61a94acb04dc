//! `assetledger` - A warehouse asset inventory ledger
//!
//! This library provides an append-only ledger of inbound and outbound asset
//! movements stored in SQLite, spreadsheet import and export, and the table
//! view and status line shown to the user.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod ledger;
pub mod logging;
pub mod record;
pub mod session;
pub mod shell;
pub mod transfer;
pub mod view;

pub use config::Config;
pub use error::{Error, Result};
pub use form::{Direction, MovementForm};
pub use ledger::{Ledger, LedgerStats};
pub use logging::init_logging;
pub use record::{AssetRecord, LabelSet};
pub use session::Session;
pub use view::{OutputFormat, Status};
