//! Clip discovery against a profile's clips listing page.
//!
//! This crate provides:
//! - The `RenderSession` trait, the contract against the controllable page
//! - A headless-Chrome implementation over CDP
//! - The `ClipLocator` page protocol (period selection, entity enumeration,
//!   overlay inspection)
//! - The persisted CSV ledger handed to the fetch stage

pub mod chrome;
pub mod error;
pub mod ledger;
pub mod locator;
pub mod session;

pub use chrome::ChromeSession;
pub use error::{CollectorError, CollectorResult};
pub use ledger::{ledger_path, read_ledger, write_ledger, LEDGER_HEADER};
pub use locator::{profile_clips_url, ClipLocator};
pub use session::RenderSession;
