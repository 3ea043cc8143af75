//! Database access for agro-ui

pub mod accounts;
pub mod legacy;

pub use accounts::{authenticate, find_account, register};
pub use legacy::import_legacy_accounts;
