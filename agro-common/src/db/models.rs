//! Database models

use serde::{Deserialize, Serialize};

/// A registered farmer account, minus its credentials
///
/// `identifier` is the mobile number entered at registration and is the
/// primary key of the `accounts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub identifier: String,
    pub display_name: String,
}
