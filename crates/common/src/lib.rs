// ================
// common/src/lib.rs
// ================
//! Common types and pure helpers
//! shared by the asset registry backend and its binary.
//! Nothing in this crate performs I/O.

use serde::{Deserialize, Serialize};

pub mod money;
pub mod redirect;
pub mod slug;

pub use money::{format_cents, parse_amount, MoneyError, MAX_CENTS};
pub use redirect::is_safe_url;
pub use slug::{candidate, slugify, FALLBACK_SLUG, MAX_SLUG_LENGTH};

/// Which identifying attribute the creation form asks for.
///
/// The registry was born as two deployments: one tracking hardware by
/// serial number, one tracking book value. Both share the same table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetVariant {
    /// A unique serial number is required, the value is optional
    #[default]
    Serial,
    /// A non-negative value is required, the serial number is optional
    Valued,
}

impl AssetVariant {
    pub fn requires_serial_number(self) -> bool {
        self == AssetVariant::Serial
    }

    pub fn requires_value(self) -> bool {
        self == AssetVariant::Valued
    }
}
