//! Role hierarchy as an ordered integer scale.
//!
//! Lower value = more authority. Comparisons are numeric and total-order;
//! nothing compares role names.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleLevel(u8);

impl RoleLevel {
    pub const SUPER_ADMIN: RoleLevel = RoleLevel(1);
    pub const ADMIN: RoleLevel = RoleLevel(2);
    pub const RESELLER: RoleLevel = RoleLevel(3);
    pub const SUB_RESELLER: RoleLevel = RoleLevel(4);
    pub const CUSTOMER: RoleLevel = RoleLevel(5);

    pub const fn new(level: u8) -> Self {
        Self(level)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// True when this level carries at least the authority of `threshold`
    /// (numerically `<=`).
    pub const fn at_least(self, threshold: RoleLevel) -> bool {
        self.0 <= threshold.0
    }
}

impl core::fmt::Display for RoleLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_ordering_is_inverted_from_the_integer() {
        assert!(RoleLevel::SUPER_ADMIN.at_least(RoleLevel::ADMIN));
        assert!(RoleLevel::ADMIN.at_least(RoleLevel::ADMIN));
        assert!(!RoleLevel::CUSTOMER.at_least(RoleLevel::RESELLER));
    }
}
