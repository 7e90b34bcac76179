//! Organization (tenant) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use netbill_core::{CoreError, CoreResult, OrganizationId, UserId};

/// Kind of business entity an organization represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgType {
    Isp,
    Corporate,
    Reseller,
    SubReseller,
    Other,
}

/// Revenue-sharing percentages for the reseller hierarchy.
///
/// Validation only — the split computation itself lives with billing, not
/// here. Percentages partition the amount at each hierarchy level, so the
/// with-sub shares may not exceed 100 combined (the remainder is the
/// sub-reseller's).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueShareConfig {
    pub enabled: bool,
    /// Reseller share when no sub-reseller is involved.
    pub reseller_share: f64,
    /// Sub-reseller share of its own customers.
    pub sub_reseller_share: f64,
    /// Platform share when a sub-reseller is in the chain.
    pub platform_share_with_sub: f64,
    /// Reseller share when a sub-reseller is in the chain.
    pub reseller_share_with_sub: f64,
}

impl RevenueShareConfig {
    pub fn validate(&self) -> CoreResult<()> {
        let percentages = [
            ("reseller_share", self.reseller_share),
            ("sub_reseller_share", self.sub_reseller_share),
            ("platform_share_with_sub", self.platform_share_with_sub),
            ("reseller_share_with_sub", self.reseller_share_with_sub),
        ];
        for (field, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(CoreError::validation(format!(
                    "{field} must be between 0 and 100"
                )));
            }
        }
        if self.platform_share_with_sub + self.reseller_share_with_sub > 100.0 {
            return Err(CoreError::validation(
                "with-sub shares exceed 100 percent; no remainder for the sub-reseller",
            ));
        }
        Ok(())
    }
}

impl Default for RevenueShareConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reseller_share: 50.0,
            sub_reseller_share: 45.0,
            platform_share_with_sub: 50.0,
            reseller_share_with_sub: 5.0,
        }
    }
}

/// Canonical tenant record. Soft-deleted via `is_active`; never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    /// Unique short code, uppercase (e.g. `KTL`, `DHKRES01`).
    pub code: String,
    pub name: String,
    pub org_type: OrgType,
    pub email: String,
    pub phone: String,
    pub mobile: Option<String>,
    pub website: Option<String>,
    pub address: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub country: String,
    pub revenue_share: RevenueShareConfig,
    pub is_active: bool,
    /// One-way transition; set by a super admin, never cleared.
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

impl Organization {
    pub fn summary(&self) -> OrganizationSummary {
        OrganizationSummary {
            id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
            org_type: self.org_type,
            is_active: self.is_active,
            is_verified: self.is_verified,
        }
    }
}

/// Wire projection served to the other service by the exists endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: OrganizationId,
    pub code: String,
    pub name: String,
    pub org_type: OrgType,
    pub is_active: bool,
    pub is_verified: bool,
}

/// Fields required to create an organization.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrganization {
    pub code: String,
    pub name: String,
    pub org_type: OrgType,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub country: String,
    #[serde(default)]
    pub revenue_share: Option<RevenueShareConfig>,
    #[serde(default)]
    pub created_by: Option<UserId>,
}

/// Organization codes: uppercase letters, digits, underscores, hyphens.
pub fn validate_code(code: &str) -> CoreResult<()> {
    if code.is_empty() || code.len() > 20 {
        return Err(CoreError::validation(
            "organization code must be 1-20 characters",
        ));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(CoreError::validation(
            "organization code must contain only uppercase letters, numbers, underscores, and hyphens",
        ));
    }
    Ok(())
}
