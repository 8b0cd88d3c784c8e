//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the approval
//! engine. These fixtures are designed to be consistent and predictable for
//! unit tests.

use std::collections::HashMap;

use chrono::{Days, NaiveDate, Utc};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use core_kernel::{Currency, FiscalYear, Money, TenantId, Timezone};
use domain_approval::compliance::{CategoryPolicy, TenantPolicyConfig};
use domain_approval::skip_rules::EmployeeContext;
use domain_approval::state_machine::AutoApprovalConfig;

/// Category codes used throughout the test suite
pub static TEST_CATEGORIES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["travel", "meals", "accommodation", "office_supplies"]);

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A small amount comfortably inside every limit
    pub fn inr_small() -> Money {
        Money::new(dec!(450.00), Currency::INR)
    }

    /// An amount above typical auto-approval limits but within policy
    pub fn inr_large() -> Money {
        Money::new(dec!(6000.00), Currency::INR)
    }

    /// An amount above the category policy limit
    pub fn inr_over_limit() -> Money {
        Money::new(dec!(25000.00), Currency::INR)
    }

    /// A zero amount for checking-state scenarios
    pub fn inr_zero() -> Money {
        Money::zero(Currency::INR)
    }

    /// A USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for dates relative to the test run
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A claim date a few days back, always inside a 30-day window
    pub fn recent_claim_date() -> NaiveDate {
        Utc::now().date_naive() - Days::new(4)
    }

    /// A claim date well beyond any submission window
    pub fn stale_claim_date() -> NaiveDate {
        Utc::now().date_naive() - Days::new(120)
    }
}

/// Fixture for tenant configuration
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Policy config with limits on every test category
    pub fn standard_policy() -> TenantPolicyConfig {
        let mut categories = HashMap::new();
        for name in TEST_CATEGORIES.iter() {
            categories.insert(
                name.to_string(),
                CategoryPolicy {
                    max_amount: Some(dec!(10000)),
                    submission_window_days: Some(30),
                    requires_documents: false,
                },
            );
        }
        TenantPolicyConfig {
            categories,
            approved_vendors: vec![
                "City Cabs".to_string(),
                "Grand Hotel".to_string(),
                "Corner Bistro".to_string(),
            ],
            fiscal_year: FiscalYear::starting_in(1).expect("valid start month"),
            timezone: Timezone::default(),
        }
    }

    /// Auto-approval enabled with permissive thresholds
    pub fn permissive_auto_approval() -> AutoApprovalConfig {
        AutoApprovalConfig {
            enabled: true,
            ai_threshold: 85,
            compliance_threshold: 70,
            max_amount: dec!(5000),
            auto_skip_after_manager: false,
        }
    }

    /// A director-level employee context for skip rule tests
    pub fn director_context() -> EmployeeContext {
        EmployeeContext {
            employee_id: None,
            email: Some("director@example.test".to_string()),
            designation: Some("director".to_string()),
        }
    }
}

/// A stable tenant id for tests that do not care about isolation
pub fn shared_test_tenant() -> TenantId {
    static TENANT: Lazy<TenantId> = Lazy::new(TenantId::new);
    *TENANT
}
