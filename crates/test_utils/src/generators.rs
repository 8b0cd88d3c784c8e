//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data that
//! maintains domain invariants.

use chrono::{Days, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money, SkipRuleId, TenantId};
use domain_approval::skip_rules::{ApprovalSkipRule, RuleConditions, SkipScope};

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::INR),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::AED),
        Just(Currency::SGD),
    ]
}

/// Strategy for generating non-negative amounts in minor units
pub fn amount_minor_strategy() -> impl Strategy<Value = i64> {
    0i64..100_000_000i64
}

/// Strategy for generating non-negative Money values
pub fn money_strategy() -> impl Strategy<Value = Money> {
    (amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating confidence/score values in range
pub fn score_strategy() -> impl Strategy<Value = u8> {
    0u8..=100
}

/// Strategy for generating skip scopes
pub fn skip_scope_strategy() -> impl Strategy<Value = SkipScope> {
    prop_oneof![
        Just(SkipScope::Manager),
        Just(SkipScope::ManagerAndHr),
        Just(SkipScope::All),
    ]
}

/// Strategy for generating rule conditions with optional constraints
pub fn rule_conditions_strategy() -> impl Strategy<Value = RuleConditions> {
    (
        prop::collection::vec("[a-z]{4,12}", 0..3),
        prop::collection::vec("[a-z]{3,8}@example\\.test", 0..3),
        prop::collection::vec("[A-Z]{3,8}", 0..3),
        prop::option::of(0i64..1_000_000i64),
    )
        .prop_map(|(designations, employee_emails, project_codes, max)| RuleConditions {
            designations,
            employee_emails,
            project_codes,
            max_amount: max.map(Decimal::from),
        })
}

/// Strategy for generating active skip rules for a tenant
pub fn skip_rule_strategy(tenant_id: TenantId) -> impl Strategy<Value = ApprovalSkipRule> {
    (
        "[a-z ]{4,24}",
        0u32..1000,
        rule_conditions_strategy(),
        skip_scope_strategy(),
    )
        .prop_map(move |(name, priority, conditions, scope)| {
            let now = Utc::now();
            ApprovalSkipRule {
                id: SkipRuleId::new(),
                tenant_id,
                name,
                priority,
                is_active: true,
                conditions,
                scope,
                created_at: now,
                updated_at: now,
            }
        })
}

/// Strategy for generating claim dates within the last year
pub fn recent_date_strategy() -> impl Strategy<Value = chrono::NaiveDate> {
    (0u64..365).prop_map(|days_ago| Utc::now().date_naive() - Days::new(days_ago))
}
