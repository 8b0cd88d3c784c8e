//! Policy compliance evaluation
//!
//! Runs a fixed, ordered set of named checks against a claim and aggregates
//! them into a weighted 0-100 score. The evaluator is a pure function: the
//! duplicate probe is pre-fetched by the caller, and missing configuration
//! resolves to a warning rather than an error, so evaluation always returns
//! a result the state machine can act on.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::{ClaimId, FiscalYear, Timezone};

use crate::claim::{Claim, ClaimStatus};

/// Outcome of a single policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    Warning,
    /// Inputs not yet available; excluded from the score denominator
    Checking,
}

/// A single compliance finding, produced fresh on every evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCheck {
    /// Stable check name
    pub id: String,
    pub status: CheckStatus,
    pub message: String,
}

impl PolicyCheck {
    fn new(id: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            status,
            message: message.into(),
        }
    }
}

/// Per-category policy limits
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPolicy {
    /// Maximum claimable amount for the category
    pub max_amount: Option<Decimal>,
    /// How many days after the expense date a claim may still be filed
    pub submission_window_days: Option<i64>,
    /// Whether the category requires supporting documents
    pub requires_documents: bool,
}

/// Tenant-wide policy configuration consumed by the evaluator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantPolicyConfig {
    /// Category code -> limits
    pub categories: HashMap<String, CategoryPolicy>,
    /// Approved vendor names, compared case-insensitively
    pub approved_vendors: Vec<String>,
    /// Fiscal year the claim date must fall within
    pub fiscal_year: FiscalYear,
    /// Tenant timezone for day-boundary math
    pub timezone: Timezone,
}

impl Default for TenantPolicyConfig {
    fn default() -> Self {
        Self {
            categories: HashMap::new(),
            approved_vendors: Vec::new(),
            fiscal_year: FiscalYear::default(),
            timezone: Timezone::default(),
        }
    }
}

/// Summary of an existing claim used by the duplicate check
#[derive(Debug, Clone)]
pub struct DuplicateCandidate {
    pub claim_id: ClaimId,
    pub status: ClaimStatus,
    pub amount: Decimal,
    pub vendor: Option<String>,
    pub claim_date: NaiveDate,
}

/// Result of a compliance evaluation: score and checks always travel together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceEvaluation {
    /// Weighted aggregate, 0-100
    pub score: u8,
    pub checks: Vec<PolicyCheck>,
}

impl ComplianceEvaluation {
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }
}

pub const CHECK_AMOUNT_LIMIT: &str = "amount_limit";
pub const CHECK_SUBMISSION_WINDOW: &str = "submission_window";
pub const CHECK_REQUIRED_DOCUMENTS: &str = "required_documents";
pub const CHECK_DUPLICATE: &str = "duplicate";
pub const CHECK_VENDOR_VERIFICATION: &str = "vendor_verification";
pub const CHECK_FINANCIAL_YEAR: &str = "financial_year";

/// Duplicate claims must match amount and vendor with a claim date within
/// this many days either side.
const DUPLICATE_TOLERANCE_DAYS: i64 = 3;

/// Fixed weight per check; the score denominator is the weight of every
/// check not in `Checking`.
fn check_weight(id: &str) -> Decimal {
    match id {
        CHECK_AMOUNT_LIMIT => Decimal::from(25),
        CHECK_DUPLICATE => Decimal::from(20),
        CHECK_SUBMISSION_WINDOW => Decimal::from(15),
        CHECK_REQUIRED_DOCUMENTS => Decimal::from(15),
        CHECK_FINANCIAL_YEAR => Decimal::from(15),
        CHECK_VENDOR_VERIFICATION => Decimal::from(10),
        _ => Decimal::ZERO,
    }
}

/// Evaluates all policy checks for a claim
///
/// # Arguments
///
/// * `claim` - The claim under evaluation
/// * `config` - Tenant policy configuration
/// * `others` - Pre-fetched claims of the same employee for the duplicate probe
/// * `now` - Evaluation instant
pub fn evaluate(
    claim: &Claim,
    config: &TenantPolicyConfig,
    others: &[DuplicateCandidate],
    now: DateTime<Utc>,
) -> ComplianceEvaluation {
    let today = config.timezone.local_date(now);
    let category = config.categories.get(&claim.category);

    let checks = vec![
        amount_limit_check(claim, category),
        submission_window_check(claim, category, today),
        required_documents_check(claim, category),
        duplicate_check(claim, others),
        vendor_verification_check(claim, &config.approved_vendors),
        financial_year_check(claim, &config.fiscal_year, today),
    ];

    let score = aggregate_score(&checks);
    ComplianceEvaluation { score, checks }
}

/// Weighted aggregation: pass = full weight, warning = half, fail = zero,
/// checking excluded from the denominator. All-checking scores zero.
fn aggregate_score(checks: &[PolicyCheck]) -> u8 {
    let mut earned = Decimal::ZERO;
    let mut denominator = Decimal::ZERO;

    for check in checks {
        let weight = check_weight(&check.id);
        match check.status {
            CheckStatus::Pass => {
                earned += weight;
                denominator += weight;
            }
            CheckStatus::Warning => {
                earned += weight / Decimal::from(2);
                denominator += weight;
            }
            CheckStatus::Fail => {
                denominator += weight;
            }
            CheckStatus::Checking => {}
        }
    }

    if denominator.is_zero() {
        return 0;
    }

    let score = (Decimal::from(100) * earned / denominator).round();
    score
        .to_u8()
        .unwrap_or(if score.is_sign_negative() { 0 } else { 100 })
        .min(100)
}

fn amount_limit_check(claim: &Claim, category: Option<&CategoryPolicy>) -> PolicyCheck {
    if claim.amount.is_zero() {
        return PolicyCheck::new(
            CHECK_AMOUNT_LIMIT,
            CheckStatus::Checking,
            "Amount not provided yet",
        );
    }

    let Some(category) = category else {
        return PolicyCheck::new(
            CHECK_AMOUNT_LIMIT,
            CheckStatus::Warning,
            format!("No policy configured for category '{}'", claim.category),
        );
    };

    match category.max_amount {
        Some(max) if claim.amount.amount() > max => PolicyCheck::new(
            CHECK_AMOUNT_LIMIT,
            CheckStatus::Fail,
            format!(
                "Amount {} exceeds the category limit of {}",
                claim.amount.amount(),
                max
            ),
        ),
        Some(max) => PolicyCheck::new(
            CHECK_AMOUNT_LIMIT,
            CheckStatus::Pass,
            format!("Amount within the category limit of {}", max),
        ),
        None => PolicyCheck::new(
            CHECK_AMOUNT_LIMIT,
            CheckStatus::Pass,
            "Category has no amount limit",
        ),
    }
}

fn submission_window_check(
    claim: &Claim,
    category: Option<&CategoryPolicy>,
    today: NaiveDate,
) -> PolicyCheck {
    let Some(category) = category else {
        return PolicyCheck::new(
            CHECK_SUBMISSION_WINDOW,
            CheckStatus::Warning,
            format!("No policy configured for category '{}'", claim.category),
        );
    };

    match category.submission_window_days {
        Some(window) => {
            let age_days = (today - claim.claim_date.value).num_days();
            if age_days > window {
                PolicyCheck::new(
                    CHECK_SUBMISSION_WINDOW,
                    CheckStatus::Fail,
                    format!(
                        "Claim date is {} days old, beyond the {}-day window",
                        age_days, window
                    ),
                )
            } else {
                PolicyCheck::new(
                    CHECK_SUBMISSION_WINDOW,
                    CheckStatus::Pass,
                    format!("Within the {}-day submission window", window),
                )
            }
        }
        None => PolicyCheck::new(
            CHECK_SUBMISSION_WINDOW,
            CheckStatus::Pass,
            "Category has no submission window",
        ),
    }
}

fn required_documents_check(claim: &Claim, category: Option<&CategoryPolicy>) -> PolicyCheck {
    let Some(category) = category else {
        return PolicyCheck::new(
            CHECK_REQUIRED_DOCUMENTS,
            CheckStatus::Warning,
            format!("No policy configured for category '{}'", claim.category),
        );
    };

    if !category.requires_documents {
        return PolicyCheck::new(
            CHECK_REQUIRED_DOCUMENTS,
            CheckStatus::Pass,
            "Category does not require documents",
        );
    }

    if claim.documents.is_empty() {
        PolicyCheck::new(
            CHECK_REQUIRED_DOCUMENTS,
            CheckStatus::Warning,
            "Category requires supporting documents but none are attached",
        )
    } else {
        PolicyCheck::new(
            CHECK_REQUIRED_DOCUMENTS,
            CheckStatus::Pass,
            format!("{} document(s) attached", claim.documents.len()),
        )
    }
}

fn duplicate_check(claim: &Claim, others: &[DuplicateCandidate]) -> PolicyCheck {
    let vendor = claim.vendor.as_ref().map(|v| v.value.to_lowercase());

    let duplicate = others.iter().find(|other| {
        other.claim_id != claim.id
            && other.status != ClaimStatus::Rejected
            && other.amount == claim.amount.amount()
            && other.vendor.as_ref().map(|v| v.to_lowercase()) == vendor
            && (other.claim_date - claim.claim_date.value)
                .num_days()
                .abs()
                <= DUPLICATE_TOLERANCE_DAYS
    });

    match duplicate {
        Some(other) => PolicyCheck::new(
            CHECK_DUPLICATE,
            CheckStatus::Fail,
            format!(
                "Possible duplicate of {} (same amount and vendor within {} days)",
                other.claim_id, DUPLICATE_TOLERANCE_DAYS
            ),
        ),
        None => PolicyCheck::new(CHECK_DUPLICATE, CheckStatus::Pass, "No matching claim found"),
    }
}

fn vendor_verification_check(claim: &Claim, approved: &[String]) -> PolicyCheck {
    let Some(vendor) = claim.vendor.as_ref() else {
        return PolicyCheck::new(
            CHECK_VENDOR_VERIFICATION,
            CheckStatus::Checking,
            "Vendor not provided yet",
        );
    };

    let known = approved
        .iter()
        .any(|a| a.eq_ignore_ascii_case(vendor.value.trim()));

    if known {
        PolicyCheck::new(
            CHECK_VENDOR_VERIFICATION,
            CheckStatus::Pass,
            format!("Vendor '{}' is approved", vendor.value),
        )
    } else {
        PolicyCheck::new(
            CHECK_VENDOR_VERIFICATION,
            CheckStatus::Warning,
            format!("Vendor '{}' is not in the approved vendor list", vendor.value),
        )
    }
}

fn financial_year_check(claim: &Claim, fiscal_year: &FiscalYear, today: NaiveDate) -> PolicyCheck {
    let cycle = fiscal_year.cycle_containing(today);
    if cycle.contains(claim.claim_date.value) {
        PolicyCheck::new(
            CHECK_FINANCIAL_YEAR,
            CheckStatus::Pass,
            format!("Claim date within fiscal year starting {}", cycle.start),
        )
    } else {
        PolicyCheck::new(
            CHECK_FINANCIAL_YEAR,
            CheckStatus::Fail,
            format!(
                "Claim date {} is outside the current fiscal year ({} to {})",
                claim.claim_date.value, cycle.start, cycle.end
            ),
        )
    }
}
