//! Core Kernel - Foundational types and utilities for the expense approval system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Temporal types for fiscal periods and tenant-local time
//! - Strongly-typed identifiers
//! - Port abstractions shared by all store adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{FiscalYear, Timezone, DateRange, TemporalError};
pub use identifiers::{
    ClaimId, TenantId, EmployeeId, SkipRuleId, DocumentId, AuditEntryId,
};
pub use ports::{PortError, DomainPort};
