//! Request handlers

pub mod claims;
pub mod health;
pub mod skip_rules;
pub mod tenant_config;

use axum::http::HeaderMap;
use std::str::FromStr;

use core_kernel::TenantId;

use crate::error::ApiError;

/// Extracts the acting tenant from the `X-Tenant-Id` header
pub(crate) fn tenant_from_headers(headers: &HeaderMap) -> Result<TenantId, ApiError> {
    let value = headers
        .get("X-Tenant-Id")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("missing X-Tenant-Id header".to_string()))?;
    TenantId::from_str(value)
        .map_err(|_| ApiError::BadRequest(format!("invalid tenant id '{value}'")))
}
