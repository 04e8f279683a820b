//! Crate-level error type.
//!
//! Per spec §7, a malformed *target program* never produces an `Err` here —
//! it produces a diagnostic or a `null`/`None` field. The only thing this
//! type represents is a contract violation by the embedding host (a
//! `HostFile`/`HostTokens` implementation returning an inconsistent token
//! pointer), which is a programmer error, not a finding.

use thiserror::Error;

/// A violation of the `HostFile`/`HostTokens` contract (spec §6).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("token pointer {0} is out of range for this file")]
    TokenOutOfRange(usize),

    #[error("scope stack underflow: popped past the root scope")]
    ScopeUnderflow,
}

pub type Result<T> = std::result::Result<T, ContractError>;
