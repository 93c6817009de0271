//! Dashboard ledgers: earnings, savings, spending, lending, borrowing.
//!
//! Entries are loosely-typed JSON objects; the only field this crate reads is
//! `amount`, for dashboard totals.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::net::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKind {
    Earnings,
    Savings,
    Spending,
    Lending,
    Borrowing,
}

impl LedgerKind {
    pub const ALL: [Self; 5] = [Self::Earnings, Self::Savings, Self::Spending, Self::Lending, Self::Borrowing];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Earnings => "earnings",
            Self::Savings => "savings",
            Self::Spending => "spending",
            Self::Lending => "lending",
            Self::Borrowing => "borrowing",
        }
    }

    #[must_use]
    pub fn path(self) -> String {
        format!("/{}", self.as_str())
    }

    #[must_use]
    pub fn entry_path(self, id: &str) -> String {
        format!("/{}/{id}", self.as_str())
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown ledger '{0}' (expected earnings, savings, spending, lending, or borrowing)")]
pub struct UnknownLedger(String);

impl FromStr for LedgerKind {
    type Err = UnknownLedger;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLedger(s.to_owned()))
    }
}

/// CRUD for one ledger. Every call passes through the request gate.
pub struct LedgerService<'a> {
    client: &'a ApiClient,
    kind: LedgerKind,
}

impl<'a> LedgerService<'a> {
    #[must_use]
    pub fn new(client: &'a ApiClient, kind: LedgerKind) -> Self {
        Self { client, kind }
    }

    /// # Errors
    ///
    /// Returns the client's error, or `UnexpectedBody` if the response is
    /// neither an array nor an object with a `data` array.
    pub async fn list(&self) -> Result<Vec<Value>, ApiError> {
        let body = self.client.get_json(&self.kind.path()).await?;
        entries_from_body(body)
    }

    /// # Errors
    ///
    /// Returns the client's error.
    pub async fn get(&self, id: &str) -> Result<Value, ApiError> {
        self.client.get_json(&self.kind.entry_path(id)).await
    }

    /// # Errors
    ///
    /// Returns the client's error.
    pub async fn create(&self, entry: Value) -> Result<Value, ApiError> {
        self.client.post_json(&self.kind.path(), entry).await
    }

    /// # Errors
    ///
    /// Returns the client's error.
    pub async fn update(&self, id: &str, entry: Value) -> Result<Value, ApiError> {
        self.client.put_json(&self.kind.entry_path(id), entry).await
    }

    /// # Errors
    ///
    /// Returns the client's error.
    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        self.client.delete_json(&self.kind.entry_path(id)).await
    }

    /// Sum of `amount` over every entry.
    ///
    /// # Errors
    ///
    /// See [`LedgerService::list`].
    pub async fn total(&self) -> Result<f64, ApiError> {
        Ok(total_amount(&self.list().await?))
    }
}

fn entries_from_body(body: Value) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(entries)) => Ok(entries),
            _ => Err(ApiError::UnexpectedBody("expected a list of entries")),
        },
        Value::Null => Ok(Vec::new()),
        _ => Err(ApiError::UnexpectedBody("expected a list of entries")),
    }
}

/// Sum the `amount` field of each entry. Numeric strings count; entries
/// without a usable amount are skipped.
#[must_use]
pub fn total_amount(entries: &[Value]) -> f64 {
    entries
        .iter()
        .filter_map(|entry| match entry.get("amount")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .sum()
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
