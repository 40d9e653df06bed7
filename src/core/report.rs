//! Report helpers built on top of the ledger engine.
//!
//! This module provides the derived views the presentation layer needs: spend
//! share per person, totals, day-grouped history, outstanding receivables, and
//! amount formatting. All functions are pure and framework-agnostic.

use crate::core::ledger::{DateRange, filter_records};
use crate::core::model::ExpenseRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Currency suffix used when formatting amounts.
pub const CURRENCY_SYMBOL: &str = "₫";

/// How much of the filtered spending a person took part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpendShare {
    /// Person name
    pub name: String,
    /// Sum of their shares, paid or not
    pub amount: i64,
}

/// Per-person cost exposure over `range`, in roster order.
///
/// Counts every share a person took part in, settled or not, so it measures
/// consumption rather than debt.
#[must_use]
pub fn spend_share(
    people: &[String],
    records: &[ExpenseRecord],
    range: DateRange,
) -> Vec<SpendShare> {
    people
        .iter()
        .map(|name| SpendShare {
            name: name.clone(),
            amount: filter_records(records, range)
                .filter(|r| r.participant(name).is_some())
                .map(ExpenseRecord::per_person_amount)
                .fold(0, i64::saturating_add),
        })
        .collect()
}

/// Sum of `total_amount` over the records inside `range`.
#[must_use]
pub fn total_spent(records: &[ExpenseRecord], range: DateRange) -> i64 {
    filter_records(records, range)
        .map(|r| r.total_amount)
        .fold(0, i64::saturating_add)
}

/// Filtered records grouped by day, newest day first.
///
/// Within a day, records keep their snapshot order.
#[must_use]
pub fn group_by_date(
    records: &[ExpenseRecord],
    range: DateRange,
) -> Vec<(NaiveDate, Vec<&ExpenseRecord>)> {
    let mut days: BTreeMap<NaiveDate, Vec<&ExpenseRecord>> = BTreeMap::new();
    for record in filter_records(records, range) {
        days.entry(record.date).or_default().push(record);
    }
    days.into_iter().rev().collect()
}

/// What is still owed to a creditor on one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receivable {
    /// Record id
    pub record_id: String,
    /// Record date
    pub date: NaiveDate,
    /// Record title
    pub title: String,
    /// Participants who have not settled yet
    pub unpaid: Vec<String>,
    /// `per_person_amount * unpaid.len()`
    pub amount: i64,
}

/// Outstanding amounts owed to `creditor` on records they paid for.
///
/// Records where everybody has settled are left out.
#[must_use]
pub fn receivables(records: &[ExpenseRecord], range: DateRange, creditor: &str) -> Vec<Receivable> {
    filter_records(records, range)
        .filter(|r| r.payer == creditor)
        .filter_map(|r| {
            let unpaid: Vec<String> = r.unpaid_participants().map(|p| p.name.clone()).collect();
            if unpaid.is_empty() {
                return None;
            }
            let count = i64::try_from(unpaid.len()).ok()?;
            Some(Receivable {
                record_id: r.id.clone(),
                date: r.date,
                title: r.title.clone(),
                amount: r.per_person_amount().saturating_mul(count),
                unpaid,
            })
        })
        .collect()
}

/// Formats an amount with `.` thousands separators, e.g. `"180.000 ₫"`.
#[must_use]
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped} {CURRENCY_SYMBOL}")
}

/// Like [`format_amount`] but always shows the sign, e.g. `"+50.000 ₫"`.
#[must_use]
pub fn format_signed_amount(amount: i64) -> String {
    if amount > 0 {
        format!("+{}", format_amount(amount))
    } else {
        format_amount(amount)
    }
}
