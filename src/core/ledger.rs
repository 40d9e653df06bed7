//! Ledger engine - derives per-person balances from a snapshot.
//!
//! Balances are never stored anywhere. They are recomputed from the roster and
//! the record list every time they are needed, so they cannot drift.

use crate::core::model::ExpenseRecord;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inclusive day range used to filter records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included
    pub start: NaiveDate,
    /// Last day included
    pub end: NaiveDate,
}

impl DateRange {
    /// Range from `start` to `end`, both inclusive.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// From the first of `today`'s month up to `today`.
    #[must_use]
    pub fn month_to_date(today: NaiveDate) -> Self {
        let start = today.with_day(1).unwrap_or(today);
        Self { start, end: today }
    }

    /// Whether `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Records whose date falls inside `range`, in snapshot order.
pub fn filter_records(
    records: &[ExpenseRecord],
    range: DateRange,
) -> impl Iterator<Item = &ExpenseRecord> {
    records.iter().filter(move |r| range.contains(r.date))
}

/// One record a person took part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealEntry {
    /// Record id
    pub record_id: String,
    /// Record date
    pub date: NaiveDate,
    /// Record title
    pub title: String,
    /// The person's share
    pub amount: i64,
    /// Whether the person has settled this share
    pub is_paid: bool,
}

/// Aggregated position of one roster member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonBalance {
    /// Person name
    pub name: String,
    /// What others still owe this person
    pub owed: i64,
    /// What this person still owes others
    pub debt: i64,
    /// `owed - debt`; positive means others owe them
    pub net: i64,
    /// Participation history, in record order
    pub meals: Vec<MealEntry>,
}

impl PersonBalance {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            owed: 0,
            debt: 0,
            net: 0,
            meals: Vec::new(),
        }
    }
}

/// Balances for every roster member, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    /// One entry per distinct roster name
    pub balances: Vec<PersonBalance>,
}

impl BalanceReport {
    /// Balance of a single person.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PersonBalance> {
        self.balances.iter().find(|b| b.name == name)
    }

    /// People owed money, largest credit first.
    #[must_use]
    pub fn creditors(&self) -> Vec<&PersonBalance> {
        let mut creditors: Vec<_> = self.balances.iter().filter(|b| b.net > 0).collect();
        creditors.sort_by(|a, b| b.net.cmp(&a.net));
        creditors
    }

    /// People owing money, most negative first.
    #[must_use]
    pub fn debtors(&self) -> Vec<&PersonBalance> {
        let mut debtors: Vec<_> = self.balances.iter().filter(|b| b.net < 0).collect();
        debtors.sort_by(|a, b| a.net.cmp(&b.net));
        debtors
    }

    /// Sum of all nets. Zero whenever every payer is still on the roster.
    #[must_use]
    pub fn total_net(&self) -> i64 {
        self.balances
            .iter()
            .fold(0, |total, b| total.saturating_add(b.net))
    }
}

/// Computes net balances over the records inside `range`.
///
/// Shares of participants or payers missing from `people` are silently
/// dropped from the totals: a removed payer's credit is lost, a removed
/// participant's debt is not counted.
#[must_use]
pub fn compute_balances(
    people: &[String],
    records: &[ExpenseRecord],
    range: DateRange,
) -> BalanceReport {
    let mut balances: Vec<PersonBalance> = Vec::with_capacity(people.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(people.len());
    for name in people {
        index.entry(name.as_str()).or_insert_with(|| {
            balances.push(PersonBalance::new(name));
            balances.len() - 1
        });
    }

    for record in filter_records(records, range) {
        let share = record.per_person_amount();
        for participant in &record.participants {
            let slot = index.get(participant.name.as_str()).copied();
            if let Some(i) = slot {
                balances[i].meals.push(MealEntry {
                    record_id: record.id.clone(),
                    date: record.date,
                    title: record.title.clone(),
                    amount: share,
                    is_paid: participant.paid,
                });
            }

            if participant.name != record.payer && !participant.paid {
                if let Some(i) = slot {
                    balances[i].debt = balances[i].debt.saturating_add(share);
                }
                if let Some(&payer) = index.get(record.payer.as_str()) {
                    balances[payer].owed = balances[payer].owed.saturating_add(share);
                }
            }
        }
    }

    for balance in &mut balances {
        balance.net = balance.owed.saturating_sub(balance.debt);
    }

    BalanceReport { balances }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::model::ParticipantStatus;
    use chrono::{DateTime, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn record(
        id: &str,
        date: NaiveDate,
        total: i64,
        payer: &str,
        participants: Vec<ParticipantStatus>,
    ) -> ExpenseRecord {
        let created: DateTime<Utc> = Utc::now();
        ExpenseRecord::new(
            id.to_string(),
            date,
            created,
            format!("Meal {id}"),
            total,
            payer.to_string(),
            participants,
        )
    }

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn unpaid(names: &[&str]) -> Vec<ParticipantStatus> {
        names.iter().map(|n| ParticipantStatus::unpaid(*n)).collect()
    }

    fn meal_ids<'a>(report: &'a BalanceReport, name: &str) -> Vec<&'a str> {
        report
            .get(name)
            .unwrap()
            .meals
            .iter()
            .map(|m| m.record_id.as_str())
            .collect()
    }

    fn april() -> DateRange {
        DateRange::new(day(1), day(30))
    }

    #[test]
    fn test_two_person_lunch() {
        let now = Utc::now();
        let records = vec![record(
            "r1",
            day(10),
            100,
            "A",
            vec![ParticipantStatus::paid("A", now), ParticipantStatus::unpaid("B")],
        )];
        let report = compute_balances(&roster(&["A", "B"]), &records, april());

        let a = report.get("A").unwrap();
        assert_eq!((a.owed, a.debt, a.net), (50, 0, 50));
        let b = report.get("B").unwrap();
        assert_eq!((b.owed, b.debt, b.net), (0, 50, -50));
        assert_eq!(report.total_net(), 0);
        assert_eq!(a.meals.len(), 1);
        assert!(a.meals[0].is_paid);
        assert!(!b.meals[0].is_paid);
    }

    #[test]
    fn test_unvalidated_huge_records_saturate() {
        let now = Utc::now();
        let huge = |id: &str| {
            record(
                id,
                day(10),
                i64::MAX,
                "A",
                vec![ParticipantStatus::paid("A", now), ParticipantStatus::unpaid("B")],
            )
        };
        let records = vec![huge("r1"), huge("r2")];
        let report = compute_balances(&roster(&["A", "B"]), &records, april());

        assert_eq!(records[0].per_person_amount(), i64::MAX / 2 + 1);
        assert_eq!(report.get("A").unwrap().owed, i64::MAX);
        assert_eq!(report.get("B").unwrap().debt, i64::MAX);
        assert_eq!(report.get("B").unwrap().net, -i64::MAX);
    }

    #[test]
    fn test_settled_share_is_not_counted() {
        let now = Utc::now();
        let records = vec![record(
            "r1",
            day(10),
            100,
            "A",
            vec![
                ParticipantStatus::paid("A", now),
                ParticipantStatus::paid("B", now),
            ],
        )];
        let report = compute_balances(&roster(&["A", "B"]), &records, april());
        assert_eq!(report.get("A").unwrap().net, 0);
        assert_eq!(report.get("B").unwrap().net, 0);
        assert!(report.creditors().is_empty());
        assert!(report.debtors().is_empty());
    }

    #[test]
    fn test_range_is_inclusive_on_both_ends() {
        let records = vec![
            record("before", day(1), 10, "A", unpaid(&["A", "B"])),
            record("start", day(2), 20, "A", unpaid(&["A", "B"])),
            record("end", day(5), 40, "A", unpaid(&["A", "B"])),
            record("after", day(6), 80, "A", unpaid(&["A", "B"])),
        ];
        let report = compute_balances(
            &roster(&["A", "B"]),
            &records,
            DateRange::new(day(2), day(5)),
        );
        assert_eq!(report.get("B").unwrap().debt, 10 + 20);
        assert_eq!(meal_ids(&report, "B"), vec!["start", "end"]);
    }

    #[test]
    fn test_meals_follow_record_order_not_date() {
        let records = vec![
            record("newest-insert", day(3), 20, "A", unpaid(&["A", "B"])),
            record("older-insert", day(9), 20, "A", unpaid(&["A", "B"])),
        ];
        let report = compute_balances(&roster(&["A", "B"]), &records, april());
        assert_eq!(meal_ids(&report, "A"), vec!["newest-insert", "older-insert"]);
    }

    #[test]
    fn test_removed_payer_credit_is_dropped() {
        let records = vec![record(
            "r1",
            day(10),
            90,
            "Gone",
            vec![
                ParticipantStatus::unpaid("Gone"),
                ParticipantStatus::unpaid("A"),
                ParticipantStatus::unpaid("B"),
            ],
        )];
        let report = compute_balances(&roster(&["A", "B"]), &records, april());
        assert_eq!(report.get("A").unwrap().debt, 30);
        assert_eq!(report.get("B").unwrap().debt, 30);
        assert!(report.get("Gone").is_none());
        assert_eq!(report.total_net(), -60);
    }

    #[test]
    fn test_removed_participant_is_ignored() {
        let records = vec![record(
            "r1",
            day(10),
            90,
            "A",
            vec![
                ParticipantStatus::unpaid("A"),
                ParticipantStatus::unpaid("Gone"),
                ParticipantStatus::unpaid("B"),
            ],
        )];
        let report = compute_balances(&roster(&["A", "B"]), &records, april());
        // Payer credit still counts the missing participant's share
        assert_eq!(report.get("A").unwrap().owed, 60);
        assert_eq!(report.get("B").unwrap().debt, 30);
        assert_eq!(report.balances.len(), 2);
    }

    #[test]
    fn test_creditors_and_debtors_ordering() {
        let records = vec![
            record("r1", day(4), 300, "A", unpaid(&["A", "B", "C"])),
            record("r2", day(5), 100, "D", unpaid(&["D", "C"])),
        ];
        let report = compute_balances(&roster(&["A", "B", "C", "D"]), &records, april());
        let creditors: Vec<(&str, i64)> = report
            .creditors()
            .iter()
            .map(|b| (b.name.as_str(), b.net))
            .collect();
        assert_eq!(creditors, vec![("A", 200), ("D", 50)]);
        let debtors: Vec<(&str, i64)> = report
            .debtors()
            .iter()
            .map(|b| (b.name.as_str(), b.net))
            .collect();
        assert_eq!(debtors, vec![("C", -150), ("B", -100)]);
        assert_eq!(report.total_net(), 0);
    }

    #[test]
    fn test_compute_balances_is_pure() {
        let people = roster(&["A", "B"]);
        let records = vec![record("r1", day(10), 101, "A", unpaid(&["A", "B"]))];
        let people_before = people.clone();
        let records_before = records.clone();

        let first = compute_balances(&people, &records, april());
        let second = compute_balances(&people, &records, april());

        assert_eq!(first, second);
        assert_eq!(people, people_before);
        assert_eq!(records, records_before);
    }

    #[test]
    fn test_duplicate_roster_names_collapse() {
        let report = compute_balances(&roster(&["A", "B", "A"]), &[], april());
        let names: Vec<&str> = report.balances.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_month_to_date() {
        let range = DateRange::month_to_date(day(17));
        assert_eq!(range.start, day(1));
        assert_eq!(range.end, day(17));
        assert!(range.contains(day(1)));
        assert!(!range.contains(day(18)));
    }
}
