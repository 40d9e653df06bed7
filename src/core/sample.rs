//! Demonstration roster and records for trying the ledger out.

use crate::core::model::{ExpenseRecord, ParticipantStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How much sample data to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleMode {
    /// Roster and illustrative records
    Full,
    /// Roster only; existing records are kept
    PeopleOnly,
}

/// The fixed demonstration roster.
pub const SAMPLE_PEOPLE: [&str; 4] = ["Khánh", "Minh Anh", "Hiếu", "Chị Trang"];

/// Sample roster as owned strings.
#[must_use]
pub fn sample_people() -> Vec<String> {
    SAMPLE_PEOPLE.iter().map(ToString::to_string).collect()
}

/// Two records, today and yesterday, mixing paid and unpaid shares.
#[must_use]
pub fn sample_records(now: DateTime<Utc>) -> Vec<ExpenseRecord> {
    let yesterday = now - Duration::days(1);
    let [khanh, minh_anh, hieu, trang] = SAMPLE_PEOPLE;

    vec![
        ExpenseRecord::new(
            Uuid::new_v4().to_string(),
            now.date_naive(),
            now,
            "Cafe sáng (Team họp)".to_string(),
            180_000,
            khanh.to_string(),
            vec![
                ParticipantStatus::paid(khanh, now),
                ParticipantStatus::unpaid(minh_anh),
                ParticipantStatus::unpaid(hieu),
                ParticipantStatus::unpaid(trang),
            ],
        ),
        ExpenseRecord::new(
            Uuid::new_v4().to_string(),
            yesterday.date_naive(),
            now - Duration::seconds(10),
            "Cơm tấm sườn bì".to_string(),
            220_000,
            trang.to_string(),
            vec![
                ParticipantStatus::paid(khanh, now),
                ParticipantStatus::unpaid(minh_anh),
                ParticipantStatus::unpaid(hieu),
                ParticipantStatus::paid(trang, yesterday),
            ],
        ),
    ]
}
