use chrono::{Datelike as _, NaiveTime};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::prelude::*;

/// One contact-form entry. Written once, never updated or deleted.
///
/// Serialized field names match the public API: `created_at` goes out as
/// `timestamp`, the diagnostics as `ipAddress` / `userAgent`.
#[derive(Clone, Debug, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
}

/// Fields supplied by the intake endpoint, already validated and normalized.
#[derive(Clone, Debug)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub ip_address: String,
    pub user_agent: String,
}

/// Summary counts over the full submission collection, computed fresh per
/// request and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStats {
    pub total: usize,
    pub today: usize,
    pub this_week: usize,
    pub this_month: usize,
}

impl Submission {
    /// Persist a new submission, assigning its id and timestamp.
    pub async fn create(db: &Db, new: NewSubmission) -> sqlx::Result<Submission> {
        let submission = Submission {
            id: Uuid::now_v7().to_string(),
            name: new.name,
            email: new.email,
            subject: new.subject,
            message: new.message,
            created_at: Utc::now(),
            ip_address: new.ip_address,
            user_agent: new.user_agent,
        };

        sqlx::query(
            "INSERT INTO submissions \
                (id, name, email, subject, message, ip_address, user_agent, created_at) \
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&submission.id)
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.subject)
        .bind(&submission.message)
        .bind(&submission.ip_address)
        .bind(&submission.user_agent)
        .bind(submission.created_at)
        .execute(db)
        .await?;

        Ok(submission)
    }

    /// All submissions, most recent first. An empty store is an empty vec.
    pub async fn list_all(db: &Db) -> sqlx::Result<Vec<Submission>> {
        sqlx::query_as::<_, Submission>(
            "SELECT * FROM submissions ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(db)
        .await
    }
}

impl SubmissionStats {
    /// Count submissions falling at/after each window start, in `tz`:
    /// `today` from the start of the current calendar day, `this_week` a
    /// rolling 7 days before that, `this_month` from the 1st of the month.
    pub fn compute(submissions: &[Submission], now: DateTime<Utc>, tz: Tz) -> Self {
        let local_now = now.with_timezone(&tz);
        let today_start = local_now.date_naive().and_time(NaiveTime::MIN);
        let week_start = today_start - chrono::Duration::days(7);
        // with_day(1) is always valid for an existing date
        let month_start = local_now.date_naive().with_day(1).unwrap().and_time(NaiveTime::MIN);

        let mut stats =
            SubmissionStats { total: submissions.len(), today: 0, this_week: 0, this_month: 0 };
        for submission in submissions {
            let t = submission.created_at.with_timezone(&tz).naive_local();
            if t >= today_start {
                stats.today += 1;
            }
            if t >= week_start {
                stats.this_week += 1;
            }
            if t >= month_start {
                stats.this_month += 1;
            }
        }
        stats
    }
}
