// src/pipeline/transform.rs

//! NormalizedJob to store record.

use chrono::{DateTime, Utc};

use crate::models::{
    JobStatus, JobType, NormalizedJob, PHONE_PLACEHOLDER, PersistedJob, SALARY_NEGOTIABLE,
};
use crate::storage::expiry_from;
use crate::utils::non_empty;

/// Build the record inserted for a first sighting of `job`.
///
/// Fills the store's required text fields: salary falls back to the
/// negotiable sentinel, phone to the placeholder number, description to
/// `"{title} - {company}"`.
pub fn transform(
    job: &NormalizedJob,
    operator_id: &str,
    now: DateTime<Utc>,
    expiry_days: i64,
) -> PersistedJob {
    let description = job
        .description
        .clone()
        .and_then(non_empty)
        .unwrap_or_else(|| {
            format!("{} - {}", job.title, job.company.as_deref().unwrap_or_default())
        });

    PersistedJob {
        id: None,
        user_id: operator_id.to_string(),
        job_type: if job.is_daily() {
            JobType::Daily
        } else {
            JobType::Standing
        },
        source: job.source,
        source_url: job.source_url.clone(),
        source_id: job.source_id.clone(),
        title: job.title.clone(),
        category: job.category.clone(),
        location: job.location.clone(),
        salary: non_empty(job.salary.clone()).unwrap_or_else(|| SALARY_NEGOTIABLE.to_string()),
        description,
        contact_phone: job
            .contact_phone
            .clone()
            .and_then(non_empty)
            .unwrap_or_else(|| PHONE_PLACEHOLDER.to_string()),
        company: job.company.clone(),
        start_date: job.start_date.clone(),
        duration: job.duration.clone(),
        status: JobStatus::Active,
        expires_at: expiry_from(now, expiry_days),
        created_at: now,
        updated_at: now,
    }
}
