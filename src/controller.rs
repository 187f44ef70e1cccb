use std::cmp::Ordering;

use tracing::debug;

use crate::controls::{format_thousands, FilterControls, FilterCriteria, SearchQuery, SortCriterion};
use crate::models::{JobEntry, JobId, JobRecord};
use crate::render::{ListView, Renderer};

pub const NO_JOBS_MESSAGE: &str = "No jobs found matching your criteria.";

/// Owns the scanned job list and drives the renderer in response to the
/// board's controls.
pub struct ListingController<R: Renderer> {
    all_jobs: Vec<JobEntry>,
    filtered_jobs: Vec<JobId>,
    renderer: R,
}

impl ListingController<ListView> {
    /// Controller over a fresh list container holding every record in order.
    pub fn from_records(records: Vec<JobRecord>) -> Self {
        let view = ListView::new((0..records.len()).map(JobId));
        Self::new(records, view)
    }
}

impl<R: Renderer> ListingController<R> {
    /// Ids are assigned in record order, so `records[i]` must be the card the
    /// renderer knows as `JobId(i)`.
    pub fn new(records: Vec<JobRecord>, renderer: R) -> Self {
        let all_jobs: Vec<JobEntry> = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| JobEntry {
                id: JobId(i),
                record,
            })
            .collect();
        let filtered_jobs = all_jobs.iter().map(|entry| entry.id).collect();
        debug!(jobs = all_jobs.len(), "loaded job listing");

        Self {
            all_jobs,
            filtered_jobs,
            renderer,
        }
    }

    pub fn all_jobs(&self) -> &[JobEntry] {
        &self.all_jobs
    }

    pub fn filtered_ids(&self) -> &[JobId] {
        &self.filtered_jobs
    }

    pub fn job(&self, id: JobId) -> Option<&JobEntry> {
        self.all_jobs.get(id.0)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Recomputes the search result from the title and location inputs, then
    /// re-applies the checkbox and salary filters. Returns the ids shown.
    pub fn search(&mut self, controls: &FilterControls) -> Vec<JobId> {
        let query = controls.search_query();
        self.filtered_jobs = self
            .all_jobs
            .iter()
            .filter(|entry| matches_search(&entry.record, &query))
            .map(|entry| entry.id)
            .collect();
        debug!(
            title = %query.title,
            location = %query.location,
            matched = self.filtered_jobs.len(),
            "search"
        );

        self.filter(controls)
    }

    /// Applies the facet checkboxes and salary ceiling to the last search
    /// result and displays what passes. An empty search result falls back to
    /// the full listing.
    pub fn filter(&mut self, controls: &FilterControls) -> Vec<JobId> {
        let criteria = controls.criteria();
        let base: Vec<JobId> = if self.filtered_jobs.is_empty() {
            self.all_jobs.iter().map(|entry| entry.id).collect()
        } else {
            self.filtered_jobs.clone()
        };

        let shown: Vec<JobId> = base
            .into_iter()
            .filter(|id| {
                self.job(*id)
                    .is_some_and(|entry| passes_filters(&entry.record, &criteria))
            })
            .collect();
        debug!(
            job_types = ?criteria.job_types,
            experience = ?criteria.experience,
            salary_max = criteria.salary_max,
            shown = shown.len(),
            "filter"
        );

        self.display(&shown);
        shown
    }

    /// Shows exactly `ids`, in that order, and hides every other job.
    pub fn display(&mut self, ids: &[JobId]) {
        for entry in &self.all_jobs {
            self.renderer.set_visible(entry.id, false);
        }

        if ids.is_empty() {
            self.renderer.show_placeholder(NO_JOBS_MESSAGE);
            return;
        }

        self.renderer.clear_placeholder();
        for id in ids {
            self.renderer.set_visible(*id, true);
        }
        self.renderer.reorder(ids);
    }

    /// Reorders the visible jobs by rate. With nothing visible the last
    /// search result is reordered instead. Returns the new order.
    pub fn sort(&mut self, criterion: SortCriterion) -> Vec<JobId> {
        let mut ids = self.renderer.visible_jobs();
        if ids.is_empty() {
            ids = self.filtered_jobs.clone();
        }

        if criterion != SortCriterion::Recent {
            let jobs = &self.all_jobs;
            let rate = |id: &JobId| jobs.get(id.0).and_then(|entry| entry.record.hourly_rate());
            ids.sort_by(|a, b| compare_rates(criterion, rate(a), rate(b)));
        }
        debug!(criterion = criterion.as_str(), jobs = ids.len(), "sort");

        self.renderer.reorder(&ids);
        ids
    }

    /// Writes the formatted slider value to the salary label and re-filters.
    pub fn update_salary_display(&mut self, controls: &FilterControls) -> Vec<JobId> {
        let label = format_thousands(controls.salary.value);
        self.renderer.set_salary_label(&label);
        self.filter(controls)
    }

    /// Placeholder application: only shows a confirmation.
    pub fn apply(&mut self, job_title: &str, company: &str) -> String {
        let message = apply_message(job_title, company);
        debug!(job_title, company, "apply");
        self.renderer.confirm(&message);
        message
    }

    pub fn apply_job(&mut self, id: JobId) -> Option<String> {
        let (title, company) = {
            let entry = self.job(id)?;
            (entry.record.title.clone(), entry.record.company.clone())
        };
        Some(self.apply(&title, &company))
    }
}

pub fn apply_message(job_title: &str, company: &str) -> String {
    format!(
        "Thank you for your interest!\n\nYou are applying for: {}\nCompany: {}\n\nWe will review your application and get back to you soon.",
        job_title, company
    )
}

pub fn matches_search(record: &JobRecord, query: &SearchQuery) -> bool {
    let title_match = query.title.is_empty() || record.title.to_lowercase().contains(&query.title);
    // The location box is matched against the company name.
    let company_match =
        query.location.is_empty() || record.company.to_lowercase().contains(&query.location);
    title_match && company_match
}

pub fn passes_filters(record: &JobRecord, criteria: &FilterCriteria) -> bool {
    let tags = record.lowercase_tags();
    passes_job_type(&tags, &criteria.job_types)
        && passes_experience(&tags, &criteria.experience)
        && passes_salary(record, criteria.salary_max)
}

fn passes_job_type(tags: &[String], selected: &[String]) -> bool {
    selected.is_empty()
        || selected.iter().any(|job_type| {
            let compact = job_type.replacen(' ', "", 1);
            tags.iter()
                .any(|tag| tag.contains(&compact) || tag.contains(job_type.as_str()))
        })
}

fn passes_experience(tags: &[String], selected: &[String]) -> bool {
    selected.is_empty()
        || selected
            .iter()
            .any(|level| tags.iter().any(|tag| tag.contains(level.as_str())))
}

// Jobs without a readable rate are never excluded by the ceiling.
fn passes_salary(record: &JobRecord, salary_max: u64) -> bool {
    record
        .annual_rate()
        .is_none_or(|annual| annual <= salary_max)
}

// Unrated jobs go last in either direction.
fn compare_rates(criterion: SortCriterion, a: Option<u64>, b: Option<u64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match criterion {
            SortCriterion::RateHigh => b.cmp(&a),
            SortCriterion::RateLow => a.cmp(&b),
            SortCriterion::Recent => Ordering::Equal,
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
