use anyhow::{Context, Result};
use askama::Template;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::controls::{format_thousands, Facet, FacetOption, FilterControls, SalarySlider, SortCriterion};
use crate::models::JobRecord;

pub const JOB_CARD_SELECTOR: &str = ".job-card";
pub const JOB_DATA_ATTR: &str = "data-job";

#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("job card {index} has no data-job attribute")]
    MissingJobData { index: usize },

    #[error("job card {index} carries malformed job data: {source}")]
    InvalidJobData {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything a rendered board page declares: the job cards in page order and
/// the state of the filter controls around them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub jobs: Vec<JobRecord>,
    pub job_title: String,
    pub location: String,
    pub job_types: Vec<FacetOption>,
    pub experience: Vec<FacetOption>,
    pub salary: Option<SalarySlider>,
    pub sort: Option<SortCriterion>,
}

pub fn load_page(path: &Path) -> Result<Page> {
    let html = fs::read_to_string(path)
        .with_context(|| format!("Failed to read page: {}", path.display()))?;
    parse_page(&html).with_context(|| format!("Failed to scan page: {}", path.display()))
}

pub fn parse_page(html: &str) -> Result<Page, PageError> {
    let document = Html::parse_document(html);

    Ok(Page {
        jobs: scan_jobs(&document)?,
        job_title: input_value(&document, "#job-title")?,
        location: input_value(&document, "#location")?,
        job_types: scan_facet(&document, Facet::JobType)?,
        experience: scan_facet(&document, Facet::Experience)?,
        salary: scan_slider(&document)?,
        sort: scan_sort(&document)?,
    })
}

/// Parses the `data-job` attribute of every job card. The first card without
/// well-formed data aborts the scan.
pub fn scan_jobs(document: &Html) -> Result<Vec<JobRecord>, PageError> {
    let cards = selector(JOB_CARD_SELECTOR)?;

    document
        .select(&cards)
        .enumerate()
        .map(|(index, card)| {
            let raw = card
                .value()
                .attr(JOB_DATA_ATTR)
                .ok_or(PageError::MissingJobData { index })?;
            serde_json::from_str(raw).map_err(|source| PageError::InvalidJobData { index, source })
        })
        .collect()
}

fn scan_facet(document: &Html, facet: Facet) -> Result<Vec<FacetOption>, PageError> {
    let checkboxes = selector(&format!(
        "input.filter-input[data-filter=\"{}\"]",
        facet.attr()
    ))?;

    Ok(document
        .select(&checkboxes)
        .filter_map(|input| {
            let value = input.value().attr("value")?.trim();
            if value.is_empty() {
                return None;
            }
            Some(FacetOption {
                value: value.to_string(),
                checked: input.value().attr("checked").is_some(),
            })
        })
        .collect())
}

fn scan_slider(document: &Html) -> Result<Option<SalarySlider>, PageError> {
    let slider = selector("#salary-slider")?;

    Ok(document.select(&slider).next().map(|input| {
        let defaults = SalarySlider::default();
        let mut slider = SalarySlider {
            min: numeric_attr(input, "min").unwrap_or(defaults.min),
            max: numeric_attr(input, "max").unwrap_or(defaults.max),
            step: numeric_attr(input, "step").unwrap_or(defaults.step),
            value: 0,
        };
        let value = numeric_attr(input, "value").unwrap_or(slider.max);
        slider.set(value);
        slider
    }))
}

fn scan_sort(document: &Html) -> Result<Option<SortCriterion>, PageError> {
    let selected = selector("#sort-select option[selected]")?;

    Ok(document
        .select(&selected)
        .next()
        .and_then(|option| option.value().attr("value"))
        .map(SortCriterion::from_select))
}

fn input_value(document: &Html, css: &str) -> Result<String, PageError> {
    let input = selector(css)?;

    Ok(document
        .select(&input)
        .next()
        .and_then(|el| el.value().attr("value"))
        .unwrap_or_default()
        .to_string())
}

fn numeric_attr(element: ElementRef, name: &str) -> Option<u64> {
    element.value().attr(name)?.trim().parse().ok()
}

fn selector(css: &str) -> Result<Selector, PageError> {
    Selector::parse(css).map_err(|_| PageError::Selector(css.to_string()))
}

// --- Job data files and page generation ---

#[derive(Deserialize)]
#[serde(untagged)]
enum JobData {
    Listing(Vec<JobRecord>),
    Wrapped { jobs: Vec<JobRecord> },
}

/// Loads job records from a JSON file holding either a bare array of records
/// or an object with a `jobs` array.
pub fn load_job_data(path: &Path) -> Result<Vec<JobRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Job data file not found at {}", path.display()))?;
    parse_job_data(&raw).with_context(|| format!("Invalid JSON in job data file {}", path.display()))
}

pub fn parse_job_data(raw: &str) -> Result<Vec<JobRecord>> {
    let data: JobData = serde_json::from_str(raw)?;
    Ok(match data {
        JobData::Listing(jobs) => jobs,
        JobData::Wrapped { jobs } => jobs,
    })
}

/// A facet's checkbox group as laid out on the page.
struct FacetGroup<'a> {
    label: &'static str,
    attr: &'static str,
    options: &'a [FacetOption],
}

struct SortOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

struct JobCard<'a> {
    data: String,
    job: &'a JobRecord,
}

#[derive(Template)]
#[template(path = "board.html")]
struct BoardPage<'a> {
    job_title: &'a str,
    location: &'a str,
    facets: Vec<FacetGroup<'a>>,
    salary: SalarySlider,
    salary_label: String,
    sort_options: Vec<SortOption>,
    cards: Vec<JobCard<'a>>,
}

/// Renders a board page whose job cards and controls `parse_page` reads back.
pub fn render_page(jobs: &[JobRecord], controls: &FilterControls) -> Result<String> {
    let cards = jobs
        .iter()
        .map(|job| {
            let data = serde_json::to_string(job).context("Failed to serialize job data")?;
            Ok(JobCard { data, job })
        })
        .collect::<Result<Vec<_>>>()?;

    let page = BoardPage {
        job_title: &controls.job_title,
        location: &controls.location,
        facets: [Facet::JobType, Facet::Experience]
            .into_iter()
            .map(|facet| FacetGroup {
                label: facet.label(),
                attr: facet.attr(),
                options: controls.options(facet),
            })
            .collect(),
        salary: controls.salary,
        salary_label: format_thousands(controls.salary.value),
        sort_options: SortCriterion::ALL
            .into_iter()
            .map(|criterion| SortOption {
                value: criterion.as_str(),
                label: criterion.label(),
                selected: criterion == controls.sort,
            })
            .collect(),
        cards,
    };

    page.render().context("Failed to render board page")
}
