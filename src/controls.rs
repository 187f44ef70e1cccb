use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which checkbox group a filter option belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    JobType,
    Experience,
}

impl Facet {
    /// Value of the `data-filter` attribute on the page's checkboxes.
    pub fn attr(self) -> &'static str {
        match self {
            Facet::JobType => "job_type",
            Facet::Experience => "experience",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Facet::JobType => "Job Type",
            Facet::Experience => "Experience",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOption {
    pub value: String,
    pub checked: bool,
}

impl FacetOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            checked: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortCriterion {
    #[default]
    Recent,
    RateHigh,
    RateLow,
}

impl SortCriterion {
    pub const ALL: [SortCriterion; 3] = [
        SortCriterion::Recent,
        SortCriterion::RateHigh,
        SortCriterion::RateLow,
    ];

    /// Maps a sort-select value; anything unrecognised keeps the current order.
    pub fn from_select(value: &str) -> Self {
        match value.trim() {
            "rate-high" => SortCriterion::RateHigh,
            "rate-low" => SortCriterion::RateLow,
            _ => SortCriterion::Recent,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortCriterion::Recent => "recent",
            SortCriterion::RateHigh => "rate-high",
            SortCriterion::RateLow => "rate-low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortCriterion::Recent => "Most Recent",
            SortCriterion::RateHigh => "Rate: High to Low",
            SortCriterion::RateLow => "Rate: Low to High",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortCriterion::Recent => SortCriterion::RateHigh,
            SortCriterion::RateHigh => SortCriterion::RateLow,
            SortCriterion::RateLow => SortCriterion::Recent,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SortCriterion::Recent => SortCriterion::RateLow,
            SortCriterion::RateHigh => SortCriterion::Recent,
            SortCriterion::RateLow => SortCriterion::RateHigh,
        }
    }
}

/// Range input holding the annual salary ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalarySlider {
    pub min: u64,
    pub max: u64,
    pub step: u64,
    pub value: u64,
}

impl Default for SalarySlider {
    fn default() -> Self {
        Self {
            min: 0,
            max: 1_000_000,
            step: 10_000,
            value: 1_000_000,
        }
    }
}

impl SalarySlider {
    /// Sets the value the way a range input does: clamped to the bounds and
    /// snapped to the nearest step that does not pass `max`.
    pub fn set(&mut self, value: u64) -> u64 {
        self.value = self.snap(value);
        self.value
    }

    pub fn step_up(&mut self) -> u64 {
        self.set(self.value.saturating_add(self.step.max(1)))
    }

    pub fn step_down(&mut self) -> u64 {
        self.set(self.value.saturating_sub(self.step.max(1)))
    }

    /// Position of the value between the bounds, 0.0..=1.0.
    pub fn ratio(&self) -> f64 {
        let span = self.max.saturating_sub(self.min);
        if span == 0 {
            return 1.0;
        }
        let offset = self.value.saturating_sub(self.min).min(span);
        offset as f64 / span as f64
    }

    fn snap(&self, value: u64) -> u64 {
        let min = self.min.min(self.max);
        let max = self.min.max(self.max);
        let clamped = value.clamp(min, max);
        if self.step == 0 {
            return clamped;
        }

        let offset = clamped - min;
        let nearest = min.saturating_add(offset.saturating_add(self.step / 2) / self.step * self.step);
        if nearest <= max {
            nearest
        } else {
            min + offset / self.step * self.step
        }
    }
}

/// Normalized free-text search inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub title: String,
    pub location: String,
}

impl SearchQuery {
    pub fn new(title: &str, location: &str) -> Self {
        Self {
            title: title.trim().to_lowercase(),
            location: location.trim().to_lowercase(),
        }
    }
}

/// Checked facet values (lower-cased) and the salary ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub job_types: Vec<String>,
    pub experience: Vec<String>,
    pub salary_max: u64,
}

/// Current state of every form control on the board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterControls {
    pub job_title: String,
    pub location: String,
    pub job_types: Vec<FacetOption>,
    pub experience: Vec<FacetOption>,
    pub salary: SalarySlider,
    pub sort: SortCriterion,
}

impl FilterControls {
    pub fn search_query(&self) -> SearchQuery {
        SearchQuery::new(&self.job_title, &self.location)
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            job_types: checked_values(&self.job_types),
            experience: checked_values(&self.experience),
            salary_max: self.salary.value,
        }
    }

    pub fn options(&self, facet: Facet) -> &[FacetOption] {
        match facet {
            Facet::JobType => &self.job_types,
            Facet::Experience => &self.experience,
        }
    }

    pub fn options_mut(&mut self, facet: Facet) -> &mut Vec<FacetOption> {
        match facet {
            Facet::JobType => &mut self.job_types,
            Facet::Experience => &mut self.experience,
        }
    }

    /// Flips the checkbox at `index`. Returns false if there is no such option.
    pub fn toggle(&mut self, facet: Facet, index: usize) -> bool {
        match self.options_mut(facet).get_mut(index) {
            Some(option) => {
                option.checked = !option.checked;
                true
            }
            None => false,
        }
    }

    /// Checks the option whose value matches (case-insensitively), adding it
    /// when the board has no such checkbox.
    pub fn check(&mut self, facet: Facet, value: &str) {
        let options = self.options_mut(facet);
        match options
            .iter_mut()
            .find(|option| option.value.eq_ignore_ascii_case(value))
        {
            Some(option) => option.checked = true,
            None => options.push(FacetOption {
                value: value.to_string(),
                checked: true,
            }),
        }
    }
}

fn checked_values(options: &[FacetOption]) -> Vec<String> {
    options
        .iter()
        .filter(|option| option.checked)
        .map(|option| option.value.to_lowercase())
        .collect()
}

/// Formats an integer with comma thousands separators: 150000 -> "150,000".
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(150_000), "150,000");
        assert_eq!(format_thousands(1_000_000), "1,000,000");
    }

    #[test]
    fn test_sort_from_select_defaults_to_recent() {
        assert_eq!(SortCriterion::from_select("rate-high"), SortCriterion::RateHigh);
        assert_eq!(SortCriterion::from_select("rate-low"), SortCriterion::RateLow);
        assert_eq!(SortCriterion::from_select("recent"), SortCriterion::Recent);
        assert_eq!(SortCriterion::from_select("relevance"), SortCriterion::Recent);
    }

    #[test]
    fn test_sort_cycle_visits_every_criterion() {
        let mut sort = SortCriterion::Recent;
        for _ in 0..SortCriterion::ALL.len() {
            sort = sort.next();
        }
        assert_eq!(sort, SortCriterion::Recent);
        assert_eq!(SortCriterion::Recent.prev(), SortCriterion::RateLow);
    }

    #[test]
    fn test_slider_clamps_and_snaps() {
        let mut slider = SalarySlider {
            min: 0,
            max: 500_000,
            step: 10_000,
            value: 500_000,
        };
        assert_eq!(slider.set(123_456), 120_000);
        assert_eq!(slider.set(125_000), 130_000);
        assert_eq!(slider.set(9_000_000), 500_000);
        assert_eq!(slider.step_down(), 490_000);
        assert_eq!(slider.step_up(), 500_000);
        assert_eq!(slider.step_up(), 500_000);
    }

    #[test]
    fn test_slider_unaligned_max_snaps_down() {
        let mut slider = SalarySlider {
            min: 0,
            max: 105,
            step: 10,
            value: 0,
        };
        assert_eq!(slider.set(105), 100);
    }

    #[test]
    fn test_slider_huge_bounds_do_not_overflow() {
        let mut slider = SalarySlider {
            min: 0,
            max: u64::MAX,
            step: u64::MAX / 2 + 1,
            value: 0,
        };
        assert_eq!(slider.set(u64::MAX), u64::MAX / 2 + 1);
        assert_eq!(slider.step_up(), u64::MAX / 2 + 1);
    }

    #[test]
    fn test_slider_ratio() {
        let slider = SalarySlider {
            min: 0,
            max: 200,
            step: 1,
            value: 50,
        };
        assert!((slider.ratio() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_search_query_normalizes() {
        let query = SearchQuery::new("  Backend DEV ", "Acme ");
        assert_eq!(query.title, "backend dev");
        assert_eq!(query.location, "acme");
        assert_eq!(SearchQuery::new(" ", ""), SearchQuery::default());
    }

    #[test]
    fn test_criteria_reads_checked_values_lowercased() {
        let mut controls = FilterControls {
            job_types: vec![FacetOption::new("Full Time"), FacetOption::new("Contract")],
            experience: vec![FacetOption::new("Senior")],
            ..Default::default()
        };
        assert!(controls.toggle(Facet::JobType, 1));
        assert!(!controls.toggle(Facet::JobType, 7));
        controls.check(Facet::Experience, "senior");
        controls.check(Facet::Experience, "Lead");

        let criteria = controls.criteria();
        assert_eq!(criteria.job_types, vec!["contract"]);
        assert_eq!(criteria.experience, vec!["senior", "lead"]);
        assert_eq!(criteria.salary_max, SalarySlider::default().value);
    }
}
