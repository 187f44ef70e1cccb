use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::controls::{FacetOption, FilterControls, SalarySlider};
use crate::page::Page;

pub const CONFIG_ENV: &str = "JOBBOARD_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page used when a command is given none.
    pub page: Option<PathBuf>,
    pub salary: SalarySlider,
    pub job_types: Vec<String>,
    pub experience: Vec<String>,
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page: None,
            salary: SalarySlider::default(),
            job_types: ["Full Time", "Part Time", "Contract", "Freelance"]
                .map(String::from)
                .to_vec(),
            experience: ["Entry", "Mid", "Senior", "Lead"].map(String::from).to_vec(),
            log_filter: "warn".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Loads `$JOBBOARD_CONFIG`, else the platform config file. A missing file
    /// means defaults.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => Self::default_path(),
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    fn default_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobboard") {
            proj_dirs.config_dir().join("config.json")
        } else {
            PathBuf::from("jobboard.json")
        }
    }

    /// Resolves the page to open: the one given, else the configured one.
    pub fn page_path(&self, given: Option<PathBuf>) -> Result<PathBuf> {
        given.or_else(|| self.page.clone()).context(
            "No page given. Pass a page path or set \"page\" in the config file.",
        )
    }

    /// Initial control state for a page. Controls the page declares win over
    /// configured ones.
    pub fn controls_for(&self, page: &Page) -> FilterControls {
        FilterControls {
            job_title: page.job_title.clone(),
            location: page.location.clone(),
            job_types: if page.job_types.is_empty() {
                options(&self.job_types)
            } else {
                page.job_types.clone()
            },
            experience: if page.experience.is_empty() {
                options(&self.experience)
            } else {
                page.experience.clone()
            },
            salary: page.salary.unwrap_or(self.salary),
            sort: page.sort.unwrap_or_default(),
        }
    }

    /// Control state for rendering a fresh page.
    pub fn default_controls(&self) -> FilterControls {
        self.controls_for(&Page::default())
    }
}

fn options(values: &[String]) -> Vec<FacetOption> {
    values.iter().map(FacetOption::new).collect()
}
