mod config;
mod controller;
mod controls;
mod models;
mod page;
mod render;
mod tui;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use controller::ListingController;
use controls::{Facet, SortCriterion};
use models::JobId;
use render::{Child, ListView};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Search, filter, and sort the jobs on a rendered job board page")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse a job board page interactively
    Browse {
        /// Page to open (defaults to the configured page)
        page: Option<PathBuf>,
    },

    /// Search, filter, and sort a page's jobs and print what remains
    List {
        /// Page to read (defaults to the configured page)
        page: Option<PathBuf>,

        /// Text the job title must contain
        #[arg(short, long)]
        title: Option<String>,

        /// Text the company must contain
        #[arg(short, long)]
        location: Option<String>,

        /// Job type to select (repeatable)
        #[arg(short = 'j', long = "job-type")]
        job_types: Vec<String>,

        /// Experience level to select (repeatable)
        #[arg(short, long)]
        experience: Vec<String>,

        /// Annual salary ceiling
        #[arg(short, long)]
        salary_max: Option<u64>,

        /// Sort order applied after filtering
        #[arg(long, value_enum)]
        sort: Option<SortCriterion>,
    },

    /// Render a job board page from a job data file
    Render {
        /// JSON file with the job records
        data: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the application confirmation for a job
    Apply {
        /// Job ID, as shown by `list`
        id: usize,

        /// Page to read (defaults to the configured page)
        #[arg(short, long)]
        page: Option<PathBuf>,
    },
}

fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_logging(&config)?;

    match cli.command {
        Commands::Browse { page } => {
            let path = config.page_path(page)?;
            let page = page::load_page(&path)?;
            info!(page = %path.display(), jobs = page.jobs.len(), "browsing");
            let controls = config.controls_for(&page);
            tui::run_browse(page, controls)?;
        }

        Commands::List {
            page,
            title,
            location,
            job_types,
            experience,
            salary_max,
            sort,
        } => {
            let path = config.page_path(page)?;
            let page = page::load_page(&path)?;
            let mut controls = config.controls_for(&page);
            if let Some(title) = title {
                controls.job_title = title;
            }
            if let Some(location) = location {
                controls.location = location;
            }
            for value in &job_types {
                controls.check(Facet::JobType, value);
            }
            for value in &experience {
                controls.check(Facet::Experience, value);
            }
            if let Some(max) = salary_max {
                controls.salary.value = max;
            }

            let mut controller = ListingController::from_records(page.jobs);
            let shown = controller.search(&controls);
            info!(
                page = %path.display(),
                matched = controller.filtered_ids().len(),
                shown = shown.len(),
                "listed"
            );
            if let Some(sort) = sort {
                controller.sort(sort);
            }
            print_jobs(&controller);
        }

        Commands::Render { data, output } => {
            let jobs = page::load_job_data(&data)?;
            let html = page::render_page(&jobs, &config.default_controls())?;
            match output {
                Some(out_path) => {
                    fs::write(&out_path, html)
                        .with_context(|| format!("Failed to write to {}", out_path.display()))?;
                    info!(jobs = jobs.len(), output = %out_path.display(), "rendered page");
                    println!("Rendered {} job(s) to {}", jobs.len(), out_path.display());
                }
                None => print!("{}", html),
            }
        }

        Commands::Apply { id, page } => {
            let path = config.page_path(page)?;
            let page = page::load_page(&path)?;
            let mut controller = ListingController::from_records(page.jobs);
            let message = controller
                .apply_job(JobId(id))
                .ok_or_else(|| anyhow!("Job {} not found", JobId(id)))?;
            println!("{}", message);
        }
    }

    Ok(())
}

fn print_jobs(controller: &ListingController<ListView>) {
    let view = controller.renderer();
    if let Some(message) = view.placeholder() {
        println!("{}", message);
        return;
    }

    println!("{:<6} {:<30} {:<20} {:>10}  {}", "ID", "TITLE", "COMPANY", "RATE", "TAGS");
    println!("{}", "-".repeat(84));
    for child in view.children() {
        let Child::Job(id) = child else { continue };
        if !view.is_visible(*id) {
            continue;
        }
        let Some(entry) = controller.job(*id) else { continue };
        let job = &entry.record;
        println!(
            "{:<6} {:<30} {:<20} {:>10}  {}",
            id.0,
            truncate(&job.title, 28),
            truncate(&job.company, 18),
            truncate(&job.rate, 10),
            job.tags.join(", ")
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
