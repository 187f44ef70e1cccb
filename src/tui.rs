use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::controller::ListingController;
use crate::controls::{format_thousands, Facet, FilterControls};
use crate::models::JobId;
use crate::page::Page;
use crate::render::{ListView, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Title,
    Location,
    JobTypes,
    Experience,
    Salary,
    Sort,
    Jobs,
}

impl Focus {
    const ORDER: [Focus; 7] = [
        Focus::Title,
        Focus::Location,
        Focus::JobTypes,
        Focus::Experience,
        Focus::Salary,
        Focus::Sort,
        Focus::Jobs,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

struct AppState {
    controller: ListingController<ListView>,
    controls: FilterControls,
    focus: Focus,
    job_type_cursor: usize,
    experience_cursor: usize,
    selected: usize,
    notice: Option<String>,
    quit: bool,
}

impl AppState {
    fn new(page: Page, controls: FilterControls) -> Self {
        let mut controller = ListingController::from_records(page.jobs);
        controller
            .renderer_mut()
            .set_salary_label(&format_thousands(controls.salary.value));

        Self {
            controller,
            controls,
            focus: Focus::Title,
            job_type_cursor: 0,
            experience_cursor: 0,
            selected: 0,
            notice: None,
            quit: false,
        }
    }

    fn visible_jobs(&self) -> Vec<JobId> {
        self.controller.renderer().visible_jobs()
    }

    fn current_job(&self) -> Option<JobId> {
        self.visible_jobs().get(self.selected).copied()
    }

    fn cursor_mut(&mut self, facet: Facet) -> &mut usize {
        match facet {
            Facet::JobType => &mut self.job_type_cursor,
            Facet::Experience => &mut self.experience_cursor,
        }
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible_jobs().len();
        self.selected = self.selected.min(visible.saturating_sub(1));
    }

    fn handle_key(&mut self, code: KeyCode) {
        // A pending confirmation swallows the key that dismisses it.
        if self.notice.is_some() {
            self.notice = self.controller.renderer_mut().take_notice();
            return;
        }

        match code {
            KeyCode::Esc => {
                self.quit = true;
                return;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Title | Focus::Location => self.edit_text(code),
            Focus::JobTypes => self.handle_facet(Facet::JobType, code),
            Focus::Experience => self.handle_facet(Facet::Experience, code),
            Focus::Salary => match code {
                KeyCode::Left | KeyCode::Char('h') => {
                    self.controls.salary.step_down();
                    self.update_salary();
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    self.controls.salary.step_up();
                    self.update_salary();
                }
                _ => {}
            },
            Focus::Sort => {
                let sort = match code {
                    KeyCode::Left | KeyCode::Char('h') => self.controls.sort.prev(),
                    KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => self.controls.sort.next(),
                    _ => return,
                };
                self.controls.sort = sort;
                self.controller.sort(sort);
            }
            Focus::Jobs => match code {
                KeyCode::Char('q') => self.quit = true,
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.selected + 1 < self.visible_jobs().len() {
                        self.selected += 1;
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selected = self.selected.saturating_sub(1);
                }
                KeyCode::Enter | KeyCode::Char('a') => self.apply_current(),
                _ => {}
            },
        }
    }

    fn edit_text(&mut self, code: KeyCode) {
        let text = if self.focus == Focus::Title {
            &mut self.controls.job_title
        } else {
            &mut self.controls.location
        };
        match code {
            KeyCode::Char(c) => text.push(c),
            KeyCode::Backspace => {
                text.pop();
            }
            KeyCode::Enter => {
                self.controller.search(&self.controls);
                self.clamp_selection();
            }
            _ => {}
        }
    }

    fn handle_facet(&mut self, facet: Facet, code: KeyCode) {
        let count = self.controls.options(facet).len();
        let cursor = self.cursor_mut(facet);
        match code {
            KeyCode::Down | KeyCode::Char('j') => {
                if *cursor + 1 < count {
                    *cursor += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => *cursor = cursor.saturating_sub(1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let index = *cursor;
                if self.controls.toggle(facet, index) {
                    self.controller.filter(&self.controls);
                    self.clamp_selection();
                }
            }
            _ => {}
        }
    }

    fn update_salary(&mut self) {
        self.controller.update_salary_display(&self.controls);
        self.clamp_selection();
    }

    fn apply_current(&mut self) {
        if let Some(id) = self.current_job() {
            self.controller.apply_job(id);
            self.notice = self.controller.renderer_mut().take_notice();
        }
    }
}

pub fn run_browse(page: Page, controls: FilterControls) -> Result<()> {
    let mut state = AppState::new(page, controls);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let mut list_state = ListState::default();

    while !state.quit {
        list_state.select(state.current_job().map(|_| state.selected));
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            state.handle_key(key.code);
        }
    }
    Ok(())
}

fn focus_block(title: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Search inputs
    let inputs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    for (area, focus, title, text) in [
        (inputs[0], Focus::Title, " Job title ", &state.controls.job_title),
        (inputs[1], Focus::Location, " Location ", &state.controls.location),
    ] {
        let focused = state.focus == focus;
        let shown = if focused { format!("{}_", text) } else { text.clone() };
        frame.render_widget(
            Paragraph::new(shown).block(focus_block(title.to_string(), focused)),
            area,
        );
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(0)])
        .split(rows[1]);

    draw_filters(frame, state, body[0]);
    draw_jobs(frame, state, list_state, body[1]);

    // Footer help
    let help = Paragraph::new(
        " Tab:focus  Enter:search  Space:toggle  \u{2190}/\u{2192}:salary/sort  j/k:navigate  a:apply  Esc:quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[2]);

    if let Some(notice) = &state.notice {
        draw_notice(frame, notice);
    }
}

fn draw_filters(frame: &mut Frame, state: &AppState, area: Rect) {
    let facet_height = |facet: Facet| state.controls.options(facet).len() as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(facet_height(Facet::JobType)),
            Constraint::Length(facet_height(Facet::Experience)),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    for (chunk, facet, focus, cursor) in [
        (chunks[0], Facet::JobType, Focus::JobTypes, state.job_type_cursor),
        (chunks[1], Facet::Experience, Focus::Experience, state.experience_cursor),
    ] {
        let focused = state.focus == focus;
        let lines: Vec<Line> = state
            .controls
            .options(facet)
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let mark = if option.checked { "[x]" } else { "[ ]" };
                let pointer = if focused && i == cursor { ">" } else { " " };
                Line::from(format!("{} {} {}", pointer, mark, option.value))
            })
            .collect();
        frame.render_widget(
            Paragraph::new(lines).block(focus_block(format!(" {} ", facet.label()), focused)),
            chunk,
        );
    }

    let salary = Gauge::default()
        .block(focus_block(" Max salary ".to_string(), state.focus == Focus::Salary))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(state.controls.salary.ratio())
        .label(format!("${}", state.controller.renderer().salary_label()));
    frame.render_widget(salary, chunks[2]);

    let sort = Paragraph::new(format!("< {} >", state.controls.sort.label()))
        .block(focus_block(" Sort ".to_string(), state.focus == Focus::Sort));
    frame.render_widget(sort, chunks[3]);
}

fn draw_jobs(frame: &mut Frame, state: &AppState, list_state: &mut ListState, area: Rect) {
    let view = state.controller.renderer();
    let visible = view.visible_jobs();
    let block = focus_block(
        format!(" Jobs ({} of {}) ", visible.len(), state.controller.all_jobs().len()),
        state.focus == Focus::Jobs,
    );

    if let Some(message) = view.placeholder() {
        let placeholder = Paragraph::new(message.to_string())
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .filter_map(|id| state.controller.job(*id))
        .map(|entry| {
            let job = &entry.record;
            let title = if job.title.chars().count() > 35 {
                format!("{}...", job.title.chars().take(32).collect::<String>())
            } else {
                job.title.clone()
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!(" | {} | ", job.company)),
                    Span::styled(job.rate.clone(), Style::default().fg(Color::Green)),
                ]),
                Line::from(Span::styled(
                    format!("  {}", job.tags.join(", ")),
                    Style::default().fg(Color::Cyan),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, list_state);
}

fn draw_notice(frame: &mut Frame, notice: &str) {
    let area = frame.area();
    let width = area.width.min(64);
    let text = textwrap::fill(notice, width.saturating_sub(4) as usize);
    let height = (text.lines().count() as u16 + 4).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Apply ")
                .title_bottom(" press any key "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::NO_JOBS_MESSAGE;
    use crate::controls::FacetOption;
    use crate::models::JobRecord;

    fn job(title: &str, company: &str, rate: &str, tags: &[&str]) -> JobRecord {
        JobRecord {
            title: title.to_string(),
            company: company.to_string(),
            rate: rate.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn state() -> AppState {
        let page = Page {
            jobs: vec![
                job("Backend Engineer", "Acme", "$100/hr", &["full-time", "senior"]),
                job("Frontend Dev", "Beta", "$300/hr", &["contract", "junior"]),
            ],
            ..Default::default()
        };
        let controls = FilterControls {
            job_types: vec![FacetOption::new("Full Time"), FacetOption::new("Contract")],
            experience: vec![FacetOption::new("Junior"), FacetOption::new("Senior")],
            ..Default::default()
        };
        AppState::new(page, controls)
    }

    fn press(state: &mut AppState, keys: &[KeyCode]) {
        for key in keys {
            state.handle_key(*key);
        }
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            state.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn test_focus_cycles() {
        assert_eq!(Focus::Jobs.next(), Focus::Title);
        assert_eq!(Focus::Title.prev(), Focus::Jobs);
    }

    #[test]
    fn test_enter_in_title_searches() {
        let mut state = state();
        type_text(&mut state, "dex");
        state.handle_key(KeyCode::Backspace);
        type_text(&mut state, "v");
        state.handle_key(KeyCode::Enter);

        assert_eq!(state.controls.job_title, "dev");
        assert_eq!(state.visible_jobs(), vec![JobId(1)]);
    }

    #[test]
    fn test_space_toggles_experience_and_filters() {
        let mut state = state();
        type_text(&mut state, "dev");
        press(
            &mut state,
            &[KeyCode::Enter, KeyCode::Tab, KeyCode::Tab, KeyCode::Tab],
        );
        assert_eq!(state.focus, Focus::Experience);

        press(&mut state, &[KeyCode::Down, KeyCode::Char(' ')]);
        assert!(state.controls.experience[1].checked);
        assert!(state.visible_jobs().is_empty());
        assert_eq!(state.controller.renderer().placeholder(), Some(NO_JOBS_MESSAGE));
    }

    #[test]
    fn test_salary_keys_update_label() {
        let mut state = state();
        state.focus = Focus::Salary;
        state.handle_key(KeyCode::Left);

        assert_eq!(state.controls.salary.value, 990_000);
        assert_eq!(state.controller.renderer().salary_label(), "990,000");
    }

    #[test]
    fn test_sort_key_reorders_visible_jobs() {
        let mut state = state();
        state.focus = Focus::Sort;
        state.handle_key(KeyCode::Right);

        assert_eq!(state.controls.sort.as_str(), "rate-high");
        assert_eq!(state.visible_jobs(), vec![JobId(1), JobId(0)]);
    }

    #[test]
    fn test_apply_shows_notice_until_dismissed() {
        let mut state = state();
        state.focus = Focus::Jobs;
        press(&mut state, &[KeyCode::Char('j'), KeyCode::Char('j'), KeyCode::Char('a')]);

        let notice = state.notice.clone().unwrap();
        assert!(notice.contains("Frontend Dev"));
        assert!(notice.contains("Beta"));

        // Esc only closes the confirmation.
        state.handle_key(KeyCode::Esc);
        assert!(state.notice.is_none());
        assert!(!state.quit);

        state.handle_key(KeyCode::Char('q'));
        assert!(state.quit);
    }

    #[test]
    fn test_q_in_text_input_is_typed() {
        let mut state = state();
        state.handle_key(KeyCode::Char('q'));
        assert!(!state.quit);
        assert_eq!(state.controls.job_title, "q");
    }
}
