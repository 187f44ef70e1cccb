use std::collections::HashSet;

use crate::models::JobId;

/// Rendering side of the board: the list container and the few labels the
/// controller writes to. Implementations own the job elements; the
/// controller only refers to them by id.
pub trait Renderer {
    fn set_visible(&mut self, id: JobId, visible: bool);

    /// Moves each element to the end of the list container, in the given order.
    fn reorder(&mut self, ids: &[JobId]);

    /// Replaces the container's content with a single message.
    fn show_placeholder(&mut self, message: &str);

    fn clear_placeholder(&mut self);

    /// Ids of the job elements currently in the container and visible, in container order.
    fn visible_jobs(&self) -> Vec<JobId>;

    fn set_salary_label(&mut self, text: &str);

    /// Blocking confirmation shown to the user.
    fn confirm(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Job(JobId),
    Placeholder(String),
}

/// In-memory model of the job list container.
///
/// Mirrors how a page behaves: replacing the content with a placeholder
/// detaches every job element, and moving a detached element to the end
/// attaches it again.
#[derive(Debug, Default)]
pub struct ListView {
    children: Vec<Child>,
    hidden: HashSet<JobId>,
    salary_label: String,
    notices: Vec<String>,
}

impl ListView {
    /// A container holding `ids` in order, all visible.
    pub fn new(ids: impl IntoIterator<Item = JobId>) -> Self {
        Self {
            children: ids.into_iter().map(Child::Job).collect(),
            ..Default::default()
        }
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn is_visible(&self, id: JobId) -> bool {
        !self.hidden.contains(&id)
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.children.iter().find_map(|child| match child {
            Child::Placeholder(message) => Some(message.as_str()),
            Child::Job(_) => None,
        })
    }

    pub fn salary_label(&self) -> &str {
        &self.salary_label
    }

    /// Oldest confirmation message not yet acknowledged.
    pub fn take_notice(&mut self) -> Option<String> {
        if self.notices.is_empty() {
            None
        } else {
            Some(self.notices.remove(0))
        }
    }
}

impl Renderer for ListView {
    fn set_visible(&mut self, id: JobId, visible: bool) {
        if visible {
            self.hidden.remove(&id);
        } else {
            self.hidden.insert(id);
        }
    }

    fn reorder(&mut self, ids: &[JobId]) {
        for id in ids {
            self.children.retain(|child| *child != Child::Job(*id));
            self.children.push(Child::Job(*id));
        }
    }

    fn show_placeholder(&mut self, message: &str) {
        self.children = vec![Child::Placeholder(message.to_string())];
    }

    fn clear_placeholder(&mut self) {
        self.children
            .retain(|child| !matches!(child, Child::Placeholder(_)));
    }

    fn visible_jobs(&self) -> Vec<JobId> {
        self.children
            .iter()
            .filter_map(|child| match child {
                Child::Job(id) if self.is_visible(*id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn set_salary_label(&mut self, text: &str) {
        self.salary_label = text.to_string();
    }

    fn confirm(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
