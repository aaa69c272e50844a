//! Counselor dashboard session state.
//!
//! One `Dashboard` is built at startup and handed to whatever renders it.
//! Search and filters rebuild the visible list from the full roster; sorting
//! reorders the visible list. Every view change returns to page 1.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::{RosterStats, StudentRecord};
use crate::notifications::NotificationCenter;
use crate::roster::{self, NewStudent, Page, Paginator, RosterError, RosterFilter, SortKey};

#[derive(Debug, Clone)]
pub struct Dashboard {
    students: Vec<StudentRecord>,
    visible: Vec<StudentRecord>,
    sort_key: Option<SortKey>,
    pages: Paginator,
    pub notifications: NotificationCenter,
}

impl Dashboard {
    pub fn new(students: Vec<StudentRecord>, config: &AppConfig) -> Self {
        Dashboard {
            visible: students.clone(),
            students,
            sort_key: None,
            pages: Paginator::new(config.page_size),
            notifications: NotificationCenter::seeded(Utc::now()),
        }
    }

    pub fn visible(&self) -> &[StudentRecord] {
        &self.visible
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    pub fn apply_filters(&mut self, filter: RosterFilter) {
        self.visible = roster::filter(&self.students, &filter);
        self.pages.reset();
    }

    pub fn search(&mut self, term: &str) {
        self.visible = roster::search(&self.students, term);
        self.pages.reset();
    }

    pub fn sort(&mut self, key: SortKey) {
        self.sort_key = Some(key);
        roster::sort(&mut self.visible, key);
        self.pages.reset();
    }

    pub fn reset(&mut self) {
        self.sort_key = None;
        self.visible = self.students.clone();
        self.pages.reset();
    }

    pub fn visible_page(&self) -> Page {
        self.pages.page(&self.visible)
    }

    pub fn next_page(&mut self) -> bool {
        self.pages.next(self.visible.len())
    }

    pub fn prev_page(&mut self) -> bool {
        self.pages.prev()
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.pages.go_to(page, self.visible.len());
    }

    /// The new student goes to the front and the view shows the whole roster.
    pub fn add_student(
        &mut self,
        new_student: NewStudent,
        today: NaiveDate,
    ) -> Result<Uuid, RosterError> {
        let id = roster::add_student(&mut self.students, new_student, today)?;
        self.visible = self.students.clone();
        self.pages.reset();
        Ok(id)
    }

    pub fn find(&self, id: Uuid) -> Option<&StudentRecord> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn stats(&self) -> RosterStats {
        roster::stats(&self.students)
    }
}
