use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Alert,
    Info,
    Reminder,
    Appointment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub kind: NotificationKind,
    pub unread: bool,
}

/// Newest-first notification list for one session.
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    items: Vec<Notification>,
}

impl NotificationCenter {
    /// The three notifications a fresh counselor session starts with.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let seed = [
            (
                "High Risk Alert",
                "3 students require immediate attention",
                Duration::hours(2),
                NotificationKind::Alert,
                true,
            ),
            (
                "Weekly Report Ready",
                "Your weekly analytics report is available",
                Duration::days(1),
                NotificationKind::Info,
                true,
            ),
            (
                "Appointment Reminder",
                "Meeting with John Doe at 3:00 PM today",
                Duration::hours(3),
                NotificationKind::Reminder,
                false,
            ),
        ];

        let items = seed
            .into_iter()
            .map(|(title, message, age, kind, unread)| Notification {
                id: Uuid::new_v4(),
                title: title.to_string(),
                message: message.to_string(),
                created_at: now - age,
                kind,
                unread,
            })
            .collect();

        NotificationCenter { items }
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| n.unread).count()
    }

    /// False when no notification has this id.
    pub fn mark_as_read(&mut self, id: Uuid) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.unread = false;
                true
            }
            None => false,
        }
    }

    pub fn push(&mut self, message: &str, kind: NotificationKind, now: DateTime<Utc>) -> Uuid {
        let title = match kind {
            NotificationKind::Appointment => "Appointment Scheduled",
            _ => "New Notification",
        };
        let notification = Notification {
            id: Uuid::new_v4(),
            title: title.to_string(),
            message: message.to_string(),
            created_at: now,
            kind,
            unread: true,
        };
        let id = notification.id;
        self.items.insert(0, notification);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_center_has_two_unread() {
        let center = NotificationCenter::seeded(Utc::now());
        assert_eq!(center.items().len(), 3);
        assert_eq!(center.unread_count(), 2);
    }

    #[test]
    fn mark_as_read_is_idempotent() {
        let mut center = NotificationCenter::seeded(Utc::now());
        let first = center.items()[0].id;
        assert!(center.mark_as_read(first));
        assert!(center.mark_as_read(first));
        assert_eq!(center.unread_count(), 1);
        assert!(!center.mark_as_read(Uuid::new_v4()));
    }

    #[test]
    fn push_adds_unread_at_front() {
        let now = Utc::now();
        let mut center = NotificationCenter::default();
        center.push("General notice", NotificationKind::Info, now);
        let id = center.push("Meeting at 4 PM", NotificationKind::Appointment, now);

        assert_eq!(center.items()[0].id, id);
        assert_eq!(center.items()[0].title, "Appointment Scheduled");
        assert_eq!(center.items()[1].title, "New Notification");
        assert_eq!(center.unread_count(), 2);
    }
}
