//! Custom test assertions

use tourney_watch::{Alert, AlertStatus};

/// Assertions for alerts
pub trait AlertAssertions {
    /// `ends_at` is set exactly when the alert is resolved
    fn assert_ends_at_consistent(&self);

    fn assert_status(&self, status: AlertStatus);
}

impl AlertAssertions for Alert {
    fn assert_ends_at_consistent(&self) {
        assert_eq!(
            self.ends_at.is_some(),
            self.status == AlertStatus::Resolved,
            "alert {} has status {} but ends_at {:?}",
            self.id,
            self.status,
            self.ends_at
        );
    }

    fn assert_status(&self, status: AlertStatus) {
        assert_eq!(
            self.status, status,
            "alert {} expected {}, got {}",
            self.id, status, self.status
        );
        self.assert_ends_at_consistent();
    }
}
