use crate::EntityId;

/// Read-only world access.
///
/// The core crate does not prescribe which queries a world exposes; the movement, combat and
/// interaction layers define extension traits on top of this one.
pub trait WorldView {
    type Entity: EntityId;

    /// Human-readable name for logs and user notices.
    fn describe(&self, entity: Self::Entity) -> String {
        format!("{entity:?}")
    }
}

/// Write access / effect sink.
///
/// Notification is fire-and-forget: nodes never branch on whether the host displayed anything.
pub trait WorldMut: WorldView {
    /// Show a progress or status line to the user. An empty message clears the line.
    fn notify_user(&mut self, _message: &str) {}

    /// Text currently on the host's status line, for hosts that keep track of it.
    fn status_text(&self) -> Option<&str> {
        None
    }

    /// Show `message` unless the status line already reads exactly that. Returns whether it was
    /// sent.
    ///
    /// Every node posting progress goes through here, so the comparison is against what the
    /// user actually sees rather than what the caller sent last.
    fn post_status(&mut self, message: &str) -> bool {
        if self.status_text() == Some(message) {
            return false;
        }
        self.notify_user(message);
        true
    }

    /// Surface a problem that needs the user's attention (bad configuration, etc.).
    fn report_error(&mut self, _message: &str) {}

    /// Set the long-lived goal line shown by the host. An empty text clears it.
    fn set_goal_text(&mut self, _text: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Screen {
        shown: String,
        sent: usize,
    }

    impl WorldView for Screen {
        type Entity = u64;
    }

    impl WorldMut for Screen {
        fn notify_user(&mut self, message: &str) {
            self.shown = message.to_string();
            self.sent += 1;
        }

        fn status_text(&self) -> Option<&str> {
            Some(self.shown.as_str())
        }
    }

    #[test]
    fn post_status_skips_what_is_already_shown() {
        let mut screen = Screen::default();
        assert!(screen.post_status("Moving to shrine"));
        assert!(!screen.post_status("Moving to shrine"));

        screen.notify_user("Selecting new target: 7");
        assert!(screen.post_status("Moving to shrine"));
        assert_eq!(screen.sent, 3);
    }

    #[test]
    fn untracked_status_is_always_sent() {
        struct Blind(usize);
        impl WorldView for Blind {
            type Entity = u64;
        }
        impl WorldMut for Blind {
            fn notify_user(&mut self, _message: &str) {
                self.0 += 1;
            }
        }

        let mut blind = Blind(0);
        blind.post_status("a");
        blind.post_status("a");
        assert_eq!(blind.0, 2);
    }
}
