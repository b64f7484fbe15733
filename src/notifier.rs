//! Queue of failures to present to the user.
//!
//! The controller pushes here instead of raising into the host page; the
//! host drains at its own pace and decides how to show each notice.

use std::{collections::VecDeque, fmt};

/// Standard title for service-side failures.
pub const T_SERVICE: &str = "Layout fixer";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserNotice {
    pub title: String,
    pub user_text: String,
    pub debug_text: String,
}

#[derive(Debug, Default)]
pub struct Notifier {
    queue: VecDeque<UserNotice>,
}

impl Notifier {
    /// Enqueues a notice.
    ///
    /// If the last queued notice has the same `title` and `user_text`, the new
    /// one is dropped so repeating failures do not pile up.
    pub fn push(&mut self, title: &str, user_text: &str, err: &dyn fmt::Debug) {
        if let Some(last) = self.queue.back()
            && last.title == title
            && last.user_text == user_text
        {
            return;
        }

        self.queue.push_back(UserNotice {
            title: title.to_string(),
            user_text: user_text.to_string(),
            debug_text: format!("{err:?}"),
        });
    }

    pub fn drain_one(&mut self) -> Option<UserNotice> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
