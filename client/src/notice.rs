//! [`Notice`]s shown to the user after their actions.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{runtime::Handle, sync::watch};

/// Kind of a [`Notice`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// Action has succeeded.
    Success,

    /// Action has failed.
    Failure,
}

/// Message about the outcome of an action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    /// [`Kind`] of this [`Notice`].
    pub kind: Kind,

    /// Human-readable message.
    pub message: String,

    /// Indicator whether this [`Notice`] stays until dismissed explicitly.
    pub persistent: bool,
}

impl Notice {
    /// Time a transient [`Notice`] is shown for.
    pub const DISMISS_AFTER: Duration = Duration::from_secs(2);

    /// Creates a new transient [`Kind::Success`] [`Notice`].
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Success,
            message: message.into(),
            persistent: false,
        }
    }

    /// Creates a new transient [`Kind::Failure`] [`Notice`].
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Failure,
            message: message.into(),
            persistent: false,
        }
    }

    /// Creates a new persistent [`Kind::Failure`] [`Notice`].
    #[must_use]
    pub fn alert(message: impl Into<String>) -> Self {
        Self {
            persistent: true,
            ..Self::failure(message)
        }
    }
}

/// Board showing a single [`Notice`] at a time.
#[derive(Clone, Debug, Default)]
pub struct Notices(Arc<Board>);

#[derive(Debug)]
struct Board {
    /// Number of [`Notice`]s shown so far, identifying the current one.
    shown: AtomicU64,

    /// Currently shown [`Notice`] along with its number.
    current: watch::Sender<Option<(u64, Notice)>>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            shown: AtomicU64::new(0),
            current: watch::Sender::new(None),
        }
    }
}

impl Notices {
    /// Creates a new empty [`Notices`] board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the provided [`Notice`], replacing the current one.
    ///
    /// Transient [`Notice`]s are dismissed after [`Notice::DISMISS_AFTER`],
    /// unless replaced earlier. Outside of a Tokio runtime there is no timer,
    /// so they stay until [`Notices::dismiss()`]ed or replaced.
    pub fn show(&self, notice: Notice) {
        let id = self.0.shown.fetch_add(1, Ordering::Relaxed) + 1;
        let persistent = notice.persistent;
        _ = self.0.current.send_replace(Some((id, notice)));
        if persistent {
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("no runtime to auto-dismiss notice #{id}");
            return;
        };
        let board = Arc::clone(&self.0);
        drop(runtime.spawn(async move {
            tokio::time::sleep(Notice::DISMISS_AFTER).await;
            _ = board.current.send_if_modified(|current| {
                let expired = current.as_ref().is_some_and(|(n, _)| *n == id);
                if expired {
                    *current = None;
                }
                expired
            });
        }));
    }

    /// Hides the current [`Notice`], if any.
    pub fn dismiss(&self) {
        _ = self.0.current.send_replace(None);
    }

    /// Returns the currently shown [`Notice`], if any.
    #[must_use]
    pub fn current(&self) -> Option<Notice> {
        self.0.current.borrow().as_ref().map(|(_, n)| n.clone())
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::{Notice, Notices};

    #[tokio::test(start_paused = true)]
    async fn transient_notice_is_dismissed() {
        let notices = Notices::new();

        notices.show(Notice::success("Property added to favorites!"));
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(
            notices.current().map(|n| n.message).as_deref(),
            Some("Property added to favorites!"),
        );

        sleep(Duration::from_millis(600)).await;
        assert_eq!(notices.current(), None);
    }

    #[test]
    fn shows_notice_outside_runtime() {
        let notices = Notices::new();

        notices.show(Notice::success("Saved"));

        assert_eq!(
            notices.current().map(|n| n.message),
            Some("Saved".to_owned()),
        );
        notices.dismiss();
        assert_eq!(notices.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn alert_persists() {
        let notices = Notices::new();

        notices.show(Notice::alert("Session expired"));
        sleep(Duration::from_secs(10)).await;
        assert!(notices.current().is_some());

        notices.dismiss();
        assert_eq!(notices.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_notice_keeps_its_own_timer() {
        let notices = Notices::new();

        notices.show(Notice::success("first"));
        sleep(Duration::from_millis(1500)).await;
        notices.show(Notice::failure("second"));
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(
            notices.current().map(|n| n.message).as_deref(),
            Some("second"),
        );

        sleep(Duration::from_millis(1100)).await;
        assert_eq!(notices.current(), None);
    }
}
