//! Transient user feedback (toasts).
//!
//! All surfaces report success and failure through the same toast model:
//! a single [`ToastHub`] holds the active toasts (the singleton-container
//! behavior of the original page-injected UI), each toast auto-expires
//! after its duration, and a zero duration persists the toast until it is
//! dismissed. Blocking dialogs are never used under any code path; the
//! hub is the only feedback mechanism.

use std::time::{Duration, Instant};

/// Visual category of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// Display options for a toast.
#[derive(Debug, Clone, Copy)]
pub struct ToastOptions {
    pub kind: ToastKind,
    /// Auto-dismiss delay in milliseconds. `0` persists the toast until
    /// dismissed, honored only when `dismissible`.
    pub duration_ms: u64,
    /// Whether the user can dismiss the toast manually.
    pub dismissible: bool,
}

/// Default auto-dismiss delay.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 4000;

impl Default for ToastOptions {
    fn default() -> Self {
        Self { kind: ToastKind::Info, duration_ms: DEFAULT_TOAST_DURATION_MS, dismissible: true }
    }
}

impl ToastOptions {
    pub fn success() -> Self {
        Self { kind: ToastKind::Success, ..Default::default() }
    }

    pub fn error() -> Self {
        Self { kind: ToastKind::Error, ..Default::default() }
    }
}

/// A toast currently shown by the hub.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    pub dismissible: bool,
    shown_at: Instant,
    expires_at: Option<Instant>,
}

/// Sink for toasts a surface renders to the user.
///
/// The CLI renders them as styled console lines; tests read the hub
/// directly.
pub trait Notifier {
    fn show(&mut self, message: &str, options: ToastOptions) -> u64;
}

/// The process-wide toast container.
///
/// Owned by the surface and passed by reference; there is no ambient
/// global. `sweep` must be called with the current instant to expire
/// toasts whose duration has elapsed.
#[derive(Debug, Default)]
pub struct ToastHub {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active (not yet expired or dismissed) toasts, oldest first.
    pub fn active(&self) -> &[Toast] {
        &self.toasts
    }

    /// Remove toasts whose duration elapsed before `now`.
    ///
    /// Persistent toasts (`duration_ms: 0`, dismissible) are unaffected.
    pub fn sweep(&mut self, now: Instant) {
        self.toasts.retain(|t| match t.expires_at {
            Some(deadline) => now < deadline,
            None => true,
        });
    }

    /// Dismiss a toast by id.
    ///
    /// Only dismissible toasts are removed; returns whether one was.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| !(t.id == id && t.dismissible));
        self.toasts.len() != before
    }
}

impl Notifier for ToastHub {
    fn show(&mut self, message: &str, options: ToastOptions) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let shown_at = Instant::now();
        // duration 0 only persists when the toast can be dismissed
        let duration_ms = if options.duration_ms == 0 && !options.dismissible {
            DEFAULT_TOAST_DURATION_MS
        } else {
            options.duration_ms
        };

        let expires_at = if duration_ms == 0 { None } else { Some(shown_at + Duration::from_millis(duration_ms)) };

        self.toasts.push(Toast {
            id,
            message: message.to_string(),
            kind: options.kind,
            dismissible: options.dismissible,
            shown_at,
            expires_at,
        });

        id
    }
}

impl Toast {
    /// How long the toast has been visible as of `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.shown_at)
    }
}
