use owo_colors::OwoColorize;
use prismweave_core::{Notifier, ToastKind, ToastOptions};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "PrismWeave".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Capture web pages as markdown\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
#[allow(dead_code)]
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Console-rendered toasts.
///
/// The terminal surface has no transient UI, so each toast prints once,
/// styled by kind. Never a blocking prompt.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    next_id: u64,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for ConsoleNotifier {
    fn show(&mut self, message: &str, options: ToastOptions) -> u64 {
        match options.kind {
            ToastKind::Success => print_success(message),
            ToastKind::Error => print_error(message),
            ToastKind::Info => print_info(message),
        }

        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
