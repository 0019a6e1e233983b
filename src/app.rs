//! Application context — unified state passed to every command handler.
//!
//! Constructed once in `Cli::run()`; adding a cross-cutting concern
//! requires only one field change here, not a signature change per
//! command.

use anyhow::Result;

use crate::application::ports::ConfirmationGate;
use crate::output::{OutputContext, TerminalReporter};

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Skip interactive prompts (also set by `CI` / `APIARY_YES` env vars).
    pub yes: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `APIARY_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("APIARY_YES").is_ok();
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            non_interactive: flags.yes || ci_env,
        }
    }

    /// Progress reporter bound to this context's output.
    #[must_use]
    pub fn terminal_reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Confirmation gate for irreversible steps. `force` answers yes
    /// without prompting, as does non-interactive mode.
    #[must_use]
    pub fn gate(&self, force: bool) -> DialogGate {
        DialogGate {
            assume_yes: force || self.non_interactive,
        }
    }
}

/// Terminal-backed `ConfirmationGate`.
pub struct DialogGate {
    assume_yes: bool,
}

impl ConfirmationGate for DialogGate {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        Ok(confirmed)
    }
}
