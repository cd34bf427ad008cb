//! Action logging with pattern-based filtering
//!
//! [`ActionLoggerMiddleware`] writes one `tracing` event per processed action.
//! Which actions are logged is controlled by glob patterns matched against
//! [`Action::name`](crate::Action::name).
//!
//! # Example
//!
//! ```ignore
//! use rex_dispatch_core::logger::{ActionLoggerConfig, ActionLoggerMiddleware};
//!
//! // Log only capture actions, skip the trigger
//! let config = ActionLoggerConfig::new(Some("*Capture*"), Some("Trigger"));
//! let middleware = ActionLoggerMiddleware::new(config);
//! ```

use crate::action::ActionSummary;
use crate::effect::Effect;
use crate::middleware::{GetState, Middleware, Next};

/// Configuration for action logging with glob pattern filtering.
///
/// Patterns support:
/// - `*` matches any sequence of characters
/// - `?` matches any single character
/// - Literal text matches exactly
///
/// # Examples
///
/// - `Capture*` matches CaptureSucceeded, CaptureFailed
/// - `*Failed` matches CaptureFailed, DetectFailed
/// - `Trigger` matches only Trigger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionLoggerConfig {
    /// If non-empty, only log actions matching these patterns
    pub include_patterns: Vec<String>,
    /// Exclude actions matching these patterns (applied after include)
    pub exclude_patterns: Vec<String>,
}

impl ActionLoggerConfig {
    /// Create a new config from comma-separated pattern strings
    ///
    /// # Example
    /// ```
    /// use rex_dispatch_core::logger::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("Capture*,Trigger"), Some("CaptureFailed"));
    /// assert!(config.should_log("CaptureSucceeded"));
    /// assert!(config.should_log("Trigger"));
    /// assert!(!config.should_log("CaptureFailed"));
    /// assert!(!config.should_log("SetText"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_default(),
        }
    }

    /// Check if an action name should be logged based on include/exclude patterns
    pub fn should_log(&self, action_name: &str) -> bool {
        if !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|p| glob_match(p, action_name))
        {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|p| glob_match(p, action_name))
    }
}

fn split_patterns(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Middleware that logs every processed action at debug level.
///
/// It never intercepts: the action always continues down the chain.
#[derive(Debug, Clone)]
pub struct ActionLoggerMiddleware {
    config: ActionLoggerConfig,
}

impl Default for ActionLoggerMiddleware {
    fn default() -> Self {
        Self::log_all()
    }
}

impl ActionLoggerMiddleware {
    pub fn new(config: ActionLoggerConfig) -> Self {
        Self { config }
    }

    /// Log every action.
    pub fn log_all() -> Self {
        Self::new(ActionLoggerConfig::default())
    }
}

impl<S, A: ActionSummary> Middleware<S, A> for ActionLoggerMiddleware {
    fn handle(&self, action: &A, state: &GetState<S>, next: Next<'_, S, A>) -> Effect<A> {
        if self.config.should_log(action.name()) {
            tracing::debug!(
                action = %action.name(),
                summary = %action.summary(),
                "action"
            );
        }
        next.run(action, state)
    }
}

/// Simple glob pattern matching supporting `*` and `?`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < text.len() {
        match pattern.get(pi) {
            Some('?') => {
                pi += 1;
                ti += 1;
            }
            Some('*') => {
                star = Some((pi, ti));
                pi += 1;
            }
            Some(c) if *c == text[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match star {
                // backtrack: let the last star swallow one more character
                Some((star_pi, star_ti)) => {
                    pi = star_pi + 1;
                    ti = star_ti + 1;
                    star = Some((star_pi, star_ti + 1));
                }
                None => return false,
            },
        }
    }

    pattern[pi..].iter().all(|c| *c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Action;

    #[test]
    fn test_glob_match_exact() {
        assert!(glob_match("Trigger", "Trigger"));
        assert!(!glob_match("Trigger", "Trigged"));
        assert!(!glob_match("Trigger", "TriggerAgain"));
    }

    #[test]
    fn test_glob_match_star() {
        assert!(glob_match("Capture*", "CaptureSucceeded"));
        assert!(glob_match("Capture*", "Capture"));
        assert!(!glob_match("Capture*", "StartCapture"));

        assert!(glob_match("*Capture", "StartCapture"));
        assert!(glob_match("*Detect*", "StartDetecting"));
        assert!(glob_match("*", ""));
    }

    #[test]
    fn test_glob_match_question() {
        assert!(glob_match("Tick?", "Ticks"));
        assert!(!glob_match("Tick?", "Tick"));
        assert!(!glob_match("Tick?", "Tickss"));
    }

    #[test]
    fn test_config_include_then_exclude() {
        let config = ActionLoggerConfig::new(Some("*Failed, Trigger"), Some("DetectFailed"));
        assert!(config.should_log("CaptureFailed"));
        assert!(config.should_log("Trigger"));
        assert!(!config.should_log("DetectFailed"));
        assert!(!config.should_log("SetText"));
    }

    #[test]
    fn test_default_config_logs_everything() {
        let config = ActionLoggerConfig::default();
        assert!(config.should_log("Anything"));
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Ping;

    impl Action for Ping {
        fn name(&self) -> &'static str {
            "Ping"
        }
    }

    impl ActionSummary for Ping {}

    #[test]
    fn test_logger_always_forwards() {
        let state = GetState::constant(());
        for logger in [
            ActionLoggerMiddleware::log_all(),
            ActionLoggerMiddleware::new(ActionLoggerConfig::new(None, Some("Ping"))),
        ] {
            let effect = Middleware::<(), Ping>::handle(&logger, &Ping, &state, Next::end());
            assert!(effect.is_none());
        }
    }
}
