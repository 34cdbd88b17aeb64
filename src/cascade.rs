//! First-match-wins driver for ordered extraction strategies.
//!
//! Every extractor in the crate that tries several approaches in priority
//! order declares them as a table of named steps and hands the table to
//! [`first_match`]. The order of the table is the priority order.

use regex::Regex;
use std::sync::LazyLock;

/// One named step of a cascade.
pub trait CascadeStep<T> {
    /// Stable name of the step, used in logs and tests.
    fn name(&self) -> &'static str;

    /// Attempts the step. `None` means "did not apply".
    fn attempt(&self, input: &str) -> Option<T>;
}

/// A step backed by a plain function.
#[derive(Clone, Copy)]
pub struct Strategy<T> {
    /// Step name
    pub name: &'static str,
    /// Step implementation
    pub run: fn(&str) -> Option<T>,
}

impl<T> Strategy<T> {
    /// Creates a function-backed step.
    pub const fn new(name: &'static str, run: fn(&str) -> Option<T>) -> Self {
        Self { name, run }
    }
}

impl<T> std::fmt::Debug for Strategy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

impl<T> CascadeStep<T> for Strategy<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt(&self, input: &str) -> Option<T> {
        (self.run)(input)
    }
}

/// A step that matches a labeled field and yields its first capture group.
///
/// The captured value is passed through `clean`; an empty cleaned value
/// counts as no match so that the next pattern gets a chance.
pub struct LabeledPattern {
    /// Step name
    pub name: &'static str,
    /// Pattern with exactly one capture group for the value
    pub pattern: LazyLock<Regex>,
    /// Post-processing for the captured value
    pub clean: fn(&str) -> String,
}

impl std::fmt::Debug for LabeledPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabeledPattern")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

impl CascadeStep<String> for LabeledPattern {
    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt(&self, input: &str) -> Option<String> {
        let captures = self.pattern.captures(input)?;
        let value = (self.clean)(captures.get(1)?.as_str());
        (!value.is_empty()).then_some(value)
    }
}

/// Runs the steps in order and returns the first result together with the
/// name of the step that produced it.
pub fn first_match<T, S: CascadeStep<T>>(steps: &[S], input: &str) -> Option<(&'static str, T)> {
    for step in steps {
        match step.attempt(input) {
            Some(value) => {
                tracing::debug!(step = step.name(), "cascade step matched");
                return Some((step.name(), value));
            }
            None => tracing::trace!(step = step.name(), "cascade step skipped"),
        }
    }
    None
}
