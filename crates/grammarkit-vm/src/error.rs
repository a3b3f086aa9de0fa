//! Errors that can occur while lexing or parsing.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// Execution fuel exhausted (too many rule evaluations).
    #[error("runtime execution limit exceeded ({0} steps)")]
    ExecFuelExhausted(u32),

    /// Recursion fuel exhausted (rule references nested too deeply).
    #[error("runtime recursion limit exceeded ({0} levels)")]
    RecursionLimitExceeded(u32),
}

/// Opt-in runtime limits. Both are unlimited by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FuelLimits {
    /// Maximum rule evaluations per run.
    pub(crate) exec_fuel: Option<u32>,
    /// Maximum depth of nested rule references.
    pub(crate) recursion_limit: Option<u32>,
}

impl FuelLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the execution fuel limit.
    pub fn exec_fuel(mut self, fuel: u32) -> Self {
        self.exec_fuel = Some(fuel);
        self
    }

    /// Set the recursion limit.
    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = Some(limit);
        self
    }

    pub fn get_exec_fuel(&self) -> Option<u32> {
        self.exec_fuel
    }

    pub fn get_recursion_limit(&self) -> Option<u32> {
        self.recursion_limit
    }
}
