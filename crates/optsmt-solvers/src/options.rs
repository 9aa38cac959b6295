// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Reads an environment variable, defaulting to the empty string.
pub(crate) fn read_env_var(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// Solver session options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverOptions {
    /// Path to the z3 executable. Empty means `Z3_EXE` from the
    /// environment, falling back to `z3` on the PATH.
    pub z3_exe: String,
    /// Whether satisfiable checks produce models.
    pub generate_models: bool,
    /// Whether each model snapshot is re-evaluated against the asserted
    /// formulas, logging a warning on mismatch.
    pub validate_models: bool,
    /// Seed for the solver's search heuristics.
    pub random_seed: Option<u32>,
    /// Soft timeout per check, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Write every command sent to the solver into this file.
    pub dump_smtlib: Option<PathBuf>,
    /// Additional `set-option` pairs sent verbatim at session start.
    pub extra_options: BTreeMap<String, String>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            z3_exe: read_env_var("Z3_EXE"),
            generate_models: true,
            validate_models: false,
            random_seed: None,
            timeout_ms: None,
            dump_smtlib: None,
            extra_options: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_produce_models_without_validation() {
        let options = SolverOptions::default();
        assert!(options.generate_models);
        assert!(!options.validate_models);
        assert_eq!(options.random_seed, None);
        assert_eq!(options.timeout_ms, None);
        assert!(options.extra_options.is_empty());
    }
}
