//! Built-in exercise sets, so the trainer is useful without any configuration.

use std::path::Path;

use tracing::error;

use crate::config::parse_set;
use crate::domain::ExerciseSet;
use crate::strategy::StrategyRegistry;

const BUILTIN: &[(&str, &str)] = &[
  ("tables", include_str!("../exercises/tables.toml")),
  ("simple_css", include_str!("../exercises/simple_css.toml")),
  ("box_sizes", include_str!("../exercises/box_sizes.toml")),
  ("box_model", include_str!("../exercises/box_model.toml")),
  ("nested_divs", include_str!("../exercises/nested_divs.toml")),
];

/// Set served when nothing else is configured.
pub const DEFAULT_SET: &str = "tables";

/// Every built-in set that parses and validates against `registry`.
pub fn builtin_sets(registry: &StrategyRegistry) -> Vec<ExerciseSet> {
  BUILTIN
    .iter()
    .filter_map(|(name, text)| {
      let path = Path::new("exercises").join(format!("{name}.toml"));
      match parse_set(name, text, &path, registry) {
        Ok(set) => Some(set),
        Err(e) => {
          error!(target: "markup_trainer", %name, error = %e, "Built-in exercise set is broken");
          None
        }
      }
    })
    .collect()
}
