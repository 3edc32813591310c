use serde::{Deserialize, Serialize};

use crate::chemistry::composition::{Modifier, PERMETHYLATION_UNIT};

/// Processing parameters consumed by the core, read-only during analysis.
///
/// Values are validated by the configuration layer before analysis starts;
/// the core does not re-validate ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Building-block names applied once to every analyte, in order.
    pub mass_modifiers: Vec<String>,
    /// Building-block name of the ionizing species.
    pub charge_carrier: String,
    /// Mass tolerance for merging near-degenerate isotopologue combinations.
    pub epsilon: f64,
    /// Minimum probability for a single isotopologue point to take part in
    /// the combinatorial expansion.
    pub min_contribution: f64,
    /// Cumulative abundance at which the ranked envelope is truncated.
    pub min_total_contribution: f64,
    /// Half-width of the spectral window extracted around an analyte.
    pub mass_window: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mass_modifiers: Vec::new(),
            charge_carrier: "Proton".to_string(),
            epsilon: 0.5,
            min_contribution: 0.0001,
            min_total_contribution: 0.95,
            mass_window: 0.25,
        }
    }
}

impl Settings {
    /// Resolve the configured modifier names plus the charge carrier into
    /// tagged modifier kinds.
    ///
    /// The permethylation unit is recognized here, once, so that no string
    /// comparison happens during per-analyte calculation.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycore::chemistry::composition::Modifier;
    /// use glycore::settings::Settings;
    ///
    /// let mut settings = Settings::default();
    /// settings.mass_modifiers = vec!["Per".to_string()];
    /// let modifiers = settings.resolved_modifiers();
    /// assert_eq!(modifiers[0], Modifier::Permethylation("Per".to_string()));
    /// assert_eq!(modifiers[1], Modifier::Independent("Proton".to_string()));
    /// ```
    pub fn resolved_modifiers(&self) -> Vec<Modifier> {
        let mut modifiers: Vec<Modifier> = self
            .mass_modifiers
            .iter()
            .map(|name| {
                if name == PERMETHYLATION_UNIT {
                    Modifier::Permethylation(name.clone())
                } else {
                    Modifier::Independent(name.clone())
                }
            })
            .collect();
        modifiers.push(Modifier::Independent(self.charge_carrier.clone()));
        modifiers
    }
}
