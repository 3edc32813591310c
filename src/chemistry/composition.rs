use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::chemistry::blocks::{BuildingBlock, BuildingBlockTable};
use crate::error::AnalyteError;
use crate::settings::Settings;

/// Unit name that marks the composition-dependent permethylation modifier.
pub const PERMETHYLATION_UNIT: &str = "Per";

/// A mass modifier resolved to its application rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    /// Added once, unscaled. The charge carrier is applied this way too.
    Independent(String),
    /// Scaled by the number of reactive sites of the base composition.
    Permethylation(String),
}

/// Elemental totals accumulated for one analyte.
///
/// Counts are signed because the permethylation pass can drive them negative
/// for compositions with too few free hydroxyl groups; such a result is
/// physically invalid but is propagated rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementalComposition {
    pub mass: f64,
    pub carbons: i32,
    pub hydrogens: i32,
    pub nitrogens: i32,
    pub oxygens: i32,
    pub sulfurs: i32,
    /// Total number of monomer units in the base composition.
    pub total_units: u32,
    /// Number of sialic-acid units in the base composition.
    pub sialic_acids: u32,
}

impl ElementalComposition {
    /// True when no element carries a positive count, so there is no
    /// isotopologue distribution to expand.
    pub fn is_empty(&self) -> bool {
        self.carbons <= 0
            && self.hydrogens <= 0
            && self.nitrogens <= 0
            && self.oxygens <= 0
            && self.sulfurs <= 0
    }

    fn add_block(&mut self, block: &BuildingBlock, count: u32) {
        self.mass += block.mass * count as f64;
        self.carbons += (block.carbons * count) as i32;
        self.hydrogens += (block.hydrogens * count) as i32;
        self.nitrogens += (block.nitrogens * count) as i32;
        self.oxygens += (block.oxygens * count) as i32;
        self.sulfurs += (block.sulfurs * count) as i32;
    }
}

/// Split an analyte name into alternating runs of letters and digits.
///
/// # Examples
///
/// ```
/// use glycore::chemistry::composition::tokenize_name;
///
/// let pairs = tokenize_name("H5N4S2").unwrap();
/// assert_eq!(pairs, vec![
///     ("H".to_string(), 5),
///     ("N".to_string(), 4),
///     ("S".to_string(), 2),
/// ]);
/// assert!(tokenize_name("H5N").is_err());
/// assert!(tokenize_name("5H4").is_err());
/// ```
pub fn tokenize_name(name: &str) -> Result<Vec<(String, u32)>, AnalyteError> {
    let pattern = Regex::new(r"([A-Za-z]+)(\d+)").unwrap();

    let mut pairs: Vec<(String, u32)> = Vec::new();
    let mut matched_up_to = 0;
    for captures in pattern.captures_iter(name) {
        let whole = captures.get(0).unwrap();
        // Every letter run must be followed directly by a digit run, any gap
        // between matches means the name is malformed
        if whole.start() != matched_up_to {
            return Err(AnalyteError::MalformedName(name.to_string()));
        }
        matched_up_to = whole.end();

        let count: u32 = captures[2]
            .parse()
            .map_err(|_| AnalyteError::MalformedName(name.to_string()))?;
        pairs.push((captures[1].to_string(), count));
    }

    if matched_up_to != name.len() || pairs.is_empty() {
        return Err(AnalyteError::MalformedName(name.to_string()));
    }
    Ok(pairs)
}

/// Resolve an analyte name into its elemental composition.
///
/// Matched unit/count pairs are accumulated into running elemental totals,
/// then the configured modifiers are applied in two passes: independent
/// modifiers (the charge carrier among them) first, the composition-dependent
/// permethylation second. Unit names without a building-block entry are
/// skipped and contribute nothing.
///
/// # Examples
///
/// ```
/// use glycore::chemistry::blocks::glycan_blocks;
/// use glycore::chemistry::composition::resolve;
/// use glycore::settings::Settings;
///
/// let composition = resolve("H5N4", &glycan_blocks(), &Settings::default()).unwrap();
/// assert_eq!(composition.total_units, 9);
/// assert_eq!(composition.carbons, 5 * 6 + 4 * 8);
/// ```
pub fn resolve(
    name: &str,
    blocks: &BuildingBlockTable,
    settings: &Settings,
) -> Result<ElementalComposition, AnalyteError> {
    let mut composition = ElementalComposition::default();

    for (unit, count) in tokenize_name(name)? {
        match blocks.lookup(&unit) {
            Some(block) => {
                composition.add_block(block, count);
                composition.total_units += count;
                if block.sialic_acid {
                    composition.sialic_acids += count;
                }
            }
            None => {
                warn!(
                    "unknown building block '{}' in analyte '{}' contributes nothing",
                    unit, name
                );
            }
        }
    }

    apply_modifiers(&mut composition, blocks, &settings.resolved_modifiers());
    Ok(composition)
}

/// Number of methylation-reactive sites of a base composition.
pub fn permethylation_sites(composition: &ElementalComposition) -> i32 {
    composition.oxygens
        - (2 * composition.total_units as i32 - 2)
        - 1
        - composition.sialic_acids as i32
}

fn apply_modifiers(
    composition: &mut ElementalComposition,
    blocks: &BuildingBlockTable,
    modifiers: &[Modifier],
) {
    // Modifiers that are independent of other modifiers
    for modifier in modifiers {
        if let Modifier::Independent(name) = modifier {
            match blocks.lookup(name) {
                Some(block) => composition.add_block(block, 1),
                None => warn!("modifier '{}' has no building block entry, skipped", name),
            }
        }
    }

    // Modifiers that scale with the already accumulated composition
    for modifier in modifiers {
        if let Modifier::Permethylation(name) = modifier {
            let Some(block) = blocks.lookup(name) else {
                warn!("modifier '{}' has no building block entry, skipped", name);
                continue;
            };
            let sites = permethylation_sites(composition);
            if sites < 0 {
                warn!(
                    "permethylation site count is negative ({}) for this composition",
                    sites
                );
            }
            composition.carbons += block.carbons as i32 * sites;
            composition.hydrogens += block.hydrogens as i32 * sites * 2;
            composition.mass += block.mass * sites as f64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::blocks::glycan_blocks;

    fn no_carrier_settings() -> Settings {
        // "None" has no table entry, so nothing is added for the carrier
        Settings {
            charge_carrier: "None".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_tokenize_rejects_partial_names() {
        assert!(matches!(
            tokenize_name("H5N"),
            Err(AnalyteError::MalformedName(_))
        ));
        assert!(matches!(
            tokenize_name(""),
            Err(AnalyteError::MalformedName(_))
        ));
        assert!(matches!(
            tokenize_name("2H5"),
            Err(AnalyteError::MalformedName(_))
        ));
        assert!(matches!(
            tokenize_name("H5-N4"),
            Err(AnalyteError::MalformedName(_))
        ));
    }

    #[test]
    fn test_accumulation_over_units() {
        let composition = resolve("H5N4S2", &glycan_blocks(), &no_carrier_settings()).unwrap();

        assert_eq!(composition.total_units, 11);
        assert_eq!(composition.sialic_acids, 2);
        assert_eq!(composition.carbons, 5 * 6 + 4 * 8 + 2 * 11);
        assert_eq!(composition.nitrogens, 4 + 2);
        let expected_mass = 5.0 * 162.0528234315 + 4.0 * 203.0793725337 + 2.0 * 291.0954165066;
        assert!((composition.mass - expected_mass).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_units_are_skipped_silently() {
        let with_unknown = resolve("H5X3N4", &glycan_blocks(), &no_carrier_settings()).unwrap();
        let without = resolve("H5N4", &glycan_blocks(), &no_carrier_settings()).unwrap();

        // The unknown unit contributes nothing at all, not even unit counts
        assert_eq!(with_unknown, without);
    }

    #[test]
    fn test_charge_carrier_added_once() {
        let bare = resolve("H5N4", &glycan_blocks(), &no_carrier_settings()).unwrap();
        let protonated = resolve("H5N4", &glycan_blocks(), &Settings::default()).unwrap();

        assert!((protonated.mass - bare.mass - 1.007276466621).abs() < 1e-9);
        assert_eq!(protonated.hydrogens, bare.hydrogens + 1);
    }

    #[test]
    fn test_permethylation_site_formula() {
        // total_units = 4, oxygens = 10, sialic_acids = 0 -> 3 sites
        let composition = ElementalComposition {
            oxygens: 10,
            total_units: 4,
            ..Default::default()
        };
        assert_eq!(permethylation_sites(&composition), 3);
    }

    #[test]
    fn test_permethylation_scaling() {
        let mut table = BuildingBlockTable::new();
        // Two synthetic residues giving total_units = 4 and oxygens = 10
        table.insert(
            "A",
            BuildingBlock {
                mass: 100.0,
                carbons: 4,
                hydrogens: 6,
                oxygens: 3,
                ..Default::default()
            },
        );
        table.insert(
            "B",
            BuildingBlock {
                mass: 120.0,
                carbons: 5,
                hydrogens: 8,
                oxygens: 2,
                ..Default::default()
            },
        );
        table.insert(
            "Per",
            BuildingBlock {
                mass: 14.0156500642,
                carbons: 1,
                hydrogens: 1,
                mass_modifier: true,
                ..Default::default()
            },
        );

        let settings = Settings {
            mass_modifiers: vec!["Per".to_string()],
            charge_carrier: "None".to_string(),
            ..Settings::default()
        };
        let composition = resolve("A2B2", &table, &settings).unwrap();

        // 3 sites: carbons + 3, hydrogens + 6, mass + 3 * 14.0156500642
        assert_eq!(composition.carbons, 2 * 4 + 2 * 5 + 3);
        assert_eq!(composition.hydrogens, 2 * 6 + 2 * 8 + 6);
        let base_mass = 2.0 * 100.0 + 2.0 * 120.0;
        assert!((composition.mass - base_mass - 3.0 * 14.0156500642).abs() < 1e-9);
    }

    #[test]
    fn test_negative_permethylation_sites_propagate() {
        // An oxygen-free residue drives the site count negative:
        // sites = 0 - (2 * 2 - 2) - 1 = -3
        let mut table = BuildingBlockTable::new();
        table.insert(
            "C",
            BuildingBlock {
                mass: 12.0,
                carbons: 1,
                ..Default::default()
            },
        );
        table.insert(
            "Per",
            BuildingBlock {
                mass: 14.0156500642,
                carbons: 1,
                hydrogens: 1,
                mass_modifier: true,
                ..Default::default()
            },
        );

        let settings = Settings {
            mass_modifiers: vec!["Per".to_string()],
            charge_carrier: "None".to_string(),
            ..Settings::default()
        };
        let composition = resolve("C2", &table, &settings).unwrap();

        assert_eq!(composition.carbons, 2 - 3);
        assert_eq!(composition.hydrogens, -6);
        assert!((composition.mass - (24.0 - 3.0 * 14.0156500642)).abs() < 1e-9);
    }
}
