use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chemistry::constants::{MASS_ELECTRON, MASS_PROTON, MASS_WATER};

/// A named chemical unit with a fixed monoisotopic mass and elemental
/// composition: a monosaccharide residue, a mass modifier, or a charge
/// carrier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildingBlock {
    pub mass: f64,
    pub carbons: u32,
    pub hydrogens: u32,
    pub nitrogens: u32,
    pub oxygens: u32,
    pub sulfurs: u32,
    /// Eligible for selection as a mass modifier.
    pub mass_modifier: bool,
    /// Eligible for selection as the charge carrier.
    pub charge_carrier: bool,
    /// Counts towards the sialic-acid total of a composition.
    pub sialic_acid: bool,
}

/// Lookup of building blocks by unit name.
///
/// Loaded once and shared read-only by all analytes. Always passed as an
/// explicit parameter so tests can substitute synthetic tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildingBlockTable {
    blocks: HashMap<String, BuildingBlock>,
}

impl BuildingBlockTable {
    pub fn new() -> Self {
        BuildingBlockTable {
            blocks: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, block: BuildingBlock) {
        self.blocks.insert(name.into(), block);
    }

    /// Look up a building block by its unit name.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycore::chemistry::blocks::glycan_blocks;
    ///
    /// let table = glycan_blocks();
    /// assert_eq!(table.lookup("H").unwrap().oxygens, 5);
    /// assert!(table.lookup("X").is_none());
    /// ```
    pub fn lookup(&self, name: &str) -> Option<&BuildingBlock> {
        self.blocks.get(name)
    }

    /// Unit names that may be offered as mass modifiers.
    ///
    /// This is the population for the `mass_modifiers` field of
    /// [`crate::settings::Settings`]: a configuration front end lists these
    /// names and the user's picks are passed through verbatim. Keep this in
    /// sync with what [`crate::chemistry::composition::resolve`] will accept,
    /// otherwise a selectable modifier would be silently skipped at
    /// resolution time.
    pub fn mass_modifier_candidates(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(|(_, block)| block.mass_modifier)
            .map(|(name, _)| name.as_str())
    }

    /// Unit names that may be offered as the charge carrier.
    ///
    /// Like [`Self::mass_modifier_candidates`], this populates the
    /// `charge_carrier` choice of [`crate::settings::Settings`]. Exactly one
    /// of these names is expected per run; the default table offers `Proton`,
    /// `Na` and `K`.
    pub fn charge_carrier_candidates(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(|(_, block)| block.charge_carrier)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Stock building-block table for released N-glycans.
///
/// Residue masses are the monoisotopic masses of the dehydrated units. The
/// permethylation unit `Per` carries the composition added per reactive site
/// (carbons once, hydrogens twice, see the modifier pass in
/// [`resolve`](crate::chemistry::composition::resolve)).
pub fn glycan_blocks() -> BuildingBlockTable {
    let mut table = BuildingBlockTable::new();

    // Monosaccharide residues
    table.insert(
        "H",
        BuildingBlock {
            mass: 162.0528234315, // Hexose
            carbons: 6,
            hydrogens: 10,
            oxygens: 5,
            ..Default::default()
        },
    );
    table.insert(
        "N",
        BuildingBlock {
            mass: 203.0793725337, // N-acetylhexosamine
            carbons: 8,
            hydrogens: 13,
            nitrogens: 1,
            oxygens: 5,
            ..Default::default()
        },
    );
    table.insert(
        "S",
        BuildingBlock {
            mass: 291.0954165066, // N-acetylneuraminic acid
            carbons: 11,
            hydrogens: 17,
            nitrogens: 1,
            oxygens: 8,
            sialic_acid: true,
            ..Default::default()
        },
    );
    table.insert(
        "F",
        BuildingBlock {
            mass: 146.0579088094, // Deoxyhexose
            carbons: 6,
            hydrogens: 10,
            oxygens: 4,
            ..Default::default()
        },
    );

    // Mass modifiers
    table.insert(
        "Free",
        BuildingBlock {
            mass: MASS_WATER, // Free reducing end
            hydrogens: 2,
            oxygens: 1,
            mass_modifier: true,
            ..Default::default()
        },
    );
    table.insert(
        "Per",
        BuildingBlock {
            mass: 14.0156500642, // CH2 added per methylated site
            carbons: 1,
            hydrogens: 1,
            mass_modifier: true,
            ..Default::default()
        },
    );

    // Charge carriers
    table.insert(
        "Proton",
        BuildingBlock {
            mass: MASS_PROTON,
            hydrogens: 1,
            charge_carrier: true,
            ..Default::default()
        },
    );
    table.insert(
        "Na",
        BuildingBlock {
            mass: 22.98976928 - MASS_ELECTRON,
            charge_carrier: true,
            ..Default::default()
        },
    );
    table.insert(
        "K",
        BuildingBlock {
            mass: 38.96370649 - MASS_ELECTRON,
            charge_carrier: true,
            ..Default::default()
        },
    );

    table
}
