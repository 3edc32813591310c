use log::debug;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::algorithm::isotope::expand_envelope;
use crate::chemistry::blocks::BuildingBlockTable;
use crate::chemistry::composition::{resolve, ElementalComposition};
use crate::data::spectrum::MassSpectrum;
use crate::error::AnalyteError;
use crate::settings::Settings;

/// One predicted isotope of an analyte.
///
/// `fraction` is the relative abundance of the cluster; after truncation the
/// fractions of an analyte no longer sum to 1. The observed `intensity` is
/// attached later by the quantitation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isotope {
    pub exact_mass: f64,
    pub fraction: f64,
    pub intensity: Option<f64>,
}

/// A named molecular species with its resolved composition and predicted
/// isotopic envelope.
///
/// Composition and isotopes are written once during construction; the
/// `data_subset` is filled in per loaded spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analyte {
    pub name: String,
    pub composition: ElementalComposition,
    /// Predicted isotopes, ascending by mass.
    pub isotopes: Vec<Isotope>,
    /// Spectral window around the reference mass, once inherited.
    pub data_subset: Option<MassSpectrum>,
}

impl Analyte {
    /// Resolve an analyte name against a building-block table and compute its
    /// isotopic envelope.
    ///
    /// # Examples
    ///
    /// ```
    /// use glycore::chemistry::blocks::glycan_blocks;
    /// use glycore::data::analyte::Analyte;
    /// use glycore::settings::Settings;
    ///
    /// let analyte = Analyte::from_name("H5N4", &glycan_blocks(), &Settings::default()).unwrap();
    /// assert!(!analyte.isotopes.is_empty());
    /// assert!(analyte.isotopes.windows(2).all(|w| w[0].exact_mass < w[1].exact_mass));
    /// ```
    pub fn from_name(
        name: &str,
        blocks: &BuildingBlockTable,
        settings: &Settings,
    ) -> Result<Self, AnalyteError> {
        let composition = resolve(name, blocks, settings)?;
        let envelope = expand_envelope(composition.mass, &composition, settings)?;
        debug!("analyte '{}' expanded to {} isotopes", name, envelope.len());

        let isotopes = envelope
            .into_iter()
            .map(|(exact_mass, fraction)| Isotope {
                exact_mass,
                fraction,
                intensity: None,
            })
            .collect();

        Ok(Analyte {
            name: name.to_string(),
            composition,
            isotopes,
            data_subset: None,
        })
    }

    /// Mass of the most abundant predicted isotope.
    ///
    /// Ties resolve to the first isotope encountered, which is the lightest
    /// of the equally abundant ones since isotopes are stored ascending by
    /// mass.
    pub fn reference_mass(&self) -> Option<f64> {
        let mut best: Option<(f64, OrderedFloat<f64>)> = None;
        for isotope in &self.isotopes {
            let fraction = OrderedFloat(isotope.fraction);
            if best.map_or(true, |(_, current)| fraction > current) {
                best = Some((isotope.exact_mass, fraction));
            }
        }
        best.map(|(mass, _)| mass)
    }

    /// Extract and store the sub-range of `spectrum` around the analyte's
    /// reference mass.
    pub fn inherit_data_subset(
        &mut self,
        spectrum: &MassSpectrum,
        mass_window: f64,
    ) -> Result<(), AnalyteError> {
        let center_mass = self.reference_mass().ok_or(AnalyteError::EmptyComposition)?;
        self.data_subset = Some(spectrum.extract_window(center_mass, mass_window)?);
        Ok(())
    }
}

/// Resolve and expand a list of analyte names using multiple threads,
/// optionally inheriting the spectral window from one spectrum.
///
/// Analytes are independent, so failures are per analyte: one malformed name
/// never aborts the rest of the batch.
///
/// Arguments:
///
/// * `names` - analyte names in composition notation
/// * `blocks` - shared read-only building-block table
/// * `settings` - shared read-only processing parameters
/// * `spectrum` - spectrum to window against, if already loaded
/// * `num_threads` - number of threads to use
///
/// Returns:
///
/// * `Vec<Result<Analyte, AnalyteError>>` - one result per input name, in
///   input order
pub fn process_analytes(
    names: &[String],
    blocks: &BuildingBlockTable,
    settings: &Settings,
    spectrum: Option<&MassSpectrum>,
    num_threads: usize,
) -> Vec<Result<Analyte, AnalyteError>> {
    let thread_pool = ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .unwrap();

    thread_pool.install(|| {
        names
            .par_iter()
            .map(|name| {
                let mut analyte = Analyte::from_name(name, blocks, settings)?;
                if let Some(spectrum) = spectrum {
                    analyte.inherit_data_subset(spectrum, settings.mass_window)?;
                }
                Ok(analyte)
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::blocks::{glycan_blocks, BuildingBlock, BuildingBlockTable};

    fn synthetic_table() -> BuildingBlockTable {
        let mut table = BuildingBlockTable::new();
        table.insert(
            "H",
            BuildingBlock {
                mass: 162.0528,
                carbons: 6,
                hydrogens: 10,
                oxygens: 5,
                ..Default::default()
            },
        );
        table.insert(
            "N",
            BuildingBlock {
                mass: 203.0794,
                carbons: 8,
                hydrogens: 13,
                nitrogens: 1,
                oxygens: 5,
                ..Default::default()
            },
        );
        table
    }

    fn synthetic_settings() -> Settings {
        Settings {
            charge_carrier: "None".to_string(),
            epsilon: 0.01,
            min_total_contribution: 0.95,
            ..Settings::default()
        }
    }

    #[test]
    fn test_monoisotopic_envelope_peak_end_to_end() {
        let analyte =
            Analyte::from_name("H2N2", &synthetic_table(), &synthetic_settings()).unwrap();

        let expected = 2.0 * 162.0528 + 2.0 * 203.0794;
        assert!((analyte.composition.mass - expected).abs() < 1e-9);

        // The monoisotopic peak is the highest-probability cluster
        assert!((analyte.reference_mass().unwrap() - expected).abs() < 0.01);
        assert!(analyte
            .isotopes
            .windows(2)
            .all(|w| w[0].exact_mass < w[1].exact_mass));
        assert!(analyte.isotopes.iter().all(|isotope| isotope.fraction > 0.0));
    }

    #[test]
    fn test_reference_mass_tie_break_is_first_encountered() {
        let analyte = Analyte {
            name: "X1".to_string(),
            composition: ElementalComposition::default(),
            isotopes: vec![
                Isotope {
                    exact_mass: 100.0,
                    fraction: 0.4,
                    intensity: None,
                },
                Isotope {
                    exact_mass: 101.0,
                    fraction: 0.4,
                    intensity: None,
                },
                Isotope {
                    exact_mass: 102.0,
                    fraction: 0.2,
                    intensity: None,
                },
            ],
            data_subset: None,
        };
        assert_eq!(analyte.reference_mass(), Some(100.0));
    }

    #[test]
    fn test_data_subset_window() {
        let mut analyte =
            Analyte::from_name("H2N2", &synthetic_table(), &synthetic_settings()).unwrap();
        let reference = analyte.reference_mass().unwrap();

        let spectrum = MassSpectrum::new(
            vec![reference - 1.0, reference - 0.1, reference + 0.2, reference + 5.0],
            vec![10.0, 20.0, 30.0, 40.0],
        );
        analyte.inherit_data_subset(&spectrum, 0.25).unwrap();

        let subset = analyte.data_subset.as_ref().unwrap();
        assert_eq!(subset.len(), 2);
        assert_eq!(subset.intensity, vec![20.0, 30.0]);
    }

    #[test]
    fn test_batch_failures_are_isolated() {
        let names: Vec<String> = ["H2N2", "not a name", "H3N2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let results = process_analytes(&names, &synthetic_table(), &synthetic_settings(), None, 2);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(AnalyteError::MalformedName(_))
        ));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_stock_table_roundtrip() {
        let analyte =
            Analyte::from_name("H5N4S2", &glycan_blocks(), &Settings::default()).unwrap();
        // Protonated mass of the glycan plus its residues
        let expected = 5.0 * 162.0528234315
            + 4.0 * 203.0793725337
            + 2.0 * 291.0954165066
            + 1.007276466621;
        assert!((analyte.composition.mass - expected).abs() < 1e-9);
        assert!(!analyte.isotopes.is_empty());
    }
}
