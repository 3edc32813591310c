extern crate statrs;

use itertools::iproduct;
use statrs::distribution::{Binomial, Discrete};

use crate::chemistry::composition::ElementalComposition;
use crate::chemistry::constants::{
    ISOTOPE_13C, ISOTOPE_15N, ISOTOPE_17O, ISOTOPE_18O, ISOTOPE_2H, ISOTOPE_33S, ISOTOPE_34S,
    ISOTOPE_36S,
};
use crate::error::AnalyteError;
use crate::settings::Settings;

/// Upper bound on the Cartesian product size of the isotopologue expansion.
/// Compositions that would exceed it fail with
/// [`AnalyteError::CombinationBudget`] instead of blowing up.
pub const MAX_COMBINATIONS: usize = 1 << 24;

/// binomial distribution over "k atoms carry the heavy isotope"
///
/// Arguments:
///
/// * `atom_count` - number of atoms of the element in the composition
/// * `abundance` - natural abundance of the heavy isotope
/// * `mass_shift` - mass difference to the light isotope
///
/// Returns:
///
/// * `Vec<(f64, f64)>` - (mass shift, probability) points for k = 0..=n; for
///   a non-positive atom count this is the delta distribution
///
/// # Examples
///
/// ```
/// use glycore::algorithm::isotope::isotopologue_distribution;
///
/// let dist = isotopologue_distribution(10, 0.0107, 1.00335);
/// assert_eq!(dist.len(), 11);
/// let total: f64 = dist.iter().map(|&(_, p)| p).sum();
/// assert!((total - 1.0).abs() < 1e-12);
/// assert_eq!(isotopologue_distribution(0, 0.0107, 1.00335), vec![(0.0, 1.0)]);
/// ```
pub fn isotopologue_distribution(
    atom_count: i32,
    abundance: f64,
    mass_shift: f64,
) -> Vec<(f64, f64)> {
    if atom_count <= 0 {
        return vec![(0.0, 1.0)];
    }

    let binomial = Binomial::new(abundance, atom_count as u64).unwrap();
    (0..=atom_count as u64)
        .map(|k| (k as f64 * mass_shift, binomial.pmf(k)))
        .collect()
}

/// Collect the isotopologue points whose probability reaches
/// `min_contribution`. The binomial pmf is unimodal, so once past the mode
/// the scan stops at the first point below the floor instead of walking all
/// n + 1 points. A channel whose surviving cardinality alone would exceed
/// [`MAX_COMBINATIONS`] fails before the points are materialized.
fn contributing_points(
    atom_count: i32,
    isotope: (f64, f64),
    min_contribution: f64,
) -> Result<Vec<(f64, f64)>, AnalyteError> {
    let (abundance, mass_shift) = isotope;
    if atom_count <= 0 {
        return Ok(vec![(0.0, 1.0)]);
    }
    // Without a floor the channel keeps all n + 1 points, so the cardinality
    // is known without evaluating a single pmf
    if min_contribution <= 0.0 && atom_count as usize >= MAX_COMBINATIONS {
        return Err(AnalyteError::CombinationBudget {
            combinations: atom_count as usize + 1,
        });
    }

    let binomial = Binomial::new(abundance, atom_count as u64).unwrap();
    let mode = ((atom_count as f64 + 1.0) * abundance) as u64;

    let mut points: Vec<(f64, f64)> = Vec::new();
    let mut best = (0.0, 0.0);
    for k in 0..=atom_count as u64 {
        let probability = binomial.pmf(k);
        if probability > best.1 {
            best = (k as f64 * mass_shift, probability);
        }
        if probability >= min_contribution {
            if points.len() >= MAX_COMBINATIONS {
                return Err(AnalyteError::CombinationBudget {
                    combinations: atom_count as usize + 1,
                });
            }
            points.push((k as f64 * mass_shift, probability));
        } else if k > mode {
            break;
        }
    }

    if points.is_empty() {
        // Keep at least the most probable point so the channel never vanishes
        points.push(best);
    }
    Ok(points)
}

/// Greedy first-match merge of near-degenerate masses.
///
/// The first unconsumed point seeds a cluster and absorbs every later
/// unconsumed point whose mass lies within `epsilon` of the seed. Each point
/// is consumed by at most one cluster. The merge is asymmetric and depends on
/// the enumeration order of the input, which is part of the contract: the
/// caller enumerates combinations in the fixed channel order 13C, 2H, 15N,
/// 17O, 18O, 33S, 34S, 36S.
///
/// Cluster mass is the probability-weighted mean of its members, cluster
/// probability the sum.
///
/// # Examples
///
/// ```
/// use glycore::algorithm::isotope::merge_clusters;
///
/// let clusters = merge_clusters(&[(100.0, 0.6), (100.2, 0.2), (103.0, 0.2)], 0.5);
/// assert_eq!(clusters.len(), 2);
/// assert!((clusters[0].0 - 100.05).abs() < 1e-9);
/// assert!((clusters[0].1 - 0.8).abs() < 1e-12);
/// ```
pub fn merge_clusters(points: &[(f64, f64)], epsilon: f64) -> Vec<(f64, f64)> {
    let mut consumed = vec![false; points.len()];
    let mut clusters: Vec<(f64, f64)> = Vec::new();

    for i in 0..points.len() {
        if consumed[i] {
            continue;
        }
        consumed[i] = true;
        let (seed_mass, seed_probability) = points[i];
        let mut weighted_mass = seed_mass * seed_probability;
        let mut probability = seed_probability;

        for j in i + 1..points.len() {
            if consumed[j] {
                continue;
            }
            let (mass, p) = points[j];
            if (mass - seed_mass).abs() < epsilon {
                weighted_mass += mass * p;
                probability += p;
                consumed[j] = true;
            }
        }
        clusters.push((weighted_mass / probability, probability));
    }
    clusters
}

/// Rank clusters by probability and keep the smallest prefix whose running
/// sum strictly exceeds `min_total_contribution`; the crossing cluster is
/// kept. The retained clusters are returned sorted ascending by mass.
///
/// # Examples
///
/// ```
/// use glycore::algorithm::isotope::rank_and_truncate;
///
/// let retained = rank_and_truncate(vec![(101.0, 0.2), (100.0, 0.7), (102.0, 0.1)], 0.8);
/// assert_eq!(retained, vec![(100.0, 0.7), (101.0, 0.2)]);
/// ```
pub fn rank_and_truncate(
    mut clusters: Vec<(f64, f64)>,
    min_total_contribution: f64,
) -> Vec<(f64, f64)> {
    clusters.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

    let mut retained: Vec<(f64, f64)> = Vec::new();
    let mut running = 0.0;
    for cluster in clusters {
        retained.push(cluster);
        running += cluster.1;
        if running > min_total_contribution {
            break;
        }
    }

    retained.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    retained
}

/// Compute the isotopic envelope of an elemental composition.
///
/// Expands the Cartesian product over eight per-element isotopologue
/// channels (two for oxygen, three for sulfur), merges near-degenerate
/// combination masses within `epsilon`, and truncates the ranked clusters at
/// `min_total_contribution`.
///
/// Arguments:
///
/// * `base_mass` - monoisotopic mass the shift sums are added to
/// * `composition` - accumulated elemental counts of the analyte
/// * `settings` - `epsilon`, `min_contribution` and `min_total_contribution`
///
/// Returns:
///
/// * `Vec<(f64, f64)>` - (exact mass, fraction) pairs sorted ascending by
///   mass, every fraction > 0
///
/// # Examples
///
/// ```
/// use glycore::algorithm::isotope::expand_envelope;
/// use glycore::chemistry::composition::ElementalComposition;
/// use glycore::settings::Settings;
///
/// let composition = ElementalComposition {
///     mass: 730.2644,
///     carbons: 28,
///     hydrogens: 46,
///     nitrogens: 2,
///     oxygens: 20,
///     ..Default::default()
/// };
/// let envelope = expand_envelope(composition.mass, &composition, &Settings::default()).unwrap();
/// assert!(!envelope.is_empty());
/// assert!(envelope.windows(2).all(|w| w[0].0 < w[1].0));
/// ```
pub fn expand_envelope(
    base_mass: f64,
    composition: &ElementalComposition,
    settings: &Settings,
) -> Result<Vec<(f64, f64)>, AnalyteError> {
    if composition.is_empty() {
        return Err(AnalyteError::EmptyComposition);
    }

    let carbons = contributing_points(composition.carbons, ISOTOPE_13C, settings.min_contribution)?;
    let hydrogens = contributing_points(composition.hydrogens, ISOTOPE_2H, settings.min_contribution)?;
    let nitrogens = contributing_points(composition.nitrogens, ISOTOPE_15N, settings.min_contribution)?;
    let oxygens17 = contributing_points(composition.oxygens, ISOTOPE_17O, settings.min_contribution)?;
    let oxygens18 = contributing_points(composition.oxygens, ISOTOPE_18O, settings.min_contribution)?;
    let sulfurs33 = contributing_points(composition.sulfurs, ISOTOPE_33S, settings.min_contribution)?;
    let sulfurs34 = contributing_points(composition.sulfurs, ISOTOPE_34S, settings.min_contribution)?;
    let sulfurs36 = contributing_points(composition.sulfurs, ISOTOPE_36S, settings.min_contribution)?;

    let combinations = carbons.len()
        * hydrogens.len()
        * nitrogens.len()
        * oxygens17.len()
        * oxygens18.len()
        * sulfurs33.len()
        * sulfurs34.len()
        * sulfurs36.len();
    if combinations > MAX_COMBINATIONS {
        return Err(AnalyteError::CombinationBudget { combinations });
    }

    let mut totals: Vec<(f64, f64)> = Vec::with_capacity(combinations);
    for (c, h, n, o17, o18, s33, s34, s36) in iproduct!(
        &carbons, &hydrogens, &nitrogens, &oxygens17, &oxygens18, &sulfurs33, &sulfurs34,
        &sulfurs36
    ) {
        let mass = base_mass + c.0 + h.0 + n.0 + o17.0 + o18.0 + s33.0 + s34.0 + s36.0;
        let probability = c.1 * h.1 * n.1 * o17.1 * o18.1 * s33.1 * s34.1 * s36.1;
        if probability > 0.0 {
            totals.push((mass, probability));
        }
    }

    let clusters = merge_clusters(&totals, settings.epsilon);
    Ok(rank_and_truncate(clusters, settings.min_total_contribution))
}
