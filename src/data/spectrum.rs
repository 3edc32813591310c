use serde::{Deserialize, Serialize};

use crate::error::AnalyteError;

/// A centroided mass spectrum with associated mass and intensity values,
/// ascending by mass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MassSpectrum {
    pub mz: Vec<f64>,
    pub intensity: Vec<f64>,
}

impl MassSpectrum {
    /// Constructs a new `MassSpectrum`, sorting the data points by mass.
    ///
    /// # Panics
    ///
    /// Panics if the lengths of `mz` and `intensity` are not the same.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use glycore::data::spectrum::MassSpectrum;
    /// let spectrum = MassSpectrum::new(vec![200.0, 100.0], vec![20.0, 10.0]);
    /// assert_eq!(spectrum.mz, vec![100.0, 200.0]);
    /// assert_eq!(spectrum.intensity, vec![10.0, 20.0]);
    /// ```
    pub fn new(mz: Vec<f64>, intensity: Vec<f64>) -> Self {
        assert_eq!(
            mz.len(),
            intensity.len(),
            "mz and intensity vectors must have the same length"
        );
        let mut points: Vec<(f64, f64)> = mz.into_iter().zip(intensity).collect();
        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        MassSpectrum {
            mz: points.iter().map(|&(m, _)| m).collect(),
            intensity: points.iter().map(|&(_, i)| i).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    /// Extract the contiguous slice of the spectrum inside
    /// `[center_mass - mass_window, center_mass + mass_window]`.
    ///
    /// Both window borders are found by binary search over the ascending mass
    /// axis: the left border is the first index with mass >= the lower bound,
    /// the right border the first index with mass > the upper bound. A window
    /// that contains no points yields an empty spectrum, not an error.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use glycore::data::spectrum::MassSpectrum;
    /// let spectrum = MassSpectrum::new(
    ///     vec![100.0, 101.0, 102.0, 200.0, 201.0],
    ///     vec![1.0, 2.0, 3.0, 4.0, 5.0],
    /// );
    /// let window = spectrum.extract_window(101.0, 1.5).unwrap();
    /// assert_eq!(window.mz, vec![100.0, 101.0, 102.0]);
    /// ```
    pub fn extract_window(
        &self,
        center_mass: f64,
        mass_window: f64,
    ) -> Result<MassSpectrum, AnalyteError> {
        if self.mz.is_empty() {
            return Err(AnalyteError::EmptySpectrum);
        }

        let lower = center_mass - mass_window;
        let upper = center_mass + mass_window;
        let left = self.mz.partition_point(|&mz| mz < lower);
        let right = self.mz.partition_point(|&mz| mz <= upper);

        Ok(MassSpectrum {
            mz: self.mz[left..right].to_vec(),
            intensity: self.intensity[left..right].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_borders_are_inclusive() {
        let spectrum = MassSpectrum::new(
            vec![100.0, 101.0, 102.0, 200.0, 201.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
        );

        // [99.5, 102.5] catches exactly the first three points
        let window = spectrum.extract_window(101.0, 1.5).unwrap();
        assert_eq!(window.mz, vec![100.0, 101.0, 102.0]);
        assert_eq!(window.intensity, vec![1.0, 2.0, 3.0]);

        // A border sitting exactly on a point keeps the point
        let window = spectrum.extract_window(150.0, 50.0).unwrap();
        assert_eq!(window.mz, vec![100.0, 101.0, 102.0, 200.0]);
    }

    #[test]
    fn test_window_with_no_points_is_empty_not_an_error() {
        let spectrum = MassSpectrum::new(vec![100.0, 200.0], vec![1.0, 2.0]);
        let window = spectrum.extract_window(150.0, 10.0).unwrap();
        assert!(window.is_empty());
    }

    #[test]
    fn test_empty_spectrum_is_an_error() {
        let spectrum = MassSpectrum::default();
        assert_eq!(
            spectrum.extract_window(100.0, 1.0),
            Err(AnalyteError::EmptySpectrum)
        );
    }

    #[test]
    fn test_window_at_spectrum_edges() {
        let spectrum = MassSpectrum::new(vec![100.0, 101.0, 102.0], vec![1.0, 2.0, 3.0]);

        let left_edge = spectrum.extract_window(99.0, 1.5).unwrap();
        assert_eq!(left_edge.mz, vec![100.0]);

        let right_edge = spectrum.extract_window(103.0, 1.5).unwrap();
        assert_eq!(right_edge.mz, vec![102.0]);
    }
}
