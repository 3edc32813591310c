use thiserror::Error;

/// Errors raised while processing a single analyte.
///
/// All variants are local to the analyte being processed; a failure for one
/// analyte never aborts the rest of a batch (see
/// [`process_analytes`](crate::data::analyte::process_analytes)).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyteError {
    /// The analyte name cannot be split into alternating unit/count runs.
    #[error("analyte name '{0}' cannot be split into unit/count pairs")]
    MalformedName(String),
    /// All elemental counts are zero, there is nothing to expand.
    #[error("elemental composition is empty, nothing to expand")]
    EmptyComposition,
    /// Windowing was requested against a spectrum with no data points.
    #[error("mass spectrum contains no data points")]
    EmptySpectrum,
    /// The isotopologue expansion would exceed the combination budget.
    #[error("isotopologue expansion would produce {combinations} combinations, over budget")]
    CombinationBudget { combinations: usize },
}
