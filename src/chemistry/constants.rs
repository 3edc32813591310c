// Purpose: To store constants that are used in the program
pub const MASS_PROTON: f64 = 1.007276466621; // Unified atomic mass unit
pub const MASS_NEUTRON: f64 = 1.00866491595; // Unified atomic mass unit
pub const MASS_ELECTRON: f64 = 0.00054857990946; // Unified atomic mass unit
pub const MASS_WATER: f64 = 18.0105646863; // Unified atomic mass unit

// Tracked heavy isotopologues as (natural abundance, mass shift) pairs.
// These eight channels drive the combinatorial envelope expansion and their
// declared order here is the enumeration order of the expansion.
pub const ISOTOPE_13C: (f64, f64) = (0.0107, 1.00335);
pub const ISOTOPE_2H: (f64, f64) = (0.00012, 1.00628);
pub const ISOTOPE_15N: (f64, f64) = (0.00364, 0.99703);
pub const ISOTOPE_17O: (f64, f64) = (0.00038, 1.00422);
pub const ISOTOPE_18O: (f64, f64) = (0.00205, 2.00425);
pub const ISOTOPE_33S: (f64, f64) = (0.0076, 0.99939);
pub const ISOTOPE_34S: (f64, f64) = (0.0429, 1.9958);
pub const ISOTOPE_36S: (f64, f64) = (0.0002, 3.99501);
