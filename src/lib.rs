// chemistry module
pub mod chemistry {
    pub mod blocks;
    pub mod composition;
    pub mod constants;
}

// algorithm module
pub mod algorithm {
    pub mod isotope;
}

// data module
pub mod data {
    pub mod analyte;
    pub mod spectrum;
}

pub mod error;
pub mod settings;
