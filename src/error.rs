use thiserror::Error;

/// Top-level error type for the fracture engine.
#[derive(Debug, Error)]
pub enum FractureError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// Errors related to voxel grid construction and access.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("invalid subdivisions ({nx}, {ny}, {nz}): every axis needs at least one cell")]
    InvalidSubdivisions { nx: u32, ny: u32, nz: u32 },

    #[error("face {face} references vertex {index}, but only {vertices} vertices exist")]
    FaceIndexOutOfRange {
        face: usize,
        index: u32,
        vertices: usize,
    },

    #[error("voxel ({x}, {y}, {z}) lies outside the grid")]
    CoordOutOfRange { x: i64, y: i64, z: i64 },

    #[error("label {0} does not fit in the cell id range")]
    LabelOutOfRange(u32),

    #[error("buffer holds {actual} cells, grid expects {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}

/// Errors related to seed placement and merging.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("max. number of tries surpassed ({max_attempts}): found {found} of {requested} seeds")]
    SearchExhausted {
        max_attempts: u32,
        found: usize,
        requested: usize,
    },

    #[error(
        "max. number of tries surpassed ({max_attempts}) around impact {impact}: found {found} of {requested} seeds"
    )]
    NearSearchExhausted {
        max_attempts: u32,
        impact: u32,
        found: usize,
        requested: usize,
    },

    #[error("no fragments to seed from")]
    NoFragments,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Convenience type alias for results using [`FractureError`].
pub type Result<T> = std::result::Result<T, FractureError>;
