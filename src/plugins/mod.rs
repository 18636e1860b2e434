//! The three batch jobs: offline seed generation, industry normalization and
//! store stats recalculation.

pub mod normalize;
pub mod seed;
pub mod stats;
