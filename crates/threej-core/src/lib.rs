pub mod domain;
pub mod modules;
pub mod numerics;

pub use domain::{
    CoefficientRange, CouplingParameters, Diagnostic, ErrorCategory, ThreejError, ThreejResult,
    ThreejjSequence,
};
pub use numerics::{
    CouplingFloat, RecursionPlan, ScaleThresholds, ThreejjSolver, threejj, threejj_into, wigner_3j,
};
