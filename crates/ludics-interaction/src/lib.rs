//! Ludics Interaction
//!
//! Plays designs against each other and analyses the result.
//!
//! # Orthogonality
//!
//! [`step`] runs a positive design against a negative one from a shared
//! locus and classifies the run:
//!
//! - `CONVERGENT`: a daimon (or forced concession) closed the branch
//! - `DIVERGENT`: the two sides opened no common child
//! - `STUCK`: one side has nothing to play
//! - `ONGOING`: the fuel bound was hit; [`resume`] continues the run
//!
//! None of these are errors. A run is a pure function of its inputs.
//!
//! # Analyses
//!
//! - [`check_uniformity`] compares sibling branches up to renaming.
//! - [`saturation`] explores every child of a locus.
//! - [`Strategy::analyze`] checks innocence and propagation of one design.
//!
//! ```
//! use ludics_design::{ActDraft, DesignBuilder};
//! use ludics_interaction::{step, Status, StepOptions};
//! use ludics_locus::Locus;
//!
//! let root = Locus::root();
//! let pos = DesignBuilder::new("d".into(), "P".into(), root.clone())
//!     .act(ActDraft::daimon(root.clone()))
//!     .unwrap()
//!     .build();
//! let neg = DesignBuilder::new("d".into(), "O".into(), root.clone())
//!     .act(ActDraft::negative(root, [0]))
//!     .unwrap()
//!     .build();
//!
//! let trace = step(&pos, &neg, &StepOptions::default());
//! assert_eq!(trace.status, Status::Convergent);
//! ```

mod saturation;
mod stepper;
mod strategy;
mod uniformity;

pub use saturation::{saturation, ChildVerdict, Saturation};
pub use stepper::{
    resume, step, Reason, Side, Status, StepOptions, Trace, TracePair, DEFAULT_FUEL,
};
pub use strategy::{Play, Strategy, Violation, ViolationKind};
pub use uniformity::{check_uniformity, Counterexample, Uniformity, UniformityError};
