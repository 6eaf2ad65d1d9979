//! Ludics Engine - the store and request facade
//!
//! This crate ties the design, interaction and commitment crates together
//! behind one explicit store object, [`Engine`]. A host creates it at
//! startup and passes it to request handlers; there is no global state.
//!
//! # Overview
//!
//! - **Designs**: compiled from move logs, loaded from persistence,
//!   delocated, or extended by judge interventions. All are kept by id.
//! - **Interaction**: stepper runs, resumption, uniformity and saturation
//!   over stored designs, with fuel defaulting to [`EngineConfig`].
//! - **Commitments**: per-owner sets and forward chaining, capped by the
//!   configured iteration limit.
//!
//! Mutating calls return a [`DesignsUpdated`] or [`CommitmentsUpdated`]
//! value the caller forwards as its "store updated" event. A failed call
//! changes nothing.
//!
//! Calls are synchronous. Callers serialise mutation per dialogue and
//! owner; read-only calls take `&self` and may run side by side.
//!
//! # Example
//!
//! ```rust
//! use ludics_design::{Move, MoveKind, Target};
//! use ludics_engine::{Engine, EngineConfig, StepRequest};
//! use ludics_interaction::Status;
//!
//! let c1 = Target::claim("c1");
//! let log = vec![
//!     Move::new("m1", "Proponent", MoveKind::Assert {
//!         locus: None, expression: "claim".into(), openings: vec![],
//!     }).on(c1.clone()).at_time(1),
//!     Move::new("m2", "Opponent", MoveKind::Close {
//!         locus: None, expression: String::new(),
//!     }).on(c1).at_time(2),
//! ];
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! let update = engine.compile("dlg-1", &log, None).unwrap();
//! let ids = &update.design_ids;
//!
//! let trace = engine.step(&StepRequest::new("dlg-1", ids[0], ids[1])).unwrap();
//! assert_eq!(trace.status, Status::Convergent);
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::{EngineConfig, DEFAULT_CHAIN_ITERATION_CAP};
pub use engine::{AuditRecord, CommitmentsUpdated, Delocated, DesignsUpdated, Engine, StepRequest};
pub use error::{Error, Result};
