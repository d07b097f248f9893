//! Tolerance-band gesture classification.
//!
//! This crate provides:
//! - [`Reading`] and [`SensorFrame`]: raw transport input and parsed frames
//! - [`ReferenceTable`]: the static table of known gesture signatures
//! - [`ToleranceProfile`]: per-channel fractional tolerances
//! - [`classify`] and [`GestureClassifier`]: first-match band classification
//! - [`Outcome`], [`Diagnostic`] and [`Phrasebook`]: typed results and the
//!   phrases spoken for them
//!
//! # Example
//!
//! ```rust,ignore
//! use glovetalk_gesture::{GestureClassifier, Reading, ReferenceTable, ToleranceProfile};
//!
//! let table = ReferenceTable::from_csv_path("gesture_data.csv", 5)?;
//! let classifier = GestureClassifier::new(table.into(), ToleranceProfile::uniform(0.05, 5)?)?;
//!
//! let outcome = classifier.recognize(&Reading::Line("512,430,300,610,220".into()));
//! ```

mod classifier;
mod frame;
mod outcome;
mod table;
mod tolerance;

pub use classifier::*;
pub use frame::*;
pub use outcome::*;
pub use table::*;
pub use tolerance::*;
