//! Fuzzy inference over named universes of discourse.
//!
//! Membership functions are registered on a [`Universe`], which hands back [`FuzzySet`]s. Sets and
//! universes compose into [`Expr`] trees, expressions pair up into [`Rule`]s, and rules are fed to a
//! [`MamdaniEngine`] or a [`TskEngine`] which turns a [`LinguisticVariable`] of crisp inputs into a
//! crisp output.

mod dsl;
mod error;
mod inference;
mod inputs;
mod linspace;
mod math;
pub mod membership;
mod ops;
mod outputs;
mod rules;
mod value;
mod variable;

pub use dsl::{BinaryOp, Expr, IntoOperand};
pub use error::{FuzzyError, Result};
pub use inference::{MamdaniEngine, RuleEngine, RuleKey, TskActivation, TskEngine};
pub use inputs::LinguisticVariable;
pub use linspace::{arange, linspace};
pub use membership::MembershipFn;
pub use ops::{Defuzzifier, Operators, TConorm, TNorm};
pub use outputs::Aggregation;
pub use rules::{MamdaniRule, Rule, TskRule};
pub use value::Value;
pub use variable::{FuzzySet, Universe, UniverseRef};
