use std::fmt;

use num::Float;
use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, Result};
use crate::math::interp;
use crate::value::Value;

/// Fuzzy conjunction. Every variant has 1 as its identity element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TNorm {
    #[default]
    Minimum,
    Product,
    Lukasiewicz,
    Drastic,
    Hamacher,
}

impl TNorm {
    pub const ALL: [TNorm; 5] = [Self::Minimum, Self::Product, Self::Lukasiewicz, Self::Drastic, Self::Hamacher];

    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Minimum => F::min(u, v),
            Self::Product => u * v,
            Self::Lukasiewicz => F::max(F::zero(), u + v - F::one()),
            Self::Drastic => {
                if u >= F::one() {
                    v
                } else if v >= F::one() {
                    u
                } else {
                    F::zero()
                }
            },
            Self::Hamacher => {
                if u + v == F::zero() {
                    F::zero()
                } else {
                    u * v / (u + v - u * v)
                }
            },
        }
    }

    pub fn apply(self, u: &Value, v: &Value) -> Result<Value> {
        u.zip_with(v, |u, v| self.call(u, v))
    }
}

/// Fuzzy disjunction. Every variant has 0 as its identity element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TConorm {
    #[default]
    Maximum,
    ProbabilisticSum,
    BoundedSum,
    Drastic,
    EinsteinSum,
}

impl TConorm {
    pub const ALL: [TConorm; 5] = [
        Self::Maximum,
        Self::ProbabilisticSum,
        Self::BoundedSum,
        Self::Drastic,
        Self::EinsteinSum,
    ];

    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Maximum => F::max(u, v),
            Self::ProbabilisticSum => u + v - u * v,
            Self::BoundedSum => F::min(F::one(), u + v),
            Self::Drastic => {
                if u <= F::zero() {
                    v
                } else if v <= F::zero() {
                    u
                } else {
                    F::one()
                }
            },
            Self::EinsteinSum => (u + v) / (F::one() + u * v),
        }
    }

    pub fn apply(self, u: &Value, v: &Value) -> Result<Value> {
        u.zip_with(v, |u, v| self.call(u, v))
    }
}

impl fmt::Display for TNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Minimum => "minimum",
            Self::Product => "product",
            Self::Lukasiewicz => "lukasiewicz",
            Self::Drastic => "drastic",
            Self::Hamacher => "hamacher",
        };

        f.write_str(name)
    }
}

impl fmt::Display for TConorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Maximum => "maximum",
            Self::ProbabilisticSum => "probabilistic_sum",
            Self::BoundedSum => "bounded_sum",
            Self::Drastic => "drastic",
            Self::EinsteinSum => "einstein_sum",
        };

        f.write_str(name)
    }
}

/// The t-norm/t-conorm pair used when fuzzy predicates are combined with AND/OR.
///
/// Universes take a copy at creation, so expressions keep the operators they were built with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Operators {
    pub tnorm: TNorm,
    pub tconorm: TConorm,
}

impl Operators {
    pub fn new(tnorm: TNorm, tconorm: TConorm) -> Self {
        Self { tnorm, tconorm }
    }

    /// {product, probabilistic sum}
    pub fn algebraic() -> Self {
        Self::new(TNorm::Product, TConorm::ProbabilisticSum)
    }
}

/// Reduces an aggregated membership curve to one crisp value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Defuzzifier {
    /// Discrete center of gravity: `Σ μ(x)·x / Σ μ(x)`
    #[default]
    Centroid,
    /// Bisector of Area
    Bisector,
    /// Mean of the values for which the membership function is maximum
    MeanOfMaximum,
    /// Smallest value for which the membership function is maximum
    SmallestOfMaximum,
    /// Largest value for which the membership function is maximum
    LargestOfMaximum,
}

impl Defuzzifier {
    /// Fails with [`FuzzyError::Degenerate`] only when the membership sums to exactly zero.
    ///
    /// Membership shapes add a 1e-10 slope epsilon, so a crisp input sitting on a set's foot
    /// evaluates to roughly 1e-11 rather than zero. Such a curve is not degenerate and still
    /// yields a crisp value.
    pub fn call(self, universe: &[f64], membership: &[f64]) -> Result<f64> {
        if universe.len() != membership.len() {
            return Err(FuzzyError::ShapeMismatch {
                left: universe.len(),
                right: membership.len(),
            });
        }

        let total = membership.iter().sum::<f64>();

        if total == 0. {
            return Err(FuzzyError::Degenerate("aggregated membership is zero everywhere"));
        }

        let crisp = match self {
            Self::Centroid => {
                let num = universe.iter().zip(membership).map(|(u, m)| u * m).sum::<f64>();

                num / total
            },
            Self::Bisector => bisector(universe, membership),
            Self::MeanOfMaximum | Self::SmallestOfMaximum | Self::LargestOfMaximum => {
                let maximum = membership.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let at_max = universe
                    .iter()
                    .zip(membership)
                    .filter_map(|(u, m)| if *m == maximum { Some(*u) } else { None });

                match self {
                    Self::MeanOfMaximum => {
                        let (len, sum) = at_max.fold((0usize, 0.), |(len, sum), u| (len + 1, sum + u));

                        sum / len as f64
                    },
                    Self::SmallestOfMaximum => at_max.fold(f64::INFINITY, f64::min),
                    _ => at_max.fold(f64::NEG_INFINITY, f64::max),
                }
            },
        };

        Ok(crisp)
    }
}

fn bisector(universe: &[f64], membership: &[f64]) -> f64 {
    if universe.len() < 2 {
        return universe[0];
    }

    let areas: Vec<f64> = universe
        .windows(2)
        .zip(membership.windows(2))
        .map(|(u, m)| (m[0] + m[1]) * (u[1] - u[0]) / 2.)
        .collect();
    let target = areas.iter().sum::<f64>() / 2.;
    let mut cum_area = 0.;

    for (i, area) in areas.iter().enumerate() {
        cum_area += area;

        if cum_area >= target {
            return interp(target, &[(cum_area - area, universe[i]), (cum_area, universe[i + 1])]);
        }
    }

    universe[universe.len() - 1]
}

#[test]
fn test_identities() {
    for a in [0., 0.25, 0.5, 0.75, 1.] {
        for t in TNorm::ALL {
            assert_eq!(t.call(a, 1.), a, "{t}");
        }
        for s in TConorm::ALL {
            assert_eq!(s.call(a, 0.), a, "{s}");
        }
    }
}

#[test]
fn test_formulas() {
    assert_eq!(TNorm::Product.call(0.5, 0.4), 0.2);
    assert_eq!(TNorm::Lukasiewicz.call(0.5, 0.4), 0.);
    assert_eq!(TNorm::Drastic.call(0.5, 0.4), 0.);
    assert_eq!(TNorm::Hamacher.call(0., 0.), 0.);
    assert_eq!(TNorm::Hamacher.call(0.5, 0.5), 0.25 / 0.75);
    assert_eq!(TConorm::ProbabilisticSum.call(0.5, 0.5), 0.75);
    assert_eq!(TConorm::BoundedSum.call(0.7, 0.6), 1.);
    assert_eq!(TConorm::Drastic.call(0.1, 0.2), 1.);
    assert_eq!(TConorm::EinsteinSum.call(0.5, 0.5), 0.8);
}

#[test]
fn test_apply_values() {
    let u = Value::Array(vec![0.2, 0.8]);

    assert_eq!(TNorm::Minimum.apply(&u, &Value::Scalar(0.5)).unwrap(), Value::Array(vec![0.2, 0.5]));
    assert_eq!(TConorm::Maximum.apply(&u, &Value::Scalar(0.5)).unwrap(), Value::Array(vec![0.5, 0.8]));
}

#[test]
fn test_operators_config() {
    let ops: Operators = serde_json::from_str(r#"{"tnorm": "product", "tconorm": "probabilistic_sum"}"#).unwrap();

    assert_eq!(ops, Operators::algebraic());

    let ops: Operators = serde_json::from_str(r#"{"tconorm": "einstein_sum"}"#).unwrap();

    assert_eq!(ops, Operators::new(TNorm::Minimum, TConorm::EinsteinSum));
    assert_eq!(Operators::default(), Operators::new(TNorm::Minimum, TConorm::Maximum));
}

#[test]
fn test_defuzzifiers() {
    let universe = [0., 1., 2., 3., 4.];
    let membership = [0., 0.5, 1., 1., 0.];

    assert_eq!(Defuzzifier::Centroid.call(&universe, &membership).unwrap(), 5.5 / 2.5);
    assert_eq!(Defuzzifier::MeanOfMaximum.call(&universe, &membership).unwrap(), 2.5);
    assert_eq!(Defuzzifier::SmallestOfMaximum.call(&universe, &membership).unwrap(), 2.);
    assert_eq!(Defuzzifier::LargestOfMaximum.call(&universe, &membership).unwrap(), 3.);

    let symmetric = [0., 1., 1., 1., 0.];

    assert_eq!(Defuzzifier::Bisector.call(&universe, &symmetric).unwrap(), 2.);
}

#[test]
fn test_defuzzify_zero_membership() {
    let universe = [0., 1., 2.];

    for op in [Defuzzifier::Centroid, Defuzzifier::Bisector, Defuzzifier::MeanOfMaximum] {
        assert!(matches!(op.call(&universe, &[0., 0., 0.]), Err(FuzzyError::Degenerate(_))));
    }
    assert!(matches!(
        Defuzzifier::Centroid.call(&universe, &[1.]),
        Err(FuzzyError::ShapeMismatch { left: 3, right: 1 })
    ));
}

#[test]
fn test_defuzzify_near_zero_membership() {
    let universe = [0., 1., 2.];
    let crisp = Defuzzifier::Centroid.call(&universe, &[2e-11, 1e-11, 0.]).unwrap();

    assert!((crisp - 1. / 3.).abs() < 1e-9);
}
