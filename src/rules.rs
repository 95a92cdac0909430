use std::fmt;

use crate::dsl::Expr;
use crate::error::Result;
use crate::inputs::LinguisticVariable;
use crate::variable::{FuzzySet, UniverseRef};
use crate::value::Value;

/// An IF/THEN rule. The kind is picked by [`Rule::new`] from the consequent.
#[derive(Clone, Debug)]
pub enum Rule {
    Mamdani(MamdaniRule),
    Tsk(TskRule),
}

impl Rule {
    /// A fuzzy set consequent makes a Mamdani rule, anything else a TSK rule.
    pub fn new(antecedent: impl Into<Expr>, consequent: impl Into<Expr>) -> Self {
        let antecedent = antecedent.into();

        match consequent.into() {
            Expr::Set(consequent) => Rule::Mamdani(MamdaniRule { antecedent, consequent }),
            consequent => Rule::Tsk(TskRule { antecedent, consequent }),
        }
    }

    pub fn antecedent(&self) -> &Expr {
        match self {
            Rule::Mamdani(rule) => &rule.antecedent,
            Rule::Tsk(rule) => &rule.antecedent,
        }
    }

    /// The universe a Mamdani rule concludes about.
    pub fn target(&self) -> Option<&UniverseRef> {
        match self {
            Rule::Mamdani(rule) => Some(rule.target()),
            Rule::Tsk(_) => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Rule::Mamdani(_) => "Mamdani",
            Rule::Tsk(_) => "TSK",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Mamdani(rule) => fmt::Display::fmt(rule, f),
            Rule::Tsk(rule) => fmt::Display::fmt(rule, f),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MamdaniRule {
    antecedent: Expr,
    consequent: FuzzySet,
}

impl MamdaniRule {
    pub fn consequent(&self) -> &FuzzySet {
        &self.consequent
    }

    pub fn target(&self) -> &UniverseRef {
        self.consequent.universe()
    }

    /// Degree of truth of the antecedent for the crisp input `x`. Must be a scalar.
    pub fn degree(&self, x: &LinguisticVariable) -> Result<f64> {
        self.antecedent.eval(x)?.as_scalar()
    }

    /// Consequent clipped by the antecedent's degree of truth, over the whole target domain.
    pub fn implication(&self, x: &LinguisticVariable) -> Result<Vec<f64>> {
        let domain = self.target().domain();
        // The consequent reads the entire output domain instead of a crisp value
        let x_q = LinguisticVariable::new([(self.target().name(), domain.to_vec())]);
        let degree = self.degree(x)?;
        let curve = self.consequent.eval(&x_q)?;

        Value::Scalar(degree).zip_with(&curve, f64::min)?.into_array(domain.len())
    }
}

impl fmt::Display for MamdaniRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF {} THEN {}", self.antecedent, self.consequent)
    }
}

#[derive(Clone, Debug)]
pub struct TskRule {
    antecedent: Expr,
    consequent: Expr,
}

impl TskRule {
    pub fn consequent(&self) -> &Expr {
        &self.consequent
    }

    pub fn firing_strength(&self, x: &LinguisticVariable) -> Result<f64> {
        self.antecedent.eval(x)?.as_scalar()
    }

    /// The local model's output for the crisp input `x`.
    pub fn output(&self, x: &LinguisticVariable) -> Result<f64> {
        self.consequent.eval(x)?.as_scalar()
    }
}

impl fmt::Display for TskRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF {} THEN {}", self.antecedent, self.consequent)
    }
}

#[cfg(test)]
use crate::{error::FuzzyError, membership::triangular, variable::Universe};

#[cfg(test)]
fn tipping() -> (Universe, Universe, Universe) {
    let domain: Vec<f64> = (0..=10).map(f64::from).collect();
    let mut quality = Universe::new("quality", domain.clone()).unwrap();
    let mut service = Universe::new("service", domain).unwrap();
    let mut tip = Universe::new("tip", (0..=25).map(f64::from).collect::<Vec<_>>()).unwrap();

    quality.register("high", triangular(5., 10., 10.).unwrap()).unwrap();
    service.register("medium", triangular(0., 5., 10.).unwrap()).unwrap();
    service.register("high", triangular(5., 10., 10.).unwrap()).unwrap();
    tip.register("medium", triangular(0., 13., 25.).unwrap()).unwrap();
    tip.register("high", triangular(13., 25., 25.).unwrap()).unwrap();

    (quality, service, tip)
}

#[test]
fn test_factory_picks_kind_from_consequent() {
    let (quality, service, tip) = tipping();
    let mamdani = Rule::new(service.set("medium").unwrap(), tip.set("medium").unwrap());
    let tsk = Rule::new(service.set("medium").unwrap(), Expr::from(&quality).mul(0.5).unwrap());
    let constant = Rule::new(service.set("medium").unwrap(), Expr::constant(12.).unwrap());

    assert!(matches!(mamdani, Rule::Mamdani(_)));
    assert_eq!(mamdani.target().map(UniverseRef::name), Some("tip"));
    assert!(matches!(tsk, Rule::Tsk(_)));
    assert!(tsk.target().is_none());
    assert!(matches!(constant, Rule::Tsk(_)));
    assert_eq!(mamdani.to_string(), "IF service.medium THEN tip.medium");
    assert_eq!(tsk.to_string(), "IF service.medium THEN (quality * 0.5)");
}

#[test]
fn test_mamdani_implication() {
    let (quality, service, tip) = tipping();
    let antecedent = quality.set("high").unwrap().or(service.set("high").unwrap()).unwrap();
    let Rule::Mamdani(rule) = Rule::new(antecedent, tip.set("high").unwrap()) else {
        panic!("expected a Mamdani rule");
    };
    let x = LinguisticVariable::new([("quality", 6.5), ("service", 9.8)]);
    let implication = rule.implication(&x).unwrap();

    assert_eq!(implication.len(), 26);
    assert!(implication[..13].iter().all(|mu| *mu < 1e-9));
    assert!((implication[25] - 0.96).abs() < 1e-9);
    assert!(implication.iter().all(|mu| *mu <= 0.96 + 1e-9));
}

#[test]
fn test_tsk_evaluation() {
    let (quality, service, _) = tipping();
    let Rule::Tsk(rule) = Rule::new(service.set("medium").unwrap(), Expr::from(&quality).mul(0.5).unwrap()) else {
        panic!("expected a TSK rule");
    };
    let x = LinguisticVariable::new([("quality", 6.5), ("service", 9.8)]);

    assert!((rule.firing_strength(&x).unwrap() - 0.04).abs() < 1e-9);
    assert_eq!(rule.output(&x).unwrap(), 3.25);

    let x = LinguisticVariable::new([("quality", Value::Array(vec![1., 2.])), ("service", Value::Scalar(5.))]);

    assert!(matches!(rule.output(&x), Err(FuzzyError::NotScalar(2))));
}

#[test]
fn test_mamdani_rejects_array_degree() {
    let (_, service, tip) = tipping();
    let Rule::Mamdani(rule) = Rule::new(service.set("medium").unwrap(), tip.set("medium").unwrap()) else {
        panic!("expected a Mamdani rule");
    };
    let x = LinguisticVariable::new([("service", (0..=25).map(f64::from).collect::<Vec<_>>())]);

    assert!(matches!(rule.degree(&x), Err(FuzzyError::NotScalar(26))));
    assert!(matches!(rule.implication(&x), Err(FuzzyError::NotScalar(26))));
}
