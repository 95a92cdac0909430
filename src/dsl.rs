//! Deferred algebra over fuzzy predicates.
//!
//! An [`Expr`] is plain data until [`Expr::eval`] walks it against a [`LinguisticVariable`].
//! Logical nodes record the t-norm or t-conorm that was in force when they were built, so
//! evaluation never consults any configuration.

use std::fmt;

use crate::error::{FuzzyError, Result};
use crate::inputs::LinguisticVariable;
use crate::ops::{Operators, TConorm, TNorm};
use crate::value::Value;
use crate::variable::{FuzzySet, Universe, UniverseRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    And(TNorm),
    Or(TConorm),
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
            Self::And(_) => "AND",
            Self::Or(_) => "OR",
        }
    }

    pub fn apply(self, u: &Value, v: &Value) -> Result<Value> {
        match self {
            Self::Add => u.zip_with(v, |u, v| u + v),
            Self::Sub => u.zip_with(v, |u, v| u - v),
            Self::Mul => u.zip_with(v, |u, v| u * v),
            Self::Div => u.zip_with(v, |u, v| u / v),
            Self::Pow => u.zip_with(v, f64::powf),
            Self::And(tnorm) => tnorm.apply(u, v),
            Self::Or(tconorm) => tconorm.apply(u, v),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Expr {
    Constant(f64),
    Set(FuzzySet),
    /// The crisp input of a universe itself, as used by TSK consequents.
    Variable(UniverseRef),
    Not(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// Anything that may appear on the right-hand side of an expression builder.
pub trait IntoOperand {
    fn into_operand(self) -> Result<Expr>;
}

impl IntoOperand for Expr {
    fn into_operand(self) -> Result<Expr> {
        Ok(self)
    }
}

impl IntoOperand for FuzzySet {
    fn into_operand(self) -> Result<Expr> {
        Ok(Expr::Set(self))
    }
}

impl IntoOperand for &FuzzySet {
    fn into_operand(self) -> Result<Expr> {
        Ok(Expr::Set(self.clone()))
    }
}

impl IntoOperand for &Universe {
    fn into_operand(self) -> Result<Expr> {
        Ok(self.into())
    }
}

impl IntoOperand for f64 {
    fn into_operand(self) -> Result<Expr> {
        Expr::constant(self)
    }
}

impl IntoOperand for i32 {
    fn into_operand(self) -> Result<Expr> {
        Expr::constant(f64::from(self))
    }
}

impl IntoOperand for Value {
    fn into_operand(self) -> Result<Expr> {
        match self {
            Value::Scalar(x) => Expr::constant(x),
            Value::Array(values) => Err(FuzzyError::Composition(format!("array of length {}", values.len()))),
        }
    }
}

impl From<FuzzySet> for Expr {
    fn from(set: FuzzySet) -> Self {
        Expr::Set(set)
    }
}

impl From<&FuzzySet> for Expr {
    fn from(set: &FuzzySet) -> Self {
        Expr::Set(set.clone())
    }
}

impl From<&Universe> for Expr {
    fn from(universe: &Universe) -> Self {
        Expr::Variable(universe.reference().clone())
    }
}

#[allow(clippy::should_implement_trait)]
impl Expr {
    /// A numeric leaf. Only finite numbers can take part in an expression.
    pub fn constant(x: f64) -> Result<Self> {
        if x.is_finite() {
            Ok(Expr::Constant(x))
        } else {
            Err(FuzzyError::Composition(format!("non-finite constant {x}")))
        }
    }

    pub fn add(self, rhs: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Add, rhs)
    }

    pub fn sub(self, rhs: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Sub, rhs)
    }

    pub fn mul(self, rhs: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Mul, rhs)
    }

    pub fn div(self, rhs: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Div, rhs)
    }

    pub fn pow(self, rhs: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Pow, rhs)
    }

    /// Conjunction under the operators this expression was built with.
    pub fn and(self, rhs: impl IntoOperand) -> Result<Self> {
        let operators = self.operators();

        self.and_with(rhs, operators)
    }

    pub fn or(self, rhs: impl IntoOperand) -> Result<Self> {
        let operators = self.operators();

        self.or_with(rhs, operators)
    }

    pub fn and_with(self, rhs: impl IntoOperand, operators: Operators) -> Result<Self> {
        let tnorm = operators.tnorm;
        let rhs = rhs.into_operand()?;

        match (&self, &rhs) {
            (Expr::Set(lhs), Expr::Set(rhs)) if lhs.universe() == rhs.universe() => {
                Ok(Expr::Set(lhs.merge(rhs, "&", move |u, v| tnorm.call(u, v))))
            },
            _ => Ok(Expr::node(BinaryOp::And(tnorm), self, rhs)),
        }
    }

    pub fn or_with(self, rhs: impl IntoOperand, operators: Operators) -> Result<Self> {
        let tconorm = operators.tconorm;
        let rhs = rhs.into_operand()?;

        match (&self, &rhs) {
            (Expr::Set(lhs), Expr::Set(rhs)) if lhs.universe() == rhs.universe() => {
                Ok(Expr::Set(lhs.merge(rhs, "|", move |u, v| tconorm.call(u, v))))
            },
            _ => Ok(Expr::node(BinaryOp::Or(tconorm), self, rhs)),
        }
    }

    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    fn binary(self, op: BinaryOp, rhs: impl IntoOperand) -> Result<Self> {
        Ok(Expr::node(op, self, rhs.into_operand()?))
    }

    fn node(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Operators of the leftmost fuzzy set in the tree, or the defaults when there is none.
    pub fn operators(&self) -> Operators {
        fn find(expr: &Expr) -> Option<Operators> {
            match expr {
                Expr::Set(set) => Some(set.operators()),
                Expr::Not(inner) => find(inner),
                Expr::Binary { lhs, rhs, .. } => find(lhs).or_else(|| find(rhs)),
                Expr::Constant(_) | Expr::Variable(_) => None,
            }
        }

        find(self).unwrap_or_default()
    }

    pub fn eval(&self, x: &LinguisticVariable) -> Result<Value> {
        match self {
            Expr::Constant(c) => Ok(Value::Scalar(*c)),
            Expr::Set(set) => set.eval(x),
            Expr::Variable(universe) => x.get(universe.name()).cloned(),
            Expr::Not(inner) => Ok(inner.eval(x)?.map(|v| 1. - v)),
            Expr::Binary { op, lhs, rhs } => {
                let u = lhs.eval(x)?;
                let v = rhs.eval(x)?;

                op.apply(&u, &v)
            },
        }
    }

    /// Every universe the expression reads from, leftmost first, without repeats.
    pub fn universes(&self) -> Vec<&UniverseRef> {
        fn collect<'e>(expr: &'e Expr, out: &mut Vec<&'e UniverseRef>) {
            match expr {
                Expr::Set(set) => push_unique(out, set.universe()),
                Expr::Variable(universe) => push_unique(out, universe),
                Expr::Not(inner) => collect(inner, out),
                Expr::Binary { lhs, rhs, .. } => {
                    collect(lhs, out);
                    collect(rhs, out);
                },
                Expr::Constant(_) => {},
            }
        }

        fn push_unique<'e>(out: &mut Vec<&'e UniverseRef>, universe: &'e UniverseRef) {
            if !out.contains(&universe) {
                out.push(universe);
            }
        }

        let mut universes = Vec::new();

        collect(self, &mut universes);

        universes
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(c) => write!(f, "{c}"),
            Expr::Set(set) => write!(f, "{set}"),
            Expr::Variable(universe) => write!(f, "{universe}"),
            Expr::Not(inner) => write!(f, "NOT {inner}"),
            Expr::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
        }
    }
}

impl FuzzySet {
    pub fn and(&self, rhs: impl IntoOperand) -> Result<Expr> {
        Expr::from(self).and(rhs)
    }

    pub fn or(&self, rhs: impl IntoOperand) -> Result<Expr> {
        Expr::from(self).or(rhs)
    }

    pub fn not(&self) -> Expr {
        Expr::from(self).not()
    }
}

#[cfg(test)]
mod fixtures {
    use crate::membership::triangular;
    use crate::ops::Operators;
    use crate::variable::Universe;

    pub(super) fn universes(operators: Operators) -> (Universe, Universe) {
        let domain: Vec<f64> = (0..=10).map(f64::from).collect();
        let mut quality = Universe::with_operators("quality", domain.clone(), operators).unwrap();
        let mut service = Universe::with_operators("service", domain, operators).unwrap();

        quality.register("low", triangular(0., 0., 5.).unwrap()).unwrap();
        quality.register("high", triangular(5., 10., 10.).unwrap()).unwrap();
        service.register("low", triangular(0., 0., 5.).unwrap()).unwrap();
        service.register("high", triangular(5., 10., 10.).unwrap()).unwrap();

        (quality, service)
    }
}

#[test]
fn test_same_universe_collapses_to_fuzzy_set() {
    let (quality, _) = fixtures::universes(Operators::default());
    let low = quality.set("low").unwrap();
    let high = quality.set("high").unwrap();

    let Expr::Set(either) = low.or(high).unwrap() else {
        panic!("same-universe OR should stay a fuzzy set");
    };

    assert_eq!(either.to_string(), "quality.low|high");
    assert_eq!(either.degree(0.), 1.);
    assert_eq!(either.degree(10.), 1.);

    let Expr::Set(both) = low.and(high).unwrap() else {
        panic!("same-universe AND should stay a fuzzy set");
    };

    assert_eq!(both.name(), "low&high");
    assert!(both.degree(5.) < 1e-9);
}

#[test]
fn test_cross_universe_builds_tree() {
    let (quality, service) = fixtures::universes(Operators::default());
    let expr = quality.set("low").unwrap().and(service.set("low").unwrap()).unwrap();

    assert!(matches!(
        expr,
        Expr::Binary {
            op: BinaryOp::And(TNorm::Minimum),
            ..
        }
    ));
    assert_eq!(expr.to_string(), "(quality.low AND service.low)");

    let x = LinguisticVariable::new([("quality", 2.5), ("service", 1.)]);
    let degree = expr.eval(&x).unwrap().as_scalar().unwrap();

    assert!((degree - 0.5).abs() < 1e-9);
}

#[test]
fn test_operators_fixed_at_construction() {
    let (quality, service) = fixtures::universes(Operators::algebraic());
    let expr = quality.set("high").unwrap().or(service.set("high").unwrap()).unwrap();
    let explicit = Expr::from(quality.set("high").unwrap())
        .or_with(service.set("high").unwrap(), Operators::default())
        .unwrap();
    let x = LinguisticVariable::new([("quality", 7.5), ("service", 7.5)]);

    assert!(matches!(
        expr,
        Expr::Binary {
            op: BinaryOp::Or(TConorm::ProbabilisticSum),
            ..
        }
    ));
    assert!((expr.eval(&x).unwrap().as_scalar().unwrap() - 0.75).abs() < 1e-9);
    assert!((explicit.eval(&x).unwrap().as_scalar().unwrap() - 0.5).abs() < 1e-9);
}

#[test]
fn test_arithmetic_and_rendering() {
    let (_, service) = fixtures::universes(Operators::default());
    let expr = Expr::constant(2.)
        .unwrap()
        .mul(&service)
        .unwrap()
        .add(Expr::constant(3.).unwrap().mul(&service).unwrap())
        .unwrap()
        .add(5)
        .unwrap()
        .div(5)
        .unwrap();
    let x = LinguisticVariable::new([("service", 9.8)]);

    assert_eq!(expr.to_string(), "((((2 * service) + (3 * service)) + 5) / 5)");
    assert!((expr.eval(&x).unwrap().as_scalar().unwrap() - 10.8).abs() < 1e-9);
    assert_eq!(expr.universes().len(), 1);

    let squared = Expr::from(&service).pow(2).unwrap();

    assert_eq!(squared.eval(&x).unwrap(), Value::Scalar(9.8f64.powf(2.)));
    assert_eq!(squared.to_string(), "(service ** 2)");
}

#[test]
fn test_not() {
    let (quality, _) = fixtures::universes(Operators::default());
    let expr = quality.set("low").unwrap().not();
    let x = LinguisticVariable::new([("quality", 0.)]);

    assert_eq!(expr.to_string(), "NOT quality.low");
    assert_eq!(expr.eval(&x).unwrap(), Value::Scalar(0.));
}

#[test]
fn test_composition_errors() {
    let (quality, _) = fixtures::universes(Operators::default());
    let low = Expr::from(quality.set("low").unwrap());

    assert!(matches!(low.clone().add(f64::NAN), Err(FuzzyError::Composition(_))));
    assert!(matches!(
        low.clone().and(Value::Array(vec![0., 1.])),
        Err(FuzzyError::Composition(ref msg)) if msg == "array of length 2"
    ));
    assert!(matches!(Expr::constant(f64::INFINITY), Err(FuzzyError::Composition(_))));
    assert!(low.mul(Value::Scalar(0.5)).is_ok());
}

#[test]
fn test_eval_is_idempotent_and_vectorized() {
    let (quality, service) = fixtures::universes(Operators::default());
    let expr = quality.set("low").unwrap().or(service.set("high").unwrap()).unwrap();
    let x = LinguisticVariable::new([("quality", Value::Array(vec![0., 5., 10.])), ("service", Value::Scalar(7.5))]);

    let first = expr.eval(&x).unwrap();

    assert_eq!(first, expr.eval(&x).unwrap());
    assert_eq!(first.len(), 3);
    assert!(matches!(expr.eval(&LinguisticVariable::default()), Err(FuzzyError::MissingInput(_))));
}
