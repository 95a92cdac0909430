use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{FuzzyError, Result};
use crate::inputs::LinguisticVariable;
use crate::membership::MembershipFn;
use crate::ops::Operators;
use crate::value::Value;

/// Shared handle on a universe's identity: its name and its sampled domain.
///
/// Fuzzy sets and expressions keep one of these to find their input and to check which
/// universe they belong to. Two handles are equal when names and domains match exactly.
#[derive(Clone, Debug)]
pub struct UniverseRef {
    name: Arc<str>,
    domain: Arc<[f64]>,
}

impl UniverseRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &[f64] {
        &self.domain
    }
}

impl PartialEq for UniverseRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.domain == other.domain
    }
}

impl fmt::Display for UniverseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A named, sampled domain together with the fuzzy sets defined over it.
#[derive(Debug)]
pub struct Universe {
    id: UniverseRef,
    operators: Operators,
    sets: IndexMap<String, FuzzySet>,
}

impl Universe {
    pub fn new(name: impl Into<String>, domain: impl Into<Vec<f64>>) -> Result<Self> {
        Self::with_operators(name, domain, Operators::default())
    }

    /// Fuzzy sets registered here combine with AND/OR through `operators`.
    pub fn with_operators(
        name: impl Into<String>,
        domain: impl Into<Vec<f64>>,
        operators: Operators,
    ) -> Result<Self> {
        let name = name.into();
        let domain = domain.into();
        let reason = if domain.is_empty() {
            Some("domain is empty")
        } else if domain.iter().any(|x| !x.is_finite()) {
            Some("domain contains non-finite values")
        } else if domain.windows(2).any(|w| w[0] >= w[1]) {
            Some("domain must be strictly increasing")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(FuzzyError::InvalidDomain { universe: name, reason });
        }

        Ok(Self {
            id: UniverseRef {
                name: name.into(),
                domain: domain.into(),
            },
            operators,
            sets: IndexMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        self.id.name()
    }

    pub fn domain(&self) -> &[f64] {
        self.id.domain()
    }

    pub fn operators(&self) -> Operators {
        self.operators
    }

    pub fn reference(&self) -> &UniverseRef {
        &self.id
    }

    /// Registers `membership` under `name`, replacing any set already registered under it.
    pub fn register(&mut self, name: &str, membership: MembershipFn) -> Result<FuzzySet> {
        if !is_identifier(name) {
            return Err(FuzzyError::InvalidName(name.to_owned()));
        }

        let set = FuzzySet {
            universe: self.id.clone(),
            name: name.to_owned(),
            membership,
            operators: self.operators,
        };

        self.sets.insert(name.to_owned(), set.clone());

        Ok(set)
    }

    pub fn set(&self, name: &str) -> Result<&FuzzySet> {
        self.sets.get(name).ok_or_else(|| FuzzyError::UnknownSet {
            universe: self.name().to_owned(),
            set: name.to_owned(),
        })
    }

    pub fn sets(&self) -> impl Iterator<Item = &FuzzySet> {
        self.sets.values()
    }

    /// Every registered set sampled over the whole domain, in registration order.
    pub fn curves(&self) -> impl Iterator<Item = (&str, Vec<f64>)> + '_ {
        self.sets.values().map(|set| (set.name(), set.curve()))
    }
}

impl PartialEq for Universe {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.id, f)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => chars.all(|c| c == '_' || c.is_alphanumeric()),
        _ => false,
    }
}

/// A membership function bound to a universe.
#[derive(Clone, Debug)]
pub struct FuzzySet {
    universe: UniverseRef,
    name: String,
    membership: MembershipFn,
    operators: Operators,
}

impl FuzzySet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn universe(&self) -> &UniverseRef {
        &self.universe
    }

    pub fn operators(&self) -> Operators {
        self.operators
    }

    pub fn membership(&self) -> &MembershipFn {
        &self.membership
    }

    pub fn degree(&self, x: f64) -> f64 {
        self.membership.degree(x)
    }

    /// Degree of the input stored under this set's universe name.
    pub fn eval(&self, x: &LinguisticVariable) -> Result<Value> {
        Ok(self.membership.eval(x.get(self.universe.name())?))
    }

    pub fn curve(&self) -> Vec<f64> {
        self.membership.sample(self.universe.domain())
    }

    /// Pointwise combination of two sets of the same universe. The result is evaluated
    /// lazily, each call applies `combine` to both underlying degrees.
    pub(crate) fn merge(
        &self,
        other: &FuzzySet,
        symbol: &str,
        combine: impl Fn(f64, f64) -> f64 + Send + Sync + 'static,
    ) -> FuzzySet {
        debug_assert_eq!(self.universe, other.universe);

        let lhs = self.membership.clone();
        let rhs = other.membership.clone();

        FuzzySet {
            universe: self.universe.clone(),
            name: format!("{}{symbol}{}", self.name, other.name),
            membership: MembershipFn::new(move |x| combine(lhs.degree(x), rhs.degree(x))),
            operators: self.operators,
        }
    }
}

impl fmt::Display for FuzzySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.universe, self.name)
    }
}

#[cfg(test)]
use crate::membership::triangular;

#[test]
fn test_register_and_lookup() {
    let mut quality = Universe::new("quality", vec![0., 5., 10.]).unwrap();
    let low = quality.register("low", triangular(0., 0., 5.).unwrap()).unwrap();

    assert_eq!(low.to_string(), "quality.low");
    assert_eq!(quality.set("low").unwrap().name(), "low");
    assert!(matches!(
        quality.set("high"),
        Err(FuzzyError::UnknownSet { ref universe, ref set }) if universe == "quality" && set == "high"
    ));
}

#[test]
fn test_register_rejects_non_identifiers() {
    let mut quality = Universe::new("quality", vec![0., 10.]).unwrap();
    let mf = triangular(0., 0., 5.).unwrap();

    for name in ["", "1st", "very low", "low-ish", "a.b"] {
        assert!(
            matches!(quality.register(name, mf.clone()), Err(FuzzyError::InvalidName(_))),
            "{name}"
        );
    }
    for name in ["low", "_hidden", "très_bas", "x2"] {
        assert!(quality.register(name, mf.clone()).is_ok(), "{name}");
    }
}

#[test]
fn test_register_replaces_in_place() {
    let mut quality = Universe::new("quality", vec![0., 5., 10.]).unwrap();

    quality.register("low", triangular(0., 0., 5.).unwrap()).unwrap();
    quality.register("high", triangular(5., 10., 10.).unwrap()).unwrap();
    quality.register("low", triangular(0., 0., 10.).unwrap()).unwrap();

    let names: Vec<_> = quality.sets().map(FuzzySet::name).collect();

    assert_eq!(names, ["low", "high"]);
    assert!((quality.set("low").unwrap().degree(5.) - 0.5).abs() < 1e-9);
}

#[test]
fn test_universe_equality() {
    let a = Universe::new("tip", vec![0., 1., 2.]).unwrap();
    let b = Universe::new("tip", vec![0., 1., 2.]).unwrap();
    let c = Universe::new("tip", vec![0., 1., 3.]).unwrap();
    let d = Universe::new("service", vec![0., 1., 2.]).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
}

#[test]
fn test_invalid_domains() {
    assert!(matches!(Universe::new("x", Vec::<f64>::new()), Err(FuzzyError::InvalidDomain { .. })));
    assert!(Universe::new("x", vec![0., f64::INFINITY]).is_err());
    assert!(Universe::new("x", vec![0., 2., 1.]).is_err());
    assert!(Universe::new("x", vec![0., 0.]).is_err());
}

#[test]
fn test_eval_against_linguistic_variable() {
    let mut service = Universe::new("service", vec![0., 5., 10.]).unwrap();
    let medium = service.register("medium", triangular(0., 5., 10.).unwrap()).unwrap();

    let x = LinguisticVariable::new([("service", 2.5)]);
    let degree = medium.eval(&x).unwrap().as_scalar().unwrap();

    assert!((degree - 0.5).abs() < 1e-9);

    let x = LinguisticVariable::new([("quality", 2.5)]);

    assert!(matches!(medium.eval(&x), Err(FuzzyError::MissingInput(ref name)) if name == "service"));
}

#[test]
fn test_curves() {
    let mut tip = Universe::new("tip", vec![0., 5., 10.]).unwrap();

    tip.register("low", triangular(0., 0., 5.).unwrap()).unwrap();
    tip.register("high", triangular(5., 10., 10.).unwrap()).unwrap();

    let curves: Vec<_> = tip.curves().collect();

    assert_eq!(curves.len(), 2);
    assert_eq!(curves[0].0, "low");
    assert_eq!(curves[0].1[0], 1.);
    assert_eq!(curves[1].0, "high");
    assert_eq!(curves[1].1[2], 1.);
}
