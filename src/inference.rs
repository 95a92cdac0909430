use slotmap::{new_key_type, SecondaryMap, SlotMap};
use tracing::{debug, trace, warn};

use crate::error::{FuzzyError, Result};
use crate::inputs::LinguisticVariable;
use crate::ops::Defuzzifier;
use crate::outputs::Aggregation;
use crate::rules::{MamdaniRule, Rule, TskRule};
use crate::variable::UniverseRef;

new_key_type! {
    /// Handle to a rule registered with an engine
    pub struct RuleKey;
}

/// Shared surface of the Mamdani and TSK engines.
pub trait RuleEngine {
    fn add_rule(&mut self, rule: Rule) -> Result<RuleKey>;

    /// Runs every rule against `x` and returns the crisp output.
    fn infer(&mut self, x: &LinguisticVariable) -> Result<f64>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Crisp output of the last successful inference.
    fn crisp(&self) -> Option<f64>;
}

/// Min implication, max aggregation, then defuzzification over the target universe.
#[derive(Debug, Default)]
pub struct MamdaniEngine {
    rules: SlotMap<RuleKey, MamdaniRule>,
    activations: SecondaryMap<RuleKey, Vec<f64>>,
    target: Option<UniverseRef>,
    defuzzifier: Defuzzifier,
    aggregate: Option<Vec<f64>>,
    crisp: Option<f64>,
}

impl MamdaniEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defuzzifier(defuzzifier: Defuzzifier) -> Self {
        Self {
            defuzzifier,
            ..Self::default()
        }
    }

    pub fn defuzzifier(&self) -> Defuzzifier {
        self.defuzzifier
    }

    pub fn target(&self) -> Option<&UniverseRef> {
        self.target.as_ref()
    }

    pub fn rule(&self, key: RuleKey) -> Option<&MamdaniRule> {
        self.rules.get(key)
    }

    pub fn rules(&self) -> impl Iterator<Item = (RuleKey, &MamdaniRule)> {
        self.rules.iter()
    }

    /// Removing the last rule releases the target universe.
    pub fn remove_rule(&mut self, key: RuleKey) -> Option<MamdaniRule> {
        let rule = self.rules.remove(key)?;

        self.activations.remove(key);

        if self.rules.is_empty() {
            self.target = None;
        }

        Some(rule)
    }

    /// The implication computed for `key` by the last inference.
    pub fn activation(&self, key: RuleKey) -> Option<&[f64]> {
        self.activations.get(key).map(Vec::as_slice)
    }

    pub fn aggregation(&self) -> Option<Aggregation<'_>> {
        let target = self.target.as_ref()?;
        let aggregate = self.aggregate.as_deref()?;

        Some(Aggregation::new(target, aggregate, self.crisp))
    }
}

impl RuleEngine for MamdaniEngine {
    fn add_rule(&mut self, rule: Rule) -> Result<RuleKey> {
        let rule = match rule {
            Rule::Mamdani(rule) => rule,
            other => {
                return Err(FuzzyError::RuleKind {
                    engine: "Mamdani",
                    rule: other.kind(),
                })
            },
        };
        let target = self.target.get_or_insert_with(|| rule.target().clone());

        if target != rule.target() {
            return Err(FuzzyError::TargetMismatch {
                expected: target.name().to_owned(),
                found: rule.target().name().to_owned(),
            });
        }

        debug!(%rule, "Registered Mamdani rule");

        Ok(self.rules.insert(rule))
    }

    fn infer(&mut self, x: &LinguisticVariable) -> Result<f64> {
        self.activations.clear();
        self.aggregate = None;
        self.crisp = None;

        let Some(target) = &self.target else {
            warn!("Mamdani inference without rules");
            return Err(FuzzyError::Degenerate("no rules registered"));
        };

        debug!(rules = self.rules.len(), input = %x, target = %target, "Mamdani inference");

        let domain = target.domain();
        let mut aggregate = vec![0.; domain.len()];

        for (key, rule) in &self.rules {
            let implication = rule.implication(x)?;

            trace!(%rule, peak = implication.iter().copied().fold(0., f64::max), "Rule activation");

            for (agg, mu) in aggregate.iter_mut().zip(&implication) {
                *agg = f64::max(*agg, *mu);
            }

            self.activations.insert(key, implication);
        }

        let defuzzed = self.defuzzifier.call(domain, &aggregate);

        self.aggregate = Some(aggregate);

        let crisp = match defuzzed {
            Ok(crisp) => crisp,
            Err(err) => {
                warn!(%err, input = %x, "No Mamdani rule fired");
                return Err(err);
            },
        };

        debug!(crisp, defuzzifier = ?self.defuzzifier, "Mamdani inference done");
        self.crisp = Some(crisp);

        Ok(crisp)
    }

    fn len(&self) -> usize {
        self.rules.len()
    }

    fn crisp(&self) -> Option<f64> {
        self.crisp
    }
}

/// Firing strength and local model output of one TSK rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TskActivation {
    pub strength: f64,
    pub output: f64,
}

/// Weighted average of the rules' local models.
#[derive(Debug, Default)]
pub struct TskEngine {
    rules: SlotMap<RuleKey, TskRule>,
    activations: SecondaryMap<RuleKey, TskActivation>,
    crisp: Option<f64>,
}

impl TskEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(&self, key: RuleKey) -> Option<&TskRule> {
        self.rules.get(key)
    }

    pub fn rules(&self) -> impl Iterator<Item = (RuleKey, &TskRule)> {
        self.rules.iter()
    }

    pub fn remove_rule(&mut self, key: RuleKey) -> Option<TskRule> {
        self.activations.remove(key);
        self.rules.remove(key)
    }

    pub fn activation(&self, key: RuleKey) -> Option<TskActivation> {
        self.activations.get(key).copied()
    }
}

impl RuleEngine for TskEngine {
    fn add_rule(&mut self, rule: Rule) -> Result<RuleKey> {
        match rule {
            Rule::Tsk(rule) => {
                debug!(%rule, "Registered TSK rule");

                Ok(self.rules.insert(rule))
            },
            other => Err(FuzzyError::RuleKind {
                engine: "TSK",
                rule: other.kind(),
            }),
        }
    }

    fn infer(&mut self, x: &LinguisticVariable) -> Result<f64> {
        self.activations.clear();
        self.crisp = None;

        if self.rules.is_empty() {
            warn!("TSK inference without rules");
            return Err(FuzzyError::Degenerate("no rules registered"));
        }

        debug!(rules = self.rules.len(), input = %x, "TSK inference");

        let mut num = 0.;
        let mut den = 0.;

        for (key, rule) in &self.rules {
            let activation = TskActivation {
                strength: rule.firing_strength(x)?,
                output: rule.output(x)?,
            };

            trace!(%rule, strength = activation.strength, output = activation.output, "Rule activation");

            num += activation.strength * activation.output;
            den += activation.strength;
            self.activations.insert(key, activation);
        }

        if den == 0. {
            warn!(input = %x, "No TSK rule fired");
            return Err(FuzzyError::Degenerate("total firing strength is zero"));
        }

        let crisp = num / den;

        debug!(crisp, "TSK inference done");
        self.crisp = Some(crisp);

        Ok(crisp)
    }

    fn len(&self) -> usize {
        self.rules.len()
    }

    fn crisp(&self) -> Option<f64> {
        self.crisp
    }
}

#[cfg(test)]
use crate::{dsl::Expr, membership::triangular, variable::Universe};

#[test]
fn test_target_mismatch() {
    let mut service = Universe::new("service", vec![0., 5., 10.]).unwrap();
    let mut tip = Universe::new("tip", vec![0., 10., 20.]).unwrap();
    let mut rating = Universe::new("rating", vec![0., 1., 2.]).unwrap();
    let good = service.register("good", triangular(5., 10., 10.).unwrap()).unwrap();
    let high = tip.register("high", triangular(10., 20., 20.).unwrap()).unwrap();
    let top = rating.register("top", triangular(1., 2., 2.).unwrap()).unwrap();

    let mut engine = MamdaniEngine::new();

    engine.add_rule(Rule::new(&good, &high)).unwrap();

    let err = engine.add_rule(Rule::new(&good, &top)).unwrap_err();

    assert!(matches!(
        err,
        FuzzyError::TargetMismatch { ref expected, ref found } if expected == "tip" && found == "rating"
    ));
    assert_eq!(engine.len(), 1);
    assert_eq!(engine.target().map(UniverseRef::name), Some("tip"));
}

#[test]
fn test_rule_kind_mismatch() {
    let mut service = Universe::new("service", vec![0., 5., 10.]).unwrap();
    let mut tip = Universe::new("tip", vec![0., 10., 20.]).unwrap();
    let good = service.register("good", triangular(5., 10., 10.).unwrap()).unwrap();
    let high = tip.register("high", triangular(10., 20., 20.).unwrap()).unwrap();

    let mut mamdani = MamdaniEngine::new();
    let mut tsk = TskEngine::new();

    assert!(matches!(
        mamdani.add_rule(Rule::new(&good, Expr::constant(15.).unwrap())),
        Err(FuzzyError::RuleKind { engine: "Mamdani", rule: "TSK" })
    ));
    assert!(matches!(
        tsk.add_rule(Rule::new(&good, &high)),
        Err(FuzzyError::RuleKind { engine: "TSK", rule: "Mamdani" })
    ));
}

#[test]
fn test_empty_engines_are_degenerate() {
    let x = LinguisticVariable::new([("service", 5.)]);

    assert!(matches!(MamdaniEngine::new().infer(&x), Err(FuzzyError::Degenerate(_))));
    assert!(matches!(TskEngine::new().infer(&x), Err(FuzzyError::Degenerate(_))));
}

#[test]
fn test_remove_rule_releases_target() {
    let mut service = Universe::new("service", vec![0., 5., 10.]).unwrap();
    let mut tip = Universe::new("tip", vec![0., 10., 20.]).unwrap();
    let mut rating = Universe::new("rating", vec![0., 1., 2.]).unwrap();
    let good = service.register("good", triangular(5., 10., 10.).unwrap()).unwrap();
    let high = tip.register("high", triangular(10., 20., 20.).unwrap()).unwrap();
    let top = rating.register("top", triangular(1., 2., 2.).unwrap()).unwrap();

    let mut engine = MamdaniEngine::new();
    let key = engine.add_rule(Rule::new(&good, &high)).unwrap();

    assert!(engine.remove_rule(key).is_some());
    assert!(engine.is_empty());
    assert!(engine.target().is_none());
    assert!(engine.add_rule(Rule::new(&good, &top)).is_ok());
}

#[test]
fn test_tsk_activations_are_cached() {
    let mut service = Universe::new("service", vec![0., 5., 10.]).unwrap();
    let good = service.register("good", triangular(5., 10., 10.).unwrap()).unwrap();
    let poor = service.register("poor", triangular(0., 0., 5.).unwrap()).unwrap();

    let mut engine = TskEngine::new();
    let generous = engine.add_rule(Rule::new(&good, Expr::constant(20.).unwrap())).unwrap();
    let stingy = engine.add_rule(Rule::new(&poor, Expr::constant(5.).unwrap())).unwrap();

    let crisp = engine.infer(&LinguisticVariable::new([("service", 7.5)])).unwrap();

    assert!((crisp - 20.).abs() < 1e-9);
    assert!((engine.activation(generous).unwrap().strength - 0.5).abs() < 1e-9);
    assert_eq!(engine.activation(stingy).unwrap().strength, 0.);
    assert_eq!(engine.crisp(), Some(crisp));
}

#[test]
fn test_tsk_nothing_fires() {
    let mut service = Universe::new("service", vec![0., 5., 10.]).unwrap();
    let good = service.register("good", triangular(5., 10., 10.).unwrap()).unwrap();

    let mut engine = TskEngine::new();

    engine.add_rule(Rule::new(&good, Expr::constant(20.).unwrap())).unwrap();
    engine.infer(&LinguisticVariable::new([("service", 10.)])).unwrap();

    assert!(matches!(
        engine.infer(&LinguisticVariable::new([("service", 0.)])),
        Err(FuzzyError::Degenerate("total firing strength is zero"))
    ));
    assert_eq!(engine.crisp(), None);
}
