use std::io::Write;

use fuzzy_inference::membership::triangular;
use fuzzy_inference::{
    arange, Defuzzifier, Expr, FuzzyError, LinguisticVariable, MamdaniEngine, Operators, Rule, RuleEngine, TskEngine,
    Universe,
};

struct Tipping {
    quality: Universe,
    service: Universe,
    tip: Universe,
}

impl Tipping {
    fn new(operators: Operators) -> Self {
        let mut quality = Universe::with_operators("quality", arange(0., 11., 1.), operators).unwrap();
        let mut service = Universe::with_operators("service", arange(0., 11., 1.), operators).unwrap();
        let mut tip = Universe::with_operators("tip", arange(0., 26., 1.), operators).unwrap();

        quality.register("low", triangular(0., 0., 5.).unwrap()).unwrap();
        quality.register("high", triangular(5., 10., 10.).unwrap()).unwrap();
        service.register("low", triangular(0., 0., 5.).unwrap()).unwrap();
        service.register("medium", triangular(0., 5., 10.).unwrap()).unwrap();
        service.register("high", triangular(5., 10., 10.).unwrap()).unwrap();
        tip.register("low", triangular(0., 0., 13.).unwrap()).unwrap();
        tip.register("medium", triangular(0., 13., 25.).unwrap()).unwrap();
        tip.register("high", triangular(13., 25., 25.).unwrap()).unwrap();

        Self { quality, service, tip }
    }

    fn poor(&self) -> Expr {
        let quality = self.quality.set("low").unwrap();

        quality.and(self.service.set("low").unwrap()).unwrap()
    }

    fn average(&self) -> Expr {
        self.service.set("medium").unwrap().into()
    }

    fn great(&self) -> Expr {
        let quality = self.quality.set("high").unwrap();

        quality.or(self.service.set("high").unwrap()).unwrap()
    }

    fn mamdani(&self) -> MamdaniEngine {
        let mut engine = MamdaniEngine::new();

        engine.add_rule(Rule::new(self.poor(), self.tip.set("low").unwrap())).unwrap();
        engine.add_rule(Rule::new(self.average(), self.tip.set("medium").unwrap())).unwrap();
        engine.add_rule(Rule::new(self.great(), self.tip.set("high").unwrap())).unwrap();

        engine
    }

    fn tsk(&self) -> TskEngine {
        let stingy = Expr::from(&self.quality).mul(0.5).unwrap();
        let fair = Expr::from(&self.service);
        let generous = Expr::constant(2.)
            .and_then(|e| e.mul(&self.service))
            .and_then(|e| e.add(Expr::constant(3.)?.mul(&self.service)?))
            .and_then(|e| e.add(5.))
            .and_then(|e| e.div(5.))
            .unwrap();
        let mut engine = TskEngine::new();

        engine.add_rule(Rule::new(self.poor(), stingy)).unwrap();
        engine.add_rule(Rule::new(self.average(), fair)).unwrap();
        engine.add_rule(Rule::new(self.great(), generous)).unwrap();

        engine
    }
}

fn dinner() -> LinguisticVariable {
    LinguisticVariable::new([("quality", 6.5), ("service", 9.8)])
}

#[test]
fn test_mamdani_tipping() {
    let tipping = Tipping::new(Operators::default());
    let mut engine = tipping.mamdani();
    let tip = engine.infer(&dinner()).unwrap();

    assert!((tip - 20.24).abs() < 0.01, "tip was {tip}");
    assert_eq!(engine.len(), 3);
    assert_eq!(engine.crisp(), Some(tip));
}

#[test]
fn test_mamdani_is_idempotent() {
    let tipping = Tipping::new(Operators::default());
    let mut engine = tipping.mamdani();
    let first = engine.infer(&dinner()).unwrap();
    let second = engine.infer(&dinner()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_mamdani_aggregation() {
    let tipping = Tipping::new(Operators::default());
    let mut engine = tipping.mamdani();
    let tip = engine.infer(&dinner()).unwrap();
    let aggregation = engine.aggregation().unwrap();

    assert_eq!(aggregation.universe().name(), "tip");
    assert_eq!(aggregation.domain().len(), 26);
    assert_eq!(aggregation.membership().len(), 26);
    assert_eq!(aggregation.crisp(), Some(tip));
    assert!(aggregation.membership().iter().all(|mu| (0. ..=1.).contains(mu)));

    let (x, mu) = aggregation.points().last().unwrap();

    assert_eq!(x, 25.);
    assert!((mu - 0.96).abs() < 1e-9);

    for (key, _) in engine.rules() {
        assert_eq!(engine.activation(key).map(<[f64]>::len), Some(26));
    }
}

#[test]
fn test_mamdani_aggregates_with_maximum() {
    let tipping = Tipping::new(Operators::algebraic());
    let mut engine = tipping.mamdani();
    let tip = engine.infer(&dinner()).unwrap();

    assert!((tip - 20.2527).abs() < 1e-3, "tip was {tip}");

    let mut expected = vec![0.; 26];

    for (key, _) in engine.rules() {
        for (max, mu) in expected.iter_mut().zip(engine.activation(key).unwrap()) {
            *max = f64::max(*max, *mu);
        }
    }

    let aggregation = engine.aggregation().unwrap();
    let peak = aggregation.membership().iter().copied().fold(0., f64::max);

    assert_eq!(aggregation.membership(), expected.as_slice());
    assert!((peak - 0.972).abs() < 1e-9);
}

#[test]
fn test_mamdani_other_defuzzifiers() {
    let tipping = Tipping::new(Operators::default());
    let mut engine = MamdaniEngine::with_defuzzifier(Defuzzifier::LargestOfMaximum);

    engine.add_rule(Rule::new(tipping.great(), tipping.tip.set("high").unwrap())).unwrap();

    assert_eq!(engine.infer(&dinner()).unwrap(), 25.);
}

#[test]
fn test_mamdani_nothing_fires() {
    let tipping = Tipping::new(Operators::default());
    let mut engine = MamdaniEngine::new();

    engine.add_rule(Rule::new(tipping.poor(), tipping.tip.set("low").unwrap())).unwrap();

    assert!(matches!(engine.infer(&dinner()), Err(FuzzyError::Degenerate(_))));
    assert_eq!(engine.crisp(), None);
}

#[test]
fn test_missing_input() {
    let tipping = Tipping::new(Operators::default());
    let mut engine = tipping.mamdani();
    let x = LinguisticVariable::new([("quality", 6.5)]);

    assert!(matches!(engine.infer(&x), Err(FuzzyError::MissingInput(ref name)) if name == "service"));
}

#[test]
fn test_tsk_tipping() {
    let tipping = Tipping::new(Operators::algebraic());
    let mut engine = tipping.tsk();
    let tip = engine.infer(&dinner()).unwrap();

    assert!((tip - 10.7605).abs() < 1e-3, "tip was {tip}");

    let strengths: Vec<f64> = engine
        .rules()
        .map(|(key, _)| engine.activation(key).unwrap().strength)
        .collect();

    assert!(strengths[0] < 1e-9);
    assert!((strengths[1] - 0.04).abs() < 1e-9);
    assert!((strengths[2] - 0.972).abs() < 1e-9);
}

#[test]
fn test_tsk_degenerate() {
    let tipping = Tipping::new(Operators::algebraic());
    let mut engine = TskEngine::new();

    engine.add_rule(Rule::new(tipping.poor(), Expr::constant(5.).unwrap())).unwrap();

    assert!(matches!(engine.infer(&dinner()), Err(FuzzyError::Degenerate(_))));
}

#[test]
fn test_inputs_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();

    write!(file, r#"{{"quality": 6.5, "service": 9.8}}"#).unwrap();

    let x = LinguisticVariable::from_json_file(file.path()).unwrap();
    let tipping = Tipping::new(Operators::default());
    let mut engine = tipping.mamdani();

    assert_eq!(x, dinner());
    assert_eq!(engine.infer(&x).unwrap(), engine.infer(&dinner()).unwrap());
}

#[test]
fn test_inputs_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        LinguisticVariable::from_json_file(dir.path().join("inputs.json")),
        Err(FuzzyError::Io(_))
    ));
}
