use fuzzy_inference::membership::{trapezoidal, triangular};
use fuzzy_inference::{linspace, Expr, LinguisticVariable, Operators, TConorm, TNorm, Universe};
use proptest::prelude::*;
use proptest::sample::select;

/// `(a, b, c)` with gaps wide enough that the slope epsilon stays invisible.
fn triangle_params() -> impl Strategy<Value = (f64, f64, f64)> {
    (-50.0..50.0f64, 0.5..20.0f64, 0.5..20.0f64).prop_map(|(a, ab, bc)| (a, a + ab, a + ab + bc))
}

fn trapezoid_params() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (triangle_params(), 0.5..20.0f64).prop_map(|((a, b, c), cd)| (a, b, c, c + cd))
}

proptest! {
    #[test]
    fn triangular_shape((a, b, c) in triangle_params(), t in 0.0..=1.0f64, s in 0.0..=1.0f64) {
        let mf = triangular(a, b, c).unwrap();

        prop_assert!(mf.degree(a) < 1e-9);
        prop_assert_eq!(mf.degree(b), 1.);
        prop_assert!(mf.degree(c) < 1e-9);
        prop_assert_eq!(mf.degree(a - 1.), 0.);
        prop_assert_eq!(mf.degree(c + 1.), 0.);

        let (lo, hi) = if t <= s { (t, s) } else { (s, t) };
        let rising = (f64::min(a + lo * (b - a), b), f64::min(a + hi * (b - a), b));
        let falling = (f64::min(b + lo * (c - b), c), f64::min(b + hi * (c - b), c));

        prop_assert!(mf.degree(rising.0) <= mf.degree(rising.1));
        prop_assert!(mf.degree(falling.0) >= mf.degree(falling.1));
        prop_assert!((0. ..=1.).contains(&mf.degree(rising.0)));
    }

    #[test]
    fn trapezoidal_shape((a, b, c, d) in trapezoid_params(), t in 0.0..=1.0f64) {
        let mf = trapezoidal(a, b, c, d).unwrap();

        prop_assert!(mf.degree(a) < 1e-9);
        prop_assert!(mf.degree(d) < 1e-9);
        prop_assert_eq!(mf.degree(a - 1.), 0.);
        prop_assert_eq!(mf.degree(d + 1.), 0.);
        prop_assert_eq!(mf.degree(b), 1.);
        prop_assert_eq!(mf.degree(c), 1.);
        prop_assert_eq!(mf.degree(f64::min(b + t * (c - b), c)), 1.);
        prop_assert!(mf.degree(a + t * (b - a)) <= 1.);
    }

    #[test]
    fn tnorm_laws(tnorm in select(TNorm::ALL.to_vec()), a in 0.0..=1.0f64, b in 0.0..=1.0f64) {
        prop_assert!((tnorm.call(a, 1.) - a).abs() < 1e-12);
        prop_assert_eq!(tnorm.call(a, b), tnorm.call(b, a));
        prop_assert!(tnorm.call(a, b) <= f64::min(a, b) + 1e-12);
    }

    #[test]
    fn tconorm_laws(tconorm in select(TConorm::ALL.to_vec()), a in 0.0..=1.0f64, b in 0.0..=1.0f64) {
        prop_assert!((tconorm.call(a, 0.) - a).abs() < 1e-12);
        prop_assert_eq!(tconorm.call(a, b), tconorm.call(b, a));
        prop_assert!(tconorm.call(a, b) >= f64::max(a, b) - 1e-12);
    }

    #[test]
    fn same_universe_connectives_are_pointwise(
        tnorm in select(TNorm::ALL.to_vec()),
        tconorm in select(TConorm::ALL.to_vec()),
        (a1, b1, c1) in triangle_params(),
        (a2, b2, c2) in triangle_params(),
        x in -60.0..90.0f64,
    ) {
        let operators = Operators::new(tnorm, tconorm);
        let mut universe = Universe::with_operators("x", linspace(-60., 90., 151), operators).unwrap();
        let first = universe.register("first", triangular(a1, b1, c1).unwrap()).unwrap();
        let second = universe.register("second", triangular(a2, b2, c2).unwrap()).unwrap();
        let input = LinguisticVariable::new([("x", x)]);

        let both = first.and(&second).unwrap();
        let either = first.or(&second).unwrap();

        prop_assert!(matches!(both, Expr::Set(_)));
        prop_assert!(matches!(either, Expr::Set(_)));

        let (u, v) = (first.degree(x), second.degree(x));

        prop_assert_eq!(both.eval(&input).unwrap().as_scalar().unwrap(), tnorm.call(u, v));
        prop_assert_eq!(either.eval(&input).unwrap().as_scalar().unwrap(), tconorm.call(u, v));
    }
}

#[test]
fn minimum_and_maximum_identities() {
    for a in linspace(0., 1., 101) {
        assert_eq!(TNorm::Minimum.call(a, 1.), a);
        assert_eq!(TConorm::Maximum.call(a, 0.), a);
    }
}
