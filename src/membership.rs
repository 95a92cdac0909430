//! Membership function constructors.
//!
//! Every constructor returns a [`MembershipFn`], a pure function from a crisp value to a degree
//! of truth. Shapes built here are clipped to `[0, 1]`.

use std::fmt;
use std::sync::Arc;

use num::Float;

use crate::error::{FuzzyError, Result};
use crate::math::interp;
use crate::value::Value;

/// Added to numerator and denominator of every slope so that vertical edges
/// become steps instead of divisions by zero.
const EPSILON: f64 = 1e-10;

#[derive(Clone)]
pub struct MembershipFn(Arc<dyn Fn(f64) -> f64 + Send + Sync>);

impl MembershipFn {
    pub fn new(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn degree(&self, x: f64) -> f64 {
        (self.0)(x)
    }

    /// Vectorized evaluation; the result has the shape of `x`.
    pub fn eval(&self, x: &Value) -> Value {
        x.map(|x| self.degree(x))
    }

    pub fn sample(&self, domain: &[f64]) -> Vec<f64> {
        domain.iter().map(|x| self.degree(*x)).collect()
    }

    /// `1 - μ(x)`, clipped.
    pub fn complement(&self) -> Self {
        let inner = self.clone();

        Self::new(move |x| clip(1. - inner.degree(x)))
    }
}

impl fmt::Debug for MembershipFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MembershipFn")
    }
}

#[inline]
fn clip<F: Float>(x: F) -> F {
    x.max(F::zero()).min(F::one())
}

#[inline]
fn rising<F: Float>(x: F, a: F, b: F, eps: F) -> F {
    (x - a + eps) / (b - a + eps)
}

#[inline]
fn falling<F: Float>(x: F, c: F, d: F, eps: F) -> F {
    (d - x + eps) / (d - c + eps)
}

fn check_params(params: &[f64]) -> Result<()> {
    if params.iter().any(|p| !p.is_finite()) {
        return Err(FuzzyError::Parameters(format!("{params:?} must be finite")));
    }
    if params.windows(2).any(|w| w[0] > w[1]) {
        return Err(FuzzyError::Parameters(format!("{params:?} must be non-decreasing")));
    }

    Ok(())
}

fn triangle<F: Float>(x: F, a: F, b: F, c: F, eps: F) -> F {
    clip(F::min(rising(x, a, b, eps), falling(x, b, c, eps)))
}

fn trapezoid<F: Float>(x: F, a: F, b: F, c: F, d: F, eps: F) -> F {
    clip(F::min(F::min(rising(x, a, b, eps), F::one()), falling(x, c, d, eps)))
}

/// Triangle rising from `a` to a peak at `b` and falling back to zero at `c`.
pub fn triangular(a: f64, b: f64, c: f64) -> Result<MembershipFn> {
    check_params(&[a, b, c])?;

    Ok(MembershipFn::new(move |x| triangle(x, a, b, c, EPSILON)))
}

/// Everywhere except the triangle `(a, b, c)`.
pub fn triangular_inverse(a: f64, b: f64, c: f64) -> Result<MembershipFn> {
    Ok(triangular(a, b, c)?.complement())
}

/// Rises over `[a, b]`, holds at one over `[b, c]`, falls over `[c, d]`.
pub fn trapezoidal(a: f64, b: f64, c: f64, d: f64) -> Result<MembershipFn> {
    check_params(&[a, b, c, d])?;

    Ok(MembershipFn::new(move |x| trapezoid(x, a, b, c, d, EPSILON)))
}

pub fn trapezoidal_inverse(a: f64, b: f64, c: f64, d: f64) -> Result<MembershipFn> {
    Ok(trapezoidal(a, b, c, d)?.complement())
}

/// Linear interpolation through `(x, degree)` points, constant beyond the first and last point.
pub fn piecewise(points: &[(f64, f64)]) -> Result<MembershipFn> {
    if points.is_empty() {
        return Err(FuzzyError::Parameters("piecewise membership needs at least one point".into()));
    }

    let xs: Vec<f64> = points.iter().map(|(x, _)| *x).collect();

    check_params(&xs)?;

    if points.iter().any(|(_, y)| !(0. ..=1.).contains(y)) {
        return Err(FuzzyError::Parameters(format!("{points:?} degrees must lie in [0, 1]")));
    }

    let points = points.to_vec();

    Ok(MembershipFn::new(move |x| interp(x, &points)))
}

#[cfg(test)]
fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_triangular() {
    let mf = triangular(0., 5., 10.).unwrap();

    assert!(close(mf.degree(0.), 0.));
    assert!(close(mf.degree(2.5), 0.5));
    assert!(close(mf.degree(5.), 1.));
    assert!(close(mf.degree(7.5), 0.5));
    assert!(close(mf.degree(10.), 0.));
    assert_eq!(mf.degree(-3.), 0.);
    assert_eq!(mf.degree(13.), 0.);
}

#[test]
fn test_triangular_degenerate_edges() {
    let left = triangular(0., 0., 5.).unwrap();
    let right = triangular(5., 10., 10.).unwrap();
    let spike = triangular(3., 3., 3.).unwrap();

    assert_eq!(left.degree(0.), 1.);
    assert!(close(left.degree(2.5), 0.5));
    assert_eq!(right.degree(10.), 1.);
    assert_eq!(spike.degree(3.), 1.);
    assert_eq!(spike.degree(2.), 0.);
    assert_eq!(spike.degree(4.), 0.);
}

#[test]
fn test_trapezoidal() {
    let mf = trapezoidal(0., 2., 4., 8.).unwrap();

    assert!(close(mf.degree(0.), 0.));
    assert!(close(mf.degree(1.), 0.5));
    assert_eq!(mf.degree(2.), 1.);
    assert_eq!(mf.degree(3.), 1.);
    assert_eq!(mf.degree(4.), 1.);
    assert!(close(mf.degree(6.), 0.5));
    assert!(close(mf.degree(8.), 0.));
    assert_eq!(mf.degree(9.), 0.);
}

#[test]
fn test_inverse_shapes() {
    let tri = triangular_inverse(0., 5., 10.).unwrap();
    let trap = trapezoidal_inverse(0., 2., 4., 8.).unwrap();

    assert!(close(tri.degree(5.), 0.));
    assert!(close(tri.degree(2.5), 0.5));
    assert_eq!(tri.degree(-1.), 1.);
    assert_eq!(trap.degree(3.), 0.);
    assert_eq!(trap.degree(20.), 1.);
}

#[test]
fn test_vectorized_eval() {
    let mf = triangular(0., 5., 10.).unwrap();

    match mf.eval(&Value::Array(vec![-1., 5., 11.])) {
        Value::Array(degrees) => assert_eq!(degrees, vec![0., 1., 0.]),
        Value::Scalar(_) => panic!("expected an array"),
    }
    assert_eq!(mf.eval(&Value::Scalar(5.)), Value::Scalar(1.));
}

#[test]
fn test_piecewise() {
    let mf = piecewise(&[(175., 0.), (180., 0.2), (185., 0.7), (190., 1.)]).unwrap();

    assert_eq!(mf.degree(150.), 0.);
    assert!(close(mf.degree(182.5), 0.45));
    assert_eq!(mf.degree(200.), 1.);
    assert!(piecewise(&[]).is_err());
    assert!(piecewise(&[(1., 0.), (0., 1.)]).is_err());
    assert!(piecewise(&[(0., 1.5)]).is_err());
}

#[test]
fn test_invalid_parameters() {
    assert!(matches!(triangular(5., 0., 10.), Err(FuzzyError::Parameters(_))));
    assert!(matches!(trapezoidal(0., 1., 3., 2.), Err(FuzzyError::Parameters(_))));
    assert!(triangular(0., f64::NAN, 1.).is_err());
}
