/// `n` evenly spaced samples over `[min, max]`, both ends included, like `numpy.linspace`.
pub fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (n - 1) as f64;

            (0..n).map(|i| min + step * i as f64).collect()
        },
    }
}

/// Samples `start, start + step, ...` strictly below `stop`, like `numpy.arange`.
///
/// A non-positive or non-finite step yields an empty domain.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !(step > 0.) || !step.is_finite() || stop <= start {
        return Vec::new();
    }

    // ceil matches numpy's length rule: ceil((stop - start) / step)
    let n = ((stop - start) / step).ceil() as usize;

    (0..n).map(|i| start + step * i as f64).collect()
}

#[test]
fn test_linspace() {
    assert_eq!(linspace(0., 1., 5), vec![0., 0.25, 0.5, 0.75, 1.]);
    assert_eq!(linspace(3., 7., 1), vec![3.]);
    assert!(linspace(0., 1., 0).is_empty());
}

#[test]
fn test_arange() {
    assert_eq!(arange(0., 11., 1.), (0..11).map(f64::from).collect::<Vec<_>>());
    assert_eq!(arange(0., 1., 0.25), vec![0., 0.25, 0.5, 0.75]);
    assert!(arange(0., 1., 0.).is_empty());
    assert!(arange(1., 0., 0.5).is_empty());
}
