use crate::variable::UniverseRef;

/// What a plotting front end needs after a Mamdani inference: the output domain, the
/// aggregated membership over it, and the crisp value to mark.
#[derive(Clone, Copy, Debug)]
pub struct Aggregation<'e> {
    universe: &'e UniverseRef,
    membership: &'e [f64],
    crisp: Option<f64>,
}

impl<'e> Aggregation<'e> {
    pub(crate) fn new(universe: &'e UniverseRef, membership: &'e [f64], crisp: Option<f64>) -> Self {
        Self {
            universe,
            membership,
            crisp,
        }
    }

    pub fn universe(&self) -> &'e UniverseRef {
        self.universe
    }

    pub fn domain(&self) -> &'e [f64] {
        self.universe.domain()
    }

    pub fn membership(&self) -> &'e [f64] {
        self.membership
    }

    /// `None` when the last inference was degenerate.
    pub fn crisp(&self) -> Option<f64> {
        self.crisp
    }

    /// `(x, μ(x))` pairs, ready to be drawn.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + 'e {
        self.domain().iter().copied().zip(self.membership.iter().copied())
    }
}
