use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::pair::FacePair;
use super::patterns::GroupPatterns;

/// The four kinds of layer constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    TacoTaco,
    TacoTortilla,
    TortillaTortilla,
    Transitivity,
}

impl ConstraintKind {
    /// Every kind, in assembly order.
    pub const ALL: [ConstraintKind; 4] = [
        ConstraintKind::TacoTaco,
        ConstraintKind::TacoTortilla,
        ConstraintKind::TortillaTortilla,
        ConstraintKind::Transitivity,
    ];

    /// Number of faces in the arrangement.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::TacoTaco | Self::TortillaTortilla => 4,
            Self::TacoTortilla | Self::Transitivity => 3,
        }
    }

    /// Face positions of the oriented pairs the constraint talks about.
    #[must_use]
    pub fn pair_positions(self) -> &'static [(usize, usize)] {
        match self {
            Self::TacoTaco => &[(0, 1), (2, 3), (0, 2), (0, 3), (1, 2), (1, 3)],
            Self::TacoTortilla => &[(0, 2), (0, 1), (1, 2)],
            Self::TortillaTortilla => &[(0, 2), (1, 3)],
            Self::Transitivity => &[(0, 1), (1, 2), (2, 0)],
        }
    }
}

/// A relation among the orders of a few face pairs.
///
/// - `TacoTaco([a, b, c, d])`: tacos `(a, b)` and `(c, d)` share a crease
///   line and open to the same side; they may nest or stack but never
///   interleave.
/// - `TacoTortilla([a, t, b])`: `t` passes the crease of taco `(a, b)`, so
///   it can not lie between `a` and `b`.
/// - `TortillaTortilla([a, b, c, d])`: the order of `(a, c)` equals the
///   order of `(b, d)`.
/// - `Transitivity([a, b, c])`: the three faces share an area, so their
///   orders can not form a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    TacoTaco([u32; 4]),
    TacoTortilla([u32; 3]),
    TortillaTortilla([u32; 4]),
    Transitivity([u32; 3]),
}

impl Constraint {
    /// Kind of the constraint.
    #[must_use]
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::TacoTaco(_) => ConstraintKind::TacoTaco,
            Self::TacoTortilla(_) => ConstraintKind::TacoTortilla,
            Self::TortillaTortilla(_) => ConstraintKind::TortillaTortilla,
            Self::Transitivity(_) => ConstraintKind::Transitivity,
        }
    }

    /// Face arrangement.
    #[must_use]
    pub fn faces(&self) -> &[u32] {
        match self {
            Self::TacoTaco(f) | Self::TortillaTortilla(f) => f,
            Self::TacoTortilla(f) | Self::Transitivity(f) => f,
        }
    }

    /// Returns the arrangement with the same meaning that sorts first, so
    /// that equal constraints found twice compare equal.
    #[must_use]
    pub fn canonical(self) -> Self {
        match self {
            Self::TacoTaco([a, b, c, d]) => {
                let first = [a.min(b), a.max(b)];
                let second = [c.min(d), c.max(d)];
                let (first, second) = if first <= second {
                    (first, second)
                } else {
                    (second, first)
                };
                Self::TacoTaco([first[0], first[1], second[0], second[1]])
            }
            Self::TacoTortilla([a, t, b]) => Self::TacoTortilla([a.min(b), t, a.max(b)]),
            Self::TortillaTortilla([a, b, c, d]) => {
                let best = [[a, b, c, d], [c, d, a, b], [b, a, d, c], [d, c, b, a]]
                    .into_iter()
                    .min()
                    .unwrap_or([a, b, c, d]);
                Self::TortillaTortilla(best)
            }
            Self::Transitivity(mut f) => {
                f.sort_unstable();
                Self::Transitivity(f)
            }
        }
    }

    /// Oriented face pairs, in the kind's pair order.
    #[must_use]
    pub fn oriented_pairs(&self) -> Vec<(u32, u32)> {
        let faces = self.faces();
        self.kind()
            .pair_positions()
            .iter()
            .map(|&(i, j)| (faces[i], faces[j]))
            .collect()
    }

    /// Returns `true` if two of its pairs refer to the same faces, which
    /// makes the relation meaningless.
    fn is_degenerate(&self) -> bool {
        let pairs = self.oriented_pairs();
        pairs.iter().any(|&(x, y)| x == y)
            || pairs.iter().enumerate().any(|(i, &(x, y))| {
                pairs[i + 1..]
                    .iter()
                    .any(|&(u, v)| FacePair::new(x, y) == FacePair::new(u, v))
            })
    }
}

/// Every constraint of a solve, deduplicated, with a pair → constraint index.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
    seen: HashSet<Constraint>,
    lookup: HashMap<FacePair, Vec<usize>>,
}

impl ConstraintSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges the constraints of every group, then the tortilla-tortilla
    /// constraints of bent edges.
    #[must_use]
    pub fn assemble(
        groups: &[(GroupPatterns, Vec<[u32; 3]>)],
        bend_tortilla_tortilla: &[[u32; 4]],
    ) -> Self {
        let mut set = Self::new();
        for (patterns, trios) in groups {
            set.extend_group(patterns, trios);
        }
        for &faces in bend_tortilla_tortilla {
            set.push(Constraint::TortillaTortilla(faces));
        }
        debug!(
            total = set.len(),
            taco_taco = set.count(ConstraintKind::TacoTaco),
            taco_tortilla = set.count(ConstraintKind::TacoTortilla),
            tortilla_tortilla = set.count(ConstraintKind::TortillaTortilla),
            transitivity = set.count(ConstraintKind::Transitivity),
            "constraints assembled"
        );
        set
    }

    /// Adds the patterns and transitivity trios of one group, kind by kind.
    pub fn extend_group(&mut self, patterns: &GroupPatterns, trios: &[[u32; 3]]) {
        for &faces in &patterns.taco_taco {
            self.push(Constraint::TacoTaco(faces));
        }
        for &faces in &patterns.taco_tortilla {
            self.push(Constraint::TacoTortilla(faces));
        }
        for &faces in &patterns.tortilla_tortilla {
            self.push(Constraint::TortillaTortilla(faces));
        }
        for &faces in trios {
            self.push(Constraint::Transitivity(faces));
        }
    }

    /// Adds a constraint in canonical form. Returns `false` for a duplicate
    /// or a degenerate arrangement.
    pub fn push(&mut self, constraint: Constraint) -> bool {
        let constraint = constraint.canonical();
        if constraint.is_degenerate() {
            warn!(?constraint, "skipping degenerate constraint");
            return false;
        }
        if !self.seen.insert(constraint) {
            return false;
        }
        let index = self.constraints.len();
        for (x, y) in constraint.oriented_pairs() {
            self.lookup.entry(FacePair::new(x, y)).or_default().push(index);
        }
        self.constraints.push(constraint);
        true
    }

    /// All constraints in insertion order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Indices of the constraints mentioning a pair.
    #[must_use]
    pub fn constraints_for(&self, pair: FacePair) -> &[usize] {
        self.lookup.get(&pair).map_or(&[], Vec::as_slice)
    }

    /// Number of constraints of one kind.
    #[must_use]
    pub fn count(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind() == kind).count()
    }

    /// Number of constraints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns `true` if there are no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}
