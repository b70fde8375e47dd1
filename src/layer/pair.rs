use std::collections::HashMap;
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use crate::error::SolveError;

/// An unordered pair of face indices, stored with the smaller index first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacePair {
    a: u32,
    b: u32,
}

impl FacePair {
    /// Creates the canonical pair of two faces.
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self::oriented(x, y).0
    }

    /// Creates the canonical pair of `(x, y)` and reports whether the two
    /// faces had to be swapped to get there.
    #[must_use]
    pub fn oriented(x: u32, y: u32) -> (Self, bool) {
        debug_assert_ne!(x, y, "a face cannot be paired with itself");
        if x <= y {
            (Self { a: x, b: y }, false)
        } else {
            (Self { a: y, b: x }, true)
        }
    }

    /// The smaller face index.
    #[must_use]
    pub fn a(self) -> u32 {
        self.a
    }

    /// The larger face index.
    #[must_use]
    pub fn b(self) -> u32 {
        self.b
    }

    /// Returns `true` if `face` is one of the two faces.
    #[must_use]
    pub fn contains(self, face: u32) -> bool {
        self.a == face || self.b == face
    }
}

impl fmt::Display for FacePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.a, self.b)
    }
}

impl FromStr for FacePair {
    type Err = SolveError;

    /// Parses the `"<min> <max>"` key form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SolveError::InvalidPairKey(s.to_owned());
        let mut parts = s.split_whitespace();
        let a = parts.next().and_then(|p| p.parse::<u32>().ok());
        let b = parts.next().and_then(|p| p.parse::<u32>().ok());
        match (a, b, parts.next()) {
            (Some(a), Some(b), None) if a != b => Ok(Self::new(a, b)),
            _ => Err(invalid()),
        }
    }
}

/// Relative order of the first face of a pair with respect to the second,
/// measured along the normal of the pair's overlap group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// The first face lies above the second (`+1`).
    Above,
    /// The first face lies below the second (`-1`).
    Below,
}

impl Order {
    /// Both values, in the order the solver tries them.
    pub const BOTH: [Order; 2] = [Order::Above, Order::Below];

    /// Returns `+1` for [`Order::Above`] and `-1` for [`Order::Below`].
    #[must_use]
    pub fn sign(self) -> i8 {
        match self {
            Self::Above => 1,
            Self::Below => -1,
        }
    }

    /// Parses a `±1` sign.
    #[must_use]
    pub fn from_sign(sign: i8) -> Option<Self> {
        match sign {
            1 => Some(Self::Above),
            -1 => Some(Self::Below),
            _ => None,
        }
    }

    /// Returns the opposite order.
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Above => Self::Below,
            Self::Below => Self::Above,
        }
    }

    /// Returns the opposite order when `flip` is `true`.
    #[must_use]
    pub fn flip_if(self, flip: bool) -> Self {
        if flip {
            self.flip()
        } else {
            self
        }
    }
}

impl Neg for Order {
    type Output = Self;

    fn neg(self) -> Self {
        self.flip()
    }
}

/// An insertion-ordered map from face pairs to their order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairOrders {
    entries: Vec<(FacePair, Order)>,
    index: HashMap<FacePair, usize>,
}

impl PairOrders {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an order.
    ///
    /// Inserting the value already stored is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the pair back if it already holds the opposite order; the
    /// stored value is left unchanged.
    pub fn try_insert(&mut self, pair: FacePair, order: Order) -> Result<(), FacePair> {
        match self.index.get(&pair) {
            Some(&i) if self.entries[i].1 == order => Ok(()),
            Some(_) => Err(pair),
            None => {
                self.index.insert(pair, self.entries.len());
                self.entries.push((pair, order));
                Ok(())
            }
        }
    }

    /// Inserts every entry of `other`, stopping at the first conflict.
    ///
    /// # Errors
    ///
    /// Returns the first pair whose order disagrees.
    pub fn try_extend(&mut self, other: &PairOrders) -> Result<(), FacePair> {
        other
            .iter()
            .try_for_each(|(pair, order)| self.try_insert(pair, order))
    }

    /// Returns the order of a pair, if solved.
    #[must_use]
    pub fn get(&self, pair: FacePair) -> Option<Order> {
        self.index.get(&pair).map(|&i| self.entries[i].1)
    }

    /// Returns the order of `x` relative to `y`, whichever index is smaller.
    #[must_use]
    pub fn get_oriented(&self, x: u32, y: u32) -> Option<Order> {
        let (pair, swapped) = FacePair::oriented(x, y);
        self.get(pair).map(|order| order.flip_if(swapped))
    }

    /// Returns `true` if the pair is solved.
    #[must_use]
    pub fn contains(&self, pair: FacePair) -> bool {
        self.index.contains_key(&pair)
    }

    /// Number of solved pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no pair is solved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FacePair, Order)> + '_ {
        self.entries.iter().copied()
    }
}

impl FromIterator<(FacePair, Order)> for PairOrders {
    /// Collects entries; a later conflicting entry is dropped.
    fn from_iter<I: IntoIterator<Item = (FacePair, Order)>>(iter: I) -> Self {
        let mut orders = Self::new();
        for (pair, order) in iter {
            let _ = orders.try_insert(pair, order);
        }
        orders
    }
}
