use std::collections::HashSet;

use super::constraints::ConstraintKind;
use super::pair::Order;

/// What a constraint implies for one partial assignment of its pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Implication {
    /// No valid stacking agrees with the assignment.
    Contradiction,
    /// Unknown positions whose value every valid completion agrees on.
    Forced(Vec<(usize, Order)>),
}

/// Implications of one constraint kind for every partial assignment.
///
/// A partial assignment is encoded in base 3, one digit per pair position:
/// `0` unknown, `1` above, `2` below.
#[derive(Debug, Clone)]
pub struct ImplicationTable {
    width: usize,
    entries: Vec<Implication>,
}

impl ImplicationTable {
    /// Derives the table of a kind from its valid complete assignments.
    #[must_use]
    pub fn build(kind: ConstraintKind) -> Self {
        let valid = valid_assignments(kind);
        let width = kind.pair_positions().len();
        let size = 3usize.pow(u32::try_from(width).unwrap_or(u32::MAX));
        let entries = (0..size)
            .map(|code| {
                let partial = decode(code, width);
                implication(&partial, &valid)
            })
            .collect();
        Self { width, entries }
    }

    /// Number of pair positions.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Looks up the implication of a partial assignment.
    #[must_use]
    pub fn lookup(&self, partial: &[Option<Order>]) -> &Implication {
        &self.entries[encode(partial)]
    }
}

/// One table per constraint kind.
#[derive(Debug, Clone)]
pub struct ImplicationTables {
    tables: [ImplicationTable; 4],
}

impl ImplicationTables {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: ConstraintKind::ALL.map(ImplicationTable::build),
        }
    }

    #[must_use]
    pub fn get(&self, kind: ConstraintKind) -> &ImplicationTable {
        let i = match kind {
            ConstraintKind::TacoTaco => 0,
            ConstraintKind::TacoTortilla => 1,
            ConstraintKind::TortillaTortilla => 2,
            ConstraintKind::Transitivity => 3,
        };
        &self.tables[i]
    }
}

impl Default for ImplicationTables {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(partial: &[Option<Order>]) -> usize {
    partial.iter().rev().fold(0, |code, order| {
        code * 3
            + match order {
                None => 0,
                Some(Order::Above) => 1,
                Some(Order::Below) => 2,
            }
    })
}

fn decode(mut code: usize, width: usize) -> Vec<Option<Order>> {
    (0..width)
        .map(|_| {
            let digit = code % 3;
            code /= 3;
            match digit {
                1 => Some(Order::Above),
                2 => Some(Order::Below),
                _ => None,
            }
        })
        .collect()
}

fn implication(partial: &[Option<Order>], valid: &[Vec<Order>]) -> Implication {
    let mut matching = valid.iter().filter(|full| {
        partial
            .iter()
            .zip(full.iter())
            .all(|(p, f)| p.is_none_or(|p| p == *f))
    });
    let Some(first) = matching.next() else {
        return Implication::Contradiction;
    };
    let mut agreed: Vec<Option<Order>> = first.iter().copied().map(Some).collect();
    for full in matching {
        for (slot, &order) in agreed.iter_mut().zip(full) {
            if *slot != Some(order) {
                *slot = None;
            }
        }
    }
    let forced = partial
        .iter()
        .zip(agreed)
        .enumerate()
        .filter_map(|(i, (known, agreed))| match (known, agreed) {
            (None, Some(order)) => Some((i, order)),
            _ => None,
        })
        .collect();
    Implication::Forced(forced)
}

/// Every complete assignment of a kind's pairs that some physical stacking
/// of its faces produces.
fn valid_assignments(kind: ConstraintKind) -> Vec<Vec<Order>> {
    let pairs = kind.pair_positions();
    if kind == ConstraintKind::TortillaTortilla {
        return Order::BOTH.iter().map(|&o| vec![o; pairs.len()]).collect();
    }
    let mut seen = HashSet::new();
    let mut valid = Vec::new();
    for heights in permutations(kind.arity()) {
        if !is_valid_stack(kind, &heights) {
            continue;
        }
        let orders: Vec<Order> = pairs
            .iter()
            .map(|&(i, j)| {
                if heights[i] > heights[j] {
                    Order::Above
                } else {
                    Order::Below
                }
            })
            .collect();
        if seen.insert(orders.clone()) {
            valid.push(orders);
        }
    }
    valid
}

/// `heights[i]` is the level of face position `i` in the stack.
fn is_valid_stack(kind: ConstraintKind, heights: &[usize]) -> bool {
    let between = |x: usize, lo: usize, hi: usize| {
        let (lo, hi) = (heights[lo].min(heights[hi]), heights[lo].max(heights[hi]));
        heights[x] > lo && heights[x] < hi
    };
    match kind {
        ConstraintKind::TacoTaco => between(2, 0, 1) == between(3, 0, 1),
        ConstraintKind::TacoTortilla => !between(1, 0, 2),
        ConstraintKind::TortillaTortilla | ConstraintKind::Transitivity => true,
    }
}

fn permutations(n: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current: Vec<usize> = (0..n).collect();
    heap_permute(n, &mut current, &mut out);
    out
}

fn heap_permute(k: usize, items: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    if k <= 1 {
        out.push(items.clone());
        return;
    }
    for i in 0..k - 1 {
        heap_permute(k - 1, items, out);
        if k % 2 == 0 {
            items.swap(i, k - 1);
        } else {
            items.swap(0, k - 1);
        }
    }
    heap_permute(k - 1, items, out);
}
