use super::pair::PairOrders;

/// One entry of a FOLD `faceOrders` list: face `f` lies on side `s` of
/// face `g`, measured along `g`'s own normal (`+1` above, `-1` below).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceOrder {
    pub f: u32,
    pub g: u32,
    pub s: i8,
}

/// One alternative of a branch list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerBranch {
    /// Orders that hold when this alternative is chosen.
    pub orders: PairOrders,
    /// Independent choices left open inside this alternative.
    pub branches: Vec<Vec<LayerBranch>>,
}

impl LayerBranch {
    /// Number of complete orderings below this alternative.
    #[must_use]
    pub fn count(&self) -> u128 {
        count_lists(&self.branches)
    }
}

/// Every layer ordering of a folded mesh.
///
/// `root` holds in every ordering. Each entry of `branches` is a list of
/// mutually exclusive alternatives; a complete ordering picks one
/// alternative from every list, recursively, and unions the orders met on
/// the way. Pairs missing from a complete ordering are free.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSolution {
    pub root: PairOrders,
    pub branches: Vec<Vec<LayerBranch>>,
    /// Winding per face: `true` when the face is upright in its group.
    pub faces_winding: Vec<bool>,
}

impl LayerSolution {
    /// The result of a mesh with no overlapping faces.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of complete orderings, saturating at `u128::MAX`.
    #[must_use]
    pub fn count(&self) -> u128 {
        count_lists(&self.branches)
    }

    /// The complete ordering with the given index, or `None` past the end.
    ///
    /// Indices enumerate the choices of the first branch list fastest.
    #[must_use]
    pub fn solution(&self, index: u128) -> Option<PairOrders> {
        if index >= self.count() {
            return None;
        }
        let mut orders = self.root.clone();
        select(&self.branches, index, &mut orders);
        Some(orders)
    }

    /// Iterates every complete ordering.
    pub fn solutions(&self) -> impl Iterator<Item = PairOrders> + '_ {
        (0..self.count()).map_while(|i| self.solution(i))
    }

    /// Converts solved pairs into FOLD `faceOrders` entries.
    #[must_use]
    pub fn face_orders(&self, orders: &PairOrders) -> Vec<FaceOrder> {
        orders
            .iter()
            .map(|(pair, order)| {
                let g_upright = self.faces_winding.get(pair.b() as usize).copied().unwrap_or(true);
                let s = if g_upright { order.sign() } else { -order.sign() };
                FaceOrder {
                    f: pair.a(),
                    g: pair.b(),
                    s,
                }
            })
            .collect()
    }
}

fn count_lists(lists: &[Vec<LayerBranch>]) -> u128 {
    lists.iter().fold(1u128, |product, list| {
        let sum = list
            .iter()
            .fold(0u128, |sum, branch| sum.saturating_add(branch.count()));
        product.saturating_mul(sum)
    })
}

fn select(lists: &[Vec<LayerBranch>], mut index: u128, orders: &mut PairOrders) {
    for list in lists {
        let radix = list
            .iter()
            .fold(0u128, |sum, branch| sum.saturating_add(branch.count()));
        if radix == 0 {
            continue;
        }
        let mut digit = index % radix;
        index /= radix;
        for branch in list {
            let count = branch.count();
            if digit < count {
                let merged = orders.try_extend(&branch.orders);
                debug_assert!(merged.is_ok(), "branch contradicts its parent");
                select(&branch.branches, digit, orders);
                break;
            }
            digit -= count;
        }
    }
}
