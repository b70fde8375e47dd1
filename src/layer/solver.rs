use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, trace};

use crate::error::{Result, SolveError};

use super::constraints::ConstraintSet;
use super::pair::{FacePair, Order, PairOrders};
use super::solution::LayerBranch;
use super::table::{Implication, ImplicationTables};

/// Order of every variable; `None` while unknown.
type State = Vec<Option<Order>>;

/// Root orders and branch lists found by [`Solver::solve`].
#[derive(Debug, Clone)]
pub struct SolvedTree {
    pub root: PairOrders,
    pub branches: Vec<Vec<LayerBranch>>,
}

/// One explored alternative: the orders it adds and the branch lists
/// (arena indices) opened below it.
#[derive(Debug, Default)]
struct Node {
    orders: Vec<(FacePair, Order)>,
    lists: Vec<Vec<usize>>,
}

/// A node waiting to be split, with its propagated state and the unknown
/// variables it is responsible for.
struct Frame {
    node: usize,
    state: State,
    scope: Vec<usize>,
}

/// Propagates constraints over face-pair variables and enumerates the
/// remaining choices as a branch tree.
pub struct Solver<'a> {
    constraints: &'a ConstraintSet,
    tables: ImplicationTables,
    pairs: Vec<FacePair>,
    initial: State,
    /// Per constraint: variable and flip of each oriented pair.
    slots: Vec<Vec<(usize, bool)>>,
    /// Per variable: constraints mentioning it.
    var_constraints: Vec<Vec<usize>>,
    max_nodes: usize,
}

impl<'a> Solver<'a> {
    /// Sets up the variables: `pairs` first, in order, then any pair that
    /// only the initial orders or the constraints mention.
    #[must_use]
    pub fn new(
        constraints: &'a ConstraintSet,
        pairs: &[FacePair],
        initial: &PairOrders,
        max_nodes: usize,
    ) -> Self {
        let mut index: HashMap<FacePair, usize> = HashMap::new();
        let mut vars: Vec<FacePair> = Vec::new();
        let mut var_of = |pair: FacePair| {
            *index.entry(pair).or_insert_with(|| {
                vars.push(pair);
                vars.len() - 1
            })
        };

        for &pair in pairs {
            var_of(pair);
        }
        let initial_vars: Vec<(usize, Order)> =
            initial.iter().map(|(pair, order)| (var_of(pair), order)).collect();
        let slots: Vec<Vec<(usize, bool)>> = constraints
            .constraints()
            .iter()
            .map(|constraint| {
                constraint
                    .oriented_pairs()
                    .into_iter()
                    .map(|(x, y)| {
                        let (pair, swapped) = FacePair::oriented(x, y);
                        (var_of(pair), swapped)
                    })
                    .collect()
            })
            .collect();

        let var_constraints: Vec<Vec<usize>> = vars
            .iter()
            .map(|&pair| constraints.constraints_for(pair).to_vec())
            .collect();
        let mut state = vec![None; vars.len()];
        for (var, order) in initial_vars {
            state[var] = Some(order);
        }

        Self {
            constraints,
            tables: ImplicationTables::new(),
            pairs: vars,
            initial: state,
            slots,
            var_constraints,
            max_nodes,
        }
    }

    /// Runs the root propagation, then explores every independent choice.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::NoSolution`] if the root propagation
    /// contradicts itself or every alternative of some choice fails, and
    /// [`SolveError::BranchLimitExceeded`] if exploration needs more nodes
    /// than allowed.
    pub fn solve(&self) -> Result<SolvedTree> {
        let mut state = self.initial.clone();
        let mut forced = Vec::new();
        self.propagate(&mut state, 0..self.slots.len(), &mut forced)
            .map_err(|var| SolveError::NoSolution {
                pair: Some(self.pairs[var]),
            })?;

        let root_orders: PairOrders = self
            .pairs
            .iter()
            .zip(&state)
            .filter_map(|(&pair, order)| order.map(|o| (pair, o)))
            .collect();
        debug!(
            variables = self.pairs.len(),
            initial = self.initial.iter().flatten().count(),
            root = root_orders.len(),
            "root propagation"
        );

        let scope: Vec<usize> = (0..self.pairs.len())
            .filter(|&v| state[v].is_none() && !self.var_constraints[v].is_empty())
            .collect();
        let arena = self.explore(state, scope)?;
        let valid = arena_validity(&arena);
        if !valid[0] {
            return Err(SolveError::NoSolution { pair: None }.into());
        }
        debug!(
            nodes = arena.len(),
            valid = valid.iter().filter(|&&v| v).count(),
            "branch exploration"
        );

        let top = build_branches(arena, &valid);
        let mut root = root_orders;
        if let Err(pair) = root.try_extend(&top.orders) {
            return Err(SolveError::NoSolution { pair: Some(pair) }.into());
        }
        Ok(SolvedTree {
            root,
            branches: top.branches,
        })
    }

    /// Depth-first exploration with an explicit stack. Node `0` is the root;
    /// children always get larger indices than their parent.
    fn explore(&self, state: State, scope: Vec<usize>) -> Result<Vec<Node>> {
        let mut arena = vec![Node::default()];
        let mut stack = Vec::new();
        if !scope.is_empty() {
            stack.push(Frame {
                node: 0,
                state,
                scope,
            });
        }

        while let Some(frame) = stack.pop() {
            for component in self.components(&frame.state, &frame.scope) {
                let guess = component[0];
                let mut list = Vec::with_capacity(2);
                for order in Order::BOTH {
                    let mut state = frame.state.clone();
                    state[guess] = Some(order);
                    let mut assigned = vec![guess];
                    let seeds = self.var_constraints[guess].iter().copied();
                    if self.propagate(&mut state, seeds, &mut assigned).is_err() {
                        trace!(pair = %self.pairs[guess], order = order.sign(), "branch pruned");
                        continue;
                    }
                    if arena.len() >= self.max_nodes {
                        return Err(SolveError::BranchLimitExceeded {
                            limit: self.max_nodes,
                        }
                        .into());
                    }

                    let id = arena.len();
                    arena.push(Node {
                        orders: assigned
                            .iter()
                            .filter_map(|&v| state[v].map(|o| (self.pairs[v], o)))
                            .collect(),
                        lists: Vec::new(),
                    });
                    list.push(id);

                    let scope: Vec<usize> = component
                        .iter()
                        .copied()
                        .filter(|&v| state[v].is_none())
                        .collect();
                    if !scope.is_empty() {
                        stack.push(Frame {
                            node: id,
                            state,
                            scope,
                        });
                    }
                }
                arena[frame.node].lists.push(list);
            }
        }
        Ok(arena)
    }

    /// Splits the unknown variables of `scope` into groups that share no
    /// constraint. Groups come out ordered by their first variable.
    fn components(&self, state: &State, scope: &[usize]) -> Vec<Vec<usize>> {
        let position: HashMap<usize, usize> =
            scope.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        let mut parent: Vec<usize> = (0..scope.len()).collect();

        for (i, &var) in scope.iter().enumerate() {
            for &c in &self.var_constraints[var] {
                for &(other, _) in &self.slots[c] {
                    if state[other].is_some() {
                        continue;
                    }
                    if let Some(&j) = position.get(&other) {
                        let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                        if ri != rj {
                            parent[ri.max(rj)] = ri.min(rj);
                        }
                    }
                }
            }
        }

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut group_of: HashMap<usize, usize> = HashMap::new();
        for (i, &var) in scope.iter().enumerate() {
            let root = find(&mut parent, i);
            let g = *group_of.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[g].push(var);
        }
        groups
    }

    /// Applies the implication tables until nothing changes.
    ///
    /// Newly fixed variables are appended to `assigned`. On contradiction
    /// the variable at fault is returned.
    fn propagate(
        &self,
        state: &mut State,
        seeds: impl IntoIterator<Item = usize>,
        assigned: &mut Vec<usize>,
    ) -> std::result::Result<(), usize> {
        let mut queue: VecDeque<usize> = VecDeque::new();
        let mut queued: HashSet<usize> = HashSet::new();
        for c in seeds {
            if queued.insert(c) {
                queue.push_back(c);
            }
        }

        let mut partial = Vec::with_capacity(6);
        while let Some(c) = queue.pop_front() {
            queued.remove(&c);
            let slots = &self.slots[c];
            partial.clear();
            partial.extend(
                slots
                    .iter()
                    .map(|&(var, flipped)| state[var].map(|o| o.flip_if(flipped))),
            );
            let kind = self.constraints.constraints()[c].kind();
            let forced = match self.tables.get(kind).lookup(&partial) {
                Implication::Contradiction => return Err(slots[0].0),
                Implication::Forced(forced) => forced,
            };
            for &(position, order) in forced {
                let (var, flipped) = slots[position];
                let value = order.flip_if(flipped);
                match state[var] {
                    Some(existing) if existing == value => continue,
                    Some(_) => return Err(var),
                    None => {}
                }
                state[var] = Some(value);
                assigned.push(var);
                trace!(pair = %self.pairs[var], order = value.sign(), "forced");
                for &next in &self.var_constraints[var] {
                    if queued.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Union-find root with path halving.
fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// A node is valid when every one of its lists keeps at least one valid
/// alternative.
fn arena_validity(arena: &[Node]) -> Vec<bool> {
    let mut valid = vec![false; arena.len()];
    for id in (0..arena.len()).rev() {
        valid[id] = arena[id]
            .lists
            .iter()
            .all(|list| list.iter().any(|&child| valid[child]));
    }
    valid
}

/// Turns the arena into nested branches, bottom-up, dropping invalid
/// alternatives. A list left with a single alternative is not a choice, so
/// its orders and lists are merged into the parent.
fn build_branches(arena: Vec<Node>, valid: &[bool]) -> LayerBranch {
    let mut built: Vec<Option<LayerBranch>> = (0..arena.len()).map(|_| None).collect();
    for (id, node) in arena.into_iter().enumerate().rev() {
        if !valid[id] {
            continue;
        }
        let mut branch = LayerBranch {
            orders: node.orders.into_iter().collect(),
            branches: Vec::new(),
        };
        for list in node.lists {
            let mut alternatives: Vec<LayerBranch> = list
                .into_iter()
                .filter(|&child| valid[child])
                .filter_map(|child| built[child].take())
                .collect();
            if alternatives.len() == 1 {
                if let Some(only) = alternatives.pop() {
                    let merged = branch.orders.try_extend(&only.orders);
                    debug_assert!(merged.is_ok(), "forced orders disagree");
                    branch.branches.extend(only.branches);
                }
            } else {
                branch.branches.push(alternatives);
            }
        }
        built[id] = Some(branch);
    }
    built
        .into_iter()
        .next()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::LayerError;
    use crate::layer::constraints::Constraint;
    use crate::layer::solution::LayerSolution;

    fn set(constraints: &[Constraint]) -> ConstraintSet {
        let mut set = ConstraintSet::new();
        for &c in constraints {
            set.push(c);
        }
        set
    }

    fn pairs(list: &[(u32, u32)]) -> Vec<FacePair> {
        list.iter().map(|&(a, b)| FacePair::new(a, b)).collect()
    }

    fn solve(
        constraints: &[Constraint],
        vars: &[(u32, u32)],
        initial: &[(u32, u32, Order)],
    ) -> Result<LayerSolution> {
        let set = set(constraints);
        let initial: PairOrders = initial
            .iter()
            .map(|&(a, b, o)| (FacePair::new(a, b), o))
            .collect();
        let tree = Solver::new(&set, &pairs(vars), &initial, 10_000).solve()?;
        Ok(LayerSolution {
            root: tree.root,
            branches: tree.branches,
            faces_winding: Vec::new(),
        })
    }

    #[test]
    fn tortilla_tortilla_copies_into_root() {
        let solution = solve(
            &[Constraint::TortillaTortilla([0, 1, 2, 3])],
            &[(0, 2), (1, 3)],
            &[(0, 2, Order::Below)],
        )
        .unwrap();
        assert_eq!(solution.root.get(FacePair::new(1, 3)), Some(Order::Below));
        assert!(solution.branches.is_empty());
    }

    #[test]
    fn root_conflict_names_a_pair() {
        let err = solve(
            &[Constraint::TortillaTortilla([0, 1, 2, 3])],
            &[(0, 2), (1, 3)],
            &[(0, 2, Order::Above), (1, 3, Order::Below)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LayerError::Solve(SolveError::NoSolution { pair: Some(_) })
        ));
    }

    #[test]
    fn free_transitivity_enumerates_all_stackings() {
        let solution = solve(
            &[Constraint::Transitivity([0, 1, 2])],
            &[(0, 1), (0, 2), (1, 2)],
            &[],
        )
        .unwrap();
        assert!(solution.root.is_empty());
        assert_eq!(solution.count(), 6);
    }

    #[test]
    fn independent_choices_are_separate_lists() {
        let solution = solve(
            &[
                Constraint::TortillaTortilla([0, 1, 2, 3]),
                Constraint::TortillaTortilla([4, 5, 6, 7]),
            ],
            &[(0, 2), (1, 3), (4, 6), (5, 7)],
            &[],
        )
        .unwrap();
        assert_eq!(solution.branches.len(), 2);
        assert!(solution.branches.iter().all(|list| list.len() == 2));
        assert_eq!(solution.count(), 4);
        let first = &solution.branches[0][0].orders;
        assert_eq!(first.get(FacePair::new(0, 2)), Some(Order::Above));
        assert_eq!(first.get(FacePair::new(1, 3)), Some(Order::Above));
    }

    #[test]
    fn unconstrained_pairs_stay_unknown() {
        let solution = solve(&[], &[(0, 1)], &[]).unwrap();
        assert!(solution.root.is_empty());
        assert!(solution.branches.is_empty());
    }

    #[test]
    fn every_alternative_failing_has_no_solution() {
        // (0, 2) equals (1, 3) and its opposite at once.
        let err = solve(
            &[
                Constraint::TortillaTortilla([0, 1, 2, 3]),
                Constraint::TortillaTortilla([0, 3, 2, 1]),
            ],
            &[(0, 2), (1, 3)],
            &[],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LayerError::Solve(SolveError::NoSolution { pair: None })
        ));
    }

    #[test]
    fn variables_use_the_set_lookup() {
        let set = set(&[
            Constraint::TacoTortilla([0, 2, 1]),
            Constraint::Transitivity([0, 1, 2]),
            Constraint::TortillaTortilla([1, 0, 3, 2]),
        ]);
        let solver = Solver::new(&set, &pairs(&[(0, 1), (1, 2)]), &PairOrders::new(), 100);
        assert_eq!(solver.pairs[..2], pairs(&[(0, 1), (1, 2)])[..]);
        for (var, &pair) in solver.pairs.iter().enumerate() {
            assert_eq!(solver.var_constraints[var], set.constraints_for(pair));
        }
        assert_eq!(solver.var_constraints[0], vec![0, 1]);
    }

    #[test]
    fn node_limit_is_enforced() {
        let constraints: Vec<Constraint> = (0..8)
            .map(|k| Constraint::TortillaTortilla([4 * k, 4 * k + 1, 4 * k + 2, 4 * k + 3]))
            .collect();
        let set = set(&constraints);
        let solver = Solver::new(&set, &[], &PairOrders::new(), 4);
        let err = solver.solve().unwrap_err();
        assert!(matches!(
            err,
            LayerError::Solve(SolveError::BranchLimitExceeded { limit: 4 })
        ));
    }

    #[test]
    fn lone_survivor_is_merged_into_parent() {
        let leaf = |pair: (u32, u32), order| Node {
            orders: vec![(FacePair::new(pair.0, pair.1), order)],
            lists: Vec::new(),
        };
        let arena = vec![
            Node {
                orders: Vec::new(),
                lists: vec![vec![1, 2], vec![3, 4]],
            },
            // Dead: its only list has no alternative left.
            Node {
                orders: vec![(FacePair::new(0, 1), Order::Above)],
                lists: vec![vec![]],
            },
            leaf((0, 1), Order::Below),
            leaf((2, 3), Order::Above),
            leaf((2, 3), Order::Below),
        ];
        let valid = arena_validity(&arena);
        assert_eq!(valid, vec![true, false, true, true, true]);
        let top = build_branches(arena, &valid);
        assert_eq!(top.orders.get(FacePair::new(0, 1)), Some(Order::Below));
        assert_eq!(top.branches.len(), 1);
        assert_eq!(top.branches[0].len(), 2);
    }
}
