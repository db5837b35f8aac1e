//! Exhaustive Combo Solver
//!
//! Branch-and-recurse search over which combos to apply and how many times.
//!
//! At each level every still-available candidate is tried, in catalog order,
//! at each feasible application count from the highest down to one. The chosen
//! candidate is removed before recursing, so a combo appears at most once in a
//! solution. A branch only replaces the current best when it is strictly
//! better, which makes the reported solution deterministic when several
//! assignments tie: earliest catalog position wins, then the higher count.
//!
//! The search is exponential in the number of distinct candidate combos.
//! Catalogs are expected to hold tens of combos, not thousands.

use rusty_money::Money;
use smallvec::SmallVec;
use tracing::{debug, info_span, trace};

use crate::{
    basket::Basket,
    combos::{ComboDefinition, ComboKey, catalog::ComboCatalog},
    quantities::{QuantityMap, RequiredQuantities},
    solvers::{
        AppliedCombo, ComboResolution, Solver, SolverError,
        observer::{NoopObserver, SearchObserver},
    },
};

type CandidatePool = SmallVec<[usize; 16]>;

/// Exhaustive combo solver
#[derive(Debug, Default, Clone, Copy)]
pub struct ExhaustiveSolver;

/// A combo that the basket can satisfy at least once.
#[derive(Debug)]
struct Candidate<'c, 'a> {
    key: ComboKey,
    combo: &'c ComboDefinition<'a>,
    required: RequiredQuantities,
}

/// Best result found below one search node.
#[derive(Debug)]
struct Branch {
    discount_minor: i64,
    applied: SmallVec<[(usize, u32); 4]>,
    remaining: QuantityMap,
}

impl Branch {
    fn nothing_applied(quantities: &QuantityMap) -> Self {
        Self {
            discount_minor: 0,
            applied: SmallVec::new(),
            remaining: quantities.clone(),
        }
    }
}

impl ExhaustiveSolver {
    /// Resolve combos while reporting search progress to `observer`.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the catalog and basket currencies differ,
    /// quantities overflow, or a discount sum overflows.
    pub fn solve_with_observer<'a, O: SearchObserver>(
        catalog: &ComboCatalog<'a>,
        basket: &Basket<'a>,
        observer: &mut O,
    ) -> Result<ComboResolution<'a>, SolverError> {
        let span = info_span!("combo_search", combos = catalog.len());
        let _guard = span.enter();

        if catalog.currency() != basket.currency() {
            return Err(SolverError::CurrencyMismatch(
                catalog.currency().iso_alpha_code,
                basket.currency().iso_alpha_code,
            ));
        }

        let quantities = QuantityMap::from_items(basket.items())?;

        let candidates: SmallVec<[Candidate<'_, 'a>; 16]> = catalog
            .iter()
            .filter_map(|(key, combo)| {
                let required = combo.required_quantities();

                quantities
                    .satisfies(&required)
                    .then_some(Candidate {
                        key,
                        combo,
                        required,
                    })
            })
            .collect();

        debug!(
            candidates = candidates.len(),
            distinct_items = quantities.len(),
            "filtered combo candidates"
        );

        if candidates.is_empty() {
            return Ok(ComboResolution::empty(quantities, catalog.currency()));
        }

        let pool: CandidatePool = (0..candidates.len()).collect();
        let best = search(&candidates, &pool, &quantities, 0, observer)?;

        let applied_combos = best
            .applied
            .iter()
            .map(|&(idx, count)| -> Result<_, SolverError> {
                let key = candidates.get(idx).map(|candidate| candidate.key).ok_or(
                    SolverError::InvariantViolation {
                        message: "applied combo index outside candidate list",
                    },
                )?;

                let combo = catalog
                    .get(key)
                    .ok_or(SolverError::InvariantViolation {
                        message: "applied combo key missing from catalog",
                    })?;

                Ok(AppliedCombo::new(key, combo, count))
            })
            .collect::<Result<SmallVec<_>, _>>()?;

        debug!(
            applied = applied_combos.len(),
            total_discount_minor = best.discount_minor,
            "combo search complete"
        );

        Ok(ComboResolution {
            applied_combos,
            remaining_items: best.remaining,
            total_discount: Money::from_minor(best.discount_minor, catalog.currency()),
        })
    }
}

impl Solver for ExhaustiveSolver {
    fn solve<'a>(
        catalog: &ComboCatalog<'a>,
        basket: &Basket<'a>,
    ) -> Result<ComboResolution<'a>, SolverError> {
        Self::solve_with_observer(catalog, basket, &mut NoopObserver)
    }
}

fn search<O: SearchObserver>(
    candidates: &[Candidate<'_, '_>],
    pool: &[usize],
    quantities: &QuantityMap,
    depth: usize,
    observer: &mut O,
) -> Result<Branch, SolverError> {
    let mut best = Branch::nothing_applied(quantities);

    for &idx in pool {
        let candidate = candidates
            .get(idx)
            .ok_or(SolverError::InvariantViolation {
                message: "candidate pool index outside candidate list",
            })?;

        if !quantities.satisfies(&candidate.required) {
            continue;
        }

        let max_applications = quantities.max_applications(&candidate.required);
        let rest: CandidatePool = pool.iter().copied().filter(|&other| other != idx).collect();
        let per_application = candidate.combo.discount().to_minor_units();

        for count in (1..=max_applications).rev() {
            let next = quantities.deducted(&candidate.required, count).ok_or(
                SolverError::InvariantViolation {
                    message: "deducting a feasible combo count went negative",
                },
            )?;

            observer.on_branch(depth, candidate.combo.id(), count);

            let below = search(candidates, &rest, &next, depth + 1, observer)?;

            let total = per_application
                .checked_mul(i64::from(count))
                .and_then(|own| own.checked_add(below.discount_minor))
                .ok_or_else(|| SolverError::DiscountOverflow {
                    combo: candidate.combo.id().clone(),
                })?;

            if total > best.discount_minor {
                trace!(depth, combo = %candidate.combo.id(), count, total, "new best branch");
                observer.on_improvement(depth, total);

                let mut applied = SmallVec::with_capacity(below.applied.len() + 1);
                applied.push((idx, count));
                applied.extend(below.applied);

                best = Branch {
                    discount_minor: total,
                    applied,
                    remaining: below.remaining,
                };
            }
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;
    use rusty_money::iso::{Currency, TWD, USD};
    use testresult::TestResult;

    use crate::{
        combos::ComboId,
        items::{CartItem, ItemId},
        solvers::observer::BranchCounter,
    };

    use super::*;

    fn twd(major: i64) -> Money<'static, Currency> {
        Money::from_minor(major * 100, TWD)
    }

    fn line(id: u32, price: i64, quantity: u32) -> CartItem<'static> {
        CartItem::new(id, format!("item {id}"), twd(price), quantity)
    }

    fn combo(id: &str, items: &[u32], discount: i64) -> ComboDefinition<'static> {
        ComboDefinition::new(id, id, items.iter().copied(), twd(discount))
    }

    fn applied_summary(resolution: &ComboResolution<'_>) -> Vec<(String, u32)> {
        resolution
            .applied_combos
            .iter()
            .map(|applied| (applied.combo_id.to_string(), applied.applicable_count))
            .collect()
    }

    /// Reference optimum: try every count vector within per-combo maximums.
    fn brute_force_best(
        combos: &[ComboDefinition<'_>],
        quantities: &QuantityMap,
    ) -> Result<i64, SolverError> {
        let Some((first, rest)) = combos.split_first() else {
            return Ok(0);
        };

        let required = first.required_quantities();
        let mut best = brute_force_best(rest, quantities)?;

        for count in 1..=quantities.max_applications(&required) {
            let next = quantities
                .deducted(&required, count)
                .ok_or(SolverError::InvariantViolation {
                    message: "brute force deduction",
                })?;

            let total = first.discount().to_minor_units() * i64::from(count)
                + brute_force_best(rest, &next)?;

            best = best.max(total);
        }

        Ok(best)
    }

    #[test]
    fn empty_catalog_applies_nothing() -> TestResult {
        let basket = Basket::with_items([line(1, 1200, 1)], TWD)?;
        let catalog = ComboCatalog::new(TWD);

        let resolution = ExhaustiveSolver::solve(&catalog, &basket)?;

        assert!(resolution.applied_combos.is_empty());
        assert_eq!(resolution.total_discount, twd(0));
        assert_eq!(resolution.remaining_items.get(ItemId(1)), 1);

        Ok(())
    }

    #[test]
    fn single_matching_combo_is_applied_once() -> TestResult {
        let basket = Basket::with_items([line(1, 300, 1), line(2, 200, 1)], TWD)?;
        let catalog = ComboCatalog::with_combos([combo("pair", &[1, 2], 100)], TWD)?;

        let resolution = ExhaustiveSolver::solve(&catalog, &basket)?;

        assert_eq!(applied_summary(&resolution), [("pair".to_string(), 1)]);
        assert_eq!(resolution.total_discount, twd(100));
        assert_eq!(resolution.remaining_items.get(ItemId(1)), 0);
        assert_eq!(resolution.remaining_items.get(ItemId(2)), 0);

        Ok(())
    }

    #[test]
    fn combo_applies_as_many_times_as_stock_allows() -> TestResult {
        let basket = Basket::with_items([line(1, 100, 5), line(2, 100, 2)], TWD)?;
        let catalog = ComboCatalog::with_combos([combo("a", &[1, 1, 2], 30)], TWD)?;

        let resolution = ExhaustiveSolver::solve(&catalog, &basket)?;

        assert_eq!(applied_summary(&resolution), [("a".to_string(), 2)]);
        assert_eq!(resolution.total_discount, twd(60));
        assert_eq!(resolution.remaining_items.get(ItemId(1)), 1);
        assert_eq!(resolution.remaining_items.get(ItemId(2)), 0);

        Ok(())
    }

    #[test]
    fn non_candidates_are_ignored() -> TestResult {
        let basket = Basket::with_items([line(1, 100, 1)], TWD)?;
        let catalog = ComboCatalog::with_combos([combo("needs-two", &[1, 1], 500)], TWD)?;

        let mut counter = BranchCounter::default();
        let resolution = ExhaustiveSolver::solve_with_observer(&catalog, &basket, &mut counter)?;

        assert!(resolution.applied_combos.is_empty());
        assert_eq!(counter.branches, 0);

        Ok(())
    }

    #[test]
    fn unidentified_lines_never_feed_combos() -> TestResult {
        let basket = Basket::with_items(
            [
                line(1, 100, 1),
                CartItem::unidentified("Loose pen", twd(50), 3),
            ],
            TWD,
        )?;
        let catalog = ComboCatalog::with_combos([combo("pair", &[1, 2], 40)], TWD)?;

        let resolution = ExhaustiveSolver::solve(&catalog, &basket)?;

        assert!(resolution.applied_combos.is_empty());
        assert_eq!(resolution.remaining_items.len(), 1);

        Ok(())
    }

    #[test]
    fn prefers_higher_total_over_greedy_first_choice() -> TestResult {
        // Taking "big" first blocks both smaller combos, which together save more.
        let basket = Basket::with_items([line(1, 500, 1), line(2, 500, 1), line(3, 500, 1)], TWD)?;
        let catalog = ComboCatalog::with_combos(
            [
                combo("big", &[1, 2], 100),
                combo("left", &[1, 3], 60),
                combo("right", &[2], 60),
            ],
            TWD,
        )?;

        let resolution = ExhaustiveSolver::solve(&catalog, &basket)?;

        assert_eq!(
            applied_summary(&resolution),
            [("left".to_string(), 1), ("right".to_string(), 1)]
        );
        assert_eq!(resolution.total_discount, twd(120));

        Ok(())
    }

    #[test]
    fn ties_keep_earliest_catalog_combo() -> TestResult {
        let basket = Basket::with_items([line(1, 100, 1)], TWD)?;
        let catalog = ComboCatalog::with_combos(
            [combo("first", &[1], 50), combo("second", &[1], 50)],
            TWD,
        )?;

        let resolution = ExhaustiveSolver::solve(&catalog, &basket)?;

        assert_eq!(applied_summary(&resolution), [("first".to_string(), 1)]);

        Ok(())
    }

    #[test]
    fn ties_keep_higher_count_before_lower_count() -> TestResult {
        // a x2 = 100 and a x1 + b x1 = 100; the higher count is explored first.
        let basket = Basket::with_items([line(1, 100, 2), line(3, 100, 1)], TWD)?;
        let catalog =
            ComboCatalog::with_combos([combo("a", &[1], 50), combo("b", &[1, 3], 50)], TWD)?;

        let resolution = ExhaustiveSolver::solve(&catalog, &basket)?;

        assert_eq!(applied_summary(&resolution), [("a".to_string(), 2)]);
        assert_eq!(resolution.remaining_items.get(ItemId(3)), 1);

        Ok(())
    }

    #[test]
    fn zero_discount_combos_are_never_reported() -> TestResult {
        let basket = Basket::with_items([line(1, 100, 1)], TWD)?;
        let catalog = ComboCatalog::with_combos([combo("free", &[1], 0)], TWD)?;

        let resolution = ExhaustiveSolver::solve(&catalog, &basket)?;

        assert!(resolution.applied_combos.is_empty());
        assert_eq!(resolution.remaining_items.get(ItemId(1)), 1);

        Ok(())
    }

    #[test]
    fn repeated_solves_are_identical() -> TestResult {
        let basket = Basket::with_items([line(1, 100, 4), line(2, 100, 3), line(3, 100, 2)], TWD)?;
        let catalog = ComboCatalog::with_combos(
            [
                combo("a", &[1, 2], 40),
                combo("b", &[2, 3], 40),
                combo("c", &[1, 3], 40),
                combo("d", &[1, 1], 30),
            ],
            TWD,
        )?;

        let first = ExhaustiveSolver::solve(&catalog, &basket)?;
        let second = ExhaustiveSolver::solve(&catalog, &basket)?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn remaining_items_conserve_stock() -> TestResult {
        let basket = Basket::with_items([line(1, 100, 4), line(2, 100, 3), line(3, 100, 2)], TWD)?;
        let combos = [
            combo("a", &[1, 2], 40),
            combo("b", &[2, 3], 35),
            combo("c", &[1, 1, 3], 70),
        ];
        let catalog = ComboCatalog::with_combos(combos.clone(), TWD)?;

        let resolution = ExhaustiveSolver::solve(&catalog, &basket)?;
        let original = QuantityMap::from_items(basket.items())?;

        for (id, start) in original.iter_sorted() {
            let consumed: u32 = resolution
                .applied_combos
                .iter()
                .filter_map(|applied| {
                    combos
                        .iter()
                        .find(|c| c.id() == &applied.combo_id)
                        .map(|c| c.required_quantities().get(id) * applied.applicable_count)
                })
                .sum();

            assert_eq!(resolution.remaining_items.get(id), start - consumed, "item {id}");
        }

        Ok(())
    }

    #[test]
    fn matches_brute_force_optimum() -> TestResult {
        // Small deterministic LCG so the cases are reproducible.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = |bound: u64| -> u64 {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 33) % bound
        };

        for case in 0..40 {
            let lines: Vec<CartItem<'static>> = (1..=4)
                .filter_map(|id| {
                    let quantity = u32::try_from(next(4)).ok()?;
                    (quantity > 0).then(|| line(id, 100, quantity))
                })
                .collect();

            let combos: Vec<ComboDefinition<'static>> = (0..5)
                .map(|n| {
                    let size = next(3) + 1;
                    let items: Vec<u32> = (0..size)
                        .filter_map(|_| u32::try_from(next(4) + 1).ok())
                        .collect();
                    let discount = i64::try_from(next(90) + 10).unwrap_or(10);

                    combo(&format!("c{n}"), &items, discount)
                })
                .collect();

            let basket = Basket::with_items(lines, TWD)?;
            let catalog = ComboCatalog::with_combos(combos.clone(), TWD)?;
            let quantities = QuantityMap::from_items(basket.items())?;

            let resolution = ExhaustiveSolver::solve(&catalog, &basket)?;

            assert_eq!(
                resolution.total_discount.to_minor_units(),
                brute_force_best(&combos, &quantities)?,
                "case {case}"
            );
        }

        Ok(())
    }

    #[test]
    fn observer_sees_every_branch() -> TestResult {
        // a can be applied 2 or 1 times; after a x1 there is still room for b.
        let basket = Basket::with_items([line(1, 100, 2), line(2, 100, 1)], TWD)?;
        let catalog =
            ComboCatalog::with_combos([combo("a", &[1], 10), combo("b", &[1, 2], 30)], TWD)?;

        let mut counter = BranchCounter::default();
        let resolution = ExhaustiveSolver::solve_with_observer(&catalog, &basket, &mut counter)?;

        // a2, a1, a1->b1, b1, b1->a1
        assert_eq!(counter.branches, 5);
        assert_eq!(counter.max_depth, 2);
        assert_eq!(
            applied_summary(&resolution),
            [("a".to_string(), 1), ("b".to_string(), 1)]
        );

        Ok(())
    }

    #[test]
    fn currency_mismatch_errors() -> TestResult {
        let basket = Basket::with_items(
            [CartItem::new(1, "Pen", Money::from_minor(100, USD), 1)],
            USD,
        )?;
        let catalog = ComboCatalog::new(TWD);

        assert!(matches!(
            ExhaustiveSolver::solve(&catalog, &basket),
            Err(SolverError::CurrencyMismatch("TWD", "USD"))
        ));

        Ok(())
    }

    #[test]
    fn applied_combo_keys_resolve_in_catalog() -> TestResult {
        let basket = Basket::with_items([line(1, 100, 2), line(2, 100, 1)], TWD)?;
        let catalog = ComboCatalog::with_combos(
            [combo("pair", &[1, 1], 40), combo("mixed", &[1, 2], 30)],
            TWD,
        )?;

        let resolution = ExhaustiveSolver::solve(&catalog, &basket)?;

        assert!(!resolution.applied_combos.is_empty());

        for applied in &resolution.applied_combos {
            let combo = catalog.get(applied.combo_key).map(ComboDefinition::id);

            assert_eq!(combo, Some(&applied.combo_id));
        }

        Ok(())
    }

    #[test]
    fn combo_ids_are_unique_in_resolution() -> TestResult {
        let basket = Basket::with_items([line(1, 100, 6)], TWD)?;
        let catalog = ComboCatalog::with_combos(
            [combo("single", &[1], 10), combo("pair", &[1, 1], 25)],
            TWD,
        )?;

        let resolution = ExhaustiveSolver::solve(&catalog, &basket)?;
        let ids: FxHashSet<&ComboId> = resolution
            .applied_combos
            .iter()
            .map(|applied| &applied.combo_id)
            .collect();

        assert_eq!(ids.len(), resolution.applied_combos.len());
        assert_eq!(resolution.total_discount, twd(75));

        Ok(())
    }
}
