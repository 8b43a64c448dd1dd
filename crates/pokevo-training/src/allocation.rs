//! Integer stat-table operations used by genome initialization, crossover and mutation.
//!
//! Base stats and effort values are both [`StatTable<u16>`]s with a budget attached:
//!
//! - Base stats of a custom genome always sum to exactly the base stat total, and no
//!   stat ever drops to zero.
//! - Effort values sum to at most the effort total, and each stat stays within the
//!   per-stat cap.
//!
//! # Operations
//!
//! - **Initialization**: [`random_base_stats`] and [`effort_spread`]
//! - **Crossover**: [`blend_base_stats`] and [`blend_efforts`]
//! - **Mutation**: [`shift_stat`]
//! - **Normalization**: [`normalize_to_total`]
//!
//! # Normalization
//!
//! [`normalize_to_total`] scales a table to an exact sum. Scaling floors every value (to a
//! minimum of 1), so the result usually misses the target by a few points; the difference
//! is then corrected one point at a time on randomly chosen stats:
//!
//! ```
//! use pokevo_engine::StatTable;
//! use pokevo_training::allocation;
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let mut rng = Pcg32::seed_from_u64(0);
//! let mut stats = StatTable::new(10, 20, 30, 40, 50, 60);
//! allocation::normalize_to_total(&mut stats, 600, &mut rng);
//! assert_eq!(stats.total(), 600);
//! assert!(stats.iter().all(|(_, v)| *v >= 1));
//! ```

use std::{array, ops::RangeInclusive};

use arrayvec::ArrayVec;
use pokevo_engine::{StatKey, StatTable};
use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};

/// Draws every base stat from `draw`, then normalizes the table to `total`.
///
/// An empty `draw` range yields an even split.
pub fn random_base_stats<R>(draw: &RangeInclusive<u16>, total: u16, rng: &mut R) -> StatTable<u16>
where
    R: Rng + ?Sized,
{
    let mut stats = if draw.is_empty() {
        StatTable::splat(0)
    } else {
        StatTable::from_fn(|_| rng.random_range(draw.clone()))
    };
    normalize_to_total(&mut stats, total, rng);
    stats
}

/// Scales `values` so they sum to exactly `target`, keeping every value at least 1.
///
/// A table that sums to zero is split evenly, with the remainder going to one random
/// stat. If `target` is smaller than the number of stats the floor of 1 wins and the
/// sum stays above `target`.
pub fn normalize_to_total<R>(values: &mut StatTable<u16>, target: u16, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let total = values.total();
    if total == 0 {
        #[expect(clippy::cast_possible_truncation)]
        let len = StatKey::LEN as u16;
        *values = StatTable::splat(target / len);
        values[random_key(rng)] += target % len;
        return;
    }

    let factor = f64::from(target) / f64::from(total);
    *values = StatTable::from_fn(|key| {
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = (f64::from(values[key]) * factor).floor() as u16;
        scaled.max(1)
    });
    adjust_to_total(values, target, rng);
}

/// Two random stats get `max_per_stat`, a third gets `minor`, the rest get nothing.
///
/// The spread is then trimmed to `max_total` if it does not fit.
pub fn effort_spread<R>(max_per_stat: u16, minor: u16, max_total: u16, rng: &mut R) -> StatTable<u16>
where
    R: Rng + ?Sized,
{
    let [first, second, third] = distinct_keys(rng);
    let mut evs = StatTable::splat(0);
    evs[first] = max_per_stat;
    evs[second] = max_per_stat;
    evs[third] = minor.min(max_per_stat);
    reduce_to_total(&mut evs, max_total, rng);
    evs
}

/// Floor-averages two effort tables, caps each stat, then trims the total.
#[must_use]
pub fn blend_efforts<R>(
    a: &StatTable<u16>,
    b: &StatTable<u16>,
    max_per_stat: u16,
    max_total: u16,
    rng: &mut R,
) -> StatTable<u16>
where
    R: Rng + ?Sized,
{
    let mut evs = StatTable::from_fn(|key| a[key].midpoint(b[key]).min(max_per_stat));
    reduce_to_total(&mut evs, max_total, rng);
    evs
}

/// Floor-averages two base stat tables and corrects the sum to exactly `total`.
#[must_use]
pub fn blend_base_stats<R>(
    a: &StatTable<u16>,
    b: &StatTable<u16>,
    total: u16,
    rng: &mut R,
) -> StatTable<u16>
where
    R: Rng + ?Sized,
{
    let mut stats = StatTable::from_fn(|key| a[key].midpoint(b[key]));
    adjust_to_total(&mut stats, total, rng);
    stats
}

/// Moves a random amount from `step` out of one random stat into another.
///
/// Nothing happens if the source stat is not larger than the amount, so no stat ever
/// reaches zero and the total is preserved. Returns whether the table changed.
pub fn shift_stat<R>(stats: &mut StatTable<u16>, step: &RangeInclusive<u16>, rng: &mut R) -> bool
where
    R: Rng + ?Sized,
{
    if step.is_empty() {
        return false;
    }
    let [from, to] = distinct_keys(rng);
    let amount = rng.random_range(step.clone());
    if stats[from] <= amount {
        return false;
    }
    stats[from] -= amount;
    stats[to] = stats[to].saturating_add(amount);
    true
}

/// Adds or removes single points on random stats until the sum equals `target`.
///
/// Removal never takes a stat below 1.
fn adjust_to_total<R>(values: &mut StatTable<u16>, target: u16, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let target = u32::from(target);
    let mut total = values.total();
    while total < target {
        let key = random_key(rng);
        values[key] = values[key].saturating_add(1);
        total += 1;
    }
    while total > target {
        let reducible: ArrayVec<StatKey, { StatKey::LEN }> = StatKey::ALL
            .into_iter()
            .filter(|key| values[*key] > 1)
            .collect();
        let Some(&key) = reducible.choose(rng) else {
            break;
        };
        values[key] -= 1;
        total -= 1;
    }
}

/// Takes points away from random nonzero stats until the sum is at most `max_total`.
fn reduce_to_total<R>(values: &mut StatTable<u16>, max_total: u16, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let max_total = u32::from(max_total);
    let mut total = values.total();
    while total > max_total {
        let nonzero: ArrayVec<StatKey, { StatKey::LEN }> = StatKey::ALL
            .into_iter()
            .filter(|key| values[*key] > 0)
            .collect();
        let Some(&key) = nonzero.choose(rng) else {
            break;
        };
        let cut = u16::try_from(total - max_total).map_or(values[key], |excess| excess.min(values[key]));
        values[key] -= cut;
        total -= u32::from(cut);
    }
}

fn random_key<R>(rng: &mut R) -> StatKey
where
    R: Rng + ?Sized,
{
    StatKey::ALL[rng.random_range(0..StatKey::LEN)]
}

/// `N` distinct stats in random order.
fn distinct_keys<const N: usize, R>(rng: &mut R) -> [StatKey; N]
where
    R: Rng + ?Sized,
{
    let mut keys = StatKey::ALL;
    keys.shuffle(rng);
    array::from_fn(|i| keys[i])
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_normalize_hits_target_exactly() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..300 {
            let mut stats = StatTable::from_fn(|_| rng.random_range(0..=300));
            normalize_to_total(&mut stats, 600, &mut rng);
            assert_eq!(stats.total(), 600);
            assert!(stats.iter().all(|(_, v)| *v >= 1), "{stats:?}");
        }
    }

    #[test]
    fn test_normalize_splits_zero_table_evenly() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut stats = StatTable::splat(0);
        normalize_to_total(&mut stats, 604, &mut rng);
        assert_eq!(stats.total(), 604);
        let bumped: Vec<_> = stats.iter().filter(|(_, v)| **v != 100).collect();
        assert_eq!(bumped.len(), 1);
        assert_eq!(*bumped[0].1, 104);
    }

    #[test]
    fn test_random_base_stats() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..200 {
            let stats = random_base_stats(&(1..=100), 600, &mut rng);
            assert_eq!(stats.total(), 600);
            assert!(stats.iter().all(|(_, v)| *v >= 1));
        }
    }

    #[test]
    fn test_effort_spread_shape() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            let evs = effort_spread(252, 6, 510, &mut rng);
            let mut values: Vec<u16> = evs.iter().map(|(_, v)| *v).collect();
            values.sort_unstable();
            assert_eq!(values, [0, 0, 0, 6, 252, 252]);
        }
    }

    #[test]
    fn test_effort_spread_respects_smaller_total() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            let evs = effort_spread(252, 6, 400, &mut rng);
            assert_eq!(evs.total(), 400);
            assert!(evs.iter().all(|(_, v)| *v <= 252));
        }
    }

    #[test]
    fn test_blend_efforts_caps_and_trims() {
        let mut rng = Pcg32::seed_from_u64(9);
        let a = StatTable::new(252, 0, 6, 0, 0, 252);
        let b = StatTable::new(0, 252, 0, 7, 0, 252);
        let evs = blend_efforts(&a, &b, 252, 510, &mut rng);
        assert_eq!(evs, StatTable::new(126, 126, 3, 3, 0, 252));

        let a = StatTable::splat(252);
        for _ in 0..100 {
            let evs = blend_efforts(&a, &a, 252, 510, &mut rng);
            assert_eq!(evs.total(), 510);
            assert!(evs.iter().all(|(_, v)| *v <= 252));
        }
    }

    #[test]
    fn test_blend_base_stats_keeps_total() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            let a = random_base_stats(&(1..=100), 600, &mut rng);
            let b = random_base_stats(&(1..=100), 600, &mut rng);
            let child = blend_base_stats(&a, &b, 600, &mut rng);
            assert_eq!(child.total(), 600);
            assert!(child.iter().all(|(_, v)| *v >= 1));
        }
    }

    #[test]
    fn test_shift_stat_preserves_total() {
        let mut rng = Pcg32::seed_from_u64(21);
        let mut stats = StatTable::splat(100);
        let mut changed = 0;
        for _ in 0..500 {
            if shift_stat(&mut stats, &(1..=20), &mut rng) {
                changed += 1;
            }
            assert_eq!(stats.total(), 600);
            assert!(stats.iter().all(|(_, v)| *v >= 1));
        }
        assert!(changed > 0);

        let mut tiny = StatTable::splat(1);
        assert!(!shift_stat(&mut tiny, &(1..=20), &mut rng));
        assert_eq!(tiny, StatTable::splat(1));
    }
}
