//! The boundary-join policy applied at every append/prepend: decides
//! whether the new data merges into the existing edge block, replaces it,
//! or is simply attached as a new slot.
//!
//! This is the one place in the crate where "should I allocate" and "how
//! big" are decided, so that [`super::Chain`]'s append/prepend methods stay
//! readable dispatchers over these outcomes.

use crate::block::{DEFAULT_MAX_BLOCK_SIZE, DEFAULT_MIN_BLOCK_SIZE, SharedBlock};

use super::Options;

/// The boundary-join outcome for an append (or, symmetrically, a prepend)
/// of `incoming_len` fresh bytes against an existing edge block.
pub(super) enum Plan {
    /// Copy the incoming bytes directly into the edge block's free space.
    InPlace,
    /// Both the edge block and the incoming data are tiny; allocate one new
    /// block sized to hold both and copy them in together, replacing the
    /// edge block.
    MergeNewBlock { capacity: usize },
    /// The edge block is empty; replace it outright rather than appending
    /// to nothing.
    DropEmpty { capacity: usize },
    /// The edge block is wasteful (mostly unused capacity); compact it with
    /// a copy, then attach the incoming data as a new block.
    RewriteThenAttach { new_capacity: usize },
    /// Attach the incoming data as an independent new block.
    Attach { capacity: usize },
}

/// Decides how `incoming_len` fresh bytes join an existing chain at one
/// edge, given that edge's current block (`None` for an empty block
/// array). `appending` selects which side's in-place feasibility check
/// applies (`can_append`/`can_prepend`); the rest of the policy is
/// symmetric.
///
/// `current_size` is the chain's total size before this join and is fed to
/// every freshly-allocated block's `recommended_length` so that, under
/// repeated small appends, block capacities grow with the chain instead of
/// pinning at `min_block_size` — the difference between O(log n) and O(n)
/// blocks for a long run of byte-at-a-time appends.
pub(super) fn plan_join(
    edge: Option<&SharedBlock>,
    incoming_len: usize,
    current_size: usize,
    options: &Options,
    appending: bool,
) -> Plan {
    let fresh_capacity =
        || new_block_capacity(0, 0, core::cmp::max(incoming_len, current_size), options);
    let can_join_in_place = |block: &SharedBlock, n: usize| {
        if appending { block.can_append_moving(n) } else { block.can_prepend_moving(n) }
    };

    let edge = match edge {
        None => return Plan::Attach { capacity: fresh_capacity() },
        Some(edge) => edge,
    };

    let edge_tiny = edge.size() < options.min_block_size();
    let incoming_tiny = incoming_len < options.min_block_size();

    if edge_tiny && incoming_tiny {
        return if can_join_in_place(edge, incoming_len) && !edge.wasteful(incoming_len) {
            Plan::InPlace
        } else {
            let merged_len = edge.size() + incoming_len;
            let recommended = core::cmp::max(merged_len, current_size);
            Plan::MergeNewBlock { capacity: new_block_capacity(0, merged_len, recommended, options) }
        };
    }

    if edge.size() == 0 {
        return Plan::DropEmpty { capacity: fresh_capacity() };
    }

    if can_join_in_place(edge, incoming_len) && !edge.wasteful(incoming_len) {
        return Plan::InPlace;
    }

    if edge.wasteful(incoming_len) {
        return Plan::RewriteThenAttach { new_capacity: fresh_capacity() };
    }

    Plan::Attach { capacity: fresh_capacity() }
}

/// Computes the capacity for a freshly allocated block absorbing a rewrite
/// of `replaced_length` existing bytes plus new content.
///
/// - Starts from `max(size, options.min_block_size - replaced_length)` so a
///   fresh block never falls below the tiny threshold.
/// - Clamped upward by `options.size_hint`, if present, so a single block
///   can hold the estimated remainder of the chain.
/// - Clamped into `[min_length, options.max_block_size - replaced_length]`;
///   the lower bound wins if the two conflict.
/// - `replaced_length` is added back at the end: the returned capacity
///   covers both the rewritten prefix/suffix and the new content.
pub(crate) fn new_block_capacity(
    replaced_length: usize,
    min_length: usize,
    recommended_length: usize,
    options: &Options,
) -> usize {
    let min_block_size = options.min_block_size();
    let max_block_size = options.max_block_size();

    let mut capacity =
        core::cmp::max(recommended_length, min_block_size.saturating_sub(replaced_length));

    if let Some(hint) = options.size_hint() {
        let remaining = hint.saturating_sub(replaced_length);
        capacity = core::cmp::max(capacity, core::cmp::min(remaining, max_block_size));
    }

    let upper = max_block_size.saturating_sub(replaced_length);
    let lower = min_length;
    capacity = capacity.clamp(lower, core::cmp::max(lower, upper));

    capacity.saturating_add(replaced_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_min_and_max() {
        let options = Options::new();
        let cap = new_block_capacity(0, 0, 10, &options);
        assert!(cap >= DEFAULT_MIN_BLOCK_SIZE);
        assert!(cap <= DEFAULT_MAX_BLOCK_SIZE);
    }

    #[test]
    fn size_hint_clamps_upward() {
        let options = Options::new().with_size_hint(1_000_000);
        let cap = new_block_capacity(0, 0, 10, &options);
        assert_eq!(cap, DEFAULT_MAX_BLOCK_SIZE);
    }

    #[test]
    fn min_length_lower_bound_wins() {
        let options = Options::new();
        let cap = new_block_capacity(0, 5000, 10, &options);
        assert!(cap >= 5000);
    }

    #[test]
    fn replaced_length_is_added_back() {
        let options = Options::new();
        let cap = new_block_capacity(100, 0, 10, &options);
        assert!(cap > 100);
    }
}
