//! Boundary-wrap linear search shared by row and cell movement.
//!
//! Starting from `anchor + delta` (negative starts clamp to 0), the search
//! walks one element at a time in the direction of `delta` looking for a
//! selectable element. The first time it runs off either end it turns around
//! toward the interior, once. Running off the end again counts against
//! [`PROBE_LIMIT`] and eventually gives up.
//!
//! After turning around the anchor itself is passed over, so stepping off the
//! last cell lands on the nearest other selectable cell behind it. When the
//! anchor is the only selectable element the search settles back on it.
//!
//! In-range probes of unselectable elements do not count toward the limit,
//! so once a search is inside the line it reaches every element before
//! giving up.

/// Out-of-range probes allowed before a search gives up.
pub const PROBE_LIMIT: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Forward,
    Backward,
}

impl Step {
    fn offset(self) -> isize {
        match self {
            Step::Forward => 1,
            Step::Backward => -1,
        }
    }

    /// Direction of `delta`, or `idle` when `delta` is zero.
    pub fn of(delta: isize, idle: Step) -> Self {
        match delta.signum() {
            1 => Step::Forward,
            -1 => Step::Backward,
            _ => idle,
        }
    }
}

/// Returns the index of the element to select, or `None` once the probe
/// limit is reached.
pub fn boundary_wrap_search(
    len: usize,
    anchor: Option<usize>,
    delta: isize,
    idle: Step,
    mut is_selectable: impl FnMut(usize) -> bool,
) -> Option<usize> {
    let mut to = anchor
        .map_or(0, |index| index as isize)
        .saturating_add(delta)
        .max(0);
    let mut step = Step::of(delta, idle);
    let mut flipped = false;
    let mut probes = 0;
    let mut anchor_held = false;

    while probes < PROBE_LIMIT {
        let Some(index) = usize::try_from(to).ok().filter(|&index| index < len) else {
            if !flipped {
                step = if to < 0 { Step::Forward } else { Step::Backward };
                flipped = true;
            }
            to += step.offset();
            probes += 1;
            continue;
        };

        to += step.offset();

        if !is_selectable(index) {
            continue;
        }

        if flipped && anchor == Some(index) {
            anchor_held = true;
            continue;
        }

        return Some(index);
    }

    if anchor_held { anchor } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn search(cells: &[bool], anchor: Option<usize>, delta: isize, idle: Step) -> Option<usize> {
        boundary_wrap_search(cells.len(), anchor, delta, idle, |i| cells[i])
    }

    #[rstest]
    #[case::next(&[true, true, true], Some(0), 1, Some(1))]
    #[case::previous(&[true, true, true], Some(2), -1, Some(1))]
    #[case::skips_unselectable(&[true, false, false, true], Some(0), 1, Some(3))]
    #[case::stays_on_anchor_for_zero(&[true, true], Some(1), 0, Some(1))]
    #[case::first_selectable_without_anchor(&[false, false, true, true], None, 0, Some(2))]
    #[case::turns_around_at_end(&[false, true, true], Some(2), 1, Some(1))]
    #[case::clamps_at_start(&[true, true, true], Some(0), -1, Some(0))]
    #[case::clamp_then_turns_around(&[false, false, true], Some(2), -5, Some(2))]
    #[case::page_past_end_lands_on_last(&[true, true, true, false], Some(0), 20, Some(2))]
    #[case::page_past_start_lands_on_first(&[false, true, true], Some(2), -20, Some(1))]
    #[case::lone_anchor_is_kept(&[false, true, false], Some(1), 1, Some(1))]
    #[case::nothing_selectable(&[false, false, false], Some(1), 1, None)]
    #[case::empty(&[], None, 0, None)]
    fn finds_expected_index(
        #[case] cells: &[bool],
        #[case] anchor: Option<usize>,
        #[case] delta: isize,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(search(cells, anchor, delta, Step::Forward), expected);
    }

    #[test]
    fn idle_direction_decides_where_zero_delta_walks() {
        let cells = [true, false, true];
        assert_eq!(search(&cells, Some(1), 0, Step::Forward), Some(2));
        assert_eq!(search(&cells, Some(1), 0, Step::Backward), Some(0));
    }

    #[test]
    fn start_beyond_end_walks_back_in() {
        let cells = [true, true];
        assert_eq!(search(&cells, Some(5), 0, Step::Backward), Some(1));
        assert_eq!(search(&cells, Some(5), 0, Step::Forward), Some(1));
    }

    #[test]
    fn unselectable_probes_do_not_count_against_limit() {
        let mut cells = vec![false; PROBE_LIMIT * 2];
        cells.push(true);
        assert_eq!(search(&cells, None, 0, Step::Forward), Some(PROBE_LIMIT * 2));
    }

    #[test]
    fn gives_up_after_probe_limit() {
        let mut probed = 0;
        let found = boundary_wrap_search(4, Some(0), 1, Step::Forward, |_| {
            probed += 1;
            false
        });
        assert_eq!(found, None);
        // each index is visited once per direction at most
        assert!(probed <= 8);
    }
}
