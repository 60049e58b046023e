use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::core::{
    event_data::case_centric::{ActivityLabel, ActivitySet},
    CaseLog, DirectlyFollowsGraph,
};

/// Ordered pair of activities (source, target) ↦ count
pub type PairCounts = HashMap<(ActivityLabel, ActivityLabel), u64>;

///
/// Direct and indirect follow counts between two activity groups
///
/// See [`count_follow_relations`] for how occurrences are matched.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowCounts {
    /// A source activity was immediately followed by a target activity
    #[serde_as(as = "Vec<(_, _)>")]
    pub direct: PairCounts,
    /// A source activity was followed by a target activity with at least one activity in between
    #[serde_as(as = "Vec<(_, _)>")]
    pub indirect: PairCounts,
    /// Number of source occurrences for which no later target occurrence was found
    ///
    /// These occurrences do not contribute to [`FollowCounts::direct`] or [`FollowCounts::indirect`].
    pub unmatched_sources: u64,
}

impl FollowCounts {
    /// Merge the counts of another [`FollowCounts`] into this one
    pub fn merge(mut self, other: FollowCounts) -> Self {
        for (pair, count) in other.direct {
            *self.direct.entry(pair).or_default() += count;
        }
        for (pair, count) in other.indirect {
            *self.indirect.entry(pair).or_default() += count;
        }
        self.unmatched_sources += other.unmatched_sources;
        self
    }

    /// Graph of the direct follow counts
    pub fn direct_graph(&self) -> DirectlyFollowsGraph {
        self.direct.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    /// Graph of the indirect follow counts
    pub fn indirect_graph(&self) -> DirectlyFollowsGraph {
        self.indirect.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    fn count_case(&mut self, case: &[ActivityLabel], group1: &ActivitySet, group2: &ActivitySet) {
        let mut i = 0;
        while i < case.len() {
            let from = &case[i];
            if !group1.contains(from) {
                i += 1;
                continue;
            }

            if let Some(to) = case.get(i + 1).filter(|to| group2.contains(*to)) {
                *self.direct.entry((from.clone(), to.clone())).or_default() += 1;
                i += 2;
                continue;
            }

            match case
                .iter()
                .enumerate()
                .skip(i + 2)
                .find(|(_, to)| group2.contains(*to))
            {
                Some((j, to)) => {
                    *self.indirect.entry((from.clone(), to.clone())).or_default() += 1;
                    i = j + 1;
                }
                None => {
                    self.unmatched_sources += 1;
                    i += 1;
                }
            }
        }
    }
}

///
/// Count how often activities of `group1` are directly or indirectly followed by activities of `group2`
///
/// Each case is scanned once from left to right. For a source occurrence (member of `group1`):
/// - if the next activity is a member of `group2`, a direct follow is counted and both positions
///   are consumed;
/// - otherwise, the first later member of `group2` is searched; if found, an indirect follow is
///   counted and scanning continues after that target;
/// - otherwise, the source occurrence is skipped (see [`FollowCounts::unmatched_sources`]).
///
/// The two groups may overlap.
///
/// ```rust
/// use loop_sampling::{case_log, count_follow_relations, ActivitySet};
///
/// let log = case_log!("c1" => ["A", "X", "B"]);
/// let counts = count_follow_relations(
///     &log,
///     &ActivitySet::from(["A".to_string()]),
///     &ActivitySet::from(["B".to_string()]),
/// );
/// assert!(counts.direct.is_empty());
/// assert_eq!(counts.indirect[&("A".to_string(), "B".to_string())], 1);
/// ```
pub fn count_follow_relations(
    log: &CaseLog,
    group1: &ActivitySet,
    group2: &ActivitySet,
) -> FollowCounts {
    let mut counts = FollowCounts::default();
    for case in log.sequences() {
        counts.count_case(case, group1, group2);
    }
    counts
}

///
/// Count direct and indirect follow relations, processing cases in parallel
///
/// Returns the same counts as [`count_follow_relations`].
pub fn count_follow_relations_par(
    log: &CaseLog,
    group1: &ActivitySet,
    group2: &ActivitySet,
) -> FollowCounts {
    log.par_sequences()
        .fold(FollowCounts::default, |mut counts, case| {
            counts.count_case(case, group1, group2);
            counts
        })
        .reduce(FollowCounts::default, FollowCounts::merge)
}
