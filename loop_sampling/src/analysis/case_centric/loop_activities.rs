use itertools::Itertools;
use rayon::prelude::*;

use crate::core::event_data::case_centric::{ActivityLabel, ActivitySet, CaseLog};

/// Set of loop activities
///
/// A loop activity is an activity occurring more than once within at least one case.
pub type LoopActivitySet = ActivitySet;

/// Activities occurring more than once in a single case
fn repeated_activities(case: &[ActivityLabel]) -> impl Iterator<Item = &ActivityLabel> + '_ {
    case.iter()
        .counts()
        .into_iter()
        .filter_map(|(act, count)| if count > 1 { Some(act) } else { None })
}

///
/// Detect the loop activities of a [`CaseLog`]
///
/// Occurrences are counted per case: an activity occurring once in each of several cases is
/// _not_ a loop activity.
///
/// ```rust
/// use loop_sampling::{case_log, detect_loop_activities};
///
/// let log = case_log!(
///     "c1" => ["a", "b", "a"],
///     "c2" => ["b", "c"],
/// );
/// let loop_activities = detect_loop_activities(&log);
/// assert!(loop_activities.contains("a"));
/// assert!(!loop_activities.contains("b"));
/// ```
pub fn detect_loop_activities(log: &CaseLog) -> LoopActivitySet {
    let mut loop_activities = LoopActivitySet::new();
    for case in log.sequences() {
        for act in repeated_activities(case) {
            if !loop_activities.contains(act) {
                loop_activities.insert(act.clone());
            }
        }
    }
    loop_activities
}

///
/// Detect the loop activities of a [`CaseLog`], processing cases in parallel
///
/// Returns the same set as [`detect_loop_activities`].
pub fn detect_loop_activities_par(log: &CaseLog) -> LoopActivitySet {
    log.par_sequences()
        .fold(LoopActivitySet::new, |mut set, case| {
            set.extend(repeated_activities(case).cloned());
            set
        })
        .reduce(LoopActivitySet::new, |mut s1, s2| {
            s1.extend(s2);
            s1
        })
}
