use std::collections::{HashMap, HashSet};

use crate::{
    analysis::case_centric::loop_activities::LoopActivitySet,
    core::{event_data::case_centric::ActivityLabel, CaseLog, DirectlyFollowsGraph},
};

/// Loop activity ↦ all activities that immediately preceded it somewhere in the log
pub type PredecessorMap = HashMap<ActivityLabel, HashSet<ActivityLabel>>;

/// Loop activity ↦ (following activity ↦ number of times it immediately followed)
///
/// After [`filter_loop_successors`], only loop activities appear as following activities.
pub type SuccessorMap = HashMap<ActivityLabel, HashMap<ActivityLabel, u64>>;

///
/// Extract the immediate predecessors and successors of all loop activities
///
/// Every loop activity is a key of both returned maps (possibly with no entries).
/// Successors are counted regardless of whether they are loop activities themselves;
/// use [`filter_loop_successors`] to restrict them to loop activities.
///
pub fn extract_loop_relations(
    log: &CaseLog,
    loop_activities: &LoopActivitySet,
) -> (PredecessorMap, SuccessorMap) {
    let mut predecessors: PredecessorMap = loop_activities
        .iter()
        .map(|act| (act.clone(), HashSet::new()))
        .collect();
    let mut successors: SuccessorMap = loop_activities
        .iter()
        .map(|act| (act.clone(), HashMap::new()))
        .collect();

    for case in log.sequences() {
        for (i, act) in case.iter().enumerate() {
            let (Some(preds), Some(succs)) =
                (predecessors.get_mut(act), successors.get_mut(act))
            else {
                continue;
            };
            if let Some(prev) = i.checked_sub(1).map(|j| &case[j]) {
                if !preds.contains(prev) {
                    preds.insert(prev.clone());
                }
            }
            if let Some(next) = case.get(i + 1) {
                match succs.get_mut(next) {
                    Some(count) => *count += 1,
                    None => {
                        succs.insert(next.clone(), 1);
                    }
                }
            }
        }
    }

    (predecessors, successors)
}

///
/// Restrict a [`SuccessorMap`] to pairs of loop activities
///
/// Keys are all loop activities; successors which are not loop activities are dropped.
///
pub fn filter_loop_successors(
    successors: &SuccessorMap,
    loop_activities: &LoopActivitySet,
) -> SuccessorMap {
    let mut filtered: SuccessorMap = loop_activities
        .iter()
        .map(|act| (act.clone(), HashMap::new()))
        .collect();
    for (act, next_acts) in successors {
        let Some(loop_succs) = filtered.get_mut(act) else {
            continue;
        };
        for (next_act, count) in next_acts {
            if loop_activities.contains(next_act) {
                *loop_succs.entry(next_act.clone()).or_default() += count;
            }
        }
    }
    filtered
}

///
/// Flatten a (filtered) [`SuccessorMap`] into a [`DirectlyFollowsGraph`]
///
/// Every `(activity, successor)` pair with a positive count becomes a relation weighted by that
/// count; activities without successors do not contribute to the graph.
///
pub fn successors_to_dfg(successors: &SuccessorMap) -> DirectlyFollowsGraph {
    successors
        .iter()
        .flat_map(|(source, targets)| {
            targets
                .iter()
                .map(move |(target, weight)| ((source.clone(), target.clone()), *weight))
        })
        .collect()
}
