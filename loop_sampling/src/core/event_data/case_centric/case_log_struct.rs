use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::constants::UNKNOWN_CASE_PREFIX;

/// Label of a recorded activity (e.g., `"Register Request"`)
///
/// Two labels refer to the same activity if and only if they are equal strings.
pub type ActivityLabel = String;

/// Identifier of a case
///
/// `None` is the _unknown case_, i.e., a case for which no identifier was recorded.
pub type CaseId = Option<String>;

/// Ordered activity labels recorded for a single case
///
/// Sequences are shared (and never mutated) between a [`CaseLog`] and all logs derived from it
/// (e.g., strata or samples).
pub type ActivitySequence = Arc<[ActivityLabel]>;

/// Set of activity labels
pub type ActivitySet = HashSet<ActivityLabel>;

///
/// Case-centric activity log
///
/// Maps every case (by its [`CaseId`]) to the [`ActivitySequence`] recorded for it.
/// The order of activities within a sequence is exactly the recorded order.
///
/// Cases are kept ordered by their identifier (with the unknown case first).
/// Case order carries no meaning, but makes iteration (and thus seeded sampling) deterministic.
///
/// Use [`CaseLogBuilder`] or the [`case_log!`](crate::case_log) macro to construct logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SerializedCaseLog", into = "SerializedCaseLog")]
pub struct CaseLog {
    cases: BTreeMap<CaseId, ActivitySequence>,
}

impl CaseLog {
    /// Create a new [`CaseLog`] without any cases
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cases
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns `true` if the log contains no cases
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Total number of recorded events (over all cases)
    pub fn num_events(&self) -> usize {
        self.cases.values().map(|seq| seq.len()).sum()
    }

    /// Get the activity sequence of a case
    pub fn get(&self, case_id: &CaseId) -> Option<&ActivitySequence> {
        self.cases.get(case_id)
    }

    /// Check whether a case with the given identifier is contained
    pub fn contains_case(&self, case_id: &CaseId) -> bool {
        self.cases.contains_key(case_id)
    }

    /// Insert (or replace) a case
    ///
    /// Returns the previous sequence of the case, if it was already present.
    pub fn insert_case<S: Into<ActivitySequence>>(
        &mut self,
        case_id: CaseId,
        activities: S,
    ) -> Option<ActivitySequence> {
        self.cases.insert(case_id, activities.into())
    }

    /// Iterate over all cases and their activity sequences
    pub fn iter(&self) -> impl Iterator<Item = (&CaseId, &ActivitySequence)> + '_ {
        self.cases.iter()
    }

    /// Iterate over all case identifiers
    pub fn case_ids(&self) -> impl Iterator<Item = &CaseId> + '_ {
        self.cases.keys()
    }

    /// Iterate over all activity sequences
    pub fn sequences(&self) -> impl Iterator<Item = &ActivitySequence> + '_ {
        self.cases.values()
    }

    /// Parallel iterator over all activity sequences
    pub fn par_sequences(&self) -> impl ParallelIterator<Item = &ActivitySequence> + '_ {
        self.cases.par_iter().map(|(_, seq)| seq)
    }

    /// All distinct activity labels occurring in the log
    pub fn activities(&self) -> ActivitySet {
        self.sequences()
            .flat_map(|seq| seq.iter().cloned())
            .collect()
    }

    /// Check whether every case of this log is also contained in `other` with an equal sequence
    pub fn is_sub_log_of(&self, other: &CaseLog) -> bool {
        self.iter()
            .all(|(case_id, seq)| other.get(case_id).is_some_and(|o| o == seq))
    }
}

impl FromIterator<(CaseId, ActivitySequence)> for CaseLog {
    fn from_iter<T: IntoIterator<Item = (CaseId, ActivitySequence)>>(iter: T) -> Self {
        Self {
            cases: iter.into_iter().collect(),
        }
    }
}

impl Extend<(CaseId, ActivitySequence)> for CaseLog {
    fn extend<T: IntoIterator<Item = (CaseId, ActivitySequence)>>(&mut self, iter: T) {
        self.cases.extend(iter)
    }
}

impl<'a> IntoIterator for &'a CaseLog {
    type Item = (&'a CaseId, &'a ActivitySequence);
    type IntoIter = std::collections::btree_map::Iter<'a, CaseId, ActivitySequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

///
/// Policy for cases without a recorded case identifier
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCasePolicy {
    /// All unidentified cases are collapsed into a single unknown case (with [`CaseId`] `None`)
    ///
    /// Their activities are appended to that case in the order in which they are added.
    #[default]
    Merge,
    /// Every unidentified case receives its own surrogate identifier
    /// (see [`UNKNOWN_CASE_PREFIX`](super::constants::UNKNOWN_CASE_PREFIX))
    ///
    /// If a recorded case later uses an issued surrogate identifier, the unidentified case
    /// moves to the next free surrogate identifier.
    Surrogate,
}

///
/// Incrementally construct a [`CaseLog`]
///
/// Events added for an already known case identifier are appended to that case.
/// Cases without identifier are handled according to the configured [`UnknownCasePolicy`].
///
/// ```rust
/// use loop_sampling::core::event_data::case_centric::{CaseLogBuilder, UnknownCasePolicy};
///
/// let mut builder = CaseLogBuilder::new(UnknownCasePolicy::Surrogate);
/// builder.add_case(Some("c1".to_string()), ["a", "b"]);
/// builder.add_case(None, ["a"]);
/// builder.add_case(None, ["b"]);
/// let log = builder.build();
/// assert_eq!(log.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaseLogBuilder {
    cases: BTreeMap<CaseId, Vec<ActivityLabel>>,
    policy: UnknownCasePolicy,
    next_surrogate: usize,
    open_surrogate: Option<CaseId>,
    issued_surrogates: HashSet<String>,
}

impl CaseLogBuilder {
    /// Create a new builder using the given [`UnknownCasePolicy`]
    pub fn new(policy: UnknownCasePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Add a complete case
    ///
    /// If `case_id` is already present, the activities are appended to the existing case.
    pub fn add_case<I, S>(&mut self, case_id: CaseId, activities: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<ActivityLabel>,
    {
        self.open_surrogate = None;
        let key = self.resolve_case_id(case_id);
        self.cases
            .entry(key)
            .or_default()
            .extend(activities.into_iter().map(Into::into));
    }

    /// Add a single event to a case
    ///
    /// Used for flat event tables: for [`UnknownCasePolicy::Surrogate`], consecutive unidentified
    /// events are considered to belong to the same case.
    pub fn add_event<S: Into<ActivityLabel>>(&mut self, case_id: CaseId, activity: S) {
        let key = match case_id {
            Some(id) => {
                self.open_surrogate = None;
                self.resolve_case_id(Some(id))
            }
            None => match &self.open_surrogate {
                Some(open) => open.clone(),
                None => {
                    let key = self.resolve_case_id(None);
                    if self.policy == UnknownCasePolicy::Surrogate {
                        self.open_surrogate = Some(key.clone());
                    }
                    key
                }
            },
        };
        self.cases.entry(key).or_default().push(activity.into());
    }

    fn resolve_case_id(&mut self, case_id: CaseId) -> CaseId {
        match (case_id, self.policy) {
            (Some(id), _) => {
                self.release_surrogate(&id);
                Some(id)
            }
            (None, UnknownCasePolicy::Merge) => None,
            (None, UnknownCasePolicy::Surrogate) => loop {
                let candidate = Some(format!("{UNKNOWN_CASE_PREFIX}{}", self.next_surrogate));
                self.next_surrogate += 1;
                if !self.cases.contains_key(&candidate) {
                    if let Some(id) = &candidate {
                        self.issued_surrogates.insert(id.clone());
                    }
                    break candidate;
                }
            },
        }
    }

    /// Move an unidentified case away from a surrogate id that is recorded for another case
    fn release_surrogate(&mut self, id: &str) {
        if !self.issued_surrogates.remove(id) {
            return;
        }
        let taken = Some(id.to_string());
        let Some(activities) = self.cases.remove(&taken) else {
            return;
        };
        let moved = self.resolve_case_id(None);
        self.cases.insert(moved, activities);
    }

    /// Number of cases added so far
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns `true` if no case was added yet
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Finish construction
    pub fn build(self) -> CaseLog {
        self.cases
            .into_iter()
            .map(|(case_id, activities)| (case_id, ActivitySequence::from(activities)))
            .collect()
    }
}

/// Serialized form of a single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CaseRecord {
    pub(crate) case_id: CaseId,
    pub(crate) activities: Vec<ActivityLabel>,
}

/// Serialized form of a [`CaseLog`]: `{"cases": [{"case_id": ..., "activities": [...]}, ...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SerializedCaseLog {
    pub(crate) cases: Vec<CaseRecord>,
}

impl SerializedCaseLog {
    pub(crate) fn into_case_log(self, policy: UnknownCasePolicy) -> CaseLog {
        let mut builder = CaseLogBuilder::new(policy);
        for record in self.cases {
            builder.add_case(record.case_id, record.activities);
        }
        builder.build()
    }
}

impl From<SerializedCaseLog> for CaseLog {
    fn from(value: SerializedCaseLog) -> Self {
        value.into_case_log(UnknownCasePolicy::default())
    }
}

impl From<CaseLog> for SerializedCaseLog {
    fn from(value: CaseLog) -> Self {
        Self {
            cases: value
                .cases
                .into_iter()
                .map(|(case_id, activities)| CaseRecord {
                    case_id,
                    activities: activities.to_vec(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case_log;

    fn seq(activities: &[&str]) -> ActivitySequence {
        activities.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn builder_appends_to_known_cases() {
        let mut builder = CaseLogBuilder::default();
        builder.add_case(Some("c1".into()), ["a", "b"]);
        builder.add_case(Some("c2".into()), ["x"]);
        builder.add_case(Some("c1".into()), ["c"]);
        let log = builder.build();

        assert_eq!(log.len(), 2);
        assert_eq!(log.get(&Some("c1".into())), Some(&seq(&["a", "b", "c"])));
    }

    #[test]
    fn unknown_cases_are_merged_by_default() {
        let mut builder = CaseLogBuilder::default();
        builder.add_case(None, ["a", "b"]);
        builder.add_case(Some("c1".into()), ["x"]);
        builder.add_case(None, ["c"]);
        let log = builder.build();

        assert_eq!(log.len(), 2);
        assert_eq!(log.get(&None).unwrap().len(), 3);
        // Unknown case is ordered first
        assert_eq!(log.case_ids().next(), Some(&None));
    }

    #[test]
    fn unknown_cases_get_surrogate_ids() {
        let mut builder = CaseLogBuilder::new(UnknownCasePolicy::Surrogate);
        builder.add_case(None, ["a", "b"]);
        builder.add_case(Some("__UNKNOWN_CASE_1".into()), ["x"]);
        builder.add_case(None, ["c"]);
        let log = builder.build();

        assert_eq!(log.len(), 3);
        assert!(!log.contains_case(&None));
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_0".into())).unwrap().len(), 2);
        // `__UNKNOWN_CASE_1` is taken by a recorded case, so the next surrogate is skipped
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_1".into())).unwrap().len(), 1);
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_2".into())).unwrap().len(), 1);
    }

    #[test]
    fn recorded_ids_displace_earlier_surrogates() {
        let mut builder = CaseLogBuilder::new(UnknownCasePolicy::Surrogate);
        builder.add_case(None, ["a"]);
        builder.add_case(Some("__UNKNOWN_CASE_0".into()), ["b"]);
        builder.add_case(None, ["c"]);
        let log = builder.build();

        assert_eq!(log.len(), 3);
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_0".into())), Some(&seq(&["b"])));
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_1".into())), Some(&seq(&["a"])));
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_2".into())), Some(&seq(&["c"])));
    }

    #[test]
    fn recorded_event_ids_displace_open_surrogate() {
        let mut builder = CaseLogBuilder::new(UnknownCasePolicy::Surrogate);
        builder.add_event(None, "a");
        builder.add_event(Some("__UNKNOWN_CASE_0".into()), "x");
        builder.add_event(Some("__UNKNOWN_CASE_0".into()), "y");
        builder.add_event(None, "b");
        let log = builder.build();

        assert_eq!(log.len(), 3);
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_0".into())), Some(&seq(&["x", "y"])));
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_1".into())), Some(&seq(&["a"])));
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_2".into())), Some(&seq(&["b"])));
    }

    #[test]
    fn surrogate_events_group_consecutive_rows() {
        let mut builder = CaseLogBuilder::new(UnknownCasePolicy::Surrogate);
        builder.add_event(None, "a");
        builder.add_event(None, "b");
        builder.add_event(Some("c1".into()), "x");
        builder.add_event(None, "c");
        let log = builder.build();

        assert_eq!(log.len(), 3);
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_0".into())).unwrap().len(), 2);
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_1".into())).unwrap().len(), 1);
    }

    #[test]
    fn merged_events_share_unknown_case() {
        let mut builder = CaseLogBuilder::default();
        builder.add_event(None, "a");
        builder.add_event(Some("c1".into()), "x");
        builder.add_event(None, "b");
        let log = builder.build();

        assert_eq!(log.len(), 2);
        assert_eq!(log.get(&None), Some(&seq(&["a", "b"])));
    }

    #[test]
    fn case_log_macro_and_queries() {
        let log = case_log!(
            "c1" => ["a", "b", "a"],
            "c2" => ["c"],
            None => [],
        );
        assert_eq!(log.len(), 3);
        assert_eq!(log.num_events(), 4);
        assert_eq!(
            log.activities(),
            ActivitySet::from(["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert!(log.get(&None).unwrap().is_empty());
    }

    #[test]
    fn sub_log_check_compares_sequences() {
        let log = case_log!("c1" => ["a", "b"], "c2" => ["c"]);
        let sub: CaseLog = log
            .iter()
            .take(1)
            .map(|(id, seq)| (id.clone(), seq.clone()))
            .collect();
        assert!(sub.is_sub_log_of(&log));

        let altered = case_log!("c1" => ["a"]);
        assert!(!altered.is_sub_log_of(&log));
        let unknown = case_log!("c3" => ["a", "b"]);
        assert!(!unknown.is_sub_log_of(&log));
    }

    #[test]
    fn json_with_null_case_ids() {
        let json = r#"{"cases": [
            {"case_id": "c1", "activities": ["a", "b"]},
            {"case_id": null, "activities": ["c"]},
            {"case_id": null, "activities": ["d"]}
        ]}"#;
        let log: CaseLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(&None), Some(&seq(&["c", "d"])));

        let exported = serde_json::to_string(&log).unwrap();
        assert!(exported.contains(r#""case_id":null"#));
    }

    #[test]
    fn json_null_case_before_colliding_id() {
        let json = r#"{"cases": [
            {"case_id": null, "activities": ["a"]},
            {"case_id": "__UNKNOWN_CASE_0", "activities": ["b"]}
        ]}"#;
        let serialized: SerializedCaseLog = serde_json::from_str(json).unwrap();
        let log = serialized.into_case_log(UnknownCasePolicy::Surrogate);
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_0".into())), Some(&seq(&["b"])));
        assert_eq!(log.get(&Some("__UNKNOWN_CASE_1".into())), Some(&seq(&["a"])));
    }
}
