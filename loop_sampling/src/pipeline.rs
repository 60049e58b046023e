//! Loop Behavior Pipeline
//!
//! Wires loop detection, relation extraction, stratified sampling and follow counting together.
use std::{collections::BTreeSet, path::Path};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    analysis::case_centric::{
        follow_relations::{count_follow_relations, FollowCounts},
        loop_activities::{detect_loop_activities, LoopActivitySet},
        relations::{
            extract_loop_relations, filter_loop_successors, successors_to_dfg, PredecessorMap,
            SuccessorMap,
        },
    },
    core::{
        event_data::case_centric::{
            io::{LogImportError, LogSource},
            utils::stratified_sampling::{
                desired_sample_count, stratified_layering, stratified_sampling,
            },
            ActivitySet,
        },
        process_models::case_centric::dfg::DfgRenderConfig,
        CaseLog, DirectlyFollowsGraph,
    },
};

/// Errors of the loop behavior pipeline
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The case log could not be loaded
    #[error("log unavailable: {0}")]
    LogUnavailable(#[from] LogImportError),
    /// The pipeline configuration is malformed
    #[error("invalid pipeline configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// The pipeline configuration could not be read
    #[error("failed to read pipeline configuration: {0}")]
    ConfigIo(#[from] std::io::Error),
}

/// Parameters of [`analyze_loop_behavior`]
///
/// All fields are optional in the JSON representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of cases to sample (clamped to the number of cases)
    ///
    /// If unset, it is derived from the log size (see [`crate::determine_sample_ratio`]).
    pub desired_sample_count: Option<usize>,
    /// Seed for the random number generator used for sampling
    ///
    /// If unset, a fresh seed is taken from the operating system.
    pub seed: Option<u64>,
    /// Source activities for follow counting (defaults to the loop activities)
    pub group1: Option<BTreeSet<String>>,
    /// Target activities for follow counting (defaults to the loop activities)
    pub group2: Option<BTreeSet<String>>,
    /// Rendering parameters for graphs produced from the analysis
    pub render: DfgRenderConfig,
}

impl PipelineConfig {
    /// Serialize pipeline configuration to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize pipeline configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read pipeline configuration from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Random number generator for sampling, seeded from [`PipelineConfig::seed`] if set
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Activity groups used for follow counting
    ///
    /// Unset groups fall back to the passed loop activities.
    pub fn follow_groups(&self, loop_activities: &LoopActivitySet) -> (ActivitySet, ActivitySet) {
        let group = |g: &Option<BTreeSet<String>>| match g {
            Some(g) => g.iter().cloned().collect(),
            None => loop_activities.clone(),
        };
        (group(&self.group1), group(&self.group2))
    }
}

/// Strata and sample of a log
struct StratifiedSample {
    complete_cases: usize,
    partial_cases: usize,
    sample: CaseLog,
}

fn draw_stratified_sample<R: Rng + ?Sized>(
    log: &CaseLog,
    loop_activities: &LoopActivitySet,
    desired: Option<usize>,
    rng: &mut R,
) -> StratifiedSample {
    let sample_size = desired_sample_count(log.len(), desired);
    info!(
        cases = log.len(),
        sample_size, "Drawing stratified sample of cases"
    );
    let (complete, partial) = stratified_layering(log, loop_activities);
    let sample = stratified_sampling(&complete, &partial, sample_size, rng);
    StratifiedSample {
        complete_cases: complete.len(),
        partial_cases: partial.len(),
        sample,
    }
}

///
/// Load a log and draw a stratified sample of its cases
///
/// Loop activities are detected on the loaded log unless they are passed explicitly.
/// The sample size is `desired_sample_count` (clamped to the number of cases) or, if unset,
/// derived from the number of cases (see [`crate::determine_sample_ratio`]).
///
/// ```rust
/// use loop_sampling::{case_log, full_pipeline};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let log = case_log!(
///     "c1" => ["a", "b", "a"],
///     "c2" => ["b", "c"],
///     "c3" => ["b", "a", "a"],
/// );
/// let sample = full_pipeline(&log, None, Some(2), &mut StdRng::seed_from_u64(0)).unwrap();
/// assert_eq!(sample.len(), 2);
/// assert!(!sample.contains_case(&Some("c2".to_string())));
/// ```
pub fn full_pipeline<S: LogSource + ?Sized, R: Rng + ?Sized>(
    source: &S,
    loop_activities: Option<&LoopActivitySet>,
    desired_sample_count: Option<usize>,
    rng: &mut R,
) -> Result<CaseLog, PipelineError> {
    let log = source.load_case_log()?;
    debug!(
        cases = log.len(),
        events = log.num_events(),
        "Loaded case log"
    );
    let detected;
    let loop_activities = match loop_activities {
        Some(loop_activities) => loop_activities,
        None => {
            detected = detect_loop_activities(&log);
            &detected
        }
    };
    Ok(draw_stratified_sample(&log, loop_activities, desired_sample_count, rng).sample)
}

/// Result of [`analyze_loop_behavior`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopAnalysis {
    /// Activities occurring more than once in at least one case
    pub loop_activities: BTreeSet<String>,
    /// Immediate predecessors of every loop activity
    pub predecessors: PredecessorMap,
    /// Immediate successors of every loop activity, restricted to loop activities
    pub loop_successors: SuccessorMap,
    /// Loop successors as a weighted graph
    pub loop_dfg: DirectlyFollowsGraph,
    /// Number of cases containing every loop activity
    pub complete_cases: usize,
    /// Number of cases missing at least one loop activity
    pub partial_cases: usize,
    /// Sampled cases
    pub sample: CaseLog,
    /// Follow counts between the configured activity groups on the sampled cases
    pub follow_counts: FollowCounts,
}

///
/// Analyze the loop behavior of a [`CaseLog`]
///
/// Detects loop activities, extracts their (loop) relations, draws a stratified sample and
/// counts follow relations between the configured activity groups on the sample.
///
pub fn analyze_loop_behavior<R: Rng + ?Sized>(
    log: &CaseLog,
    config: &PipelineConfig,
    rng: &mut R,
) -> LoopAnalysis {
    let loop_activities = detect_loop_activities(log);
    info!(
        loop_activities = loop_activities.len(),
        "Detected loop activities"
    );

    let (predecessors, successors) = extract_loop_relations(log, &loop_activities);
    let loop_successors = filter_loop_successors(&successors, &loop_activities);
    let loop_dfg = successors_to_dfg(&loop_successors);
    debug!(
        relations = loop_dfg.directly_follows_relations.len(),
        "Built loop successor graph"
    );

    let StratifiedSample {
        complete_cases,
        partial_cases,
        sample,
    } = draw_stratified_sample(log, &loop_activities, config.desired_sample_count, rng);

    let (group1, group2) = config.follow_groups(&loop_activities);
    let follow_counts = count_follow_relations(&sample, &group1, &group2);
    info!(
        direct = follow_counts.direct.len(),
        indirect = follow_counts.indirect.len(),
        unmatched = follow_counts.unmatched_sources,
        "Counted follow relations on sample"
    );

    LoopAnalysis {
        loop_activities: loop_activities.into_iter().collect(),
        predecessors,
        loop_successors,
        loop_dfg,
        complete_cases,
        partial_cases,
        sample,
        follow_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{case_log, core::io::Importable, test_utils::get_test_data_path};

    #[test]
    fn pipeline_on_fixture() {
        let path = get_test_data_path().join("repair_loops.json");
        let log = CaseLog::import_from_path(&path).unwrap();

        let sample = full_pipeline(path.as_path(), None, None, &mut StdRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(sample.len(), 1);
        assert!(sample.is_sub_log_of(&log));

        let sample = full_pipeline(&path, None, Some(100), &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(sample, log);
    }

    #[test]
    fn pipeline_with_given_loop_activities() {
        let log = case_log!(
            "c1" => ["a", "b", "a"],
            "c2" => ["x", "y"],
            "c3" => ["x", "a"],
        );
        let loop_activities = LoopActivitySet::from(["x".to_string()]);
        let sample = full_pipeline(
            &log,
            Some(&loop_activities),
            Some(2),
            &mut StdRng::seed_from_u64(9),
        )
        .unwrap();
        assert_eq!(
            sample,
            case_log!("c2" => ["x", "y"], "c3" => ["x", "a"])
        );
    }

    #[test]
    fn missing_log_is_unavailable() {
        let res = full_pipeline(
            get_test_data_path().join("does_not_exist.json").as_path(),
            None,
            None,
            &mut StdRng::seed_from_u64(0),
        );
        assert!(matches!(res, Err(PipelineError::LogUnavailable(_))));
    }

    #[test]
    fn seeded_pipeline_is_reproducible() {
        let path = get_test_data_path().join("repair_loops.csv");
        let first = full_pipeline(&path, None, Some(5), &mut StdRng::seed_from_u64(11)).unwrap();
        let second = full_pipeline(&path, None, Some(5), &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn analyze_fixture() {
        let log = CaseLog::import_from_path(get_test_data_path().join("repair_loops.json"))
            .unwrap();
        let config = PipelineConfig {
            desired_sample_count: Some(4),
            seed: Some(1),
            ..Default::default()
        };
        let analysis = analyze_loop_behavior(&log, &config, &mut config.rng());

        assert_eq!(
            analysis.loop_activities,
            BTreeSet::from(["check".to_string(), "repair".to_string()])
        );
        assert_eq!(analysis.complete_cases, 4);
        assert_eq!(analysis.partial_cases, 4);
        assert_eq!(analysis.loop_dfg.total_frequency(), 10);

        // The sample is exactly the first stratum: c1, c3, c4 and c7
        assert_eq!(analysis.sample.len(), 4);
        assert!(analysis.sample.contains_case(&Some("c7".to_string())));
        let counts = &analysis.follow_counts;
        assert_eq!(counts.direct[&("check".to_string(), "repair".to_string())], 4);
        assert_eq!(counts.direct[&("repair".to_string(), "repair".to_string())], 1);
        assert_eq!(counts.direct.len(), 2);
        assert!(counts.indirect.is_empty());
        // Each trailing `check` right before `close` in c1, c3 and c7
        assert_eq!(counts.unmatched_sources, 3);
    }

    #[test]
    fn analyze_with_custom_groups() {
        let log = case_log!("c1" => ["a", "x", "a", "b"], "c2" => ["a", "b"]);
        let config = PipelineConfig::from_json(
            r#"{"desired_sample_count": 10, "seed": 3, "group1": ["a"], "group2": ["b"]}"#,
        )
        .unwrap();
        let analysis = analyze_loop_behavior(&log, &config, &mut config.rng());
        assert_eq!(analysis.sample, log);
        assert_eq!(
            analysis.follow_counts.indirect[&("a".to_string(), "b".to_string())],
            1
        );
        assert_eq!(
            analysis.follow_counts.direct[&("a".to_string(), "b".to_string())],
            1
        );
    }

    #[test]
    fn config_json() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());

        let config =
            PipelineConfig::from_json(r#"{"seed": 42, "render": {"rank_dir": "TB"}}"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.render.rank_dir, "TB");
        assert_eq!(config.render.font_size, 12);

        let again = PipelineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, again);

        assert!(matches!(
            PipelineConfig::from_json("{\"seed\": \"no\"}"),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_path(get_test_data_path().join("missing_config.json")),
            Err(PipelineError::ConfigIo(_))
        ));
    }
}
