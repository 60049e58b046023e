//! Stratified Sampling of Cases
//!
//! Cases are layered by whether they contain every loop activity. Samples favor the first
//! stratum and are filled up from the second one.
use rand::{seq::index, Rng};
use tracing::{debug, warn};

use crate::core::event_data::case_centric::{ActivitySet, CaseLog};

/// Logs with at least this many cases use [`LARGE_LOG_SAMPLE_RATIO`]
pub const LARGE_LOG_THRESHOLD: usize = 10_000;
/// Logs with at least this many cases (and fewer than [`LARGE_LOG_THRESHOLD`]) use [`MEDIUM_LOG_SAMPLE_RATIO`]
pub const MEDIUM_LOG_THRESHOLD: usize = 1_000;

/// Sampling ratio for large logs
pub const LARGE_LOG_SAMPLE_RATIO: f64 = 0.05;
/// Sampling ratio for medium-sized logs
pub const MEDIUM_LOG_SAMPLE_RATIO: f64 = 0.10;
/// Sampling ratio for small logs
pub const SMALL_LOG_SAMPLE_RATIO: f64 = 0.15;

/// Default fraction of cases to sample from a log with `num_cases` cases
pub fn determine_sample_ratio(num_cases: usize) -> f64 {
    if num_cases >= LARGE_LOG_THRESHOLD {
        LARGE_LOG_SAMPLE_RATIO
    } else if num_cases >= MEDIUM_LOG_THRESHOLD {
        MEDIUM_LOG_SAMPLE_RATIO
    } else {
        SMALL_LOG_SAMPLE_RATIO
    }
}

///
/// Number of cases to sample from a log with `num_cases` cases
///
/// A requested count is clamped to `num_cases`. Without one, the count is
/// `floor(num_cases * determine_sample_ratio(num_cases))`.
///
pub fn desired_sample_count(num_cases: usize, desired: Option<usize>) -> usize {
    match desired {
        Some(desired) => desired.min(num_cases),
        None => (num_cases as f64 * determine_sample_ratio(num_cases)).floor() as usize,
    }
}

///
/// Partition the cases of a log into two strata
///
/// The first stratum contains the cases in which every loop activity occurs at least once;
/// the second stratum contains all remaining cases.
/// With an empty set of loop activities, all cases belong to the first stratum.
///
/// Sequences are shared with the input log, not copied.
///
pub fn stratified_layering(log: &CaseLog, loop_activities: &ActivitySet) -> (CaseLog, CaseLog) {
    let (complete, partial): (CaseLog, CaseLog) = log
        .iter()
        .map(|(case_id, case)| (case_id.clone(), case.clone()))
        .partition(|(_, case)| {
            loop_activities
                .iter()
                .all(|loop_act| case.iter().any(|act| act == loop_act))
        });
    debug!(
        "Layered {} cases into strata of sizes {} and {}",
        log.len(),
        complete.len(),
        partial.len()
    );
    (complete, partial)
}

/// Draw `amount` cases of `layer` uniformly without replacement and add them to `sample`
fn sample_from_layer<R: Rng + ?Sized>(
    layer: &CaseLog,
    amount: usize,
    rng: &mut R,
    sample: &mut CaseLog,
) {
    let cases: Vec<_> = layer.iter().collect();
    let amount = amount.min(cases.len());
    sample.extend(
        index::sample(rng, cases.len(), amount)
            .into_iter()
            .map(|i| (cases[i].0.clone(), cases[i].1.clone())),
    );
}

///
/// Draw a stratified sample of (up to) `sample_size` cases
///
/// If the first stratum holds at least `sample_size` cases, the sample is drawn from it alone.
/// Otherwise, all cases of the first stratum are taken and the remainder is drawn from the
/// second stratum. If both strata together hold fewer than `sample_size` cases, the result
/// contains all of them.
///
/// All draws are uniform and without replacement, using the passed random number generator.
///
/// ```rust
/// use loop_sampling::{case_log, stratified_sampling};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let complete = case_log!("c1" => ["a", "a"], "c2" => ["a", "b", "a"]);
/// let partial = case_log!("c3" => ["b"], "c4" => ["c"]);
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let sample = stratified_sampling(&complete, &partial, 3, &mut rng);
/// assert_eq!(sample.len(), 3);
/// assert!(complete.is_sub_log_of(&sample));
/// ```
pub fn stratified_sampling<R: Rng + ?Sized>(
    layer_1: &CaseLog,
    layer_2: &CaseLog,
    sample_size: usize,
    rng: &mut R,
) -> CaseLog {
    let mut sample = CaseLog::new();
    if layer_1.len() >= sample_size {
        sample_from_layer(layer_1, sample_size, rng, &mut sample);
    } else {
        sample.extend(layer_1.iter().map(|(id, case)| (id.clone(), case.clone())));
        sample_from_layer(layer_2, sample_size - layer_1.len(), rng, &mut sample);
    }

    if sample.len() < sample_size {
        warn!(
            "Requested {} cases, but only {} are available",
            sample_size,
            sample.len()
        );
    }
    debug!("Sampled {} cases", sample.len());
    sample
}
