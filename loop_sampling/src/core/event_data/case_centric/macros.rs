//! Macros for the creation of [`CaseLog`](super::CaseLog)s

/// Create a [`CaseLog`].
///
/// A case log is denoted by a comma-separated list of `case_id => [activity, ...]` mappings.
/// Case identifiers are literals or identifiers converted via `to_string()`; `None` denotes the
/// unknown case. Repeated case identifiers are appended to the same case.
///
/// # Examples
///
/// ```rust
/// use loop_sampling::case_log;
///
/// let log = case_log!(
///     "c1" => ["register", "check", "check", "close"],
///     "c2" => ["register", "close"],
///     None => ["register"],
/// );
/// assert_eq!(log.len(), 3);
/// assert_eq!(log.num_events(), 7);
/// ```
///
/// [`CaseLog`]: crate::core::event_data::case_centric::CaseLog
#[macro_export]
macro_rules! case_log {
    (@case_id None) => {
        None
    };
    (@case_id $id:tt) => {
        Some($id.to_string())
    };
    ($($id:tt => [$($activity:expr),* $(,)?]),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut builder = $crate::core::event_data::case_centric::CaseLogBuilder::default();
        $(
            let activities: ::std::vec::Vec<$crate::core::event_data::case_centric::ActivityLabel> =
                vec![$($activity.to_string()),*];
            builder.add_case($crate::case_log!(@case_id $id), activities);
        )*
        builder.build()
    }};
}
