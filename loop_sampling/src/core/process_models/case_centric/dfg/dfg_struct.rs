use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::{HashMap, HashSet};

use crate::core::event_data::case_centric::ActivityLabel;

/// A directly-follows graph of activities.
///
/// Graph containing a set of activities and weighted relations between pairs of activities.
/// The weight of a relation is the (positive) number of times it was observed; relations with
/// weight 0 are never stored.
///
/// Used both for the loop successor graph and for visualizing direct/indirect follow counts.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectlyFollowsGraph {
    /// Activities
    pub activities: HashSet<ActivityLabel>,
    /// Directly-follows relations
    #[serde_as(as = "Vec<(_, _)>")]
    pub directly_follows_relations: HashMap<(ActivityLabel, ActivityLabel), u64>,
}

impl DirectlyFollowsGraph {
    /// Create new [`DirectlyFollowsGraph`] with no activities and directly-follows relations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Add an activity.
    pub fn add_activity<S: Into<ActivityLabel>>(&mut self, activity: S) {
        self.activities.insert(activity.into());
    }

    /// Checks if an activity is already contained in the directly-follows graph.
    pub fn contains_activity<S: AsRef<str>>(&self, activity: S) -> bool {
        self.activities.contains(activity.as_ref())
    }

    /// Removes an activity (and all its relations) from the directly-follows graph.
    pub fn remove_activity<S: AsRef<str>>(&mut self, activity: S) {
        let activity = activity.as_ref();
        if self.activities.remove(activity) {
            self.directly_follows_relations
                .retain(|(from, to), _| from != activity && to != activity);
        }
    }

    /// Add a directly-follows relation with a frequency.
    ///
    /// Both activities are added to the graph.
    /// If the directly-follows relation already exists, the frequency count is added to the
    /// existing directly-follows relation.
    /// A frequency of 0 is ignored.
    pub fn add_df_relation<S: Into<ActivityLabel>, T: Into<ActivityLabel>>(
        &mut self,
        from: S,
        to: T,
        frequency: u64,
    ) {
        if frequency == 0 {
            return;
        }
        let (from, to) = (from.into(), to.into());
        self.activities.insert(from.clone());
        self.activities.insert(to.clone());
        *self
            .directly_follows_relations
            .entry((from, to))
            .or_default() += frequency;
    }

    /// Checks if a directly-follows relation is already contained in the directly-follows graph.
    pub fn contains_df_relation<S: AsRef<str>>(&self, (a, b): (S, S)) -> bool {
        self.df_frequency((a, b)) > 0
    }

    /// Frequency of a directly-follows relation (0 if the relation is not contained)
    pub fn df_frequency<S: AsRef<str>>(&self, (a, b): (S, S)) -> u64 {
        self.directly_follows_relations
            .get(&(a.as_ref().to_string(), b.as_ref().to_string()))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of the frequencies of all directly-follows relations
    pub fn total_frequency(&self) -> u64 {
        self.directly_follows_relations.values().sum()
    }

    /// Returns the ingoing activities of an activity in the directly-follows graph.
    pub fn ingoing_activities<S: AsRef<str>>(&self, activity: S) -> HashSet<&ActivityLabel> {
        self.directly_follows_relations
            .keys()
            .filter_map(|(x, y)| if y == activity.as_ref() { Some(x) } else { None })
            .collect()
    }

    /// Returns the outgoing activities of an activity in the directly-follows graph.
    pub fn outgoing_activities<S: AsRef<str>>(&self, activity: S) -> HashSet<&ActivityLabel> {
        self.directly_follows_relations
            .keys()
            .filter_map(|(x, y)| if x == activity.as_ref() { Some(y) } else { None })
            .collect()
    }

    #[cfg(feature = "graphviz-export")]
    /// Export directly-follows graph as an image
    ///
    /// The image file is written to the specified filepath, using the format, colors and layout
    /// given in the [`DfgRenderConfig`].
    ///
    /// _Note_: This is an export method for __visualizing__ the directly-follows graph.
    ///
    /// Only available with the `graphviz-export` feature.
    pub fn export_image<P: AsRef<std::path::Path>>(
        &self,
        path: P,
        config: &DfgRenderConfig,
    ) -> Result<(), std::io::Error> {
        super::image_export::export_dfg_image(self, path, config)
    }
}

impl FromIterator<((ActivityLabel, ActivityLabel), u64)> for DirectlyFollowsGraph {
    fn from_iter<T: IntoIterator<Item = ((ActivityLabel, ActivityLabel), u64)>>(
        iter: T,
    ) -> Self {
        let mut graph = Self::new();
        for ((from, to), frequency) in iter {
            graph.add_df_relation(from, to, frequency);
        }
        graph
    }
}

/// Image formats for rendering a [`DirectlyFollowsGraph`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DfgImageFormat {
    /// PNG raster image
    #[default]
    Png,
    /// SVG vector image
    Svg,
    /// PDF document
    Pdf,
}

/// Configuration for rendering a [`DirectlyFollowsGraph`]
///
/// Rendering itself is done by graphviz (see the `graphviz-export` feature).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DfgRenderConfig {
    /// Output format
    pub format: DfgImageFormat,
    /// Background color (graphviz color name or `#RRGGBB`)
    pub background_color: String,
    /// Font size of activity labels
    pub font_size: u32,
    /// Layout direction (graphviz `rankdir`, e.g., `LR` or `TB`)
    pub rank_dir: String,
}

impl Default for DfgRenderConfig {
    fn default() -> Self {
        Self {
            format: DfgImageFormat::Png,
            background_color: "white".to_string(),
            font_size: 12,
            rank_dir: "LR".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    pub const SAMPLE_JSON_DFG: &str = r#"
{
    "activities": ["check", "repair", "close"],
    "directly_follows_relations": [
        [
            ["check","repair"],
            4
        ],
        [
            ["repair","check"],
            4
        ],
        [
            ["check","check"],
            1
        ],
        [
            ["repair","close"],
            2
        ]
    ]
}"#;

    use super::*;

    #[test]
    fn directly_follows_graph() {
        let mut graph = DirectlyFollowsGraph::new();
        graph.add_df_relation("check", "repair", 3);
        graph.add_df_relation("repair", "check", 4);
        graph.add_df_relation("check", "repair", 1);
        graph.add_df_relation("repair", "close", 0);
        graph.add_activity("register");

        assert_eq!(graph.df_frequency(("check", "repair")), 4);
        assert!(graph.contains_df_relation(("repair", "check")));
        assert!(!graph.contains_df_relation(("repair", "close")));
        assert!(!graph.contains_activity("close"));
        assert!(graph.contains_activity("register"));
        assert_eq!(graph.total_frequency(), 8);

        let outgoing = graph.outgoing_activities("check");
        assert_eq!(outgoing.len(), 1);
        assert!(outgoing.contains(&"repair".to_string()));
        assert_eq!(graph.ingoing_activities("register").len(), 0);

        graph.remove_activity("repair");
        assert!(graph.directly_follows_relations.is_empty());
        assert_eq!(graph.activities.len(), 2);
    }

    #[test]
    fn deserialize_dfg_test() {
        let dfg: DirectlyFollowsGraph = serde_json::from_str(SAMPLE_JSON_DFG).unwrap();
        assert!(dfg.activities.len() == 3);
        assert!(dfg.directly_follows_relations.len() == 4);
        assert_eq!(dfg.df_frequency(("repair", "close")), 2);

        let json = dfg.to_json().unwrap();
        let again: DirectlyFollowsGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(dfg, again);
    }

    #[test]
    fn collect_skips_zero_weights() {
        let dfg: DirectlyFollowsGraph = [
            (("a".to_string(), "b".to_string()), 2),
            (("b".to_string(), "c".to_string()), 0),
        ]
        .into_iter()
        .collect();
        assert_eq!(dfg.directly_follows_relations.len(), 1);
        assert!(!dfg.contains_activity("c"));
    }

    #[test]
    fn render_config_defaults() {
        let config: DfgRenderConfig = serde_json::from_str(r#"{"format": "svg"}"#).unwrap();
        assert_eq!(config.format, DfgImageFormat::Svg);
        assert_eq!(config.background_color, "white");
        assert_eq!(config.font_size, 12);
        assert_eq!(config.rank_dir, "LR");
    }
}
