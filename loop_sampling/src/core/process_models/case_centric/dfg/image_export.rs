use std::{fs::File, io::Write};

use graphviz_rust::{
    cmd::Format,
    dot_generator::{attr, edge, graph, id, node, node_id, stmt},
    dot_structures::*,
    printer::{DotPrinter, PrinterContext},
};
use itertools::Itertools;
use uuid::Uuid;

use super::dfg_struct::{DfgImageFormat, DfgRenderConfig, DirectlyFollowsGraph};

impl From<DfgImageFormat> for Format {
    fn from(value: DfgImageFormat) -> Self {
        match value {
            DfgImageFormat::Png => Format::Png,
            DfgImageFormat::Svg => Format::Svg,
            DfgImageFormat::Pdf => Format::Pdf,
        }
    }
}

///
/// Export the image of a [`DirectlyFollowsGraph`]
///
/// Format, colors and layout direction are taken from the [`DfgRenderConfig`].
/// Also consider using [`DirectlyFollowsGraph::export_image`] for convenience.
///
pub fn export_dfg_image<P: AsRef<std::path::Path>>(
    dfg: &DirectlyFollowsGraph,
    path: P,
    config: &DfgRenderConfig,
) -> Result<(), std::io::Error> {
    let g = export_dfg_to_dot_graph(dfg, config);

    let format: Format = config.format.into();
    let out = graphviz_rust::exec(g, &mut PrinterContext::default(), vec![format.into()])?;

    let mut f = File::create(path)?;
    f.write_all(&out)?;
    Ok(())
}

///
/// Export a [`DirectlyFollowsGraph`] to a DOT graph (used in Graphviz)
///
/// Every relation is labeled with its frequency.
///
pub fn export_dfg_to_dot_graph(dfg: &DirectlyFollowsGraph, config: &DfgRenderConfig) -> Graph {
    let font_size = config.font_size;
    let activity_nodes: Vec<Stmt> = dfg
        .activities
        .iter()
        .sorted()
        .map(|act| {
            stmt!(node!(esc act; attr!("label", esc act), attr!("shape","box"), attr!("fontsize",font_size), attr!("style","filled"), attr!("fillcolor","white"), attr!("height",0.5)))
        })
        .collect();

    let arcs: Vec<Stmt> = dfg
        .directly_follows_relations
        .iter()
        .sorted()
        .map(|((from, to), &frequency)| {
            let attrs = vec![attr!("label", (format!("{}", frequency)))];
            stmt!(edge!(node_id!(esc from) => node_id!(esc to), attrs))
        })
        .collect();

    let rank_dir = &config.rank_dir;
    let background_color = &config.background_color;
    let mut global_graph_options = vec![
        stmt!(attr!("rankdir", rank_dir)),
        stmt!(attr!("bgcolor", esc background_color)),
    ];
    if config.format == DfgImageFormat::Png {
        global_graph_options.push(stmt!(attr!("dpi", (2.0 * 96.0))))
    }

    graph!(strict di id!(esc Uuid::new_v4()),vec![global_graph_options,activity_nodes, arcs].into_iter().flatten().collect())
}

///
/// Convert a DOT graph to a String containing the DOT source
///
pub fn graph_to_dot(g: &Graph) -> String {
    g.print(&mut PrinterContext::default())
}
