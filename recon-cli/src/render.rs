//! Graphviz DOT rendering.
//!
//! Encodes the metrics visually:
//!
//! - node width/height ∝ LOC (0.5 to 3.0 inches)
//! - fill colour ∝ PageRank, white to red
//! - border width ∝ cyclomatic complexity (1 to 5)
//! - edge width and label = import count; reciprocal imports share one
//!   two-headed edge labelled `w1/w2`
//!
//! Edges are written before nodes so that nodes are drawn on top.

use recon_core::graph::{DepGraph, EdgeWeight, NodeMetrics};

/// Graph-level layout options.
#[derive(Debug, Clone)]
pub struct DotOptions {
    /// Graphviz layout engine hint (`neato`, `dot`, `fdp`, ...).
    pub layout: String,
    /// Output resolution when Graphviz renders to a bitmap.
    pub dpi: u32,
    /// Emit the legend cluster.
    pub legend: bool,
}

impl Default for DotOptions {
    fn default() -> Self {
        DotOptions {
            layout: "neato".to_string(),
            dpi: 300,
            legend: true,
        }
    }
}

const LEGEND: &str = r#"<
<TABLE BORDER="0" CELLBORDER="1" CELLSPACING="0" CELLPADDING="4" BGCOLOR="white">
  <TR><TD ALIGN="LEFT">Node area</TD><TD>LOC</TD></TR>
  <TR><TD ALIGN="LEFT">Fill color</TD><TD>PageRank</TD></TR>
  <TR><TD ALIGN="LEFT">Border thickness</TD><TD>Cyclomatic Complexity</TD></TR>
  <TR><TD ALIGN="LEFT">Edge thickness</TD><TD>Import count</TD></TR>
  <TR><TD ALIGN="LEFT">Edge label</TD><TD>Import count</TD></TR>
</TABLE>
>"#;

/// Min-max range of one metric.
#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        values.fold(
            Range {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |r, v| Range {
                min: r.min.min(v),
                max: r.max.max(v),
            },
        )
    }

    /// Position of `v` in the range; 1.0 when the range is degenerate.
    fn normalize(&self, v: f64) -> f64 {
        if self.max > self.min {
            (v - self.min) / (self.max - self.min)
        } else {
            1.0
        }
    }
}

/// Render a graph whose nodes carry metrics as DOT.
pub fn render_dot<N, E>(graph: &DepGraph<N, E>, options: &DotOptions) -> String
where
    N: NodeMetrics,
    E: EdgeWeight,
{
    let mut out = String::new();

    out.push_str("digraph architecture {\n");
    out.push_str(&format!(
        "    graph [layout={}, dpi={}, overlap=false, splines=ortho, K=0.3, nodesep=0.2, ranksep=0.3, pad=0.2];\n",
        options.layout, options.dpi
    ));
    out.push_str("    edge [color=gray50, fontsize=10, fontcolor=gray20];\n");
    out.push_str("    node [style=\"filled,rounded\", shape=box, fontsize=12, fontcolor=black];\n\n");

    for (from, to, edge) in graph.edges() {
        let w = edge.weight();
        match graph.edge(to, from) {
            // Reciprocal pair: emitted once, from the smaller name.
            Some(back) if from != to => {
                if from < to {
                    let back = back.weight();
                    let pen = penwidth(w.max(back));
                    out.push_str(&format!(
                        "    \"{}\" -> \"{}\" [penwidth={pen}, label=\"{w}/{back}\", dir=both];\n",
                        escape_dot_label(from),
                        escape_dot_label(to)
                    ));
                }
            }
            _ => {
                out.push_str(&format!(
                    "    \"{}\" -> \"{}\" [penwidth={}, label=\"{w}\", dir=forward];\n",
                    escape_dot_label(from),
                    escape_dot_label(to),
                    penwidth(w)
                ));
            }
        }
    }

    out.push('\n');

    let loc = Range::of(graph.nodes().map(|(_, n)| n.metrics().loc as f64));
    let pagerank = Range::of(graph.nodes().map(|(_, n)| n.metrics().pagerank));
    let cc = Range::of(graph.nodes().map(|(_, n)| n.metrics().cc as f64));

    for (name, node) in graph.nodes() {
        let m = node.metrics();
        let size = 0.5 + loc.normalize(m.loc as f64) * (3.0 - 0.5);
        let fill = fill_color(pagerank.normalize(m.pagerank));
        let pen = 1.0 + cc.normalize(m.cc as f64) * 4.0;
        out.push_str(&format!(
            "    \"{}\" [label=\"{}\", width={size:.2}, height={size:.2}, fillcolor=\"{fill}\", penwidth={pen}];\n",
            escape_dot_label(name),
            escape_dot_label(short_label(name))
        ));
    }

    if options.legend {
        out.push_str("\n    subgraph cluster_legend {\n");
        out.push_str("        label=\"Legend\";\n        labelloc=b;\n        fontsize=10;\n");
        out.push_str(&format!(
            "        legend [shape=box, style=filled, fillcolor=white, margin=0.1, label={LEGEND}];\n"
        ));
        out.push_str("    }\n");
    }

    out.push_str("}\n");
    out
}

/// Edge width for an import count, capped at 4.
fn penwidth(weight: u32) -> f64 {
    (0.3 + f64::from(weight)).min(4.0)
}

/// `#ffGGBB` fading from white (0.0) to red (1.0).
fn fill_color(norm: f64) -> String {
    let gb = (255.0 * (1.0 - norm)) as u8;
    format!("#ff{gb:02x}{gb:02x}")
}

/// Last dotted segment of a name.
fn short_label(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Escape special characters for DOT labels
fn escape_dot_label(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
