//! SVG scene for a laid-out subgraph.
//!
//! Nodes are fixed-size circles with their compact identifier centered on
//! them; edges are arrows ending at the target's rim, labeled at their
//! midpoint with the compact predicate. Edges between the same pair of nodes
//! fan out as quadratic curves so each one stays visible. Self-loops are drawn
//! as a teardrop above the node.

use std::collections::HashMap;
use std::fmt::Write;

use petgraph::visit::EdgeRef;

use crate::config::RenderConfig;
use crate::graph::Subgraph;

use super::layout::Point;

const NODE_FILL: &str = "#9ecae1";
const FOCUS_FILL: &str = "#fdae6b";
const NODE_STROKE: &str = "#3182bd";
const EDGE_COLOR: &str = "#555555";
const TEXT_COLOR: &str = "#111111";
const NODE_FONT_SIZE: f64 = 12.0;
const EDGE_FONT_SIZE: f64 = 10.0;
/// Perpendicular spacing between parallel edges at their midpoint.
const PARALLEL_SPACING: f64 = 28.0;
/// Longest label drawn before truncation.
const MAX_LABEL_CHARS: usize = 24;

/// Build a complete SVG document.
///
/// `positions` are canvas coordinates indexed by node index. An empty
/// subgraph yields a document containing only the background.
pub fn build_scene(
    subgraph: &Subgraph,
    positions: &[Point],
    config: &RenderConfig,
) -> Result<String, std::fmt::Error> {
    let graph = subgraph.graph();
    let radius = f64::from(config.node_radius);
    let mut svg = String::new();

    writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"{font}\">",
        w = config.width,
        h = config.height,
        font = escape_xml(&config.font_family),
    )?;
    writeln!(
        svg,
        "  <defs><marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"8\" markerHeight=\"8\" orient=\"auto\"><path d=\"M0,0 L10,5 L0,10 z\" fill=\"{EDGE_COLOR}\"/></marker></defs>"
    )?;
    writeln!(
        svg,
        "  <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
        config.width,
        config.height,
        escape_xml(&config.background)
    )?;

    if graph.node_count() == 0 {
        svg.push_str("</svg>\n");
        return Ok(svg);
    }

    // Group edges by unordered endpoint pair so parallel and reverse edges fan out.
    let mut pairs: HashMap<(usize, usize), usize> = HashMap::new();
    for e in graph.edge_references() {
        let (a, b) = (e.source().index(), e.target().index());
        *pairs.entry((a.min(b), a.max(b))).or_default() += 1;
    }
    let mut seen: HashMap<(usize, usize), usize> = HashMap::new();

    let mut labels = String::new();
    for e in graph.edge_references() {
        let (a, b) = (e.source().index(), e.target().index());
        let key = (a.min(b), a.max(b));
        let total = pairs[&key];
        let slot = seen.entry(key).or_default();
        let rank = *slot;
        *slot += 1;

        let predicate = compact_label(&e.weight().predicate);
        let label_at = if a == b {
            write_self_loop(&mut svg, positions[a], radius, rank)?
        } else {
            // Offset measured against the canonical (low -> high) direction so
            // A->B and B->A pick different sides.
            let offset = (rank as f64 - (total as f64 - 1.0) / 2.0) * PARALLEL_SPACING;
            write_edge(&mut svg, positions, (a, b), key, offset, radius)?
        };
        writeln!(
            labels,
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{EDGE_FONT_SIZE}\" fill=\"{EDGE_COLOR}\" text-anchor=\"middle\" dominant-baseline=\"middle\" stroke=\"white\" stroke-width=\"3\" paint-order=\"stroke\">{}</text>",
            label_at.x,
            label_at.y,
            escape_xml(&predicate)
        )?;
    }
    svg.push_str(&labels);

    let ids: Vec<&str> = graph.node_indices().map(|idx| graph[idx].as_str()).collect();
    let node_labels = distinct_labels(&ids);

    for (idx, label) in graph.node_indices().zip(&node_labels) {
        let p = positions[idx.index()];
        let id = &graph[idx];
        let fill = if id == subgraph.entity() {
            FOCUS_FILL
        } else {
            NODE_FILL
        };
        writeln!(
            svg,
            "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{radius:.1}\" fill=\"{fill}\" stroke=\"{NODE_STROKE}\" stroke-width=\"1.5\"/>",
            p.x, p.y
        )?;
        writeln!(
            svg,
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{NODE_FONT_SIZE}\" fill=\"{TEXT_COLOR}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
            p.x,
            p.y,
            escape_xml(label)
        )?;
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Draw one non-loop edge; returns where its label goes.
fn write_edge(
    svg: &mut String,
    positions: &[Point],
    (from, to): (usize, usize),
    (lo, hi): (usize, usize),
    offset: f64,
    radius: f64,
) -> Result<Point, std::fmt::Error> {
    let p0 = positions[from];
    let p2 = positions[to];
    let (canon_from, canon_to) = (positions[lo], positions[hi]);
    let (nx, ny) = unit(canon_to.y - canon_from.y, canon_from.x - canon_to.x);
    let control = Point::new(
        (p0.x + p2.x) / 2.0 + nx * offset * 2.0,
        (p0.y + p2.y) / 2.0 + ny * offset * 2.0,
    );

    let (sx, sy) = unit(control.x - p0.x, control.y - p0.y);
    let (ex, ey) = unit(control.x - p2.x, control.y - p2.y);
    let start = Point::new(p0.x + sx * radius, p0.y + sy * radius);
    let end = Point::new(p2.x + ex * radius, p2.y + ey * radius);

    writeln!(
        svg,
        "  <path d=\"M{:.1},{:.1} Q{:.1},{:.1} {:.1},{:.1}\" fill=\"none\" stroke=\"{EDGE_COLOR}\" stroke-width=\"1.5\" marker-end=\"url(#arrow)\"/>",
        start.x, start.y, control.x, control.y, end.x, end.y
    )?;

    // Quadratic Bezier at t = 0.5.
    Ok(Point::new(
        0.25 * p0.x + 0.5 * control.x + 0.25 * p2.x,
        0.25 * p0.y + 0.5 * control.y + 0.25 * p2.y,
    ))
}

/// Draw a self-loop above the node; stacked loops grow outward.
fn write_self_loop(
    svg: &mut String,
    center: Point,
    radius: f64,
    rank: usize,
) -> Result<Point, std::fmt::Error> {
    let reach = radius * (2.6 + rank as f64 * 0.9);
    let spread = radius * 1.4;
    let start = Point::new(center.x - radius * 0.5, center.y - radius * 0.87);
    let end = Point::new(center.x + radius * 0.5, center.y - radius * 0.87);
    writeln!(
        svg,
        "  <path d=\"M{:.1},{:.1} C{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"none\" stroke=\"{EDGE_COLOR}\" stroke-width=\"1.5\" marker-end=\"url(#arrow)\"/>",
        start.x,
        start.y,
        center.x - spread,
        center.y - reach,
        center.x + spread,
        center.y - reach,
        end.x,
        end.y
    )?;
    // Cubic Bezier apex at t = 0.5.
    Ok(Point::new(center.x, center.y - radius * 0.87 * 0.25 - reach * 0.75))
}

/// Unit vector, or zero for a degenerate input.
fn unit(dx: f64, dy: f64) -> (f64, f64) {
    let len = (dx * dx + dy * dy).sqrt();
    if len < f64::EPSILON {
        (0.0, 0.0)
    } else {
        (dx / len, dy / len)
    }
}

/// Short display form of an identifier: the IRI fragment or last path
/// segment, truncated to a readable length.
pub fn compact_label(id: &str) -> String {
    let is_iri = id.contains("://") || id.starts_with("urn:");
    let tail = if is_iri {
        let trimmed = id.trim_end_matches(['/', '#']);
        trimmed
            .rsplit_once('#')
            .or_else(|| trimmed.rsplit_once('/'))
            .map(|(_, tail)| tail)
            .filter(|tail| !tail.is_empty())
            .unwrap_or(trimmed)
    } else {
        id
    };

    if tail.chars().count() > MAX_LABEL_CHARS {
        let head: String = tail.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{head}…")
    } else {
        tail.to_string()
    }
}

/// Node labels for `ids`, widened to the parent segment (and then to the
/// tail of the full identifier) wherever compact forms collide.
pub fn distinct_labels<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    let mut labels: Vec<String> = ids.iter().map(|id| compact_label(id.as_ref())).collect();
    let widenings: [fn(&str) -> String; 2] = [qualified_label, tail_label];
    for widen in widenings {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for label in &labels {
            *counts.entry(label.as_str()).or_default() += 1;
        }
        let clashing: Vec<usize> = (0..labels.len())
            .filter(|&i| counts[labels[i].as_str()] > 1)
            .collect();
        if clashing.is_empty() {
            break;
        }
        for i in clashing {
            labels[i] = widen(ids[i].as_ref());
        }
    }
    labels
}

/// IRI tail with its parent segment, e.g. `people/alice` or `fraud#acct1`.
fn qualified_label(id: &str) -> String {
    if !(id.contains("://") || id.starts_with("urn:")) {
        return tail_label(id);
    }
    let trimmed = id.trim_end_matches(['/', '#']);
    let seps: Vec<usize> = trimmed.match_indices(['/', '#']).map(|(i, _)| i).collect();
    match seps.len() {
        0 | 1 => tail_label(trimmed),
        n => tail_label(&trimmed[seps[n - 2] + 1..]),
    }
}

/// Last `MAX_LABEL_CHARS` characters, with a leading ellipsis when cut.
fn tail_label(id: &str) -> String {
    let count = id.chars().count();
    if count > MAX_LABEL_CHARS {
        let tail: String = id.chars().skip(count - (MAX_LABEL_CHARS - 1)).collect();
        format!("…{tail}")
    } else {
        id.to_string()
    }
}

/// Escape text for SVG content and attributes, dropping characters XML forbids.
pub(crate) fn escape_xml(input: &str) -> String {
    input
        .chars()
        .filter(|&c| is_xml_char(c))
        .collect::<String>()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// XML 1.0 `Char` production; surrogates cannot occur in a `char`.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || (!c.is_control() && !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Triple, TripleStore};

    fn positions(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| Point::new(100.0 + 200.0 * i as f64, 300.0))
            .collect()
    }

    #[test]
    fn empty_scene_is_background_only() {
        let sub = Subgraph::extract(&TripleStore::default(), "");
        let svg = build_scene(&sub, &[], &RenderConfig::default()).unwrap();
        assert!(svg.contains("<rect"));
        assert!(!svg.contains("<circle"));
        assert!(!svg.contains("marker-end"));
    }

    #[test]
    fn one_circle_per_node_one_path_per_edge() {
        let store = TripleStore::from_triples([
            Triple::new("A", "worksWith", "B"),
            Triple::new("B", "ownedBy", "C"),
            Triple::new("B", "controls", "C"),
        ]);
        let sub = Subgraph::extract(&store, "B");
        let svg = build_scene(&sub, &positions(3), &RenderConfig::default()).unwrap();
        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches("marker-end").count(), 3);
        assert!(svg.contains(">worksWith<"));
        assert!(svg.contains(">ownedBy<"));
        assert!(svg.contains(">controls<"));
        assert!(svg.contains(FOCUS_FILL));
    }

    #[test]
    fn labels_are_escaped() {
        let store = TripleStore::from_triples([Triple::new("A&B", "p", "<x>")]);
        let sub = Subgraph::extract(&store, "A&B");
        let svg = build_scene(&sub, &positions(2), &RenderConfig::default()).unwrap();
        assert!(svg.contains("A&amp;B"));
        assert!(svg.contains("&lt;x&gt;"));
    }

    #[test]
    fn compact_label_forms() {
        assert_eq!(compact_label("http://example.org/fraud#acct1"), "acct1");
        assert_eq!(compact_label("http://example.org/people/alice"), "alice");
        assert_eq!(compact_label("http://example.org/people/"), "people");
        assert_eq!(compact_label("plain literal"), "plain literal");
        assert_eq!(compact_label("a/b ratio"), "a/b ratio");
        assert_eq!(compact_label("case #12"), "case #12");
        assert_eq!(compact_label(""), "");
        let long = "x".repeat(40);
        assert_eq!(compact_label(&long).chars().count(), MAX_LABEL_CHARS);
    }

    #[test]
    fn control_characters_are_dropped() {
        assert_eq!(escape_xml("a\u{0}b\nc"), "ab\nc");
    }

    #[test]
    fn noncharacters_are_dropped() {
        assert_eq!(escape_xml("bad\u{FFFF}te\u{FFFE}xt"), "badtext");
        assert_eq!(escape_xml("é\u{FFFD}"), "é\u{FFFD}");
    }

    #[test]
    fn scene_with_nonchar_literal_parses() {
        let store = TripleStore::from_triples([Triple::new("A", "note", "bad\u{FFFF}text")]);
        let sub = Subgraph::extract(&store, "A");
        let svg = build_scene(&sub, &positions(2), &RenderConfig::default()).unwrap();
        assert!(!svg.contains('\u{FFFF}'));
        assert!(svg.contains(">badtext<"));
    }

    #[test]
    fn colliding_fragments_are_qualified() {
        let labels = distinct_labels(&[
            "http://bank.example/customers#alice",
            "http://shop.example/users#alice",
            "http://bank.example/customers#bob",
        ]);
        assert_eq!(labels, ["customers#alice", "users#alice", "bob"]);
    }

    #[test]
    fn literal_and_iri_with_same_tail_differ() {
        let labels = distinct_labels(&["alice", "http://ex.org/people/alice"]);
        assert_eq!(labels, ["alice", "people/alice"]);
    }

    #[test]
    fn same_parent_collisions_fall_back_to_full_tail() {
        let labels = distinct_labels(&["http://a.org/x/alice", "http://b.org/x/alice"]);
        assert_ne!(labels[0], labels[1]);
        assert!(labels.iter().all(|l| l.chars().count() <= MAX_LABEL_CHARS));
        assert_eq!(labels[0], "http://a.org/x/alice");
    }

    #[test]
    fn scene_disambiguates_node_labels() {
        let store = TripleStore::from_triples([Triple::new(
            "http://bank.example/customers#alice",
            "sameAs",
            "http://shop.example/users#alice",
        )]);
        let sub = Subgraph::extract(&store, "http://bank.example/customers#alice");
        let svg = build_scene(&sub, &positions(2), &RenderConfig::default()).unwrap();
        assert!(svg.contains(">customers#alice<"));
        assert!(svg.contains(">users#alice<"));
    }
}
