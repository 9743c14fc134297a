//! Force-directed node placement (Fruchterman-Reingold).
//!
//! Nodes start at random positions in the unit square, repel each other with
//! force `k²/d`, and adjacent nodes attract with force `d²/k`, where
//! `k = 1/sqrt(n)`. Displacement per step is capped by a temperature that
//! cools linearly to zero. The result is centered and scaled so the largest
//! coordinate has magnitude 1.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use petgraph::visit::EdgeRef;

use crate::config::RenderConfig;
use crate::graph::Subgraph;

/// Smallest distance used in force computations, to keep forces finite.
const MIN_DISTANCE: f64 = 0.01;

/// A 2D position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Spring layout parameters.
#[derive(Debug, Clone)]
pub struct SpringLayout {
    /// Number of cooling steps.
    pub iterations: usize,
    /// Seed for the initial placement; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self {
            iterations: 50,
            seed: None,
        }
    }
}

impl SpringLayout {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            iterations: config.iterations,
            seed: config.seed,
        }
    }

    /// Compute one position per node, indexed by `NodeIndex::index()`.
    ///
    /// Coordinates lie in `[-1, 1]`. Empty graphs yield no positions and a
    /// single node sits at the origin.
    pub fn compute(&self, subgraph: &Subgraph) -> Vec<Point> {
        let graph = subgraph.graph();
        let n = graph.node_count();
        match n {
            0 => return Vec::new(),
            1 => return vec![Point::new(0.0, 0.0)],
            _ => {}
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut pos: Vec<Point> = (0..n)
            .map(|_| Point::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
            .collect();

        // Undirected adjacency; parallel edges and direction do not change attraction.
        let mut adjacent = vec![false; n * n];
        for e in graph.edge_references() {
            let (a, b) = (e.source().index(), e.target().index());
            if a != b {
                adjacent[a * n + b] = true;
                adjacent[b * n + a] = true;
            }
        }

        let k = (1.0 / n as f64).sqrt();
        let span = |f: fn(&Point) -> f64| {
            let (lo, hi) = pos
                .iter()
                .map(f)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
            hi - lo
        };
        let mut temperature = span(|p| p.x).max(span(|p| p.y)) * 0.1;
        let cooling = temperature / (self.iterations as f64 + 1.0);

        let mut displacement = vec![Point::new(0.0, 0.0); n];
        for _ in 0..self.iterations {
            for (i, disp) in displacement.iter_mut().enumerate() {
                let mut dx_total = 0.0;
                let mut dy_total = 0.0;
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dx = pos[i].x - pos[j].x;
                    let dy = pos[i].y - pos[j].y;
                    let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                    let attract = if adjacent[i * n + j] { dist / k } else { 0.0 };
                    let factor = k * k / (dist * dist) - attract;
                    dx_total += dx * factor;
                    dy_total += dy * factor;
                }
                *disp = Point::new(dx_total, dy_total);
            }

            for (p, d) in pos.iter_mut().zip(&displacement) {
                let length = (d.x * d.x + d.y * d.y).sqrt().max(MIN_DISTANCE);
                p.x += d.x * temperature / length;
                p.y += d.y * temperature / length;
            }
            temperature -= cooling;
        }

        rescale(&mut pos);
        pos
    }
}

/// Center on the mean and scale so the largest |coordinate| is 1.
fn rescale(pos: &mut [Point]) {
    let n = pos.len() as f64;
    let cx = pos.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = pos.iter().map(|p| p.y).sum::<f64>() / n;
    let mut lim: f64 = 0.0;
    for p in pos.iter_mut() {
        p.x -= cx;
        p.y -= cy;
        lim = lim.max(p.x.abs()).max(p.y.abs());
    }
    if lim > 0.0 {
        for p in pos.iter_mut() {
            p.x /= lim;
            p.y /= lim;
        }
    }
}

/// Map unit-box coordinates onto a `width` x `height` canvas, keeping
/// `margin` pixels clear on every side.
pub fn to_canvas(points: &[Point], width: f64, height: f64, margin: f64) -> Vec<Point> {
    let half_w = ((width - 2.0 * margin) / 2.0).max(0.0);
    let half_h = ((height - 2.0 * margin) / 2.0).max(0.0);
    points
        .iter()
        .map(|p| Point::new(width / 2.0 + p.x * half_w, height / 2.0 - p.y * half_h))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Triple, TripleStore};

    fn star() -> Subgraph {
        let store = TripleStore::from_triples([
            Triple::new("acct", "ownedBy", "alice"),
            Triple::new("acct", "sentTo", "mule"),
            Triple::new("acct", "flaggedBy", "alert"),
            Triple::new("bob", "sharesDevice", "acct"),
        ]);
        Subgraph::extract(&store, "acct")
    }

    #[test]
    fn empty_graph_has_no_positions() {
        let sub = Subgraph::extract(&TripleStore::default(), "x");
        assert!(SpringLayout::default().compute(&sub).is_empty());
    }

    #[test]
    fn single_node_is_centered() {
        let store = TripleStore::from_triples([Triple::new("A", "p", "A")]);
        let sub = Subgraph::extract(&store, "A");
        assert_eq!(SpringLayout::default().compute(&sub), vec![Point::new(0.0, 0.0)]);
    }

    #[test]
    fn positions_are_finite_and_bounded() {
        let pos = SpringLayout::default().compute(&star());
        assert_eq!(pos.len(), 5);
        for p in &pos {
            assert!(p.x.is_finite() && p.y.is_finite());
            assert!(p.x.abs() <= 1.0 + 1e-9 && p.y.abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let layout = SpringLayout {
            iterations: 50,
            seed: Some(42),
        };
        let sub = star();
        assert_eq!(layout.compute(&sub), layout.compute(&sub));
    }

    #[test]
    fn canvas_mapping_respects_margin() {
        let points = [Point::new(-1.0, 1.0), Point::new(1.0, -1.0), Point::new(0.0, 0.0)];
        let mapped = to_canvas(&points, 1000.0, 800.0, 50.0);
        assert_eq!(mapped[0], Point::new(50.0, 50.0));
        assert_eq!(mapped[1], Point::new(950.0, 750.0));
        assert_eq!(mapped[2], Point::new(500.0, 400.0));
    }
}
