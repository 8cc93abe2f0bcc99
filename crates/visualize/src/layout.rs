use petgraph::graph::DiGraph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MIN_DISTANCE: f64 = 0.01;

/// Fruchterman-Reingold force-directed layout with a fixed seed, so the same
/// graph always lands in the same place. Edge direction is ignored.
#[derive(Debug, Clone)]
pub struct SpringLayout {
    pub seed: u64,
    /// Optimal distance between nodes.
    pub k: f64,
    pub iterations: usize,
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self {
            seed: 42,
            k: 0.8,
            iterations: 50,
        }
    }
}

impl SpringLayout {
    /// Positions indexed by `NodeIndex::index()`, scaled into [-1, 1].
    pub fn positions<N, E>(&self, graph: &DiGraph<N, E>) -> Vec<(f64, f64)> {
        let n = graph.node_count();
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![(0.0, 0.0)];
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut pos: Vec<(f64, f64)> = (0..n).map(|_| (rng.r#gen::<f64>(), rng.r#gen::<f64>())).collect();

        let edges: Vec<(usize, usize)> = graph
            .edge_indices()
            .filter_map(|e| graph.edge_endpoints(e))
            .map(|(a, b)| (a.index(), b.index()))
            .filter(|(a, b)| a != b)
            .collect();

        let mut temperature = 0.1;
        let cooling = temperature / (self.iterations as f64 + 1.0);
        let k2 = self.k * self.k;

        for _ in 0..self.iterations {
            let mut disp = vec![(0.0f64, 0.0f64); n];

            // Repulsion between every pair
            for i in 0..n {
                for j in (i + 1)..n {
                    let (dx, dy) = (pos[i].0 - pos[j].0, pos[i].1 - pos[j].1);
                    let dist = dx.hypot(dy).max(MIN_DISTANCE);
                    let force = k2 / dist;
                    let (fx, fy) = (dx / dist * force, dy / dist * force);
                    disp[i].0 += fx;
                    disp[i].1 += fy;
                    disp[j].0 -= fx;
                    disp[j].1 -= fy;
                }
            }

            // Attraction along edges
            for &(a, b) in &edges {
                let (dx, dy) = (pos[a].0 - pos[b].0, pos[a].1 - pos[b].1);
                let dist = dx.hypot(dy).max(MIN_DISTANCE);
                let force = dist * dist / self.k;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                disp[a].0 -= fx;
                disp[a].1 -= fy;
                disp[b].0 += fx;
                disp[b].1 += fy;
            }

            for (p, d) in pos.iter_mut().zip(&disp) {
                let len = d.0.hypot(d.1).max(MIN_DISTANCE);
                let step = len.min(temperature);
                p.0 += d.0 / len * step;
                p.1 += d.1 / len * step;
            }
            temperature -= cooling;
        }

        rescale(pos)
    }
}

/// Centers the layout on the origin and scales the widest axis to 1.
fn rescale(mut pos: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    let n = pos.len() as f64;
    let (mx, my) = pos.iter().fold((0.0, 0.0), |acc, p| (acc.0 + p.0 / n, acc.1 + p.1 / n));
    for p in pos.iter_mut() {
        p.0 -= mx;
        p.1 -= my;
    }

    let extent = pos
        .iter()
        .map(|p| p.0.abs().max(p.1.abs()))
        .fold(0.0f64, f64::max);
    if extent > 0.0 {
        for p in pos.iter_mut() {
            p.0 /= extent;
            p.1 /= extent;
        }
    }
    pos
}
