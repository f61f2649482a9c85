//! Fruchterman-Reingold spring layout.
//!
//! Initial positions come from a seeded generator owned by the call, so two
//! layouts of the same graph always agree.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Smallest distance used in force computations
const MIN_DISTANCE: f64 = 0.01;

/// Weighted undirected edge list input for [`spring_layout`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

/// 2-D positions for `n` nodes, centred on the origin and scaled so the
/// largest coordinate magnitude is 1.
///
/// `k` is the optimal node distance; attraction along an edge scales with
/// its weight.
pub fn spring_layout(
    n: usize,
    edges: &[LayoutEdge],
    k: f64,
    iterations: usize,
    seed: u64,
) -> Vec<(f64, f64)> {
    match n {
        0 => return Vec::new(),
        1 => return vec![(0.0, 0.0)],
        _ => {}
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect();

    let mut adjacency = vec![vec![0.0; n]; n];
    for edge in edges {
        adjacency[edge.source][edge.target] = edge.weight;
        adjacency[edge.target][edge.source] = edge.weight;
    }

    let mut temperature = 0.1 * extent(&pos);
    let cooling = temperature / (iterations as f64 + 1.0);

    for _ in 0..iterations {
        let mut shifts = vec![[0.0f64; 2]; n];
        for i in 0..n {
            let mut disp = [0.0f64; 2];
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i][0] - pos[j][0];
                let dy = pos[i][1] - pos[j][1];
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = k * k / (distance * distance) - adjacency[i][j] * distance / k;
                disp[0] += dx * force;
                disp[1] += dy * force;
            }
            let length = (disp[0] * disp[0] + disp[1] * disp[1]).sqrt().max(MIN_DISTANCE);
            shifts[i] = [disp[0] * temperature / length, disp[1] * temperature / length];
        }
        for (p, shift) in pos.iter_mut().zip(&shifts) {
            p[0] += shift[0];
            p[1] += shift[1];
        }
        temperature -= cooling;
    }

    rescale(&mut pos);
    pos.into_iter().map(|[x, y]| (x, y)).collect()
}

/// Largest side of the bounding box
fn extent(pos: &[[f64; 2]]) -> f64 {
    (0..2)
        .map(|axis| {
            let (lo, hi) = pos.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
                (lo.min(p[axis]), hi.max(p[axis]))
            });
            hi - lo
        })
        .fold(0.0, f64::max)
}

fn rescale(pos: &mut [[f64; 2]]) {
    let n = pos.len() as f64;
    for axis in 0..2 {
        let mean = pos.iter().map(|p| p[axis]).sum::<f64>() / n;
        for p in pos.iter_mut() {
            p[axis] -= mean;
        }
    }
    let limit = pos
        .iter()
        .flat_map(|p| [p[0].abs(), p[1].abs()])
        .fold(0.0, f64::max);
    if limit > 0.0 {
        for p in pos.iter_mut() {
            p[0] /= limit;
            p[1] /= limit;
        }
    }
}
