//! Delaunay triangulation of scattered points and piecewise-linear
//! (barycentric) interpolation over it.
//!
//! Points are swept in x order, each fanned onto the hull edges it can see,
//! so the triangles always cover the convex hull. Edges are then flipped
//! until every triangle is locally Delaunay. Queries outside the convex hull
//! evaluate to NaN.

use std::{collections::HashMap, sync::Arc};

use crate::constants::BARYCENTRIC_TOLERANCE;

#[derive(Debug, Clone, Copy)]
struct Circumcircle {
    center: [f64; 2],
    radius_sq: f64,
}

impl Circumcircle {
    fn of(points: &[[f64; 2]], vertices: [usize; 3]) -> Self {
        let [a, b, c] = vertices.map(|v| points[v]);
        let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));

        if d.abs() < f64::EPSILON {
            // Degenerate sliver: every neighbour lands in its circle so it is flipped away.
            return Circumcircle {
                center: a,
                radius_sq: f64::INFINITY,
            };
        }

        let a2 = a[0] * a[0] + a[1] * a[1];
        let b2 = b[0] * b[0] + b[1] * b[1];
        let c2 = c[0] * c[0] + c[1] * c[1];
        let ux = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
        let uy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
        let radius_sq = (a[0] - ux).powi(2) + (a[1] - uy).powi(2);

        Circumcircle {
            center: [ux, uy],
            radius_sq,
        }
    }

    fn contains(&self, p: [f64; 2]) -> bool {
        let dist_sq = (p[0] - self.center[0]).powi(2) + (p[1] - self.center[1]).powi(2);
        dist_sq < self.radius_sq * (1.0 - 1e-12)
    }
}

/// Triangles covering the convex hull of a point set.
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    /// Triangulates `points`. Coincident points after the first are ignored.
    /// Collinear or fewer than three distinct points produce no triangles.
    pub fn new(points: &[[f64; 2]]) -> Self {
        let mut triangulation = Triangulation {
            points: points.to_vec(),
            triangles: Vec::new(),
        };

        // Adding 0.0 folds -0.0 into 0.0 so coincident points sort next to each other.
        let key = |i: usize| [points[i][0] + 0.0, points[i][1] + 0.0];
        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|&i, &j| {
            let (p, q) = (key(i), key(j));
            p[0].total_cmp(&q[0])
                .then(p[1].total_cmp(&q[1]))
                .then(i.cmp(&j))
        });
        order.dedup_by(|later, earlier| points[*later] == points[*earlier]);

        // Leading points on one line form a chain; the first point off it closes the seed fan.
        let Some(split) = order
            .iter()
            .skip(2)
            .position(|&k| signed_area(points, [order[0], order[1], k]).abs() > f64::EPSILON)
            .map(|offset| offset + 2)
        else {
            return triangulation;
        };

        let apex = order[split];
        let mut hull = order[..split].to_vec();
        if signed_area(points, [hull[0], hull[split - 1], apex]) < 0.0 {
            hull.reverse();
        }
        let mut triangles: Vec<[usize; 3]> =
            hull.windows(2).map(|w| [w[0], w[1], apex]).collect();
        hull.push(apex);

        // Hull is counter-clockwise; an edge is visible when the point lies to its right.
        for &p in &order[split + 1..] {
            let h = hull.len();
            let visible: Vec<bool> = (0..h)
                .map(|e| signed_area(points, [hull[e], hull[(e + 1) % h], p]) < 0.0)
                .collect();

            let Some(start) = (0..h).find(|&e| visible[e] && !visible[(e + h - 1) % h]) else {
                continue;
            };
            let run = (0..h).take_while(|&k| visible[(start + k) % h]).count();

            for k in start..start + run {
                triangles.push([hull[(k + 1) % h], hull[k % h], p]);
            }

            let mut next = Vec::with_capacity(h - run + 2);
            next.push(hull[start]);
            next.push(p);
            next.extend((start + run..start + h).map(|k| hull[k % h]));
            hull = next;
        }

        legalize(points, &mut triangles);
        triangulation.triangles = triangles;

        triangulation
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Triangle containing `(x, y)` and the barycentric weights of its vertices.
    pub fn locate(&self, x: f64, y: f64) -> Option<([usize; 3], [f64; 3])> {
        self.triangles.iter().find_map(|&vertices| {
            let weights = barycentric(&self.points, vertices, x, y)?;
            weights
                .iter()
                .all(|&w| w >= -BARYCENTRIC_TOLERANCE)
                .then_some((vertices, weights))
        })
    }
}

// Lawson flips: replace the shared edge of two triangles whenever the far
// vertex of one lies inside the circumcircle of the other. Triangles are
// counter-clockwise and only the diagonal of a convex quad is flipped, so
// coverage of the hull never changes.
fn legalize(points: &[[f64; 2]], triangles: &mut [[usize; 3]]) {
    let max_passes = 4 * points.len() * points.len() + 16;

    for _ in 0..max_passes {
        let mut opposite: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        for (t, &[a, b, c]) in triangles.iter().enumerate() {
            opposite.insert((a, b), (t, c));
            opposite.insert((b, c), (t, a));
            opposite.insert((c, a), (t, b));
        }

        let mut touched = vec![false; triangles.len()];
        let mut flipped = false;

        for t in 0..triangles.len() {
            if touched[t] {
                continue;
            }
            let tri = triangles[t];
            let circle = Circumcircle::of(points, tri);

            for k in 0..3 {
                let (a, b, c) = (tri[k], tri[(k + 1) % 3], tri[(k + 2) % 3]);
                let Some(&(u, d)) = opposite.get(&(b, a)) else {
                    continue;
                };
                if touched[u] || !circle.contains(points[d]) {
                    continue;
                }
                if signed_area(points, [c, a, d]) <= 0.0 || signed_area(points, [c, d, b]) <= 0.0 {
                    continue;
                }

                triangles[t] = [c, a, d];
                triangles[u] = [c, d, b];
                touched[t] = true;
                touched[u] = true;
                flipped = true;
                break;
            }
        }

        if !flipped {
            break;
        }
    }
}

/// Piecewise-linear interpolant of one value per triangulation point.
#[derive(Debug, Clone)]
pub struct LinearInterpolant {
    triangulation: Arc<Triangulation>,
    values: Vec<f64>,
}

impl LinearInterpolant {
    /// `values` must be aligned with the triangulation's points.
    pub fn new(triangulation: Arc<Triangulation>, values: Vec<f64>) -> Self {
        debug_assert_eq!(triangulation.points().len(), values.len());
        LinearInterpolant {
            triangulation,
            values,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at `(x, y)`, NaN outside the convex hull.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        match self.triangulation.locate(x, y) {
            Some((vertices, weights)) => vertices
                .iter()
                .zip(weights)
                .map(|(&v, w)| w * self.values[v])
                .sum(),
            None => f64::NAN,
        }
    }
}

fn signed_area(points: &[[f64; 2]], [a, b, c]: [usize; 3]) -> f64 {
    let (a, b, c) = (points[a], points[b], points[c]);
    0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
}

// λ1 = Area(P, V1, V2) / Area(V0, V1, V2), λ2 likewise, λ3 = 1 - λ1 - λ2.
fn barycentric(points: &[[f64; 2]], [i0, i1, i2]: [usize; 3], x: f64, y: f64) -> Option<[f64; 3]> {
    let (v0, v1, v2) = (points[i0], points[i1], points[i2]);

    let denom = (v1[1] - v2[1]) * (v0[0] - v2[0]) + (v2[0] - v1[0]) * (v0[1] - v2[1]);
    if denom.abs() < f64::EPSILON {
        return None;
    }

    let l1 = ((v1[1] - v2[1]) * (x - v2[0]) + (v2[0] - v1[0]) * (y - v2[1])) / denom;
    let l2 = ((v2[1] - v0[1]) * (x - v2[0]) + (v0[0] - v2[0]) * (y - v2[1])) / denom;

    Some([l1, l2, 1.0 - l1 - l2])
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn square() -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]
    }

    #[test]
    fn should_triangulate_square() {
        let t = Triangulation::new(&square());

        assert_eq!(t.triangles().len(), 2);
    }

    #[test]
    fn should_tile_grid_hull() {
        let mut points = Vec::new();
        for i in 0..5 {
            for j in 0..4 {
                points.push([i as f64 * 3.0, j as f64 * 2.5]);
            }
        }
        let t = Triangulation::new(&points);

        assert!((covered_area(&t) - 12.0 * 7.5).abs() < 1e-6);
        assert_eq!(t.triangles().len(), 24);
    }

    fn covered_area(t: &Triangulation) -> f64 {
        t.triangles()
            .iter()
            .map(|&tri| signed_area(t.points(), tri).abs())
            .sum()
    }

    // Andrew's monotone chain.
    fn hull_area(points: &[[f64; 2]]) -> f64 {
        let mut sorted = points.to_vec();
        sorted.sort_by(|p, q| p[0].total_cmp(&q[0]).then(p[1].total_cmp(&q[1])));
        sorted.dedup();

        let cross = |o: [f64; 2], a: [f64; 2], b: [f64; 2]| {
            (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
        };
        let mut hull: Vec<[f64; 2]> = Vec::new();
        for pass in [sorted.clone(), sorted.iter().rev().copied().collect()] {
            let base = hull.len();
            for p in pass {
                while hull.len() >= base + 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
                    hull.pop();
                }
                hull.push(p);
            }
            hull.pop();
        }

        (0..hull.len())
            .map(|i| {
                let (a, b) = (hull[i], hull[(i + 1) % hull.len()]);
                a[0] * b[1] - b[0] * a[1]
            })
            .sum::<f64>()
            .abs()
            / 2.0
    }

    #[test]
    fn should_cover_hull_along_flat_edge() {
        // The middle point sits 0.001 deg above a long bottom edge, so the
        // triangle on that edge has an enormous circumcircle.
        let points = vec![
            [209.007, 27.615],
            [288.293, 29.839],
            [248.65, 28.728],
            [250.0, 70.0],
            [230.0, 50.0],
        ];
        let values = vec![1.0; points.len()];
        let t = Arc::new(Triangulation::new(&points));
        let interp = LinearInterpolant::new(Arc::clone(&t), values);

        assert!((covered_area(&t) - hull_area(&points)).abs() < 1e-9);
        assert!(interp.evaluate(248.65, 28.727 + 1e-6).is_finite());
        assert!(interp.evaluate(248.65, 28.727 + 1e-4).is_finite());
        assert!(interp.evaluate(248.65, 28.727 - 1e-3).is_nan());
    }

    #[test]
    fn should_cover_hull_of_random_station_sets() {
        let mut state: u64 = 12345;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        };

        for _ in 0..300 {
            let n = 4 + (next() * 40.0) as usize;
            let points: Vec<[f64; 2]> = (0..n)
                .map(|_| [200.0 + 100.0 * next(), 25.0 + 50.0 * next()])
                .collect();

            let t = Triangulation::new(&points);
            let (covered, hull) = (covered_area(&t), hull_area(&points));

            assert!((covered - hull).abs() < 1e-9 * hull, "{} vs {}", covered, hull);
            assert!(t.triangles().iter().all(|&tri| signed_area(&points, tri) > 0.0));
        }
    }

    #[test]
    fn should_be_delaunay() {
        let points = vec![
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 1.0],
            [0.0, 1.0],
            [5.0, 0.5],
            [3.0, 0.2],
            [7.0, 0.9],
        ];
        let t = Triangulation::new(&points);

        for &tri in t.triangles() {
            let circle = Circumcircle::of(&points, tri);
            for (i, &p) in points.iter().enumerate() {
                if !tri.contains(&i) {
                    assert!(!circle.contains(p));
                }
            }
        }
    }

    #[test]
    fn should_reproduce_linear_field() {
        let points = vec![
            [0.0, 0.0],
            [7.0, 1.0],
            [3.0, 8.0],
            [9.0, 9.0],
            [4.0, 4.0],
            [1.0, 6.0],
        ];
        let values: Vec<f64> = points.iter().map(|p| 2.0 * p[0] - 3.0 * p[1] + 1.0).collect();
        let interp = LinearInterpolant::new(Arc::new(Triangulation::new(&points)), values);

        for (x, y) in [(4.0, 3.0), (5.0, 5.0), (2.0, 5.0), (6.5, 6.0)] {
            let expected = 2.0 * x - 3.0 * y + 1.0;
            assert!((interp.evaluate(x, y) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn should_return_exact_values_at_vertices() {
        let points = square();
        let values = vec![1.0, 2.0, 3.0, 4.0];
        let interp = LinearInterpolant::new(Arc::new(Triangulation::new(&points)), values.clone());

        for (p, v) in points.iter().zip(values) {
            assert!((interp.evaluate(p[0], p[1]) - v).abs() < 1e-9);
        }
    }

    #[test]
    fn should_be_nan_outside_hull() {
        let interp = LinearInterpolant::new(
            Arc::new(Triangulation::new(&square())),
            vec![1.0, 2.0, 3.0, 4.0],
        );

        assert!(interp.evaluate(-0.1, 5.0).is_nan());
        assert!(interp.evaluate(5.0, 10.5).is_nan());
        assert!(interp.evaluate(5.0, 0.0).is_finite());
    }

    #[test]
    fn should_leave_collinear_points_untriangulated() {
        let t = Triangulation::new(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]);

        assert!(t.is_empty());
        assert!(t.locate(1.0, 1.0).is_none());
    }

    #[test]
    fn should_ignore_coincident_points() {
        let points = vec![[0.0, 0.0], [10.0, 0.0], [0.0, 10.0], [0.0, 0.0]];
        let t = Triangulation::new(&points);

        assert_eq!(t.triangles().len(), 1);
        assert!(t.triangles()[0].iter().all(|&v| v < 3));
    }
}
