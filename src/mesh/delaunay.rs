// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bowyer-Watson Delaunay triangulation of planar point sets

use crate::error::MeshError;
use ahash::{AHashMap, AHashSet};
use nalgebra::Point2;
use robust::Coord;
use tracing::debug;

/// Super-triangle size relative to the input extent
const SUPER_SCALE: f64 = 100.0;

fn coord(p: &Point2<f64>) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

fn edges_of(v: [usize; 3]) -> [(usize, usize); 3] {
    [(v[0], v[1]), (v[1], v[2]), (v[2], v[0])]
}

/// Twice the signed area of (a, b, c); positive when counter-clockwise.
///
/// The sign is exact.
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    robust::orient2d(coord(a), coord(b), coord(c))
}

/// Positive when `d` lies inside the circumcircle of counter-clockwise (a, b, c).
///
/// The sign is exact, zero means the four points are cocircular.
pub fn in_circle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64 {
    robust::incircle(coord(a), coord(b), coord(c), coord(d))
}

/// Triangles under construction, with each directed edge mapped to the
/// triangle that owns it
struct Triangulation {
    points: Vec<Point2<f64>>,
    triangles: Vec<[usize; 3]>,
    alive: Vec<bool>,
    edges: AHashMap<(usize, usize), usize>,
    last: usize,
}

impl Triangulation {
    fn new(points: Vec<Point2<f64>>, root: [usize; 3]) -> Self {
        let mut triangulation = Self {
            triangles: Vec::with_capacity(2 * points.len()),
            alive: Vec::with_capacity(2 * points.len()),
            edges: AHashMap::with_capacity(6 * points.len()),
            points,
            last: 0,
        };
        triangulation.add_triangle(root);
        triangulation
    }

    fn add_triangle(&mut self, v: [usize; 3]) {
        let index = self.triangles.len();
        self.triangles.push(v);
        self.alive.push(true);
        for edge in edges_of(v) {
            self.edges.insert(edge, index);
        }
        self.last = index;
    }

    fn remove_triangle(&mut self, t: usize) {
        self.alive[t] = false;
        for edge in edges_of(self.triangles[t]) {
            if self.edges.get(&edge) == Some(&t) {
                self.edges.remove(&edge);
            }
        }
    }

    /// Triangle on the other side of directed edge (s, e)
    fn neighbour(&self, s: usize, e: usize) -> Option<usize> {
        self.edges.get(&(e, s)).copied()
    }

    fn circle_contains(&self, t: usize, p: &Point2<f64>) -> bool {
        let [a, b, c] = self.triangles[t];
        in_circle(&self.points[a], &self.points[b], &self.points[c], p) > 0.0
    }

    /// Triangle containing `p`, walking from the last created triangle
    fn locate(&self, p: &Point2<f64>) -> Option<usize> {
        let mut t = self.last;
        'walk: for _ in 0..self.triangles.len() {
            for (s, e) in edges_of(self.triangles[t]) {
                if orient2d(&self.points[s], &self.points[e], p) < 0.0 {
                    match self.neighbour(s, e) {
                        Some(next) => {
                            t = next;
                            continue 'walk;
                        }
                        None => return None,
                    }
                }
            }
            return Some(t);
        }

        // The walk did not settle, fall back to a scan
        (0..self.triangles.len()).find(|&t| {
            self.alive[t]
                && edges_of(self.triangles[t])
                    .iter()
                    .all(|&(s, e)| orient2d(&self.points[s], &self.points[e], p) >= 0.0)
        })
    }

    /// Insert point `i`; returns false when it duplicates an existing vertex
    fn insert(&mut self, i: usize, duplicate_eps: f64) -> Result<bool, MeshError> {
        let p = self.points[i];
        let is_duplicate = |points: &[Point2<f64>], v: [usize; 3]| {
            v.iter().any(|&j| (points[j] - p).norm() <= duplicate_eps)
        };

        let start = self.locate(&p).ok_or_else(|| {
            MeshError::TriangulationFailed(format!(
                "point {} ({}, {}) lies outside the super-triangle",
                i, p.x, p.y
            ))
        })?;
        if is_duplicate(&self.points, self.triangles[start]) {
            return Ok(false);
        }
        if !self.circle_contains(start, &p) {
            return Err(MeshError::TriangulationFailed(format!(
                "point {} ({}, {}) is not inside any circumcircle",
                i, p.x, p.y
            )));
        }

        let mut cavity = vec![start];
        let mut visited: AHashSet<usize> = AHashSet::new();
        visited.insert(start);
        let mut stack = vec![start];
        let mut boundary: Vec<(usize, usize)> = Vec::new();
        while let Some(t) = stack.pop() {
            for (s, e) in edges_of(self.triangles[t]) {
                match self.neighbour(s, e) {
                    Some(n) if visited.contains(&n) => {}
                    Some(n) if self.circle_contains(n, &p) => {
                        visited.insert(n);
                        cavity.push(n);
                        stack.push(n);
                    }
                    _ => boundary.push((s, e)),
                }
            }
        }

        if cavity
            .iter()
            .any(|&t| is_duplicate(&self.points, self.triangles[t]))
        {
            return Ok(false);
        }
        for &(s, e) in &boundary {
            if orient2d(&self.points[s], &self.points[e], &p) <= 0.0 {
                return Err(MeshError::TriangulationFailed(format!(
                    "cavity of point {} is not star-shaped",
                    i
                )));
            }
        }

        for t in cavity {
            self.remove_triangle(t);
        }
        for (s, e) in boundary {
            self.add_triangle([s, e, i]);
        }
        Ok(true)
    }
}

/// Insertion order following a serpentine sweep over cells of about one
/// point each, so consecutive points are close together
fn insertion_order(points: &[Point2<f64>], min: &Point2<f64>, max: &Point2<f64>) -> Vec<usize> {
    let n = points.len() as f64;
    let (width, height) = (max.x - min.x, max.y - min.y);
    let cell = match (width * height / n).sqrt() {
        cell if cell > 0.0 => cell,
        _ => width.max(height) / n,
    };
    let columns = (width / cell) as usize + 1;

    let key = |p: &Point2<f64>| {
        let row = ((p.y - min.y) / cell) as usize;
        let column = ((p.x - min.x) / cell) as usize;
        if row % 2 == 1 {
            (row, columns - column.min(columns - 1))
        } else {
            (row, column)
        }
    };

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by_key(|&i| (key(&points[i]), i));
    order
}

/// Triangulate `points`, returning counter-clockwise index triples.
///
/// Points closer than a relative 1e-12 of the extent to an already inserted
/// point are treated as duplicates and left out of the result.
pub fn triangulate(points: &[Point2<f64>]) -> Result<Vec<[usize; 3]>, MeshError> {
    if points.len() < 3 {
        return Err(MeshError::TriangulationFailed(format!(
            "need at least 3 points, got {}",
            points.len()
        )));
    }

    let (mut min, mut max) = (points[0], points[0]);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    let extent = (max.x - min.x).max(max.y - min.y);
    if !extent.is_finite() || extent <= 0.0 {
        return Err(MeshError::TriangulationFailed(
            "points have no extent".to_string(),
        ));
    }
    let duplicate_eps = 1e-12 * extent;

    let n = points.len();
    let center = nalgebra::center(&min, &max);
    let r = SUPER_SCALE * extent;
    let mut all: Vec<Point2<f64>> = points.to_vec();
    all.push(Point2::new(center.x - 2.0 * r, center.y - r));
    all.push(Point2::new(center.x + 2.0 * r, center.y - r));
    all.push(Point2::new(center.x, center.y + 2.0 * r));

    let mut triangulation = Triangulation::new(all, [n, n + 1, n + 2]);
    let mut inserted = 0usize;
    for i in insertion_order(points, &min, &max) {
        if triangulation.insert(i, duplicate_eps)? {
            inserted += 1;
        } else {
            debug!(index = i, "skipping duplicate point");
        }
    }

    let result: Vec<[usize; 3]> = triangulation
        .triangles
        .iter()
        .zip(&triangulation.alive)
        .filter(|(v, alive)| **alive && v.iter().all(|&k| k < n))
        .map(|(v, _)| *v)
        .collect();

    debug!(
        points = n,
        inserted,
        triangles = result.len(),
        "delaunay triangulation complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(nx: usize, ny: usize) -> Vec<Point2<f64>> {
        let mut points = Vec::new();
        for j in 0..=ny {
            for i in 0..=nx {
                points.push(Point2::new(i as f64, j as f64));
            }
        }
        points
    }

    fn total_area(points: &[Point2<f64>], tris: &[[usize; 3]]) -> f64 {
        tris.iter()
            .map(|t| 0.5 * orient2d(&points[t[0]], &points[t[1]], &points[t[2]]))
            .sum()
    }

    #[test]
    fn test_square() {
        let points = grid(1, 1);
        let tris = triangulate(&points).unwrap();
        assert_eq!(tris.len(), 2);
        assert!((total_area(&points, &tris) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_grid_covers_hull_ccw() {
        let points = grid(6, 3);
        let tris = triangulate(&points).unwrap();
        // Euler: 2n - h - 2 triangles for n points with h hull points
        assert_eq!(tris.len(), 2 * 28 - 18 - 2);
        assert!((total_area(&points, &tris) - 18.0).abs() < 1e-9);
        for t in &tris {
            assert!(orient2d(&points[t[0]], &points[t[1]], &points[t[2]]) > 0.0);
        }
    }

    #[test]
    fn test_delaunay_property() {
        let points: Vec<Point2<f64>> = (0..40)
            .map(|k| {
                let t = k as f64 * 0.618_033_988_75;
                Point2::new((t * 7.3).fract() * 4.0, (t * 3.1).fract() * 2.0)
            })
            .collect();
        let tris = triangulate(&points).unwrap();
        for t in &tris {
            let (a, b, c) = (&points[t[0]], &points[t[1]], &points[t[2]]);
            for (k, p) in points.iter().enumerate() {
                if t.contains(&k) {
                    continue;
                }
                assert!(in_circle(a, b, c, p) <= 1e-9, "point {} inside circumcircle", k);
            }
        }
    }

    #[test]
    fn test_elongated_strip() {
        // 2000 x 1 unit cells: local circle tests are tiny next to the extent
        let points = grid(2000, 1);
        let tris = triangulate(&points).unwrap();
        assert_eq!(tris.len(), 2 * 4002 - 4002 - 2);
        assert!((total_area(&points, &tris) - 2000.0).abs() < 1e-6);
        for t in &tris {
            assert!(orient2d(&points[t[0]], &points[t[1]], &points[t[2]]) > 0.0);
        }
    }

    #[test]
    fn test_fine_points_far_from_origin() {
        let points: Vec<Point2<f64>> = grid(40, 40)
            .into_iter()
            .map(|p| Point2::new(1.0e4 + p.x * 1.0e-3, -2.0e4 + p.y * 1.0e-3))
            .collect();
        let tris = triangulate(&points).unwrap();
        assert_eq!(tris.len(), 2 * 1681 - 160 - 2);
        assert!((total_area(&points, &tris) - 1.6e-3).abs() < 1e-9);
    }

    #[test]
    fn test_predicates_exact_on_cocircular_points() {
        let (a, b, c) = (Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0));
        assert_eq!(in_circle(&a, &b, &c, &Point2::new(0.0, 1.0)), 0.0);
        assert!(in_circle(&a, &b, &c, &Point2::new(0.5, 0.5)) > 0.0);
        assert!(in_circle(&a, &b, &c, &Point2::new(2.0, 2.0)) < 0.0);
        assert_eq!(orient2d(&a, &Point2::new(0.5, 0.5), &c), 0.0);
    }

    #[test]
    fn test_duplicates_skipped() {
        let mut points = grid(1, 1);
        points.push(Point2::new(1.0, 1.0));
        let tris = triangulate(&points).unwrap();
        assert_eq!(tris.len(), 2);
        assert!(tris.iter().all(|t| !t.contains(&4)));
    }

    #[test]
    fn test_too_few_points() {
        assert!(triangulate(&[Point2::origin(), Point2::new(1.0, 0.0)]).is_err());
        let collinear = [Point2::origin(), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
        assert!(triangulate(&collinear).map(|t| t.is_empty()).unwrap_or(true));
    }
}
