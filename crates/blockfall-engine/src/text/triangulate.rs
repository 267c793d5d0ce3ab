//! Polygon triangulation for glyph caps.
//!
//! Holes are spliced into their outer contour through a zero-width bridge, then
//! the resulting simple polygon is ear-clipped.

use crate::coords::Vec2;

const EPS: f32 = 1e-9;

/// An outer contour (counter-clockwise) with its holes (clockwise).
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub outer: Vec<Vec2>,
    pub holes: Vec<Vec<Vec2>>,
}

/// Twice the signed area; positive for counter-clockwise.
pub fn signed_area(poly: &[Vec2]) -> f32 {
    let n = poly.len();
    (0..n).map(|i| poly[i].perp_dot(poly[(i + 1) % n])).sum()
}

#[inline]
fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).perp_dot(b - o)
}

/// Even-odd point-in-polygon test.
pub fn contains_point(poly: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let n = poly.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Groups flattened contours into shapes by containment depth.
///
/// Contours nested an even number of times are solids; odd ones are holes of
/// the smallest solid that contains them. Orientation is normalised on the way.
pub fn group_contours(contours: Vec<Vec<Vec2>>) -> Vec<Shape> {
    let areas: Vec<f32> = contours.iter().map(|c| signed_area(c).abs()).collect();
    let parents: Vec<Vec<usize>> = (0..contours.len())
        .map(|i| {
            (0..contours.len())
                .filter(|&j| j != i && areas[j] > areas[i] && contains_point(&contours[j], contours[i][0]))
                .collect()
        })
        .collect();

    let mut shapes: Vec<Shape> = Vec::new();
    let mut shape_of: Vec<Option<usize>> = vec![None; contours.len()];
    let mut order: Vec<usize> = (0..contours.len()).collect();
    // Largest first so every solid exists before its holes are attached.
    order.sort_by(|&a, &b| areas[b].total_cmp(&areas[a]));

    for &i in &order {
        let mut contour = contours[i].clone();
        if parents[i].len() % 2 == 0 {
            if signed_area(&contour) < 0.0 {
                contour.reverse();
            }
            shape_of[i] = Some(shapes.len());
            shapes.push(Shape { outer: contour, holes: Vec::new() });
        } else {
            if signed_area(&contour) > 0.0 {
                contour.reverse();
            }
            let owner = parents[i]
                .iter()
                .filter(|&&p| parents[p].len() % 2 == 0)
                .min_by(|&&a, &&b| areas[a].total_cmp(&areas[b]))
                .and_then(|&p| shape_of[p]);
            if let Some(s) = owner {
                shapes[s].holes.push(contour);
            }
        }
    }

    shapes
}

/// Triangulates `shape`. Returns the polygon that was clipped (outer contour with
/// holes bridged in) and triangles as index triples into it, counter-clockwise.
pub fn triangulate(shape: &Shape) -> (Vec<Vec2>, Vec<[u32; 3]>) {
    let poly = bridge_holes(shape);
    let tris = ear_clip(&poly);
    (poly, tris)
}

fn bridge_holes(shape: &Shape) -> Vec<Vec2> {
    let mut poly = shape.outer.clone();
    let mut holes: Vec<&Vec<Vec2>> = shape.holes.iter().filter(|h| h.len() >= 3).collect();
    holes.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));

    for (k, hole) in holes.iter().enumerate() {
        let m = (0..hole.len())
            .max_by(|&a, &b| hole[a].x.total_cmp(&hole[b].x))
            .unwrap_or(0);
        let mp = hole[m];
        let others = &holes[k + 1..];

        let visible = |v: usize, strict: bool| {
            let vp = poly[v];
            (if strict { vp.x > mp.x } else { vp.x >= mp.x }) && segment_is_clear(mp, vp, &poly, others)
        };
        let nearest = |strict: bool| {
            (0..poly.len())
                .filter(|&v| visible(v, strict))
                .min_by(|&a, &b| dist2(mp, poly[a]).total_cmp(&dist2(mp, poly[b])))
        };
        let Some(v) = nearest(true).or_else(|| nearest(false)) else {
            log::debug!("no bridge found for a glyph hole; skipping it");
            continue;
        };

        let mut merged = Vec::with_capacity(poly.len() + hole.len() + 2);
        merged.extend_from_slice(&poly[..=v]);
        merged.extend((0..=hole.len()).map(|i| hole[(m + i) % hole.len()]));
        merged.extend_from_slice(&poly[v..]);
        poly = merged;
    }

    poly
}

fn max_x(poly: &[Vec2]) -> f32 {
    poly.iter().map(|p| p.x).fold(f32::MIN, f32::max)
}

fn dist2(a: Vec2, b: Vec2) -> f32 {
    (b - a).length_squared()
}

/// True if segment `a`–`b` crosses no edge of `poly` or `holes` and passes
/// through no other vertex.
fn segment_is_clear(a: Vec2, b: Vec2, poly: &[Vec2], holes: &[&Vec<Vec2>]) -> bool {
    std::iter::once(poly).chain(holes.iter().map(|h| h.as_slice())).all(|ring| {
        let n = ring.len();
        (0..n).all(|i| {
            let (p, q) = (ring[i], ring[(i + 1) % n]);
            !touches_interior(a, b, p) && !segments_cross(a, b, p, q)
        })
    })
}

/// `p` lies strictly between `a` and `b` on their segment.
fn touches_interior(a: Vec2, b: Vec2, p: Vec2) -> bool {
    if p == a || p == b || cross(a, b, p).abs() > EPS {
        return false;
    }
    let d = b - a;
    let t = (p - a).dot(d) / d.length_squared();
    t > 0.0 && t < 1.0
}

/// Proper crossing; shared endpoints do not count.
fn segments_cross(a: Vec2, b: Vec2, p: Vec2, q: Vec2) -> bool {
    if a == p || a == q || b == p || b == q {
        return false;
    }
    let d1 = cross(a, b, p);
    let d2 = cross(a, b, q);
    let d3 = cross(p, q, a);
    let d4 = cross(p, q, b);
    ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS)) && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
}

/// Closed triangle test, ignoring points that coincide with a corner.
fn in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    if p == a || p == b || p == c {
        return false;
    }
    cross(a, b, p) >= -EPS && cross(b, c, p) >= -EPS && cross(c, a, p) >= -EPS
}

fn ear_clip(poly: &[Vec2]) -> Vec<[u32; 3]> {
    let mut idx: Vec<usize> = (0..poly.len()).collect();
    let mut tris = Vec::with_capacity(poly.len().saturating_sub(2));

    while idx.len() > 3 {
        let n = idx.len();
        let ear = (0..n).find(|&i| {
            let (a, b, c) = (poly[idx[(i + n - 1) % n]], poly[idx[i]], poly[idx[(i + 1) % n]]);
            cross(a, b, c) > EPS
                && idx
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i && j != (i + n - 1) % n && j != (i + 1) % n)
                    .all(|(_, &k)| !in_triangle(poly[k], a, b, c))
        });

        match ear {
            Some(i) => {
                tris.push([idx[(i + n - 1) % n] as u32, idx[i] as u32, idx[(i + 1) % n] as u32]);
                idx.remove(i);
            }
            None => {
                // Zero-area corners (collinear runs, bridge seams) can be dropped.
                let flat = (0..n).find(|&i| {
                    cross(poly[idx[(i + n - 1) % n]], poly[idx[i]], poly[idx[(i + 1) % n]]).abs() <= EPS
                });
                match flat {
                    Some(i) => {
                        idx.remove(i);
                    }
                    None => {
                        log::debug!("ear clipping stalled with {n} vertices; closing with a fan");
                        for i in 1..n - 1 {
                            tris.push([idx[0] as u32, idx[i] as u32, idx[i + 1] as u32]);
                        }
                        return tris;
                    }
                }
            }
        }
    }

    if idx.len() == 3 && cross(poly[idx[0]], poly[idx[1]], poly[idx[2]]).abs() > EPS {
        tris.push([idx[0] as u32, idx[1] as u32, idx[2] as u32]);
    }
    tris
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, s: f32) -> Vec<Vec2> {
        vec![Vec2::new(x, y), Vec2::new(x + s, y), Vec2::new(x + s, y + s), Vec2::new(x, y + s)]
    }

    fn tri_area(poly: &[Vec2], tris: &[[u32; 3]]) -> f32 {
        tris.iter()
            .map(|t| cross(poly[t[0] as usize], poly[t[1] as usize], poly[t[2] as usize]) / 2.0)
            .sum()
    }

    #[test]
    fn square_becomes_two_triangles() {
        let shape = Shape { outer: square(0.0, 0.0, 1.0), holes: vec![] };
        let (poly, tris) = triangulate(&shape);
        assert_eq!(tris.len(), 2);
        assert!((tri_area(&poly, &tris) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn triangles_are_counter_clockwise() {
        let shape = Shape { outer: square(0.0, 0.0, 2.0), holes: vec![] };
        let (poly, tris) = triangulate(&shape);
        for t in &tris {
            assert!(cross(poly[t[0] as usize], poly[t[1] as usize], poly[t[2] as usize]) > 0.0);
        }
    }

    #[test]
    fn concave_l_shape() {
        let outer = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        let (poly, tris) = triangulate(&Shape { outer, holes: vec![] });
        assert_eq!(tris.len(), 4);
        assert!((tri_area(&poly, &tris) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn ring_area_excludes_hole() {
        let mut hole = square(1.0, 1.0, 1.0);
        hole.reverse();
        let shape = Shape { outer: square(0.0, 0.0, 3.0), holes: vec![hole] };
        let (poly, tris) = triangulate(&shape);
        assert_eq!(poly.len(), 4 + 4 + 2);
        assert!((tri_area(&poly, &tris) - 8.0).abs() < 1e-4);
    }

    #[test]
    fn two_holes() {
        let mut h1 = square(1.0, 1.0, 1.0);
        let mut h2 = square(3.0, 1.0, 1.0);
        h1.reverse();
        h2.reverse();
        let shape = Shape { outer: vec![
            Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0), Vec2::new(5.0, 3.0), Vec2::new(0.0, 3.0),
        ], holes: vec![h1, h2] };
        let (poly, tris) = triangulate(&shape);
        assert!((tri_area(&poly, &tris) - 13.0).abs() < 1e-4);
    }

    #[test]
    fn grouping_by_containment() {
        // outer ring, its hole, and an island inside the hole
        let shapes = group_contours(vec![
            square(2.0, 2.0, 1.0),
            square(0.0, 0.0, 5.0),
            square(1.0, 1.0, 3.0),
        ]);
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].holes.len(), 1);
        assert!(signed_area(&shapes[0].outer) > 0.0);
        assert!(signed_area(&shapes[0].holes[0]) < 0.0);
        assert!(shapes[1].holes.is_empty());
    }

    #[test]
    fn clockwise_solid_is_reoriented() {
        let mut cw = square(0.0, 0.0, 1.0);
        cw.reverse();
        let shapes = group_contours(vec![cw]);
        assert!(signed_area(&shapes[0].outer) > 0.0);
    }

    #[test]
    fn point_in_polygon() {
        let sq = square(0.0, 0.0, 2.0);
        assert!(contains_point(&sq, Vec2::new(1.0, 1.0)));
        assert!(!contains_point(&sq, Vec2::new(3.0, 1.0)));
    }
}
