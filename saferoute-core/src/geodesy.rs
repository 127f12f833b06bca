//! Distance primitives on WGS84 coordinates.
//!
//! Points follow the `geo` convention: `x` is longitude, `y` is latitude,
//! both in decimal degrees.

use geo::{Coord, LineString, Point, Rect, coord};

use crate::Meters;

/// Mean Earth radius used by every distance in the engine.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two points.
pub fn haversine(a: Point<f64>, b: Point<f64>) -> Meters {
    let (lat1, lat2) = (a.y().to_radians(), b.y().to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Distance from `point` to the segment `start`-`end`.
///
/// Works in a tangent plane anchored at `start`: longitudes are scaled by the
/// cosine of the segment's mean latitude. Good to well under a meter for
/// segments of a few kilometers.
pub fn point_segment_distance(point: Point<f64>, start: Point<f64>, end: Point<f64>) -> Meters {
    let mean_lat = ((start.y() + end.y()) / 2.0).to_radians();
    let project = |p: Point<f64>| -> Coord<f64> {
        coord! {
            x: (p.x() - start.x()).to_radians() * mean_lat.cos() * EARTH_RADIUS_METERS,
            y: (p.y() - start.y()).to_radians() * EARTH_RADIUS_METERS,
        }
    };

    let p = project(point);
    let b = project(end);
    let seg_len_sq = b.x * b.x + b.y * b.y;

    if seg_len_sq == 0.0 {
        return p.x.hypot(p.y);
    }

    let t = ((p.x * b.x + p.y * b.y) / seg_len_sq).clamp(0.0, 1.0);
    (p.x - t * b.x).hypot(p.y - t * b.y)
}

/// Smallest segment distance from `point` to any segment of `line`.
pub fn polyline_distance(point: Point<f64>, line: &LineString<f64>) -> Meters {
    match line.0.as_slice() {
        [] => f64::INFINITY,
        [only] => haversine(point, (*only).into()),
        _ => line
            .lines()
            .map(|segment| point_segment_distance(point, segment.start_point(), segment.end_point()))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Sum of haversine distances over consecutive polyline vertices.
pub fn polyline_length(line: &LineString<f64>) -> Meters {
    line.lines()
        .map(|segment| haversine(segment.start_point(), segment.end_point()))
        .sum()
}

/// Inclusive point-in-box test; points on an edge or corner are inside.
pub fn bbox_contains(bounds: &Rect<f64>, point: Point<f64>) -> bool {
    let (min, max) = (bounds.min(), bounds.max());
    point.x() >= min.x && point.x() <= max.x && point.y() >= min.y && point.y() <= max.y
}

/// Box spanning both points, grown by `pad_deg` on every side.
pub fn padded_bbox(a: Point<f64>, b: Point<f64>, pad_deg: f64) -> Rect<f64> {
    Rect::new(
        coord! { x: a.x().min(b.x()) - pad_deg, y: a.y().min(b.y()) - pad_deg },
        coord! { x: a.x().max(b.x()) + pad_deg, y: a.y().max(b.y()) + pad_deg },
    )
}

/// Degree offsets that cover at least `meters` around `latitude`.
/// Returns `(d_lng, d_lat)`.
pub(crate) fn meters_to_degrees(meters: Meters, latitude: f64) -> (f64, f64) {
    let d_lat = (meters / EARTH_RADIUS_METERS).to_degrees();
    // Clamp so boxes stay finite near the poles.
    let cos_lat = latitude.to_radians().cos().max(1e-6);
    (d_lat / cos_lat, d_lat)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::line_string;

    use super::*;

    #[test]
    fn haversine_matches_known_distance() {
        // One thousandth of a degree of latitude.
        let a = Point::new(90.4, 23.7);
        let b = Point::new(90.4, 23.701);
        assert_relative_eq!(haversine(a, b), 111.195, epsilon = 1e-2);
        assert_eq!(haversine(a, a), 0.0);
    }

    #[test]
    fn segment_distance_is_perpendicular_inside_and_clamped_outside() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(0.001, 0.0);

        let above_middle = Point::new(0.0005, 0.00005);
        assert_relative_eq!(
            point_segment_distance(above_middle, start, end),
            5.56,
            epsilon = 1e-2
        );

        let past_end = Point::new(0.002, 0.0);
        assert_relative_eq!(
            point_segment_distance(past_end, start, end),
            haversine(past_end, end),
            epsilon = 1e-3
        );
    }

    #[test]
    fn degenerate_segment_falls_back_to_point_distance() {
        let p = Point::new(0.0, 0.0001);
        let a = Point::new(0.0, 0.0);
        assert_relative_eq!(
            point_segment_distance(p, a, a),
            haversine(p, a),
            epsilon = 1e-6
        );
    }

    #[test]
    fn two_vertex_polyline_length_equals_haversine() {
        let line = line_string![(x: 90.4, y: 23.7), (x: 90.4001, y: 23.7001)];
        assert_relative_eq!(
            polyline_length(&line),
            haversine(Point::new(90.4, 23.7), Point::new(90.4001, 23.7001)),
            epsilon = 1e-9
        );
        assert_relative_eq!(polyline_length(&line), 15.08, epsilon = 1e-2);
    }

    #[test]
    fn bbox_contains_edges_and_corners() {
        let bounds = Rect::new(coord! { x: 90.2, y: 23.6 }, coord! { x: 90.6, y: 24.0 });
        assert!(bbox_contains(&bounds, Point::new(90.2, 23.6)));
        assert!(bbox_contains(&bounds, Point::new(90.6, 24.0)));
        assert!(!bbox_contains(&bounds, Point::new(90.61, 24.0)));
    }

    #[test]
    fn padded_bbox_orders_corners() {
        let bounds = padded_bbox(Point::new(1.0, 2.0), Point::new(0.0, 1.0), 0.1);
        assert_relative_eq!(bounds.min().x, -0.1);
        assert_relative_eq!(bounds.min().y, 0.9);
        assert_relative_eq!(bounds.max().x, 1.1);
        assert_relative_eq!(bounds.max().y, 2.1);
    }
}
