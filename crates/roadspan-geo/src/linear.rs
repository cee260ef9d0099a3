//! Linear referencing on planar lines.
//!
//! Distances are measured in the units of the line's own coordinates, so
//! fractions are only meaningful relative to the line they were computed on.

use geo::{
    Coord, Distance, Euclidean, Length, LineInterpolatePoint, LineLocatePoint, LineString, Point,
};
use roadspan_core::error::{Result, RoadspanError};

fn distance(a: Coord, b: Coord) -> f64 {
    Euclidean.distance(Point::from(a), Point::from(b))
}

/// Planar length of a line
pub fn line_length(line: &LineString) -> f64 {
    Euclidean.length(line)
}

/// Cumulative distance from the first vertex to every vertex, for cuts that
/// keep the interior vertices
fn cumulative_lengths(line: &LineString) -> Vec<f64> {
    let mut total = 0.0;
    let mut lengths = Vec::with_capacity(line.0.len());
    lengths.push(0.0);
    for segment in line.lines() {
        total += distance(segment.start, segment.end);
        lengths.push(total);
    }
    lengths
}

/// Coordinate at arc-length `target` along `line`, given its cumulative lengths
fn coord_at_distance(line: &LineString, cumulative: &[f64], target: f64) -> Coord {
    let coords = &line.0;
    for i in 1..coords.len() {
        if target <= cumulative[i] {
            let span = cumulative[i] - cumulative[i - 1];
            if span <= 0.0 {
                return coords[i];
            }
            let t = (target - cumulative[i - 1]) / span;
            let (a, b) = (coords[i - 1], coords[i]);
            return Coord { x: a.x + (b.x - a.x) * t, y: a.y + (b.y - a.y) * t };
        }
    }
    coords[coords.len() - 1]
}

/// Stitch line parts into one simple line.
///
/// Starting from the first part, the remaining part whose endpoint lies
/// closest to either end of the chain is attached next, reversed when needed.
/// Touching endpoints are joined without duplicating the shared vertex;
/// gaps are bridged by a straight edge.
pub fn merge_lines(parts: &[LineString]) -> Result<LineString> {
    let mut remaining: Vec<Vec<Coord>> =
        parts.iter().filter(|p| !p.0.is_empty()).map(|p| p.0.clone()).collect();
    if remaining.is_empty() {
        return Err(RoadspanError::geometry("merge_lines", "no line parts to merge"));
    }

    let mut chain = remaining.remove(0);
    while !remaining.is_empty() {
        let head = chain[0];
        let tail = chain[chain.len() - 1];

        // (part index, attach option, gap length)
        let mut best: Option<(usize, u8, f64)> = None;
        for (index, part) in remaining.iter().enumerate() {
            let first = part[0];
            let last = part[part.len() - 1];
            let options = [
                distance(tail, first),
                distance(tail, last),
                distance(head, last),
                distance(head, first),
            ];
            for (option, gap) in options.into_iter().enumerate() {
                if best.map_or(true, |(_, _, best_gap)| gap < best_gap) {
                    best = Some((index, option as u8, gap));
                }
            }
        }

        let Some((index, option, _)) = best else {
            break;
        };
        let mut part = remaining.remove(index);
        match option {
            0 | 1 => {
                if option == 1 {
                    part.reverse();
                }
                if part.first() == chain.last() {
                    part.remove(0);
                }
                chain.extend(part);
            }
            _ => {
                if option == 3 {
                    part.reverse();
                }
                if part.last() == chain.first() {
                    part.pop();
                }
                part.extend(chain);
                chain = part;
            }
        }
    }

    if chain.len() < 2 {
        return Err(RoadspanError::geometry("merge_lines", "merged line has fewer than 2 vertices"));
    }
    Ok(LineString::new(chain))
}

/// The portion of `line` between two arc-length fractions.
///
/// Fractions are clamped to `[0, 1]`. The result starts and ends at the
/// interpolated cut points and keeps every vertex strictly between them.
pub fn line_substring(line: &LineString, start_fraction: f64, end_fraction: f64) -> Result<LineString> {
    if !start_fraction.is_finite() || !end_fraction.is_finite() {
        return Err(RoadspanError::geometry("line_substring", "fractions must be finite"));
    }
    let f0 = start_fraction.clamp(0.0, 1.0);
    let f1 = end_fraction.clamp(0.0, 1.0);
    if f0 >= f1 {
        return Err(RoadspanError::geometry(
            "line_substring",
            format!("empty fraction window [{}, {}]", f0, f1),
        ));
    }

    let cumulative = cumulative_lengths(line);
    let total = cumulative.last().copied().unwrap_or(0.0);
    if line.0.len() < 2 || total <= 0.0 {
        return Err(RoadspanError::geometry("line_substring", "line has zero length"));
    }

    let d0 = f0 * total;
    let d1 = f1 * total;
    let mut coords = vec![coord_at_distance(line, &cumulative, d0)];
    for (coord, along) in line.0.iter().zip(&cumulative) {
        if *along > d0 && *along < d1 && coords.last() != Some(coord) {
            coords.push(*coord);
        }
    }
    let end = coord_at_distance(line, &cumulative, d1);
    if coords.last() != Some(&end) {
        coords.push(end);
    }

    if coords.len() < 2 {
        return Err(RoadspanError::geometry("line_substring", "cut collapsed to a single point"));
    }
    Ok(LineString::new(coords))
}

/// Coordinate at an arc-length fraction of `line` (clamped to `[0, 1]`)
pub fn interpolate_at_fraction(line: &LineString, fraction: f64) -> Result<Coord> {
    if line.0.is_empty() {
        return Err(RoadspanError::geometry("interpolate_at_fraction", "line is empty"));
    }
    if !fraction.is_finite() {
        return Err(RoadspanError::geometry("interpolate_at_fraction", "fraction must be finite"));
    }
    if line_length(line) <= 0.0 {
        return Ok(line.0[0]);
    }
    line.line_interpolate_point(fraction.clamp(0.0, 1.0))
        .map(Coord::from)
        .ok_or_else(|| RoadspanError::geometry("interpolate_at_fraction", "point is not on the line"))
}

/// A point projected onto a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatedPoint {
    /// Arc-length fraction of the closest point on the line
    pub fraction: f64,
    /// The closest point on the line
    pub snapped: Coord,
}

/// Project `point` onto `line`
pub fn locate_point(line: &LineString, point: Point) -> Result<LocatedPoint> {
    if line.0.is_empty() {
        return Err(RoadspanError::geometry("locate_point", "line is empty"));
    }
    if line_length(line) <= 0.0 {
        return Ok(LocatedPoint { fraction: 0.0, snapped: line.0[0] });
    }
    let fraction = line.line_locate_point(&point).ok_or_else(|| {
        RoadspanError::geometry("locate_point", "point cannot be located on the line")
    })?;
    let snapped = interpolate_at_fraction(line, fraction)?;
    Ok(LocatedPoint { fraction, snapped })
}
