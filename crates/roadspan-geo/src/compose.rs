//! Union of clipped line pieces

use crate::models::{from_geo_line, Geometry};
use geo::LineString;
use roadspan_core::error::{Result, RoadspanError};

/// Combine line pieces into one geometry.
///
/// Pieces keep the order they are given in; exact duplicates are dropped. A
/// single remaining piece stays a LineString, several become a
/// MultiLineString.
pub fn union_lines(pieces: &[LineString]) -> Result<Geometry> {
    let mut unique: Vec<&LineString> = Vec::with_capacity(pieces.len());
    for piece in pieces.iter().filter(|p| p.0.len() >= 2) {
        if !unique.contains(&piece) {
            unique.push(piece);
        }
    }

    match unique.as_slice() {
        [] => Err(RoadspanError::geometry("union_lines", "no pieces to combine")),
        [single] => Ok(from_geo_line(single)),
        many => Ok(Geometry::multi_line_string(
            many.iter().map(|line| line.coords().map(|c| [c.x, c.y]).collect()).collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadspan_core::models::GeometryType;

    #[test]
    fn test_single_piece_stays_line() {
        let piece = LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]);
        let geometry = union_lines(&[piece]).unwrap();
        assert_eq!(geometry.geometry_type(), GeometryType::LineString);
    }

    #[test]
    fn test_several_pieces_keep_order() {
        let first = LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]);
        let second = LineString::from(vec![(5.0, 0.0), (6.0, 0.0)]);
        let geometry = union_lines(&[first, second]).unwrap();
        assert_eq!(
            geometry,
            Geometry::multi_line_string(vec![
                vec![[0.0, 0.0], [1.0, 0.0]],
                vec![[5.0, 0.0], [6.0, 0.0]],
            ])
        );
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let piece = LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]);
        let geometry = union_lines(&[piece.clone(), piece]).unwrap();
        assert_eq!(geometry.geometry_type(), GeometryType::LineString);
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(union_lines(&[]).is_err());
        assert!(union_lines(&[LineString::from(vec![(0.0, 0.0)])]).is_err());
    }
}
