//! Tests for bounding-box resolution

use super::*;
use crate::database::models::GeoPoint;

fn region(tr: (&str, &str), bl: (&str, &str)) -> Result<Region, BoundsError> {
    build_region(&Coordinate::new(tr.0, tr.1), &Coordinate::new(bl.0, bl.1))
}

#[test]
fn test_string_corners_are_coerced() {
    let region = region(("10.5", "20.25"), ("5", "15")).unwrap();
    assert_eq!(
        region.ring(),
        &[
            [15.0, 5.0],
            [15.0, 10.5],
            [20.25, 10.5],
            [20.25, 5.0],
            [15.0, 5.0]
        ]
    );
}

#[test]
fn test_numeric_and_text_corners_agree() {
    let from_text = region(("10.5", "20.25"), ("5", "15")).unwrap();
    let from_numbers = build_region(
        &Coordinate::new(10.5, 20.25),
        &Coordinate::new(5.0, 15.0),
    )
    .unwrap();
    assert_eq!(from_text, from_numbers);
}

#[test]
fn test_ring_is_closed_with_four_distinct_corners() {
    let cases = [
        (("1", "1"), ("0", "0")),
        (("89.9", "179.9"), ("-89.9", "-179.9")),
        (("-10", "-20"), ("-30", "-40")),
        ((" 60.17 ", "24.95"), ("60.15", " 24.90")),
    ];

    for (tr, bl) in cases {
        let region = region(tr, bl).unwrap();
        let ring = region.ring();
        assert_eq!(ring.len(), 5, "ring for {:?}/{:?}", tr, bl);
        assert_eq!(ring.first(), ring.last(), "ring for {:?}/{:?} is open", tr, bl);

        let mut corners: Vec<[f64; 2]> = Vec::new();
        for p in &ring[..4] {
            if !corners.contains(p) {
                corners.push(*p);
            }
        }
        assert_eq!(corners.len(), 4, "ring for {:?}/{:?}", tr, bl);
    }
}

#[test]
fn test_build_is_idempotent() {
    let tr = Coordinate::new("48.9", "2.45");
    let bl = Coordinate::new("48.8", "2.25");
    assert_eq!(build_region(&tr, &bl).unwrap(), build_region(&tr, &bl).unwrap());
}

#[test]
fn test_serializes_as_geojson_polygon() {
    let region = region(("10.5", "20.25"), ("5", "15")).unwrap();
    let value = serde_json::to_value(&region).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "type": "Polygon",
            "coordinates": [[[15.0, 5.0], [15.0, 10.5], [20.25, 10.5], [20.25, 5.0], [15.0, 5.0]]]
        })
    );
}

#[test]
fn test_non_numeric_text_is_invalid() {
    let err = region(("abc", "20"), ("5", "15")).unwrap_err();
    assert_eq!(
        err,
        BoundsError::InvalidCoordinate {
            field: "topRight.lat".into(),
            value: "abc".into()
        }
    );
}

#[test]
fn test_empty_and_non_finite_text_is_invalid() {
    for bad in ["", "   ", "NaN", "inf", "-infinity", "1,5"] {
        let result = region(("10", "20"), (bad, "15"));
        assert!(
            matches!(result, Err(BoundsError::InvalidCoordinate { ref field, .. }) if field == "bottomLeft.lat"),
            "{:?} should be rejected, got {:?}",
            bad,
            result
        );
    }
}

#[test]
fn test_non_finite_number_is_invalid() {
    let result = build_region(
        &Coordinate::new(f64::NAN, 20.0),
        &Coordinate::new(5.0, 15.0),
    );
    assert!(matches!(result, Err(BoundsError::InvalidCoordinate { .. })));
}

#[test]
fn test_out_of_range_latitude_is_invalid() {
    let result = region(("90.5", "20"), ("5", "15"));
    assert!(matches!(
        result,
        Err(BoundsError::InvalidCoordinate { ref field, .. }) if field == "topRight.lat"
    ));
}

#[test]
fn test_out_of_range_longitude_is_invalid() {
    let result = region(("10", "20"), ("5", "-180.01"));
    assert!(matches!(
        result,
        Err(BoundsError::InvalidCoordinate { ref field, .. }) if field == "bottomLeft.lng"
    ));
}

#[test]
fn test_poles_and_antimeridian_limits_are_accepted() {
    let region = region(("90", "180"), ("-90", "-180")).unwrap();
    assert_eq!(region.ring()[2], [180.0, 90.0]);
}

#[test]
fn test_identical_corners_are_malformed() {
    let result = region(("10", "20"), ("10", "20"));
    assert!(matches!(result, Err(BoundsError::MalformedRectangle(_))));
}

#[test]
fn test_zero_width_rectangle_is_malformed() {
    let result = region(("10", "20"), ("5", "20"));
    assert!(matches!(result, Err(BoundsError::MalformedRectangle(_))));
}

#[test]
fn test_inverted_latitude_is_malformed() {
    let result = region(("5", "20"), ("10", "15"));
    assert!(matches!(result, Err(BoundsError::MalformedRectangle(_))));
}

#[test]
fn test_antimeridian_span_is_malformed() {
    // North-east corner west of the south-west corner
    let result = region(("10", "-170"), ("5", "170"));
    assert!(matches!(result, Err(BoundsError::MalformedRectangle(_))));
}

#[test]
fn test_query_pairs_are_lat_then_lng() {
    let region = region_from_query("10.5,20.25", "5,15").unwrap();
    assert_eq!(region.ring()[2], [20.25, 10.5]);
}

#[test]
fn test_query_pair_needs_exactly_two_tokens() {
    for bad in ["10.5", "10.5,20.25,3", ""] {
        let result = region_from_query(bad, "5,15");
        assert!(
            matches!(result, Err(BoundsError::InvalidCoordinate { ref field, .. }) if field == "topRight"),
            "{:?} should be rejected, got {:?}",
            bad,
            result
        );
    }
}

#[test]
fn test_containment_matches_inside_point_only() {
    let region = region(("10.5", "20.25"), ("5", "15")).unwrap();
    assert!(region_contains(&region, &GeoPoint::new(16.0, 7.0)));
    assert!(!region_contains(&region, &GeoPoint::new(30.0, 30.0)));
}

#[test]
fn test_containment_includes_boundary() {
    let region = region(("10", "20"), ("5", "15")).unwrap();
    assert!(region_contains(&region, &GeoPoint::new(15.0, 7.0)));
    assert!(region_contains(&region, &GeoPoint::new(20.0, 10.0)));
    assert!(!region_contains(&region, &GeoPoint::new(20.0001, 10.0)));
}
