//! Shape checks run before a raw record is deserialized, and invariant
//! checks run on the typed track afterwards.

use serde_json::Value;

use crate::error::ValidationError;
use crate::model::Attributes;
use crate::model::track::Track;

/// Structural checks on a raw record so errors can name the exact field.
pub(crate) fn check_shape(value: &Value) -> Result<(), ValidationError> {
    let record = value
        .as_object()
        .ok_or_else(|| ValidationError::new("track", "expected an object"))?;

    match record.get("trackId") {
        None | Some(Value::Null) => return Err(ValidationError::new("trackId", "field required")),
        Some(id) if id.as_u64().is_none() => {
            return Err(ValidationError::new(
                "trackId",
                "expected a non-negative integer",
            ));
        }
        Some(_) => {}
    }

    for key in ["begin", "end"] {
        if let Some(v) = record.get(key) {
            if !v.is_null() && v.as_u64().is_none() {
                return Err(ValidationError::new(key, "expected a non-negative integer"));
            }
        }
    }

    if let Some(pairs) = record.get("confidencePairs") {
        let pairs = pairs
            .as_array()
            .ok_or_else(|| ValidationError::new("confidencePairs", "expected an array"))?;
        for (i, pair) in pairs.iter().enumerate() {
            check_pair(pair).map_err(|e| e.within(&format!("[{i}]")).within("confidencePairs"))?;
        }
    }

    if let Some(features) = record.get("features") {
        let features = features
            .as_array()
            .ok_or_else(|| ValidationError::new("features", "expected an array"))?;
        for (i, feature) in features.iter().enumerate() {
            check_feature(feature).map_err(|e| e.within(&format!("[{i}]")).within("features"))?;
        }
    }

    for key in ["attributes", "meta"] {
        if let Some(v) = non_null(record.get(key)) {
            if !v.is_object() {
                return Err(ValidationError::new(key, "expected an object"));
            }
        }
    }

    Ok(())
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn check_pair(pair: &Value) -> Result<(), ValidationError> {
    match pair.as_array().map(Vec::as_slice) {
        Some([label, confidence]) => {
            if !label.is_string() {
                return Err(ValidationError::new("[0]", "expected a string label"));
            }
            if !confidence.is_number() {
                return Err(ValidationError::new("[1]", "expected a number"));
            }
            Ok(())
        }
        _ => Err(ValidationError::new("", "expected a [label, confidence] pair")),
    }
}

fn check_feature(feature: &Value) -> Result<(), ValidationError> {
    let record = feature
        .as_object()
        .ok_or_else(|| ValidationError::new("", "expected an object"))?;

    match record.get("frame") {
        None | Some(Value::Null) => return Err(ValidationError::new("frame", "field required")),
        Some(frame) if frame.as_u64().is_none() => {
            return Err(ValidationError::new(
                "frame",
                "expected a non-negative integer",
            ));
        }
        Some(_) => {}
    }

    if let Some(bounds) = non_null(record.get("bounds")) {
        let ok = bounds
            .as_array()
            .is_some_and(|b| b.len() == 4 && b.iter().all(Value::is_number));
        if !ok {
            return Err(ValidationError::new("bounds", "expected four numbers"));
        }
    }

    for key in ["head", "tail"] {
        if let Some(point) = non_null(record.get(key)) {
            let ok = point
                .as_array()
                .is_some_and(|p| p.len() == 2 && p.iter().all(Value::is_number));
            if !ok {
                return Err(ValidationError::new(key, "expected two numbers"));
            }
        }
    }

    if let Some(length) = non_null(record.get("fishLength")) {
        if !length.is_number() {
            return Err(ValidationError::new("fishLength", "expected a number"));
        }
    }

    for key in ["interpolate", "keyframe"] {
        if let Some(flag) = non_null(record.get(key)) {
            if !flag.is_boolean() {
                return Err(ValidationError::new(key, "expected a boolean"));
            }
        }
    }

    if let Some(attributes) = non_null(record.get("attributes")) {
        if !attributes.is_object() {
            return Err(ValidationError::new("attributes", "expected an object"));
        }
    }

    Ok(())
}

fn check_attributes(field: &str, attributes: &Attributes) -> Result<(), ValidationError> {
    for (key, value) in attributes {
        if value.is_array() || value.is_object() {
            return Err(ValidationError::new(
                format!("{field}.{key}"),
                "expected a scalar value",
            ));
        }
    }
    Ok(())
}

/// Invariants on a typed track: confidence range, finite geometry, scalar
/// attributes and non-decreasing frame order.
pub(crate) fn check_track(track: &Track) -> Result<(), ValidationError> {
    for (i, pair) in track.confidence_pairs.iter().enumerate() {
        let c = pair.confidence();
        if !(0.0..=1.0).contains(&c) {
            return Err(ValidationError::new(
                format!("confidencePairs[{i}][1]"),
                format!("confidence {c} is outside [0, 1]"),
            ));
        }
    }

    if let Some(attributes) = &track.attributes {
        check_attributes("attributes", attributes)?;
    }

    let mut previous = None;
    for (i, feature) in track.features.iter().enumerate() {
        if let Some(bounds) = &feature.bounds {
            if !bounds.is_finite() {
                return Err(ValidationError::new(
                    format!("features[{i}].bounds"),
                    "coordinates must be finite",
                ));
            }
        }
        if let Some(attributes) = &feature.attributes {
            check_attributes(&format!("features[{i}].attributes"), attributes)?;
        }
        if let Some(prev) = previous {
            if feature.frame < prev {
                return Err(ValidationError::new(
                    format!("features[{i}].frame"),
                    format!("frame {} precedes frame {prev}", feature.frame),
                ));
            }
        }
        previous = Some(feature.frame);
    }

    if let (Some(begin), Some(end)) = (track.begin, track.end) {
        if begin > end {
            return Err(ValidationError::new(
                "begin",
                format!("begin {begin} is after end {end}"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_track_id_type() {
        let err = check_shape(&json!({"trackId": "7"})).unwrap_err();
        assert_eq!(err.field, "trackId");
        let err = check_shape(&json!({"trackId": -1})).unwrap_err();
        assert_eq!(err.field, "trackId");
    }

    #[test]
    fn test_feature_errors_name_index() {
        let err = check_shape(&json!({
            "trackId": 1,
            "features": [{"frame": 0}, {"bounds": [0, 0, 1, 1]}]
        }))
        .unwrap_err();
        assert_eq!(err.field, "features[1].frame");

        let err = check_shape(&json!({
            "trackId": 1,
            "features": [{"frame": 0, "bounds": [0, 0, 1]}]
        }))
        .unwrap_err();
        assert_eq!(err.field, "features[0].bounds");
    }

    #[test]
    fn test_confidence_pair_shape() {
        let err = check_shape(&json!({"trackId": 1, "confidencePairs": [["fish"]]})).unwrap_err();
        assert_eq!(err.field, "confidencePairs[0]");

        let err =
            check_shape(&json!({"trackId": 1, "confidencePairs": [[3, 0.5]]})).unwrap_err();
        assert_eq!(err.field, "confidencePairs[0][0]");
    }

    #[test]
    fn test_confidence_range() {
        let mut track = Track::new(1);
        track
            .confidence_pairs
            .push(crate::model::ConfidencePair::new("fish", 1.5));
        let err = check_track(&track).unwrap_err();
        assert_eq!(err.field, "confidencePairs[0][1]");
    }

    #[test]
    fn test_frame_order() {
        use crate::model::Feature;
        let mut track = Track::new(1);
        track.features = vec![Feature::at(3), Feature::at(3), Feature::at(2)];
        let err = check_track(&track).unwrap_err();
        assert_eq!(err.field, "features[2].frame");
    }

    #[test]
    fn test_nested_attribute_rejected() {
        let mut track = Track::new(1);
        let mut attributes = Attributes::new();
        attributes.insert("tags".into(), json!(["a", "b"]));
        track.attributes = Some(attributes);
        let err = check_track(&track).unwrap_err();
        assert_eq!(err.field, "attributes.tags");
    }
}
