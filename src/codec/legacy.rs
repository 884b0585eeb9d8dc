//! Legacy VIAME CSV decoding.
//!
//! Column layout (fixed, 0-based):
//!
//! | col  | meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | track id                                             |
//! | 1    | video timestamp or image filename (ignored)          |
//! | 2    | frame                                                |
//! | 3-6  | tl_x, tl_y, br_x, br_y                               |
//! | 7    | detection confidence (checked, not stored)           |
//! | 8    | target length, `<= 0` means absent                   |
//! | 9+   | `label, confidence` pairs, then tagged columns       |
//!
//! Tagged columns start with a parenthesized tag: `(atr) key value`,
//! `(trk-atr) key value`, `(kp) head|tail x y`, `(poly) ...`.

use std::collections::BTreeMap;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::Value;
use tracing::{debug, warn};

use crate::collection::TrackCollection;
use crate::error::DecodeError;
use crate::model::{Feature, Rect, TrackBuilder, TrackId};

const MIN_COLUMNS: usize = 9;

/// One parsed CSV row.
struct Row {
    track_id: TrackId,
    feature: Feature,
    confidence_pairs: Vec<(String, f64)>,
    track_attributes: Vec<(String, Value)>,
}

pub(super) fn decode(bytes: &[u8]) -> Result<TrackCollection, DecodeError> {
    let mut builders: BTreeMap<TrackId, TrackBuilder> = BTreeMap::new();
    for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = index as u64 + 1;
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let trimmed = raw.trim_ascii();
        if trimmed.is_empty() || trimmed.starts_with(b"#") {
            continue;
        }

        let Some(record) = read_record(raw, line)? else {
            continue;
        };
        let row = parse_row(&record, line)?;
        let builder = builders
            .entry(row.track_id)
            .or_insert_with(|| TrackBuilder::new(row.track_id));
        builder.push_feature(row.feature);
        for (label, confidence) in row.confidence_pairs {
            builder.add_confidence(label, confidence);
        }
        for (key, value) in row.track_attributes {
            builder.set_attribute(key, value);
        }
    }

    Ok(builders
        .into_values()
        .map(|builder| {
            let mut track = builder.build();
            // Rows of one track may be interleaved out of frame order.
            track.features.sort_by_key(|f| f.frame);
            track
        })
        .collect())
}

/// Split one physical line into fields. Legacy rows never span lines.
fn read_record(raw: &[u8], line: u64) -> Result<Option<StringRecord>, DecodeError> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw)
        .records()
        .next()
        .transpose()
        .map_err(|e| row_error(line, e.to_string()))
}

fn row_error(line: u64, reason: impl Into<String>) -> DecodeError {
    DecodeError::Row {
        line,
        reason: reason.into(),
    }
}

fn parse_num<T: std::str::FromStr>(
    record: &StringRecord,
    col: usize,
    name: &str,
    line: u64,
) -> Result<T, DecodeError> {
    let cell = record.get(col).unwrap_or_default();
    cell.parse::<T>()
        .map_err(|_| row_error(line, format!("column {col} ({name}): expected a number, found '{cell}'")))
}

fn parse_row(record: &StringRecord, line: u64) -> Result<Row, DecodeError> {
    if record.len() < MIN_COLUMNS {
        return Err(row_error(
            line,
            format!(
                "expected at least {MIN_COLUMNS} columns, found {}",
                record.len()
            ),
        ));
    }

    let track_id: TrackId = parse_num(record, 0, "track id", line)?;
    let frame: u64 = parse_num(record, 2, "frame", line)?;
    let mut coords = [0.0f64; 4];
    for (i, coord) in coords.iter_mut().enumerate() {
        *coord = parse_num(record, 3 + i, "bounds", line)?;
    }
    let _detection_confidence: f64 = parse_num(record, 7, "confidence", line)?;
    let length: f64 = parse_num(record, 8, "length", line)?;

    let mut feature = Feature::at(frame).with_bounds(Rect::from(coords));
    if !feature.bounds.is_some_and(|b| b.is_finite()) {
        return Err(row_error(line, "bounds must be finite"));
    }
    if !length.is_finite() {
        return Err(row_error(line, "length must be finite"));
    }
    if length > 0.0 {
        feature.fish_length = Some(length);
    }

    let mut confidence_pairs = Vec::new();
    let mut track_attributes = Vec::new();
    let mut col = MIN_COLUMNS;
    while col < record.len() {
        let cell = &record[col];
        if cell.is_empty() {
            col += 1;
            continue;
        }
        if cell.starts_with('(') {
            parse_tagged(cell, &mut feature, &mut track_attributes, line)?;
            col += 1;
            continue;
        }

        let confidence: f64 = match record.get(col + 1) {
            Some(value) if !value.is_empty() => parse_num(record, col + 1, "pair confidence", line)?,
            _ => {
                return Err(row_error(
                    line,
                    format!("label '{cell}' in column {col} has no confidence"),
                ));
            }
        };
        if !(0.0..=1.0).contains(&confidence) {
            return Err(row_error(
                line,
                format!("confidence {confidence} for '{cell}' is outside [0, 1]"),
            ));
        }
        confidence_pairs.push((cell.to_string(), confidence));
        col += 2;
    }

    Ok(Row {
        track_id,
        feature,
        confidence_pairs,
        track_attributes,
    })
}

fn parse_tagged(
    cell: &str,
    feature: &mut Feature,
    track_attributes: &mut Vec<(String, Value)>,
    line: u64,
) -> Result<(), DecodeError> {
    let mut parts = cell.split_whitespace();
    let tag = parts.next().unwrap_or_default();
    match tag {
        "(atr)" | "(trk-atr)" => {
            let key = parts
                .next()
                .ok_or_else(|| row_error(line, format!("attribute column '{cell}' has no key")))?;
            let value = attribute_value(&parts.collect::<Vec<_>>().join(" "));
            if tag == "(atr)" {
                feature
                    .attributes
                    .get_or_insert_with(Default::default)
                    .insert(key.to_string(), value);
            } else {
                track_attributes.push((key.to_string(), value));
            }
        }
        "(kp)" => {
            let name = parts.next().unwrap_or_default();
            let coords = parts
                .map(|p| p.parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| row_error(line, format!("keypoint column '{cell}' is not numeric")))?;
            let [x, y] = coords.as_slice() else {
                return Err(row_error(line, format!("keypoint column '{cell}' needs x and y")));
            };
            if !(x.is_finite() && y.is_finite()) {
                return Err(row_error(line, format!("keypoint column '{cell}' must be finite")));
            }
            match name {
                "head" => feature.head = Some([*x, *y]),
                "tail" => feature.tail = Some([*x, *y]),
                other => warn!("Line {}: ignoring keypoint '{}'", line, other),
            }
        }
        "(poly)" => debug!("Line {}: polygon column ignored", line),
        other => warn!("Line {}: ignoring unknown column tag '{}'", line, other),
    }
    Ok(())
}

/// Attribute cells carry untyped text: booleans and numbers are recovered,
/// anything else stays a string.
fn attribute_value(raw: &str) -> Value {
    match raw {
        "true" | "True" => return Value::Bool(true),
        "false" | "False" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    match raw.parse::<f64>() {
        Ok(float) if float.is_finite() => Value::from(float),
        _ => Value::String(raw.to_string()),
    }
}
