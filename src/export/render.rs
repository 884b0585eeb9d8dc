use csv::{Terminator, WriterBuilder};

use crate::error::ExportError;
use crate::export::rows::{ExportRow, ExportRows};
use crate::model::Attributes;

/// Renders an export as CSV text, one line per item.
///
/// The first item is the header. Fields are comma separated, rows end with
/// `\n`, and a field is quoted only when it contains a delimiter, quote or
/// newline. Numbers are written in plain decimal notation, always with a
/// decimal point (`2.0`, `0.25`, `100000000000000000000.0`). The stream ends
/// after the first error.
pub struct CsvLines<'a> {
    rows: ExportRows<'a>,
    header_pending: bool,
    failed: bool,
}

impl<'a> CsvLines<'a> {
    pub fn new(rows: ExportRows<'a>) -> Self {
        Self {
            rows,
            header_pending: true,
            failed: false,
        }
    }

    fn render(fields: Vec<String>) -> Result<String, ExportError> {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(&fields).map_err(render_err)?;
        let bytes = writer.into_inner().map_err(render_err)?;
        String::from_utf8(bytes).map_err(render_err)
    }

    fn fields(&self, row: ExportRow) -> Result<Vec<String>, ExportError> {
        let options = self.rows.options();
        let mut fields = vec![row.track_id.to_string(), row.frame.to_string()];
        if options.fps.is_some() {
            fields.push(row.time.map(float).unwrap_or_default());
        }
        if options.filenames.is_some() {
            fields.push(row.filename.unwrap_or_default());
        }
        match row.bounds {
            Some(bounds) => fields.extend(bounds.to_tlbr().into_iter().map(float)),
            None => fields.extend(std::iter::repeat_n(String::new(), 4)),
        }
        fields.push(row.fish_length.map(float).unwrap_or_default());
        fields.extend(
            row.confidences
                .into_iter()
                .map(|c| c.map(float).unwrap_or_default()),
        );
        fields.push(inline(row.attributes.as_ref())?);
        fields.push(inline(row.track_attributes.as_ref())?);
        Ok(fields)
    }
}

impl Iterator for CsvLines<'_> {
    type Item = Result<String, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let line = if self.header_pending {
            self.header_pending = false;
            Self::render(self.rows.header())
        } else {
            match self.rows.next()? {
                Ok(row) => self.fields(row).and_then(Self::render),
                Err(e) => Err(e),
            }
        };
        self.failed = line.is_err();
        Some(line)
    }
}

fn render_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Render(e.to_string())
}

fn float(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// Compact JSON for a non-empty attribute mapping, blank otherwise.
fn inline(attributes: Option<&Attributes>) -> Result<String, ExportError> {
    match attributes {
        Some(attributes) if !attributes.is_empty() => {
            serde_json::to_string(attributes).map_err(render_err)
        }
        _ => Ok(String::new()),
    }
}
