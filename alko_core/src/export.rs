//! CSV export of the concentration timeline.

use crate::{Estimate, Result, TimelinePoint};
use std::io::Write;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    minute: u32,
    clock: &'a str,
    promiles: f64,
}

impl<'a> From<&'a TimelinePoint> for CsvRow<'a> {
    fn from(point: &'a TimelinePoint) -> Self {
        CsvRow {
            minute: point.time,
            clock: &point.clock,
            promiles: point.promiles,
        }
    }
}

/// Write the timeline of an estimate as CSV with a header row
///
/// Returns the number of rows written.
pub fn write_timeline_csv<W: Write>(estimate: &Estimate, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for point in &estimate.timeline {
        csv_writer.serialize(CsvRow::from(point))?;
    }

    csv_writer.flush()?;
    tracing::debug!("Wrote {} timeline rows as CSV", estimate.timeline.len());
    Ok(estimate.timeline.len())
}
