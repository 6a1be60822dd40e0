/// Fidelity report writer
///
/// Tab-separated text output: one block per source view (name line with the
/// fitted slope and peak, the minimum sampled distance, and the first
/// non-zero error sample, followed by the distance row and the error row),
/// then an optional target section listing retired source views and the
/// greedy importance order.

use std::io::Write;

use crate::error::Result;
use crate::fidelity::{FidelityCurve, ViewErrorSweep};

/// Writes the tab-separated fidelity report
pub struct FidelityReportWriter<W: Write> {
    out: W,
}

impl<W: Write> FidelityReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// One source view's block: stats line, distance row, error row,
    /// trailing blank line.
    pub fn view_block(
        &mut self,
        name: &str,
        sweep: &ViewErrorSweep,
        curve: &FidelityCurve,
    ) -> Result<()> {
        let min_sampled_distance = sweep.distances.get(1).copied().unwrap_or(0.0);
        let first_error = sweep.errors.get(1).copied().unwrap_or(0.0);
        writeln!(
            self.out,
            "{}\t{}\t{}\t{}\t{}",
            name, curve.slope, curve.peak, min_sampled_distance, first_error
        )?;

        for distance in &sweep.distances {
            write!(self.out, "{}\t", distance)?;
        }
        writeln!(self.out)?;

        for error in &sweep.errors {
            write!(self.out, "{}\t", error)?;
        }
        writeln!(self.out)?;

        writeln!(self.out)?;
        Ok(())
    }

    /// Header introducing the target-view-set section
    pub fn target_section_header(&mut self) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Expected error for views in target view set:")?;
        writeln!(self.out)?;
        Ok(())
    }

    /// A source view absent from the target set: measured once against the
    /// kept views, with the cumulative measured error over the remainder.
    pub fn source_only_row(
        &mut self,
        name: &str,
        curve: &FidelityCurve,
        measured_error: f64,
        cumulative_error: f64,
    ) -> Result<()> {
        writeln!(
            self.out,
            "{}\t{}\t{}\tn/a\t{}\t{}",
            name, curve.slope, curve.peak, measured_error, cumulative_error
        )?;
        Ok(())
    }

    /// One greedy pick: distance to the previously picked set, predicted
    /// error, and the running cumulative predicted error of the remainder.
    pub fn ranked_row(
        &mut self,
        name: &str,
        curve: &FidelityCurve,
        distance: f64,
        error: f64,
        expected_cumulative: f64,
    ) -> Result<()> {
        writeln!(
            self.out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            name, curve.slope, curve.peak, distance, error, expected_cumulative
        )?;
        Ok(())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
