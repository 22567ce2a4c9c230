//! Hook called by the judge after every match.
//!
//! The judge hands the current tournament report and a snapshot of every committed result
//! to a [`Reporter`]. What the reporter does with them (write a file, upload to a website,
//! print a table) is up to it. A failing reporter never affects the tournament: the error
//! is logged, counted in the summary, and the next match runs as usual.

use std::io::Write;

use anyhow::Context;
use serde::Serialize;

use crate::report::TournamentReport;
use crate::results::PairResult;

/// Receives the state of the tournament after each match.
pub trait Reporter {
    /// Publish the current aggregate report and every result committed so far.
    fn publish(&mut self, report: &TournamentReport, results: &[PairResult]) -> anyhow::Result<()>;
}

impl<F> Reporter for F
where
    F: FnMut(&TournamentReport, &[PairResult]) -> anyhow::Result<()>,
{
    fn publish(&mut self, report: &TournamentReport, results: &[PairResult]) -> anyhow::Result<()> {
        self(report, results)
    }
}

#[derive(Serialize)]
struct Snapshot<'a> {
    report: &'a TournamentReport,
    results: &'a [PairResult],
}

/// Writes each snapshot as a single JSON line to the wrapped writer.
pub struct JsonReporter<W: Write> {
    writer: W,
}

impl<W: Write> JsonReporter<W> {
    /// Wrap a writer (a file, a socket, a `Vec<u8>`...).
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give the writer back.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn publish(&mut self, report: &TournamentReport, results: &[PairResult]) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, &Snapshot { report, results })
            .context("cannot serialize tournament snapshot")?;
        self.writer.write_all(b"\n")?;
        self.writer.flush().context("cannot flush tournament snapshot")
    }
}
