use std::io::{self, Write};

use crate::library::{OrganizeResult, RunSummary};

/// Print one line per file followed by the summary counts.
pub fn write_report<W: Write>(mut out: W, results: &[OrganizeResult]) -> io::Result<RunSummary> {
    for result in results {
        let source = result.source().display();
        match result {
            OrganizeResult::Moved { destination, .. } => {
                writeln!(out, " - {source} -> {}", destination.display())?
            }
            OrganizeResult::SkippedDuplicate {
                existing, removed, ..
            } => {
                let action = if *removed { "removed" } else { "kept" };
                writeln!(out, " = {source} already at {} ({action})", existing.display())?
            }
            OrganizeResult::SkippedError { reason, .. } => writeln!(out, " ! {source}: {reason}")?,
        }
    }

    let summary = RunSummary::from_results(results);
    writeln!(out, "\n{summary}")?;
    Ok(summary)
}
