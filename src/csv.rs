//! CSV rendering of the league cap table.

use std::io;

use serde::Serialize;

use crate::engine::TeamCapSummary;

#[derive(Debug, Serialize)]
struct OutputRow {
    team: String,
    players: usize,
    total_cap: String,
    cap_space: String,
}

/// Write the cap table to any writer in csv format
pub fn write_cap_table_to<W: io::Write>(
    writer: W,
    summaries: impl IntoIterator<Item = TeamCapSummary>,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for summary in summaries {
        writer.serialize(OutputRow {
            team: summary.team,
            players: summary.players,
            total_cap: summary.total_cap.to_string(),
            cap_space: summary.cap_space.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the cap table to stdout in csv format
pub fn write_cap_table(summaries: impl IntoIterator<Item = TeamCapSummary>) {
    let stdout = io::stdout();
    write_cap_table_to(stdout.lock(), summaries).expect("failed to write csv to stdout");
}
