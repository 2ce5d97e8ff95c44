use crate::emission::EmissionRecord;
use std::fs;
use std::io;
use std::path::Path;

/// Writes the terminal record to `<dir>/sim_<run_id>.json`, the
/// supplemental JSON sink described in §6 ("a JSON sink writing the
/// final payload under `data/simulations/sim_<timestamp>.json`").
///
/// Keyed by run id rather than a wall-clock timestamp so repeat runs in
/// the same second (e.g. in a test) don't clobber each other.
pub fn write_final_record(dir: &Path, run_id: u64, record: &EmissionRecord) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("sim_{run_id}.json"));
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, record).map_err(io::Error::from)
}
