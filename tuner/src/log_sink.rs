//! The append-only run-log file (§6), independent of the `log` crate's diagnostic logging (§4.7).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use crate::configuration::Configuration;
use crate::cost::Outcome;

/// Appends one line per evaluation to a log file. The exact byte-level format isn't a
/// compatibility surface; it exists to give a human something to `tail -f` while a long tuning
/// run is in progress.
pub(crate) struct LogSink {
    file: File,
    start: Instant,
}

impl LogSink {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            start: Instant::now(),
        })
    }

    pub fn log_outcome(&mut self, configuration: &Configuration, outcome: &Outcome) {
        let timestamp_ms = self.start.elapsed().as_millis();
        let result = match outcome {
            Outcome::Valid(cost) => format!("cost={cost}"),
            Outcome::Invalid => "invalid".to_owned(),
        };
        // Best-effort: a failure to write the run log shouldn't abort a tuning run.
        let _ = writeln!(self.file, "{timestamp_ms} {configuration} {result}");
    }
}
