//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] renders lifecycle events as one-line `tracing` records at
//! `INFO` level under the `stagehand` target.
//!
//! ## Output format
//! ```text
//! [started] instance=#1 name=intro run=1 frame=0
//! [paused] instance=#1 name=intro run=1 frame=12
//! [resumed] instance=#1 name=intro run=1 frame=20
//! [halted] instance=#1 name=intro run=1 frame=31
//! [completed] instance=#2 name=outro run=3 frame=95 elapsed=1.58s
//! ```
//!
//! ## Example
//! ```no_run
//! # use stagehand::{Director, LogWriter};
//! let mut director = Director::default();
//! director.subscribe(LogWriter);
//! ```

use tracing::info;

use crate::core::Control;
use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Lifecycle logger.
///
/// Enabled via the `logging` feature. Install a `tracing` subscriber in the
/// host to see the output.
pub struct LogWriter;

impl Subscribe for LogWriter {
    fn on_event(&mut self, e: &Event, _control: &mut Control) {
        match e.kind {
            EventKind::Completed => {
                info!(
                    target: "stagehand",
                    "[{}] instance={} name={} run={} frame={} elapsed={:.2?}",
                    e.kind, e.instance, e.name, e.generation, e.frame, e.time
                );
            }
            _ => {
                info!(
                    target: "stagehand",
                    "[{}] instance={} name={} run={} frame={}",
                    e.kind, e.instance, e.name, e.generation, e.frame
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
