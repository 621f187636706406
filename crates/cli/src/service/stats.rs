//! Service run statistics.

use std::time::Duration;

/// Counters collected over one service run, printed at shutdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceStats {
    /// Datagrams received by the listener
    pub datagrams_received: u64,
    /// Datagrams dropped by the decode stage
    pub decode_failures: u64,
    /// Payloads dropped because the dispatch queue was full
    pub queue_dropped: u64,
    /// Reports persisted to the store
    pub reports_persisted: u64,
    /// Persistence attempts dropped
    pub persist_failures: u64,
    /// Total run duration
    pub duration: Duration,
}

impl ServiceStats {
    /// Datagrams per second over the run
    pub fn rate(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.datagrams_received as f64 / secs
        } else {
            0.0
        }
    }

    /// Print a human-readable summary
    pub fn print_summary(&self) {
        println!("\n=== Run Summary ===\n");
        println!("  Duration: {:.1}s", self.duration.as_secs_f64());
        println!(
            "  Datagrams received: {} ({:.2}/s)",
            self.datagrams_received,
            self.rate()
        );
        println!("  Decode failures: {}", self.decode_failures);
        println!("  Queue drops: {}", self.queue_dropped);
        println!("  Reports persisted: {}", self.reports_persisted);
        println!("  Persist failures: {}", self.persist_failures);
        println!();
    }
}
