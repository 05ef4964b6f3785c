use std::time::Duration;

/// Tracks transfer activity over a single run with minimal overhead.
///
/// Counters are updated under the run's exclusion lock, so plain integers
/// suffice. The report is printed once after all actors have joined.
#[derive(Clone, Debug, Default)]
pub struct TransferStats {
    pub writes: u64,
    pub reads: u64,
    pub commits: u64,
    pub bytes_written: u64,
    pub bytes_read: u64,
    pub largest_write: usize,
    pub largest_read: usize,
}

impl TransferStats {
    pub fn record_write(&mut self, len: usize) {
        self.writes += 1;
        self.bytes_written += len as u64;
        if len > self.largest_write {
            self.largest_write = len;
        }
    }

    pub fn record_read(&mut self, len: usize) {
        self.reads += 1;
        self.bytes_read += len as u64;
        if len > self.largest_read {
            self.largest_read = len;
        }
    }

    pub fn record_commit(&mut self) {
        self.commits += 1;
    }

    /// Prints a formatted summary of the run.
    ///
    /// Displays operation counts, byte totals, the largest single transfer in
    /// each direction, and end-to-end throughput over `elapsed`.
    pub fn print_report(&self, elapsed: Duration) {
        println!("\nTransfer Report");
        println!(
            "Writes:  {:6} ops, {} bytes (largest {})",
            self.writes, self.bytes_written, self.largest_write
        );
        println!(
            "Reads:   {:6} ops, {} bytes (largest {})",
            self.reads, self.bytes_read, self.largest_read
        );
        println!("Commits: {:6} ops", self.commits);

        let seconds = elapsed.as_secs_f64();
        println!("Time: {:.4} s", seconds);
        if seconds > 0.0 {
            let mib = self.bytes_read as f64 / (1024.0 * 1024.0);
            println!("Throughput: {:.2} MiB/s", mib / seconds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_totals_and_largest_transfers() {
        let mut stats = TransferStats::default();
        stats.record_write(10);
        stats.record_write(30);
        stats.record_write(20);
        stats.record_read(5);
        stats.record_read(45);
        stats.record_commit();

        assert_eq!(stats.writes, 3);
        assert_eq!(stats.bytes_written, 60);
        assert_eq!(stats.largest_write, 30);
        assert_eq!(stats.reads, 2);
        assert_eq!(stats.bytes_read, 50);
        assert_eq!(stats.largest_read, 45);
        assert_eq!(stats.commits, 1);
    }
}
