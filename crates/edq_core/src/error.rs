use std::io;

use thiserror::Error;

/// Fatal conditions a stress run can end with.
///
/// The harness treats every anomaly as a test failure rather than attempting
/// recovery: the chunking logic already respects declared capacity and
/// availability, so a short transfer or a read-back mismatch signals a
/// device-contract violation, not backpressure. Actors return these to the
/// orchestrator instead of terminating the process themselves; only the host
/// binary turns them into exit codes.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The device accepted fewer bytes than the write requested.
    #[error("short write: requested {requested} bytes, device accepted {accepted}")]
    ShortWrite { requested: usize, accepted: usize },

    /// The device rejected a write outright.
    #[error("queue write failed")]
    Write(#[source] io::Error),

    /// The device returned fewer bytes than the read requested.
    #[error("short read: requested {requested} bytes, device returned {returned}")]
    ShortRead { requested: usize, returned: usize },

    /// The device rejected a read outright.
    #[error("queue read failed")]
    Read(#[source] io::Error),

    /// The queue cursor could not be positioned at the base offset.
    #[error("seek to queue offset {offset:#x} failed")]
    Seek {
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// A consumed byte differs from the byte the producer wrote.
    #[error("read-back mismatch at byte {offset}: wrote {expected:#04x}, read {actual:#04x}")]
    Mismatch {
        offset: usize,
        expected: u8,
        actual: u8,
    },

    /// The run finished without moving the full target through the queue.
    #[error("incomplete transfer: produced {produced}, consumed {consumed} of {total} bytes")]
    Incomplete {
        produced: usize,
        consumed: usize,
        total: usize,
    },
}

impl HarnessError {
    /// Process exit code for this failure.
    ///
    /// The codes follow the eDMA unit-test convention so wrapper scripts can
    /// tell failure classes apart: 1 = write, 2 = read, 3 = seek,
    /// 4 = data integrity.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ShortWrite { .. } | Self::Write(_) => 1,
            Self::ShortRead { .. } | Self::Read(_) => 2,
            Self::Seek { .. } => 3,
            Self::Mismatch { .. } | Self::Incomplete { .. } => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_stay_distinct_per_class() {
        let short_write = HarnessError::ShortWrite {
            requested: 8,
            accepted: 4,
        };
        let short_read = HarnessError::ShortRead {
            requested: 8,
            returned: 0,
        };
        let seek = HarnessError::Seek {
            offset: 0x1000_0000,
            source: io::Error::new(io::ErrorKind::InvalidInput, "bad offset"),
        };
        let mismatch = HarnessError::Mismatch {
            offset: 3,
            expected: b'a',
            actual: b'z',
        };
        assert_eq!(short_write.exit_code(), 1);
        assert_eq!(short_read.exit_code(), 2);
        assert_eq!(seek.exit_code(), 3);
        assert_eq!(mismatch.exit_code(), 4);
    }
}
