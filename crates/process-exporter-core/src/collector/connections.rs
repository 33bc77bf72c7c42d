//! Classification of a process's sockets into connection-state buckets.

/// The bucket a socket is counted in.
///
/// Every socket falls into exactly one bucket. TCP states other than the four
/// named ones, and all stateless sockets (UDP, unix), are `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Listen,
    Established,
    TimeWait,
    CloseWait,
    Other,
}

impl ConnectionState {
    /// Maps a kernel TCP state code (the `st` column of `/proc/net/tcp`).
    pub fn from_tcp_state(code: u8) -> Self {
        match code {
            0x01 => ConnectionState::Established,
            0x06 => ConnectionState::TimeWait,
            0x08 => ConnectionState::CloseWait,
            0x0A => ConnectionState::Listen,
            _ => ConnectionState::Other,
        }
    }
}

/// Per-bucket connection counts for one process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionCounts {
    pub listen: u64,
    pub established: u64,
    pub time_wait: u64,
    pub close_wait: u64,
    pub other: u64,
}

impl ConnectionCounts {
    /// Counts `states` into buckets.
    pub fn classify(states: impl IntoIterator<Item = ConnectionState>) -> Self {
        let mut counts = Self::default();
        for state in states {
            counts.record(state);
        }
        counts
    }

    pub fn record(&mut self, state: ConnectionState) {
        let bucket = match state {
            ConnectionState::Listen => &mut self.listen,
            ConnectionState::Established => &mut self.established,
            ConnectionState::TimeWait => &mut self.time_wait,
            ConnectionState::CloseWait => &mut self.close_wait,
            ConnectionState::Other => &mut self.other,
        };
        *bucket += 1;
    }

    /// Sum of all five buckets.
    pub fn total(&self) -> u64 {
        self.listen + self.established + self.time_wait + self.close_wait + self.other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tcp_state() {
        assert_eq!(ConnectionState::from_tcp_state(0x01), ConnectionState::Established);
        assert_eq!(ConnectionState::from_tcp_state(0x06), ConnectionState::TimeWait);
        assert_eq!(ConnectionState::from_tcp_state(0x08), ConnectionState::CloseWait);
        assert_eq!(ConnectionState::from_tcp_state(0x0A), ConnectionState::Listen);
        // SYN_SENT, FIN_WAIT1, LAST_ACK, CLOSING
        for code in [0x02, 0x04, 0x09, 0x0B] {
            assert_eq!(ConnectionState::from_tcp_state(code), ConnectionState::Other);
        }
    }

    #[test]
    fn test_classify_is_exhaustive_and_disjoint() {
        // every possible state byte lands in exactly one bucket
        let states: Vec<ConnectionState> = (0..=u8::MAX).map(ConnectionState::from_tcp_state).collect();
        let counts = ConnectionCounts::classify(states.iter().copied());

        assert_eq!(counts.total(), states.len() as u64);
        assert_eq!(counts.listen, 1);
        assert_eq!(counts.established, 1);
        assert_eq!(counts.time_wait, 1);
        assert_eq!(counts.close_wait, 1);
        assert_eq!(counts.other, 252);
    }

    #[test]
    fn test_classify_mixed() {
        use ConnectionState::*;
        let counts = ConnectionCounts::classify([
            Listen,
            Listen,
            Established,
            Established,
            Established,
            TimeWait,
            CloseWait,
            Other,
        ]);

        assert_eq!(
            counts,
            ConnectionCounts {
                listen: 2,
                established: 3,
                time_wait: 1,
                close_wait: 1,
                other: 1,
            }
        );
        assert_eq!(counts.total(), 8);
    }

    #[test]
    fn test_classify_empty() {
        let counts = ConnectionCounts::classify([]);
        assert_eq!(counts, ConnectionCounts::default());
        assert_eq!(counts.total(), 0);
    }
}
