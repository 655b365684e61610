//! Ping-pong bookkeeping for the two particle slots

/// Identities of the two GPU particle buffers.
///
/// `render` is the slot drawn from and simulated from; `stream_out` is the
/// slot the next simulate pass writes. After every pass they trade places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingPong {
    render: usize,
    stream_out: usize,
    swaps: u64,
}

impl PingPong {
    pub fn new() -> Self {
        Self {
            render: 0,
            stream_out: 1,
            swaps: 0,
        }
    }

    /// Slot that holds the most recently written particles
    pub fn render(&self) -> usize {
        self.render
    }

    /// Slot the next simulate pass writes into
    pub fn stream_out(&self) -> usize {
        self.stream_out
    }

    /// Number of swaps since construction
    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    /// Exchange the two roles. The slot just written becomes the draw source.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.render, &mut self.stream_out);
        self.swaps += 1;
    }
}

impl Default for PingPong {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_exchanges_roles() {
        let mut pp = PingPong::new();
        assert_eq!((pp.render(), pp.stream_out()), (0, 1));
        pp.swap();
        assert_eq!((pp.render(), pp.stream_out()), (1, 0));
        pp.swap();
        assert_eq!((pp.render(), pp.stream_out()), (0, 1));
        assert_eq!(pp.swaps(), 2);
    }
}
