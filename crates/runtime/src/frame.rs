/// Frame metadata handed to per-frame consumers.
///
/// Times come from the host's frame callback (milliseconds, monotonic clock).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Host timestamp of this frame (milliseconds).
    pub time_ms: f64,
    /// Time since the previous frame (milliseconds). Zero on the first frame.
    pub dt_ms: f64,
}

impl Frame {
    pub fn new(index: u64, time_ms: f64, dt_ms: f64) -> Self {
        Self {
            index,
            time_ms,
            dt_ms,
        }
    }
}

/// Turns raw host timestamps into [`Frame`]s.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    last_time_ms: Option<f64>,
    next_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a frame at `time_ms`.
    ///
    /// The first frame after construction (or [`FrameClock::reset`]) has a zero
    /// delta. A timestamp earlier than the previous one also yields zero.
    pub fn tick(&mut self, time_ms: f64) -> Frame {
        let dt_ms = match self.last_time_ms {
            Some(last) => (time_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_time_ms = Some(time_ms);

        let frame = Frame::new(self.next_index, time_ms, dt_ms);
        self.next_index = self.next_index.wrapping_add(1);
        frame
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn frames_seen(&self) -> u64 {
        self.next_index
    }
}
