//! The explicit configuration surface passed into a play session.

/// Tunables for a play session, read once at the start of [`crate::engine::play`].
///
/// Constructed with [`PlayConfig::default`] and adjusted with the builder-style setters, rather
/// than read from process-wide flags: a session's configuration should be as reproducible as the
/// bytes it streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayConfig {
    /// Samples per second the device should emit. Default `24000`.
    pub scan_rate: u32,
    /// Host-chosen refresh rate, used only to derive [`PlayConfig::frame_points`] when it hasn't
    /// been overridden. Default `30`.
    pub frame_rate: u32,
    /// Samples per pacing-loop chunk. If `None`, derived as `scan_rate / frame_rate`.
    pub frame_points_override: Option<u32>,
    /// The device's ring-buffer capacity in samples. Default `1799`, matching the hardware.
    pub buffer_capacity: u16,
    /// Default draw speed (points per unit distance) for [`crate::drawing::draw_path`].
    pub draw_speed: u32,
    /// Default pre/post blank sample counts for [`crate::drawing::blank_path`].
    pub blank_count: BlankCount,
    /// Emit verbose per-command `tracing` events.
    pub debug: bool,
    /// Emit an additional per-point `tracing` event (implies a lot of log volume).
    pub dump: bool,
}

/// Pre/post blanked-sample counts used by [`crate::drawing::blank_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlankCount {
    pub pre: u32,
    pub post: u32,
}

impl Default for BlankCount {
    fn default() -> Self {
        BlankCount { pre: 0, post: 20 }
    }
}

impl Default for PlayConfig {
    fn default() -> Self {
        PlayConfig {
            scan_rate: 24_000,
            frame_rate: 30,
            frame_points_override: None,
            buffer_capacity: 1799,
            draw_speed: 50,
            blank_count: BlankCount::default(),
            debug: false,
            dump: false,
        }
    }
}

impl PlayConfig {
    /// The number of samples in one host-chosen refresh window: `scan_rate / frame_rate`, unless
    /// overridden via [`PlayConfig::with_frame_points`].
    pub fn frame_points(&self) -> u32 {
        self.frame_points_override.unwrap_or(self.scan_rate / self.frame_rate)
    }

    pub fn with_scan_rate(mut self, scan_rate: u32) -> Self {
        self.scan_rate = scan_rate;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_frame_points(mut self, frame_points: u32) -> Self {
        self.frame_points_override = Some(frame_points);
        self
    }

    pub fn with_buffer_capacity(mut self, buffer_capacity: u16) -> Self {
        self.buffer_capacity = buffer_capacity;
        self
    }

    pub fn with_draw_speed(mut self, draw_speed: u32) -> Self {
        self.draw_speed = draw_speed;
        self
    }

    pub fn with_blank_count(mut self, blank_count: BlankCount) -> Self {
        self.blank_count = blank_count;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_dump(mut self, dump: bool) -> Self {
        self.dump = dump;
        self
    }
}
