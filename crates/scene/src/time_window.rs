use foundation::time::{
    Interval, PeriodParseError, Time, TimeSpan, decrement, increment, parse_period, round_down,
};

pub const DEFAULT_STEP: &str = "01h00m";

/// The user's time filter. While the filter is off, the span follows the
/// data bounds instead of a chosen window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    span: TimeSpan,
    filter_applied: bool,
    interval: Interval,
    step: String,
}

impl TimeWindow {
    /// An inactive window spanning `bounds`, stepping by `step`.
    pub fn full(bounds: TimeSpan, step: &str) -> Result<Self, PeriodParseError> {
        let interval = parse_period(step)?;
        Ok(Self {
            span: TimeSpan::new(bounds.start, bounds.end),
            filter_applied: false,
            interval,
            step: step.to_string(),
        })
    }

    pub fn start(&self) -> Time {
        self.span.start
    }

    pub fn end(&self) -> Time {
        self.span.end
    }

    pub fn span(&self) -> TimeSpan {
        self.span
    }

    pub fn filter_applied(&self) -> bool {
        self.filter_applied
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn step_spec(&self) -> &str {
        &self.step
    }

    /// Activates the filter on `[a, b]`, in either order.
    pub fn apply(&mut self, a: Time, b: Time) {
        self.span = TimeSpan::new(a, b);
        self.filter_applied = true;
    }

    /// Turns the filter off and falls back to the data bounds.
    pub fn clear(&mut self, bounds: TimeSpan) {
        self.span = TimeSpan::new(bounds.start, bounds.end);
        self.filter_applied = false;
    }

    /// Called when the data changes; only moves the span while inactive.
    pub fn track_bounds(&mut self, bounds: TimeSpan) {
        if !self.filter_applied {
            self.span = TimeSpan::new(bounds.start, bounds.end);
        }
    }

    /// Re-parses the step; a malformed spec leaves the window as it was.
    pub fn set_step(&mut self, spec: &str) -> Result<(), PeriodParseError> {
        self.interval = parse_period(spec)?;
        self.step = spec.to_string();
        Ok(())
    }

    /// Activates a one-interval window starting at `at` rounded down.
    pub fn align(&mut self, at: Time) {
        let start = round_down(at, self.interval);
        self.apply(start, increment(start, self.interval));
    }

    pub fn step_forward(&mut self) {
        let (start, end) = (self.span.start, self.span.end);
        self.apply(increment(start, self.interval), increment(end, self.interval));
    }

    pub fn step_backward(&mut self) {
        let (start, end) = (self.span.start, self.span.end);
        self.apply(decrement(start, self.interval), decrement(end, self.interval));
    }
}
