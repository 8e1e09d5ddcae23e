//! Fixed-window parameters for admission control.
//!
//! A window is the pair (capacity, interval): at most `capacity` permits are
//! handed out between two consecutive resets, and a reset happens every
//! `interval`.

use std::time::Duration;

/// Error returned when window parameters are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateConfigError {
    /// Capacity must be at least one permit
    ZeroCapacity,
    /// Interval duration must be greater than zero
    ZeroInterval,
}

impl std::fmt::Display for GateConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateConfigError::ZeroCapacity => write!(f, "capacity must be greater than 0"),
            GateConfigError::ZeroInterval => write!(f, "interval must be greater than 0"),
        }
    }
}

impl std::error::Error for GateConfigError {}

/// Named window lengths.
///
/// A limit of "N requests per minute" is expressed as
/// `Window::per_unit(N, WindowUnit::Minute)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowUnit {
    /// One second
    Second,
    /// One minute
    Minute,
    /// One hour
    Hour,
    /// One day (24 hours)
    Day,
}

impl WindowUnit {
    /// Length of one unit.
    pub fn as_duration(self) -> Duration {
        match self {
            WindowUnit::Second => Duration::from_secs(1),
            WindowUnit::Minute => Duration::from_secs(60),
            WindowUnit::Hour => Duration::from_secs(60 * 60),
            WindowUnit::Day => Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl From<WindowUnit> for Duration {
    fn from(unit: WindowUnit) -> Self {
        unit.as_duration()
    }
}

/// Validated fixed-window parameters.
///
/// # Example
/// ```
/// use document_throttle::{Window, WindowUnit, GateConfigError};
/// use std::time::Duration;
///
/// let window = Window::per_unit(10, WindowUnit::Minute).unwrap();
/// assert_eq!(window.capacity(), 10);
/// assert_eq!(window.interval(), Duration::from_secs(60));
///
/// assert_eq!(
///     Window::new(0, Duration::from_secs(1)),
///     Err(GateConfigError::ZeroCapacity)
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    capacity: usize,
    interval: Duration,
}

impl Window {
    /// Create window parameters.
    ///
    /// # Errors
    /// Returns `GateConfigError::ZeroCapacity` if `capacity` is 0 and
    /// `GateConfigError::ZeroInterval` if `interval` is zero.
    pub fn new(capacity: usize, interval: Duration) -> Result<Self, GateConfigError> {
        if capacity == 0 {
            return Err(GateConfigError::ZeroCapacity);
        }
        if interval.is_zero() {
            return Err(GateConfigError::ZeroInterval);
        }
        Ok(Self { capacity, interval })
    }

    /// Create window parameters spanning exactly one `unit`.
    ///
    /// # Errors
    /// Returns `GateConfigError::ZeroCapacity` if `capacity` is 0.
    pub fn per_unit(capacity: usize, unit: WindowUnit) -> Result<Self, GateConfigError> {
        Self::new(capacity, unit.as_duration())
    }

    /// Permits available at the start of each window.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Length of each window.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            Window::new(0, Duration::from_secs(60)),
            Err(GateConfigError::ZeroCapacity)
        );
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert_eq!(
            Window::new(5, Duration::ZERO),
            Err(GateConfigError::ZeroInterval)
        );
    }

    #[test]
    fn test_zero_capacity_reported_before_zero_interval() {
        assert_eq!(
            Window::new(0, Duration::ZERO),
            Err(GateConfigError::ZeroCapacity)
        );
    }

    #[test]
    fn test_per_unit_durations() {
        let cases = [
            (WindowUnit::Second, 1),
            (WindowUnit::Minute, 60),
            (WindowUnit::Hour, 3_600),
            (WindowUnit::Day, 86_400),
        ];

        for (unit, secs) in cases {
            let window = Window::per_unit(3, unit).unwrap();
            assert_eq!(window.interval(), Duration::from_secs(secs));
            assert_eq!(window.capacity(), 3);
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GateConfigError::ZeroCapacity.to_string(),
            "capacity must be greater than 0"
        );
        assert_eq!(
            GateConfigError::ZeroInterval.to_string(),
            "interval must be greater than 0"
        );
    }
}
