//! Self-terminating year counter
//!
//! Years are derived from an integer step counter (`start + k * step`), so
//! the run ends after `floor((end - start) / step)` increments and never hands
//! out a year past `end`, even when `step` does not divide the range.

/// Counts from `start` to `end` (inclusive) in `step` increments, once
#[derive(Debug, Clone)]
pub struct YearTicker {
    start: f64,
    step: f64,
    steps: u64,
    next: u64,
    current: Option<u64>,
    finished: bool,
}

impl YearTicker {
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        let steps = if step > 0.0 && end > start {
            ((end - start) / step + 1e-9).floor() as u64
        } else {
            0
        };

        Self {
            start,
            step,
            steps,
            next: 0,
            current: None,
            finished: false,
        }
    }

    /// Year for increment `k`, cleaned of representation noise
    pub fn year_at(&self, k: u64) -> f64 {
        let year = self.start + k as f64 * self.step;
        (year * 1e9).round() / 1e9
    }

    /// Next year to render, or None once the final year has been handed out
    pub fn advance(&mut self) -> Option<f64> {
        if self.finished {
            return None;
        }
        let k = self.next;
        self.current = Some(k);
        if k >= self.steps {
            self.finished = true;
        } else {
            self.next += 1;
        }
        Some(self.year_at(k))
    }

    /// Last year handed out
    pub fn current_year(&self) -> Option<f64> {
        self.current.map(|k| self.year_at(k))
    }

    /// Half a step: records within this distance of a year belong to it
    pub fn tolerance(&self) -> f64 {
        self.step.abs() / 2.0
    }

    /// Number of years this ticker hands out in total
    pub fn total(&self) -> u64 {
        self.steps + 1
    }

    /// Years handed out so far
    pub fn emitted(&self) -> u64 {
        self.current.map_or(0, |k| k + 1)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stop early
    pub fn stop(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminates_exactly_at_end_year() {
        let mut ticker = YearTicker::new(2000.0, 2001.0, 0.1);
        let years: Vec<f64> = std::iter::from_fn(|| ticker.advance()).collect();

        assert_eq!(years.len(), 11);
        assert_eq!(years[0], 2000.0);
        assert_eq!(years[3], 2000.3);
        assert_eq!(*years.last().unwrap(), 2001.0);
        assert!(ticker.is_finished());
        assert_eq!(ticker.advance(), None);
        assert_eq!(ticker.current_year(), Some(2001.0));
    }

    #[test]
    fn test_counts() {
        let mut ticker = YearTicker::new(2000.0, 2001.0, 0.1);
        assert_eq!(ticker.total(), 11);
        assert_eq!(ticker.emitted(), 0);
        ticker.advance();
        ticker.advance();
        assert_eq!(ticker.emitted(), 2);
        assert!((ticker.tolerance() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_uneven_step_stops_at_or_before_end() {
        let cases = [
            (0.4, vec![2000.0, 2000.4, 2000.8]),
            (0.3, vec![2000.0, 2000.3, 2000.6, 2000.9]),
        ];
        for (step, expected) in cases {
            let mut ticker = YearTicker::new(2000.0, 2001.0, step);
            let total = ticker.total();
            let years: Vec<f64> = std::iter::from_fn(|| ticker.advance()).collect();

            assert_eq!(years, expected);
            assert!(years.iter().all(|&y| y <= 2001.0));
            assert_eq!(total, years.len() as u64);
        }
    }

    #[test]
    fn test_degenerate_range_emits_start_once() {
        let mut ticker = YearTicker::new(2005.0, 2000.0, 1.0);
        assert_eq!(ticker.advance(), Some(2005.0));
        assert_eq!(ticker.advance(), None);
    }

    #[test]
    fn test_stop_early() {
        let mut ticker = YearTicker::new(2000.0, 2010.0, 1.0);
        ticker.advance();
        ticker.stop();
        assert_eq!(ticker.advance(), None);
        assert_eq!(ticker.current_year(), Some(2000.0));
    }
}
