//! Per-kind warning ceiling.

use std::collections::HashMap;

use delimit_model::WarningKind;

/// What to do with a warning after counting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Below the ceiling: report it.
    Emit,
    /// First warning past the ceiling: report a single "no further warnings" notice.
    Notice,
    /// Past the ceiling and already noticed: drop it.
    Suppress,
}

/// Counts warnings per kind against a shared ceiling.
///
/// A ceiling of zero disables throttling.
#[derive(Debug, Clone, Default)]
pub struct WarningThrottle {
    max_per_kind: usize,
    counts: HashMap<WarningKind, usize>,
}

impl WarningThrottle {
    pub fn new(max_per_kind: usize) -> Self {
        Self {
            max_per_kind,
            counts: HashMap::new(),
        }
    }

    pub fn admit(&mut self, kind: WarningKind) -> Admission {
        let count = self.counts.entry(kind).or_insert(0);
        *count += 1;
        if self.max_per_kind == 0 || *count <= self.max_per_kind {
            Admission::Emit
        } else if *count == self.max_per_kind + 1 {
            Admission::Notice
        } else {
            Admission::Suppress
        }
    }

    /// Warnings of `kind` seen so far, including suppressed ones.
    pub fn seen(&self, kind: WarningKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Start a new read pass.
    pub fn reset(&mut self) {
        self.counts.clear();
    }

    /// Text of the notice emitted once a kind reaches the ceiling.
    pub fn notice_message(kind: WarningKind) -> String {
        format!("No further warnings of kind '{kind}' will be reported")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_up_to_ceiling_then_one_notice() {
        let mut throttle = WarningThrottle::new(2);
        let admissions: Vec<Admission> = (0..5)
            .map(|_| throttle.admit(WarningKind::Delimiter))
            .collect();
        assert_eq!(
            admissions,
            vec![
                Admission::Emit,
                Admission::Emit,
                Admission::Notice,
                Admission::Suppress,
                Admission::Suppress
            ]
        );
        assert_eq!(throttle.admit(WarningKind::Qualifier), Admission::Emit);
        assert_eq!(throttle.seen(WarningKind::Delimiter), 5);
    }

    #[test]
    fn zero_ceiling_is_unlimited() {
        let mut throttle = WarningThrottle::new(0);
        assert!((0..1000).all(|_| throttle.admit(WarningKind::Scan) == Admission::Emit));
    }

    #[test]
    fn reset_starts_over() {
        let mut throttle = WarningThrottle::new(1);
        throttle.admit(WarningKind::LineFeed);
        throttle.reset();
        assert_eq!(throttle.admit(WarningKind::LineFeed), Admission::Emit);
    }
}
