//! The fixed daily feeding cycle.
//!
//! Residents feed at 8 fixed clock times. The cycle day is anchored at
//! 06:00: clock times between 00:00 and 05:59 are a continuation of the
//! previous day's cycle, so their minute positions extend past 1440.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Minutes in a nominal day
pub const MINUTES_PER_DAY: u32 = 1440;

/// Minute position of the cycle anchor (06:00)
pub const CYCLE_START_MIN: u32 = 360;

/// Smallest dispensable volume in millilitres
pub const VOLUME_UNIT_ML: u32 = 5;

/// A slot starting sooner than this after admission is skipped
pub const MIN_GAP_AFTER_ADMISSION_MIN: u32 = 60;

/// A fixed point in the daily cycle when a resident patient feeds
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedSlot {
    /// Clock time, "HH:MM"
    pub label: String,
    /// Minutes since 00:00 on the cycle day; early-morning slots exceed 1440
    pub minute_of_day: u32,
}

/// The immutable table of fixed feed slots, in cycle order
#[derive(Clone, Debug)]
pub struct FeedCycle {
    pub slots: Vec<FeedSlot>,
}

/// Cached default cycle - built once and reused across all calculations
static DEFAULT_CYCLE: Lazy<FeedCycle> = Lazy::new(build_default_cycle_internal);

/// Get a reference to the cached default cycle
pub fn get_default_cycle() -> &'static FeedCycle {
    &DEFAULT_CYCLE
}

/// Builds the default 8-slot cycle
///
/// **Note**: Prefer `get_default_cycle()` which returns a cached reference.
/// This function is retained for validation tests and custom tables.
pub fn build_default_cycle() -> FeedCycle {
    build_default_cycle_internal()
}

fn build_default_cycle_internal() -> FeedCycle {
    let slots = [
        ("07:00", 420),
        ("10:00", 600),
        ("13:00", 780),
        ("16:00", 960),
        ("19:00", 1140),
        ("23:00", 1380),
        ("02:00", 1560),
        ("05:00", 1740),
    ]
    .into_iter()
    .map(|(label, minute_of_day)| FeedSlot {
        label: label.to_string(),
        minute_of_day,
    })
    .collect();

    FeedCycle { slots }
}

impl FeedCycle {
    /// Validate the cycle table for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    ///
    /// The spacing check exists because the post-admission exclusion rule
    /// skips at most the first surviving slot; it is only correct while
    /// consecutive slots are never closer than the exclusion gap.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.slots.is_empty() {
            errors.push("Cycle has no slots".to_string());
        }

        for slot in &self.slots {
            match parse_label(&slot.label) {
                Some(clock_min) => {
                    if slot.minute_of_day % MINUTES_PER_DAY != clock_min {
                        errors.push(format!(
                            "Slot label '{}' doesn't match minute_of_day {}",
                            slot.label, slot.minute_of_day
                        ));
                    }
                }
                None => {
                    errors.push(format!("Slot has malformed label '{}'", slot.label));
                }
            }
        }

        for pair in self.slots.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if b.minute_of_day <= a.minute_of_day {
                errors.push(format!(
                    "Slots '{}' and '{}' are not in ascending cycle order",
                    a.label, b.label
                ));
            } else if b.minute_of_day - a.minute_of_day < MIN_GAP_AFTER_ADMISSION_MIN {
                errors.push(format!(
                    "Slots '{}' and '{}' are closer than {} minutes",
                    a.label, b.label, MIN_GAP_AFTER_ADMISSION_MIN
                ));
            }
        }

        if let Some(first) = self.slots.first() {
            if first.minute_of_day < CYCLE_START_MIN {
                errors.push(format!(
                    "First slot '{}' starts before the cycle anchor",
                    first.label
                ));
            }
        }

        errors
    }
}

fn parse_label(label: &str) -> Option<u32> {
    let (h, m) = label.split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some(h * 60 + m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cycle_has_eight_slots() {
        let cycle = build_default_cycle();
        assert_eq!(cycle.slots.len(), 8);
        assert_eq!(cycle.slots[0].label, "07:00");
        assert_eq!(cycle.slots[7].label, "05:00");
        assert_eq!(cycle.slots[7].minute_of_day, 1740);
    }

    #[test]
    fn test_default_cycle_validates() {
        let cycle = build_default_cycle();
        let errors = cycle.validate();
        assert!(
            errors.is_empty(),
            "Default cycle has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_slots_ascend_and_respect_gap() {
        let cycle = build_default_cycle();
        for pair in cycle.slots.windows(2) {
            assert!(pair[1].minute_of_day > pair[0].minute_of_day);
            assert!(
                pair[1].minute_of_day - pair[0].minute_of_day >= MIN_GAP_AFTER_ADMISSION_MIN
            );
        }
    }

    #[test]
    fn test_mismatched_label_is_rejected() {
        let mut cycle = build_default_cycle();
        cycle.slots[0].minute_of_day = 425;
        let errors = cycle.validate();
        assert!(errors.iter().any(|e| e.contains("doesn't match")));
    }

    #[test]
    fn test_tight_spacing_is_rejected() {
        let cycle = FeedCycle {
            slots: vec![
                FeedSlot {
                    label: "07:00".into(),
                    minute_of_day: 420,
                },
                FeedSlot {
                    label: "07:30".into(),
                    minute_of_day: 450,
                },
            ],
        };
        let errors = cycle.validate();
        assert!(errors.iter().any(|e| e.contains("closer than")));
    }

    #[test]
    fn test_out_of_order_is_rejected() {
        let cycle = FeedCycle {
            slots: vec![
                FeedSlot {
                    label: "10:00".into(),
                    minute_of_day: 600,
                },
                FeedSlot {
                    label: "07:00".into(),
                    minute_of_day: 420,
                },
            ],
        };
        let errors = cycle.validate();
        assert!(errors.iter().any(|e| e.contains("ascending")));
    }

    #[test]
    fn test_malformed_label_is_rejected() {
        let cycle = FeedCycle {
            slots: vec![FeedSlot {
                label: "7am".into(),
                minute_of_day: 420,
            }],
        };
        let errors = cycle.validate();
        assert!(errors.iter().any(|e| e.contains("malformed")));
    }
}
