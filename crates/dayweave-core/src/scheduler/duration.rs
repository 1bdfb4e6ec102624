//! Duration adjustment.
//!
//! A suggestion asks for its ideal duration and accepts anything down to
//! its base duration. It is never stretched past the ask, however much
//! room a gap has.

use crate::suggestion::{ShrinkPolicy, Suggestion};
use crate::timeline::MINUTES_PER_DAY;

/// Sanitized duration range of a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBounds {
    /// Minimum acceptable minutes, `1..=ask`
    pub base: u32,
    /// Ideal minutes
    pub ask: u32,
    pub policy: ShrinkPolicy,
}

impl DurationBounds {
    /// Bounds of a suggestion, or `None` when its ask is not positive.
    ///
    /// No gap is longer than a day, so the ask is capped at one day. A base
    /// above the ask is lowered to the ask; a base below one minute is
    /// raised to one.
    pub fn from_suggestion(suggestion: &Suggestion) -> Option<Self> {
        if suggestion.duration <= 0 {
            return None;
        }
        let ask = suggestion.duration.min(i32::from(MINUTES_PER_DAY));
        let base = suggestion.base_duration.clamp(1, ask) as u32;
        let ask = ask as u32;
        Some(Self {
            base,
            ask,
            policy: suggestion.task_type.shrink_policy(),
        })
    }

    /// Minutes to allocate given `available` free minutes.
    pub fn fit(&self, available: u32) -> Option<u32> {
        if available >= self.ask {
            Some(self.ask)
        } else if available >= self.base {
            Some(available)
        } else {
            None
        }
    }

    /// Minutes this task can give up
    pub fn room(&self) -> u32 {
        self.ask - self.base
    }
}

/// Duration to allocate for `suggestion` in `available_minutes`, or `None`
/// when it cannot fit even at its base duration.
pub fn fit_duration(suggestion: &Suggestion, available_minutes: u32) -> Option<u32> {
    DurationBounds::from_suggestion(suggestion)?.fit(available_minutes)
}

/// Share `capacity` minutes between tasks that must all fit together.
///
/// `items` are in priority order. Everyone starts at base; what is left is
/// handed out first to `PreferFull` tasks (in order, up to their ask), then
/// to `Flexible` tasks in proportion to how far each is from its ask, with
/// rounding leftovers going to the higher-priority tasks. Returns `None`
/// when the bases alone exceed the capacity.
pub fn share_capacity(items: &[DurationBounds], capacity: u32) -> Option<Vec<u32>> {
    let total_ask: u64 = items.iter().map(|b| b.ask as u64).sum();
    if total_ask <= capacity as u64 {
        return Some(items.iter().map(|b| b.ask).collect());
    }

    let total_base: u64 = items.iter().map(|b| b.base as u64).sum();
    if total_base > capacity as u64 {
        return None;
    }

    let mut durations: Vec<u32> = items.iter().map(|b| b.base).collect();
    let mut slack = capacity as u64 - total_base;

    for (i, item) in items.iter().enumerate() {
        if item.policy == ShrinkPolicy::PreferFull {
            let grant = slack.min(item.room() as u64);
            durations[i] += grant as u32;
            slack -= grant;
        }
    }

    let flexible: Vec<usize> = (0..items.len())
        .filter(|&i| items[i].policy == ShrinkPolicy::Flexible)
        .collect();
    let flexible_room: u64 = flexible.iter().map(|&i| items[i].room() as u64).sum();

    if slack > 0 && flexible_room > 0 {
        let pool = slack.min(flexible_room);
        let mut granted = 0u64;
        for &i in &flexible {
            let share = pool * items[i].room() as u64 / flexible_room;
            durations[i] += share as u32;
            granted += share;
        }
        let mut leftover = pool - granted;
        for &i in &flexible {
            if leftover == 0 {
                break;
            }
            let headroom = (items[i].ask - durations[i]) as u64;
            let grant = leftover.min(headroom);
            durations[i] += grant as u32;
            leftover -= grant;
        }
    }

    Some(durations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestion::TaskType;

    fn bounds(base: u32, ask: u32, policy: ShrinkPolicy) -> DurationBounds {
        DurationBounds { base, ask, policy }
    }

    #[test]
    fn full_ask_when_room_allows() {
        let s = Suggestion::new("a", 1.0, 0.0, 60, 30);
        assert_eq!(fit_duration(&s, 600), Some(60));
        assert_eq!(fit_duration(&s, 60), Some(60));
    }

    #[test]
    fn shrinks_between_base_and_ask() {
        let s = Suggestion::new("a", 1.0, 0.0, 120, 60);
        assert_eq!(fit_duration(&s, 90), Some(90));
        assert_eq!(fit_duration(&s, 60), Some(60));
        assert_eq!(fit_duration(&s, 59), None);
    }

    #[test]
    fn routine_truncates_when_forced() {
        let s = Suggestion::new("r", 0.5, 0.0, 45, 20).with_type(TaskType::Routine);
        assert_eq!(fit_duration(&s, 100), Some(45));
        assert_eq!(fit_duration(&s, 30), Some(30));
        assert_eq!(fit_duration(&s, 19), None);
    }

    #[test]
    fn backlog_never_goes_below_base() {
        let s = Suggestion::new("b", 0.3, 0.0, 60, 40).with_type(TaskType::Backlog);
        assert_eq!(fit_duration(&s, 39), None);
    }

    #[test]
    fn malformed_bounds_are_clamped() {
        let inverted = Suggestion::new("a", 0.5, 0.0, 30, 45);
        let b = DurationBounds::from_suggestion(&inverted).unwrap();
        assert_eq!((b.base, b.ask), (30, 30));

        let negative_base = Suggestion::new("a", 0.5, 0.0, 30, -10);
        let b = DurationBounds::from_suggestion(&negative_base).unwrap();
        assert_eq!(b.base, 1);

        let huge = Suggestion::new("a", 0.5, 0.0, i32::MAX, i32::MAX);
        let b = DurationBounds::from_suggestion(&huge).unwrap();
        assert_eq!((b.base, b.ask), (1440, 1440));

        assert!(DurationBounds::from_suggestion(&Suggestion::new("a", 0.5, 0.0, 0, 0)).is_none());
        assert!(DurationBounds::from_suggestion(&Suggestion::new("a", 0.5, 0.0, -5, 0)).is_none());
    }

    #[test]
    fn share_gives_everyone_ask_when_it_fits() {
        let items = [
            bounds(60, 90, ShrinkPolicy::Flexible),
            bounds(60, 90, ShrinkPolicy::Flexible),
        ];
        assert_eq!(share_capacity(&items, 200), Some(vec![90, 90]));
    }

    #[test]
    fn share_shrinks_simultaneously() {
        let items = [
            bounds(30, 45, ShrinkPolicy::Flexible),
            bounds(30, 40, ShrinkPolicy::Flexible),
        ];
        assert_eq!(share_capacity(&items, 60), Some(vec![30, 30]));
        assert_eq!(share_capacity(&items, 59), None);

        // 15 + 10 minutes of room, 10 minutes of slack
        assert_eq!(share_capacity(&items, 70), Some(vec![36, 34]));
    }

    #[test]
    fn share_serves_routines_first() {
        let items = [
            bounds(30, 60, ShrinkPolicy::Flexible),
            bounds(30, 60, ShrinkPolicy::PreferFull),
        ];
        assert_eq!(share_capacity(&items, 100), Some(vec![40, 60]));
        assert_eq!(share_capacity(&items, 70), Some(vec![30, 40]));
    }

    #[test]
    fn share_never_exceeds_capacity() {
        let items = [
            bounds(10, 37, ShrinkPolicy::Flexible),
            bounds(15, 29, ShrinkPolicy::Flexible),
            bounds(5, 61, ShrinkPolicy::Flexible),
        ];
        for capacity in 30..=127 {
            let durations = share_capacity(&items, capacity).unwrap();
            assert_eq!(durations.iter().sum::<u32>(), capacity);
            for (d, b) in durations.iter().zip(&items) {
                assert!(*d >= b.base && *d <= b.ask);
            }
        }
    }
}
