use crate::domain::time_of_day::TimeOfDay;

/// Pending alarms in insertion order. Order only matters for listing.
#[derive(Debug, Clone, Default)]
pub struct AlarmRegistry {
    entries: Vec<TimeOfDay>,
}

impl AlarmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` without touching the registry if `time` is already present.
    pub fn add(&mut self, time: TimeOfDay) -> bool {
        if self.contains(time) {
            tracing::debug!("Alarm {} already set, ignoring", time);
            return false;
        }
        self.entries.push(time);
        true
    }

    /// Removes the first entry equal to `time`.
    pub fn remove(&mut self, time: TimeOfDay) -> bool {
        match self.entries.iter().position(|entry| *entry == time) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Overwrites `old` with `new` in place. `new` is not checked against
    /// other entries, so this can leave two equal entries behind.
    pub fn replace(&mut self, old: TimeOfDay, new: TimeOfDay) -> bool {
        match self.entries.iter_mut().find(|entry| **entry == old) {
            Some(entry) => {
                *entry = new;
                true
            }
            None => false,
        }
    }

    pub fn list_all(&self) -> Vec<TimeOfDay> {
        self.entries.clone()
    }

    pub fn contains(&self, time: TimeOfDay) -> bool {
        self.entries.contains(&time)
    }

    /// Number of entries equal to `time`; above one only after a colliding `replace`.
    pub fn count_of(&self, time: TimeOfDay) -> usize {
        self.entries.iter().filter(|entry| **entry == time).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns every entry matching `predicate`, keeping the
    /// relative order of both the taken and the remaining entries.
    pub fn take_matching<F>(&mut self, mut predicate: F) -> Vec<TimeOfDay>
    where
        F: FnMut(TimeOfDay) -> bool,
    {
        let mut taken = Vec::new();
        self.entries.retain(|entry| {
            if predicate(*entry) {
                taken.push(*entry);
                false
            } else {
                true
            }
        });
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32) -> TimeOfDay {
        TimeOfDay::from_hms(h, m, s).unwrap()
    }

    #[test]
    fn test_add_ignores_duplicates() {
        let mut registry = AlarmRegistry::new();
        assert!(registry.add(t(7, 0, 0)));
        assert!(!registry.add(t(7, 0, 0)));
        assert_eq!(registry.list_all(), vec![t(7, 0, 0)]);
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let mut registry = AlarmRegistry::new();
        registry.add(t(9, 0, 0));
        registry.add(t(6, 0, 0));
        registry.add(t(12, 0, 0));
        assert_eq!(registry.list_all(), vec![t(9, 0, 0), t(6, 0, 0), t(12, 0, 0)]);
    }

    #[test]
    fn test_remove() {
        let mut registry = AlarmRegistry::new();
        registry.add(t(9, 0, 0));
        assert!(!registry.remove(t(10, 0, 0)));
        assert!(registry.remove(t(9, 0, 0)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_replace_preserves_position() {
        let mut registry = AlarmRegistry::new();
        registry.add(t(9, 0, 0));
        registry.add(t(10, 0, 0));
        registry.add(t(11, 0, 0));

        assert!(registry.replace(t(10, 0, 0), t(5, 30, 0)));
        assert_eq!(registry.list_all(), vec![t(9, 0, 0), t(5, 30, 0), t(11, 0, 0)]);
    }

    #[test]
    fn test_replace_missing_leaves_registry_unchanged() {
        let mut registry = AlarmRegistry::new();
        registry.add(t(9, 0, 0));
        assert!(!registry.replace(t(10, 0, 0), t(11, 0, 0)));
        assert_eq!(registry.list_all(), vec![t(9, 0, 0)]);
    }

    #[test]
    fn test_replace_can_collide() {
        let mut registry = AlarmRegistry::new();
        registry.add(t(9, 0, 0));
        registry.add(t(10, 0, 0));
        assert!(registry.replace(t(10, 0, 0), t(9, 0, 0)));
        assert_eq!(registry.count_of(t(9, 0, 0)), 2);
    }

    #[test]
    fn test_take_matching() {
        let mut registry = AlarmRegistry::new();
        registry.add(t(9, 0, 0));
        registry.add(t(10, 0, 0));
        registry.add(t(11, 0, 0));

        let taken = registry.take_matching(|time| time.hour() != 10);
        assert_eq!(taken, vec![t(9, 0, 0), t(11, 0, 0)]);
        assert_eq!(registry.list_all(), vec![t(10, 0, 0)]);
    }
}
