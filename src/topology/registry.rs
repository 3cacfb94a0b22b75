//! Component identity registry.
//!
//! Hands out per-type component numbers (`UE1`, `UE2`, ...) and takes them
//! back when a node is deleted or cut. For every component type the in-use
//! set and the available set are disjoint and together cover
//! `1..=max_assigned`, so allocation always returns the smallest free number.

use super::types::ComponentType;
use std::collections::{BTreeMap, BTreeSet};

/// Registry inconsistency found while rebuilding from live nodes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Component number {number} is used by more than one live {kind} node")]
    DuplicateNumber { kind: ComponentType, number: u32 },
    #[error("Component number 0 is not valid for {0}")]
    ZeroNumber(ComponentType),
}

/// Numbering state for one component type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TypeNumbers {
    in_use: BTreeSet<u32>,
    available: BTreeSet<u32>,
    max_assigned: u32,
}

impl TypeNumbers {
    fn is_consistent(&self) -> bool {
        self.in_use.is_disjoint(&self.available)
            && self.in_use.len() + self.available.len() == self.max_assigned as usize
            && self
                .in_use
                .iter()
                .chain(self.available.iter())
                .all(|n| (1..=self.max_assigned).contains(n))
    }
}

/// Per-type component number allocator.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    numbers: BTreeMap<ComponentType, TypeNumbers>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the smallest available number for `kind` and mark it in use.
    pub fn allocate(&mut self, kind: ComponentType) -> u32 {
        let entry = self.numbers.entry(kind).or_default();
        let number = match entry.available.pop_first() {
            Some(reused) => reused,
            None => {
                entry.max_assigned += 1;
                entry.max_assigned
            }
        };
        entry.in_use.insert(number);
        log::debug!("Allocated {}{}", kind, number);
        number
    }

    /// Return `number` to the available set. Releasing a number that is
    /// already available, or that was never handed out, is a no-op.
    pub fn release(&mut self, kind: ComponentType, number: u32) {
        let Some(entry) = self.numbers.get_mut(&kind) else {
            log::debug!("Ignoring release of {}{}: nothing allocated", kind, number);
            return;
        };
        if entry.in_use.remove(&number) {
            entry.available.insert(number);
            log::debug!("Released {}{}", kind, number);
        } else {
            log::debug!("Ignoring release of {}{}: not in use", kind, number);
        }
    }

    /// Claim a specific number, e.g. one read back from a saved document.
    /// Returns false when the number is zero or already in use.
    pub fn reserve(&mut self, kind: ComponentType, number: u32) -> bool {
        if number == 0 {
            return false;
        }
        let entry = self.numbers.entry(kind).or_default();
        if entry.in_use.contains(&number) {
            return false;
        }
        if number > entry.max_assigned {
            entry.available.extend(entry.max_assigned + 1..number);
            entry.max_assigned = number;
        } else {
            entry.available.remove(&number);
        }
        entry.in_use.insert(number);
        true
    }

    /// Rebuild every type's sets from the numbers of the live nodes.
    ///
    /// Required after any bulk change that bypassed `allocate`/`release`.
    /// On a duplicate the registry is left untouched.
    pub fn resync<I>(&mut self, live: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (ComponentType, u32)>,
    {
        let mut rebuilt: BTreeMap<ComponentType, TypeNumbers> = BTreeMap::new();
        for (kind, number) in live {
            if number == 0 {
                return Err(RegistryError::ZeroNumber(kind));
            }
            let entry = rebuilt.entry(kind).or_default();
            if !entry.in_use.insert(number) {
                return Err(RegistryError::DuplicateNumber { kind, number });
            }
            entry.max_assigned = entry.max_assigned.max(number);
        }
        for entry in rebuilt.values_mut() {
            entry.available = (1..=entry.max_assigned)
                .filter(|n| !entry.in_use.contains(n))
                .collect();
        }
        self.numbers = rebuilt;
        log::debug!("Identity registry resynced: {:?}", self.summary());
        Ok(())
    }

    pub fn is_in_use(&self, kind: ComponentType, number: u32) -> bool {
        self.numbers
            .get(&kind)
            .is_some_and(|entry| entry.in_use.contains(&number))
    }

    /// Numbers currently free for reuse, ascending.
    pub fn available(&self, kind: ComponentType) -> Vec<u32> {
        self.numbers
            .get(&kind)
            .map(|entry| entry.available.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn max_assigned(&self, kind: ComponentType) -> u32 {
        self.numbers.get(&kind).map_or(0, |entry| entry.max_assigned)
    }

    /// True when every type satisfies the disjoint-cover invariant.
    pub fn is_consistent(&self) -> bool {
        self.numbers.values().all(TypeNumbers::is_consistent)
    }

    /// In-use counts per type, for logging.
    pub fn summary(&self) -> BTreeMap<ComponentType, usize> {
        self.numbers
            .iter()
            .map(|(kind, entry)| (*kind, entry.in_use.len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_is_sequential() {
        let mut registry = IdentityRegistry::new();
        assert_eq!(registry.allocate(ComponentType::Host), 1);
        assert_eq!(registry.allocate(ComponentType::Host), 2);
        assert_eq!(registry.allocate(ComponentType::UserEquipment), 1);
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_release_reuses_smallest() {
        let mut registry = IdentityRegistry::new();
        for _ in 0..5 {
            registry.allocate(ComponentType::UserEquipment);
        }
        registry.release(ComponentType::UserEquipment, 4);
        registry.release(ComponentType::UserEquipment, 2);
        assert_eq!(registry.available(ComponentType::UserEquipment), vec![2, 4]);
        assert_eq!(registry.allocate(ComponentType::UserEquipment), 2);
        assert_eq!(registry.allocate(ComponentType::UserEquipment), 4);
        assert_eq!(registry.allocate(ComponentType::UserEquipment), 6);
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_double_release_is_noop() {
        let mut registry = IdentityRegistry::new();
        registry.allocate(ComponentType::Switch);
        registry.allocate(ComponentType::Switch);
        registry.release(ComponentType::Switch, 1);
        registry.release(ComponentType::Switch, 1);
        registry.release(ComponentType::Switch, 9);
        registry.release(ComponentType::Router, 1);
        assert_eq!(registry.available(ComponentType::Switch), vec![1]);
        assert!(registry.is_consistent());
        assert_eq!(registry.allocate(ComponentType::Switch), 1);
        assert_eq!(registry.allocate(ComponentType::Switch), 3);
    }

    #[test]
    fn test_reserve_fills_gaps() {
        let mut registry = IdentityRegistry::new();
        assert!(registry.reserve(ComponentType::BaseStation, 3));
        assert!(!registry.reserve(ComponentType::BaseStation, 3));
        assert!(!registry.reserve(ComponentType::BaseStation, 0));
        assert_eq!(registry.available(ComponentType::BaseStation), vec![1, 2]);
        assert!(registry.is_consistent());
        assert_eq!(registry.allocate(ComponentType::BaseStation), 1);
    }

    #[test]
    fn test_resync_rebuilds_sets() {
        let mut registry = IdentityRegistry::new();
        registry.allocate(ComponentType::Host);
        registry
            .resync(vec![
                (ComponentType::Host, 2),
                (ComponentType::Host, 5),
                (ComponentType::AccessPoint, 1),
            ])
            .unwrap();
        assert_eq!(registry.available(ComponentType::Host), vec![1, 3, 4]);
        assert_eq!(registry.max_assigned(ComponentType::Host), 5);
        assert!(registry.is_in_use(ComponentType::AccessPoint, 1));
        assert!(registry.is_consistent());
        assert_eq!(registry.allocate(ComponentType::Host), 1);
    }

    #[test]
    fn test_resync_rejects_duplicates() {
        let mut registry = IdentityRegistry::new();
        registry.allocate(ComponentType::Host);
        let err = registry
            .resync(vec![(ComponentType::Station, 1), (ComponentType::Station, 1)])
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateNumber { kind: ComponentType::Station, number: 1 }
        );
        // Prior state kept
        assert!(registry.is_in_use(ComponentType::Host, 1));
    }

    #[test]
    fn test_resync_after_everything_deleted() {
        let mut registry = IdentityRegistry::new();
        registry.allocate(ComponentType::Controller);
        registry.allocate(ComponentType::Controller);
        registry.resync(Vec::new()).unwrap();
        assert_eq!(registry.allocate(ComponentType::Controller), 1);
    }
}
