//! Collision policy
//!
//! Two situations produce more than one value for a single key:
//! - several jobs in one pipeline carry the configured deploy-job name
//! - several compute services normalize to the same service name
//!
//! Both are resolved with last-write-wins: the value seen last in response
//! order is kept. Collisions are not errors.

use std::collections::HashMap;
use std::hash::Hash;

/// Stores `value` under `key`, replacing any earlier value
///
/// Returns the replaced value so callers can report the collision.
pub fn last_write_wins<K, V>(map: &mut HashMap<K, V>, key: K, value: V) -> Option<V>
where
    K: Eq + Hash,
{
    map.insert(key, value)
}

/// Overwrites `slot` with `value`, returning the previous value when one was set
pub fn overwrite<V>(slot: &mut Option<V>, value: V) -> Option<V> {
    slot.replace(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins_keeps_latest() {
        let mut map = HashMap::new();
        assert_eq!(last_write_wins(&mut map, "billing", "1.0"), None);
        assert_eq!(last_write_wins(&mut map, "billing", "2.0"), Some("1.0"));
        assert_eq!(map.get("billing"), Some(&"2.0"));
    }

    #[test]
    fn test_overwrite_slot() {
        let mut slot = None;
        assert_eq!(overwrite(&mut slot, "success"), None);
        assert_eq!(overwrite(&mut slot, "failed"), Some("success"));
        assert_eq!(slot, Some("failed"));
    }
}
