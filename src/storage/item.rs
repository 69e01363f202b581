//! Inventory Items
//!
//! An [`Item`] is an immutable value: once created, its label, type and
//! expiration never change. Removing an item from the inventory removes its
//! membership from the store and the expiration index; the value itself is
//! handed back to the caller untouched.
//!
//! Items are shared between the store and the index through `Arc<Item>`,
//! so both structures refer to the same logical item rather than copies.

use crate::scheduler::{Clock, SystemClock};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::time::Duration;

/// Identity of an item inside one inventory.
///
/// Ids are handed out from a monotonic counter at insertion time, so they
/// double as the insertion sequence number. Two items with equal labels,
/// types and expirations still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A perishable item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    label: String,
    kind: String,
    expiration: DateTime<Utc>,
}

impl Item {
    /// Creates an item expiring at an absolute instant.
    ///
    /// # Example
    ///
    /// ```
    /// use perishables::Item;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let milk = Item::new("milk", "dairy", Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap());
    /// assert_eq!(milk.label(), "milk");
    /// assert_eq!(milk.to_string(), "milk, dairy, 2030-01-01T12:00:00.000Z");
    /// ```
    pub fn new(
        label: impl Into<String>,
        kind: impl Into<String>,
        expiration: DateTime<Utc>,
    ) -> Self {
        Self {
            label: label.into(),
            kind: kind.into(),
            expiration,
        }
    }

    /// Creates an item expiring `ttl` from now.
    ///
    /// Always reads the wall clock (`Utc::now()`). An inventory running on a
    /// [`ManualClock`](crate::scheduler::ManualClock) should build its items
    /// with [`Item::expiring_after`] instead.
    pub fn expiring_in(label: impl Into<String>, kind: impl Into<String>, ttl: Duration) -> Self {
        Self::expiring_after(&SystemClock, label, kind, ttl)
    }

    /// Creates an item expiring `ttl` after `clock`'s current instant.
    ///
    /// Saturates at the latest representable instant.
    pub fn expiring_after(
        clock: &dyn Clock,
        label: impl Into<String>,
        kind: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expiration = clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(label, kind, expiration)
    }

    /// The caller-supplied label. Not unique across an inventory.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The descriptive type of the item.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The instant after which the item is expired.
    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    /// Returns true if the item is due at `now`.
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration <= now
    }

    /// Renders `"<label>, <type>, <expiration>"` with an RFC 3339 timestamp
    /// at the given precision.
    pub fn describe(&self, precision: SecondsFormat) -> String {
        format!(
            "{}, {}, {}",
            self.label,
            self.kind,
            self.expiration.to_rfc3339_opts(precision, true)
        )
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(SecondsFormat::Millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualClock;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_display_is_parseable() {
        let item = Item::new("yogurt", "dairy", noon());
        let text = item.to_string();
        assert_eq!(text, "yogurt, dairy, 2030-06-01T12:00:00.000Z");

        let stamp = text.rsplit(", ").next().unwrap();
        let parsed = DateTime::parse_from_rfc3339(stamp).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), noon());
    }

    #[test]
    fn test_expiring_after_follows_the_given_clock() {
        let clock = ManualClock::new(noon());
        let item = Item::expiring_after(&clock, "kefir", "dairy", Duration::from_secs(90));
        assert_eq!(item.expiration(), noon() + chrono::Duration::seconds(90));

        clock.advance(Duration::from_secs(3600));
        let later = Item::expiring_after(&clock, "kefir", "dairy", Duration::from_secs(90));
        assert_eq!(later.expiration(), noon() + chrono::Duration::seconds(3690));
    }

    #[test]
    fn test_describe_precision() {
        let item = Item::new("bread", "bakery", noon());
        assert_eq!(
            item.describe(SecondsFormat::Secs),
            "bread, bakery, 2030-06-01T12:00:00Z"
        );
    }

    #[test]
    fn test_is_expired_at_is_inclusive() {
        let item = Item::new("eggs", "dairy", noon());
        assert!(!item.is_expired_at(noon() - chrono::Duration::milliseconds(1)));
        assert!(item.is_expired_at(noon()));
        assert!(item.is_expired_at(noon() + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_expiring_in() {
        let before = Utc::now();
        let item = Item::expiring_in("fish", "seafood", Duration::from_secs(60));
        assert!(item.expiration() >= before + chrono::Duration::seconds(60));
        assert!(item.expiration() <= Utc::now() + chrono::Duration::seconds(60));
    }

    #[test]
    fn test_expiring_in_saturates() {
        let item = Item::expiring_in("salt", "pantry", Duration::MAX);
        assert_eq!(item.expiration(), DateTime::<Utc>::MAX_UTC);
    }
}
