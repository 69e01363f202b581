use chrono::SecondsFormat;

/// Configuration for an [`Inventory`](crate::Inventory).
///
/// # Example
///
/// ```rust
/// use perishables::InventoryConfig;
/// use chrono::SecondsFormat;
///
/// let config = InventoryConfig::default()
///     .with_event_capacity(64)
///     .with_timestamp_precision(SecondsFormat::Secs);
/// assert_eq!(config.event_capacity, 64);
/// ```
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Buffered notifications per live subscriber before it starts lagging (default: 1024)
    pub event_capacity: usize,

    /// Precision of the RFC 3339 expiration in notification text (default: milliseconds)
    pub timestamp_precision: SecondsFormat,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            event_capacity: 1024,
            timestamp_precision: SecondsFormat::Millis,
        }
    }
}

impl InventoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the subscriber channel capacity. Clamped to at least one.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn with_timestamp_precision(mut self, precision: SecondsFormat) -> Self {
        self.timestamp_precision = precision;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InventoryConfig::new();
        assert_eq!(config.event_capacity, 1024);
        assert_eq!(config.timestamp_precision, SecondsFormat::Millis);
    }

    #[test]
    fn test_capacity_is_clamped() {
        let config = InventoryConfig::default().with_event_capacity(0);
        assert_eq!(config.event_capacity, 1);
    }
}
