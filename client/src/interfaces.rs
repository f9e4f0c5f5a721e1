//! Collaborator interfaces the engine consumes. The embedding application
//! supplies real implementations; the defaults here are enough for tests and
//! headless use.

use log::error;

/// Display-name filtering. `is_flagged` comes from the server's bad-name bit;
/// implementations may replace characters with a mask. Must be pure.
pub trait NameFilter {
    fn filter_name(&self, raw: &str, is_flagged: bool) -> String;
}

/// Replaces every character of a flagged name with `*`, passes clean names
/// through unchanged.
pub struct MaskNameFilter;

impl NameFilter for MaskNameFilter {
    fn filter_name(&self, raw: &str, is_flagged: bool) -> String {
        if is_flagged {
            raw.chars().map(|_| '*').collect()
        } else {
            raw.to_string()
        }
    }
}

/// Where the engine reports recoverable faults (autotile lookup failures,
/// cache bugs). Reports are diagnostics, never user-facing.
pub trait ErrorSink {
    fn report(&mut self, message: &str, context: &str);
}

/// Default sink: forwards every report to the `log` facade.
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&mut self, message: &str, context: &str) {
        error!("{message} ({context})");
    }
}

/// Test/diagnostic sink that remembers every report.
#[derive(Default)]
pub struct CollectingErrorSink {
    pub reports: Vec<(String, String)>,
}

impl ErrorSink for CollectingErrorSink {
    fn report(&mut self, message: &str, context: &str) {
        self.reports.push((message.to_string(), context.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_filter_masks_only_flagged_names() {
        let filter = MaskNameFilter;
        assert_eq!(filter.filter_name("Rarity", false), "Rarity");
        assert_eq!(filter.filter_name("Rarity", true), "******");
    }
}
