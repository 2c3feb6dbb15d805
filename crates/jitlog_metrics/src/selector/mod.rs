//! Opt-in selection of functions for detailed compilation timing

pub mod pattern;

pub use pattern::{Pattern, matches};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

/// Decides which functions get a phase-by-phase timing breakdown.
///
/// Holds a comma-separated list of wildcard patterns such as
/// `__main__:foo,mymod:Class.*`. Compiler threads query it concurrently while
/// reconfiguration swaps in a whole new list, so a reader always sees either
/// the old list or the new one, never a mix.
#[derive(Debug)]
pub struct FunctionSelector {
    patterns: RwLock<Arc<[Pattern]>>,
}

impl Default for FunctionSelector {
    fn default() -> Self {
        Self {
            patterns: RwLock::new(Arc::from(Vec::<Pattern>::new())),
        }
    }
}

impl FunctionSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_list(raw_list: &str) -> Self {
        let selector = Self::new();
        selector.configure(raw_list);
        selector
    }

    /// Replace the configured patterns with the entries of `raw_list`.
    ///
    /// Empty entries (`a,,b`, leading or trailing commas) are skipped.
    pub fn configure(&self, raw_list: &str) {
        let patterns: Arc<[Pattern]> = parse_list(raw_list).into();
        tracing::debug!(
            count = patterns.len(),
            "configured compilation time capture patterns"
        );
        *self.patterns.write() = patterns;
    }

    /// Drop every configured pattern
    pub fn clear(&self) {
        *self.patterns.write() = Arc::from(Vec::<Pattern>::new());
    }

    /// True if any configured pattern matches `qualified_name`.
    ///
    /// With nothing configured no function is selected.
    pub fn is_selected(&self, qualified_name: &str) -> bool {
        let patterns = self.snapshot();
        patterns
            .iter()
            .any(|pattern| pattern.matches(qualified_name))
    }

    /// Copy of the currently configured patterns, in configuration order
    pub fn patterns(&self) -> Vec<Pattern> {
        self.snapshot().to_vec()
    }

    pub fn len(&self) -> usize {
        self.patterns.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.read().is_empty()
    }

    fn snapshot(&self) -> Arc<[Pattern]> {
        Arc::clone(&self.patterns.read())
    }
}

fn parse_list(raw_list: &str) -> Vec<Pattern> {
    raw_list
        .split(',')
        .filter(|entry| !entry.is_empty())
        .map(Pattern::new)
        .collect()
}

static GLOBAL_SELECTOR: Lazy<FunctionSelector> = Lazy::new(FunctionSelector::new);

/// Process-wide selector shared by every compiler thread
pub fn global_selector() -> &'static FunctionSelector {
    &GLOBAL_SELECTOR
}

/// Replace the process-wide pattern list
pub fn configure_global(raw_list: &str) {
    GLOBAL_SELECTOR.configure(raw_list);
}

/// Whether `qualified_name` should get a phase timing breakdown according
/// to the process-wide selector
pub fn capture_compilation_time_for(qualified_name: &str) -> bool {
    GLOBAL_SELECTOR.is_selected(qualified_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_empty_selector_selects_nothing() {
        let selector = FunctionSelector::new();
        assert!(selector.is_empty());
        assert!(!selector.is_selected("__main__:foo"));
        assert!(!selector.is_selected(""));
    }

    #[test]
    fn test_exact_entry() {
        let selector = FunctionSelector::from_list("__main__:foo");
        assert!(selector.is_selected("__main__:foo"));
        assert!(!selector.is_selected("__main__:bar"));
    }

    #[test]
    fn test_wildcard_entries() {
        let selector = FunctionSelector::from_list("__main__:*");
        assert!(selector.is_selected("__main__:foo"));
        assert!(selector.is_selected("__main__:bar"));
        assert!(!selector.is_selected("other:foo"));

        selector.configure("__main__:f?o");
        assert!(selector.is_selected("__main__:foo"));
        assert!(!selector.is_selected("__main__:fo"));
        assert!(!selector.is_selected("__main__:fp"));
    }

    #[test]
    fn test_empty_entries_are_dropped() {
        let selector = FunctionSelector::from_list(",,__main__:foo,,,mod:bar,");
        assert_eq!(
            selector.patterns(),
            vec![Pattern::new("__main__:foo"), Pattern::new("mod:bar")]
        );
        assert!(!selector.is_selected(""));

        selector.configure(",,,");
        assert!(selector.is_empty());
    }

    #[test]
    fn test_configure_replaces_previous_list() {
        let selector = FunctionSelector::from_list("__main__:foo");
        selector.configure("__main__:bar");
        assert_eq!(selector.len(), 1);
        assert!(!selector.is_selected("__main__:foo"));
        assert!(selector.is_selected("__main__:bar"));

        selector.configure("");
        assert!(!selector.is_selected("__main__:bar"));
    }

    #[test]
    fn test_clear() {
        let selector = FunctionSelector::from_list("*");
        assert!(selector.is_selected("anything"));
        selector.clear();
        assert!(!selector.is_selected("anything"));
    }

    #[test]
    fn test_concurrent_readers_see_whole_lists() {
        let selector = Arc::new(FunctionSelector::from_list("a:x,a:y"));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let selector = Arc::clone(&selector);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let patterns = selector.patterns();
                        // either the two-entry list or the three-entry one
                        assert!(patterns.len() == 2 || patterns.len() == 3);
                        let hit = patterns
                            .iter()
                            .any(|pattern| pattern.matches("a:x") || pattern.matches("b:x"));
                        assert!(hit);
                    }
                })
            })
            .collect();

        for i in 0..200 {
            if i % 2 == 0 {
                selector.configure("b:x,b:y,b:z");
            } else {
                selector.configure("a:x,a:y");
            }
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_global_selector() {
        configure_global("__global_test__:*");
        assert!(capture_compilation_time_for("__global_test__:f"));
        assert!(global_selector().is_selected("__global_test__:g"));
        assert!(!capture_compilation_time_for("__other__:f"));
    }
}
