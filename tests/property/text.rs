//! Property-based tests for excerpts, presence checks and retry schedules

use docregen::extraction::is_present_in;
use docregen::generation::prompt::excerpt;
use docregen::generation::{Fingerprint, RetryPolicy};
use proptest::prelude::*;
use std::time::Duration;

/// An excerpt never exceeds its budget and is a prefix of the trimmed source.
#[test]
fn test_excerpt_is_bounded_prefix() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any::<String>(), 0usize..64), |(source, max_chars)| {
            let cut = excerpt(&source, max_chars);
            prop_assert!(cut.chars().count() <= max_chars);
            prop_assert!(source.trim().starts_with(&cut));
            Ok(())
        })
        .unwrap();
}

/// Any slice of the source is found in the source.
#[test]
fn test_slices_of_source_are_present() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let strategy = "[a-z0-9系统故障修复恢复工程师 ，。]{1,40}".prop_flat_map(|source| {
        let len = source.chars().count();
        (Just(source), 0..len, 0..=len)
    });

    runner
        .run(&strategy, |(source, start, end)| {
            let chars: Vec<char> = source.chars().collect();
            let (start, end) = if start <= end { (start, end) } else { (end, start) };
            let slice: String = chars[start..end].iter().collect();
            prop_assert!(is_present_in(&slice, &source));
            Ok(())
        })
        .unwrap();
}

/// Same inputs, same fingerprint.
#[test]
fn test_fingerprint_is_deterministic() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any::<String>(), any::<String>()), |(input, param)| {
            let first = Fingerprint::compute("section", &input, &[("tone", param.as_str())]);
            let second = Fingerprint::compute("section", &input, &[("tone", param.as_str())]);
            prop_assert_eq!(first, second);
            Ok(())
        })
        .unwrap();
}

/// Each wait doubles the previous one, and there is one wait per retry.
#[test]
fn test_retry_schedule_doubles() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(0u32..8, 1u64..5_000), |(retries, initial_ms)| {
            let policy = RetryPolicy::new(retries, Duration::from_millis(initial_ms));
            let schedule = policy.schedule();
            prop_assert_eq!(schedule.len(), retries as usize);
            if let Some(first) = schedule.first() {
                prop_assert_eq!(*first, Duration::from_millis(initial_ms));
            }
            for pair in schedule.windows(2) {
                prop_assert_eq!(pair[1], pair[0] * 2);
            }
            Ok(())
        })
        .unwrap();
}
