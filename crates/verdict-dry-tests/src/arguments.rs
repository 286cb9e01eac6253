// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Terse argument-list construction for tests.

use verdict_core::Argument;

/// Argument with a present value.
///
/// # Example
///
/// ```
/// use verdict_dry_tests::arg;
///
/// let a = arg("Argument1", "String", "value1");
/// assert_eq!(a.value.as_deref(), Some("value1"));
/// ```
pub fn arg(name: &str, ty: &str, value: &str) -> Argument {
    Argument::new(name, ty, value)
}

/// Argument whose value is `null`.
pub fn null_arg(name: &str, ty: &str) -> Argument {
    Argument::null(name, ty)
}

/// The two-argument list used throughout the hashing tests:
/// `[{Argument1, String, value1}, {Argument2, Integer, value2}]`.
pub fn sample_pair() -> Vec<Argument> {
    vec![
        arg("Argument1", "String", "value1"),
        arg("Argument2", "Integer", "value2"),
    ]
}
