//! Purpose: Pure arithmetic and greeting operations.
//! Exports: `add`, `multiply`, `greet`.
//! Role: The entire functional surface; everything else is presentation.
//! Invariants: All three operations are total, stateless, and side-effect-free.
//! Invariants: Integer overflow is native Rust arithmetic, not a policy.

/// Returns the arithmetic sum of `a` and `b`.
pub fn add(a: i64, b: i64) -> i64 {
    a + b
}

/// Returns the arithmetic product of `a` and `b`.
pub fn multiply(a: i64, b: i64) -> i64 {
    a * b
}

/// Formats the fixed greeting for `name`, embedding it verbatim.
pub fn greet(name: &str) -> String {
    format!("Hello, {name}!")
}
