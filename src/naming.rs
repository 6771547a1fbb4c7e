//! Natural ordering for entry names.
//!
//! Listings sort names the way a person reads them: embedded digit runs
//! compare by numeric value rather than character by character, so
//! `file2` comes before `file10`.
//!
//! ## Rules
//!
//! - A run of ASCII digits compares by value. Leading zeros are ignored,
//!   then a shorter run is smaller, then equal-length runs compare
//!   digit-wise. Runs of any length work without overflow.
//! - Every other character compares by Unicode scalar value. Comparison
//!   is case-sensitive: `B` sorts before `a`.
//! - Names equal under these rules (`a01` vs `a1`) fall back to plain
//!   byte order so the result is a total order.
//!
//! ```text
//! a2      < a10
//! x9y     < x10y
//! img007  < img8
//! file    < file1
//! ```

use crate::types::Entry;
use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Compare two names in natural order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                match compare_digit_runs(&l_run, &r_run) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            (Some(l), Some(r)) => {
                match l.cmp(&r) {
                    Ordering::Equal => {}
                    other => return other,
                }
                left.next();
                right.next();
            }
        }
    }
}

/// Sort entries in place by natural name order.
pub fn sort_natural(entries: &mut [Entry]) {
    entries.sort_by(|a, b| natural_cmp(&a.name, &b.name));
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
