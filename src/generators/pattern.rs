//! String synthesis from regular expressions
//!
//! A pattern is parsed into `regex-syntax`'s high-level IR and the tree is
//! walked once, emitting a string that matches it: literals are copied,
//! a class contributes one member, a repetition picks a count within its
//! bounds, and an alternation picks a branch. The walk is linear in the size
//! of the output, so it always terminates.
//!
//! Classes prefer printable ASCII members when they have any, which keeps
//! `.` and negated classes readable. Unbounded repetitions (`*`, `+`, `{n,}`)
//! are capped at `min + repeat_limit`. Line and text anchors emit nothing;
//! word-boundary assertions are rejected.

use crate::error::{Error, Result};
use rand::Rng;
use regex_syntax::hir::{Class, ClassBytes, ClassUnicode, Hir, HirKind, Look};
use regex_syntax::ParserBuilder;

const PRINTABLE_ASCII: (u32, u32) = (0x20, 0x7E);

/// Generates strings matching one regular expression
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    pattern: String,
    hir: Hir,
    repeat_limit: u32,
}

impl PatternGenerator {
    /// Parse `pattern`, rejecting constructs that cannot be synthesized
    pub fn new(pattern: &str, repeat_limit: u32) -> Result<Self> {
        let hir = ParserBuilder::new()
            .build()
            .parse(pattern)
            .map_err(|e| Error::Pattern(format!("invalid pattern '{}': {}", pattern, e)))?;
        check_supported(&hir, pattern)?;

        Ok(Self {
            pattern: pattern.to_string(),
            hir,
            repeat_limit,
        })
    }

    /// The source pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Produce one matching string
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut out = String::new();
        self.emit(&self.hir, rng, &mut out);
        out
    }

    fn emit<R: Rng + ?Sized>(&self, hir: &Hir, rng: &mut R, out: &mut String) {
        match hir.kind() {
            HirKind::Empty | HirKind::Look(_) => {}
            HirKind::Literal(literal) => out.push_str(&String::from_utf8_lossy(&literal.0)),
            HirKind::Class(Class::Unicode(class)) => out.push(pick_unicode(class, rng)),
            HirKind::Class(Class::Bytes(class)) => out.push(pick_byte(class, rng)),
            HirKind::Repetition(repetition) => {
                let max = repetition
                    .max
                    .unwrap_or_else(|| repetition.min.saturating_add(self.repeat_limit));
                let count = rng.gen_range(repetition.min..=max);
                for _ in 0..count {
                    self.emit(&repetition.sub, rng, out);
                }
            }
            HirKind::Capture(capture) => self.emit(&capture.sub, rng, out),
            HirKind::Concat(parts) => {
                for part in parts {
                    self.emit(part, rng, out);
                }
            }
            HirKind::Alternation(branches) => {
                let branch = &branches[rng.gen_range(0..branches.len())];
                self.emit(branch, rng, out);
            }
        }
    }
}

fn check_supported(hir: &Hir, pattern: &str) -> Result<()> {
    match hir.kind() {
        HirKind::Empty | HirKind::Literal(_) => Ok(()),
        HirKind::Class(class) => {
            let empty = match class {
                Class::Unicode(c) => c.ranges().is_empty(),
                Class::Bytes(c) => c.ranges().is_empty(),
            };
            if empty {
                Err(Error::Pattern(format!(
                    "pattern '{}' contains a class that matches nothing",
                    pattern
                )))
            } else {
                Ok(())
            }
        }
        HirKind::Look(look) => match look {
            Look::Start
            | Look::End
            | Look::StartLF
            | Look::EndLF
            | Look::StartCRLF
            | Look::EndCRLF => Ok(()),
            other => Err(Error::Pattern(format!(
                "pattern '{}' uses unsupported assertion {:?}",
                pattern, other
            ))),
        },
        HirKind::Repetition(repetition) => check_supported(&repetition.sub, pattern),
        HirKind::Capture(capture) => check_supported(&capture.sub, pattern),
        HirKind::Concat(parts) | HirKind::Alternation(parts) => {
            parts.iter().try_for_each(|part| check_supported(part, pattern))
        }
    }
}

fn pick_unicode<R: Rng + ?Sized>(class: &ClassUnicode, rng: &mut R) -> char {
    let spans: Vec<(u32, u32)> = class
        .ranges()
        .iter()
        .map(|r| (u32::from(r.start()), u32::from(r.end())))
        .collect();
    let printable = printable_subset(&spans);
    let pool = if printable.is_empty() { &spans } else { &printable };

    // Any span crossing the surrogate gap also contains U+E000.
    char::from_u32(pick_from_spans(pool, rng)).unwrap_or('\u{E000}')
}

fn pick_byte<R: Rng + ?Sized>(class: &ClassBytes, rng: &mut R) -> char {
    let spans: Vec<(u32, u32)> = class
        .ranges()
        .iter()
        .map(|r| (u32::from(r.start()), u32::from(r.end())))
        .collect();
    let printable = printable_subset(&spans);
    let pool = if printable.is_empty() { &spans } else { &printable };

    char::from_u32(pick_from_spans(pool, rng)).unwrap_or('?')
}

fn printable_subset(spans: &[(u32, u32)]) -> Vec<(u32, u32)> {
    spans
        .iter()
        .filter_map(|&(start, end)| {
            let start = start.max(PRINTABLE_ASCII.0);
            let end = end.min(PRINTABLE_ASCII.1);
            (start <= end).then_some((start, end))
        })
        .collect()
}

fn pick_from_spans<R: Rng + ?Sized>(spans: &[(u32, u32)], rng: &mut R) -> u32 {
    let total: u64 = spans.iter().map(|&(s, e)| u64::from(e - s) + 1).sum();
    let mut n = rng.gen_range(0..total);
    for &(start, end) in spans {
        let width = u64::from(end - start) + 1;
        if n < width {
            return start + n as u32;
        }
        n -= width;
    }
    spans[0].0
}
