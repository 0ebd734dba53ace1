//! # Validator selection filters.
//!
//! A [`Filter`] is a pure predicate over a validator [`Descriptor`]. Primitives
//! match on codes or stages, combinators compose them:
//!
//! ```text
//! Filter::AcceptAll            every validator ("no filter")
//! Filter::codes([c..])         code ∈ {c..}
//! Filter::stages([s..])        any declared stage ∈ {s..}
//! a.and(b)   a.or(b)   !a      boolean algebra
//! ```
//!
//! [`select`] turns the three user-facing lists (disabled codes, enabled codes,
//! stages) into an optional filter using a fixed precedence: enabled overrides
//! disabled, stages are always intersected.
//!
//! ## Example
//! ```rust
//! use bundlevisor::{filter, Code, Descriptor, Stage};
//!
//! let f = filter::select("AM0001", "", "pre-release").unwrap().unwrap();
//!
//! let first = Descriptor::new(Code::new(1).unwrap(), "first", "");
//! let second = Descriptor::new(Code::new(2).unwrap(), "second", "");
//! assert!(!f.matches(&first));
//! assert!(f.matches(&second));
//! ```

use std::collections::BTreeSet;
use std::ops::Not;
use std::str::FromStr;

use crate::error::ParseError;
use crate::validator::{Code, Descriptor, Stage};

/// Predicate selecting which validators run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    /// Accepts every validator.
    #[default]
    AcceptAll,
    /// Accepts validators whose code is in the set.
    Codes(BTreeSet<Code>),
    /// Accepts validators declaring at least one stage in the set.
    Stages(BTreeSet<Stage>),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn codes(codes: impl IntoIterator<Item = Code>) -> Self {
        Filter::Codes(codes.into_iter().collect())
    }

    pub fn stages(stages: impl IntoIterator<Item = Stage>) -> Self {
        Filter::Stages(stages.into_iter().collect())
    }

    pub fn and(self, other: Filter) -> Self {
        Filter::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Filter) -> Self {
        Filter::Or(Box::new(self), Box::new(other))
    }

    /// Evaluates the predicate. Total and side-effect free.
    pub fn matches(&self, desc: &Descriptor) -> bool {
        match self {
            Filter::AcceptAll => true,
            Filter::Codes(codes) => codes.contains(&desc.code()),
            Filter::Stages(stages) => desc.stages().iter().any(|s| stages.contains(s)),
            Filter::And(a, b) => a.matches(desc) && b.matches(desc),
            Filter::Or(a, b) => a.matches(desc) || b.matches(desc),
            Filter::Not(f) => !f.matches(desc),
        }
    }
}

impl Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }
}

/// Evaluates an optional filter; `None` accepts everything.
pub fn accepts(filter: Option<&Filter>, desc: &Descriptor) -> bool {
    filter.map_or(true, |f| f.matches(desc))
}

/// Builds the run filter from comma-separated option lists.
///
/// Precedence (order matters):
/// 1. all lists empty → `None` (run everything);
/// 2. `disabled` → `!codes(disabled)`;
/// 3. `enabled` → `codes(enabled)`, replacing the disabled filter;
/// 4. `stages` → previous filter `and` `stages(stages)`.
pub fn select(disabled: &str, enabled: &str, stages: &str) -> Result<Option<Filter>, ParseError> {
    if disabled.is_empty() && enabled.is_empty() && stages.is_empty() {
        return Ok(None);
    }

    let mut filter = Filter::AcceptAll;

    if !disabled.is_empty() {
        filter = !Filter::codes(parse_list::<Code>("disabled", disabled)?);
    }

    if !enabled.is_empty() {
        filter = Filter::codes(parse_list::<Code>("enabled", enabled)?);
    }

    if !stages.is_empty() {
        filter = filter.and(Filter::stages(parse_list::<Stage>("stages", stages)?));
    }

    Ok(Some(filter))
}

/// Parses a comma-separated list; elements are trimmed.
pub fn parse_list<T>(option: &'static str, list: &str) -> Result<Vec<T>, ParseError>
where
    T: FromStr<Err = ParseError>,
{
    list.split(',')
        .map(|item| {
            item.trim().parse::<T>().map_err(|e| ParseError::List {
                option,
                list: list.to_string(),
                source: Box::new(e),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(code: u32, stages: &[Stage]) -> Descriptor {
        Descriptor::new(Code::new(code).unwrap(), format!("v{code}"), "")
            .with_stages(stages.iter().copied())
    }

    fn catalogue() -> Vec<Descriptor> {
        vec![
            desc(1, &[Stage::PreRelease]),
            desc(2, &[Stage::PostRelease]),
            desc(3, &[]),
            desc(4, &[Stage::PreRelease]),
        ]
    }

    fn selected(filter: &Filter) -> Vec<u32> {
        catalogue()
            .iter()
            .filter(|d| filter.matches(d))
            .map(|d| d.code().get())
            .collect()
    }

    fn samples() -> Vec<Filter> {
        let c = |n| Code::new(n).unwrap();
        vec![
            Filter::AcceptAll,
            Filter::codes([c(1), c(3)]),
            Filter::stages([Stage::PostRelease]),
            Filter::codes([c(2)]).or(Filter::stages([Stage::PreRelease])),
            !Filter::codes([c(4)]),
        ]
    }

    #[test]
    fn and_with_accept_all_is_identity() {
        for f in samples() {
            assert_eq!(selected(&Filter::AcceptAll.and(f.clone())), selected(&f));
        }
    }

    #[test]
    fn or_with_negation_accepts_everything() {
        for f in samples() {
            assert_eq!(selected(&f.clone().or(!f)), vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn double_negation_is_identity() {
        for f in samples() {
            assert_eq!(selected(&!!f.clone()), selected(&f));
        }
    }

    #[test]
    fn absent_filter_accepts_everything() {
        assert!(catalogue().iter().all(|d| accepts(None, d)));
    }

    #[test]
    fn stage_filter_matches_any_declared_stage() {
        assert_eq!(selected(&Filter::stages([Stage::PreRelease])), vec![1, 3, 4]);
    }

    #[test]
    fn no_lists_means_no_filter() {
        assert_eq!(select("", "", "").unwrap(), None);
    }

    #[test]
    fn disabled_excludes_codes() {
        let f = select("AM0001,AM0002", "", "").unwrap().unwrap();
        assert_eq!(selected(&f), vec![3, 4]);
    }

    #[test]
    fn enabled_overrides_disabled() {
        let f = select("AM0001", "AM0001,AM0004", "").unwrap().unwrap();
        assert_eq!(selected(&f), vec![1, 4]);
    }

    #[test]
    fn stages_are_intersected_with_code_filter() {
        let f = select("", "AM0001,AM0002", "pre-release").unwrap().unwrap();
        assert_eq!(selected(&f), vec![1]);

        let f = select("AM0004", "", "pre-release").unwrap().unwrap();
        assert_eq!(selected(&f), vec![1, 3]);

        let f = select("", "", "post-release").unwrap().unwrap();
        assert_eq!(selected(&f), vec![2, 3]);
    }

    #[test]
    fn list_elements_are_trimmed() {
        let f = select("", "AM0001, AM0002", "").unwrap().unwrap();
        assert_eq!(selected(&f), vec![1, 2]);
    }

    #[test]
    fn malformed_lists_name_the_option() {
        let err = select("AM01", "", "").unwrap_err();
        assert!(matches!(err, ParseError::List { option: "disabled", .. }));

        let err = select("", "", "pre-release,staging").unwrap_err();
        assert!(matches!(err, ParseError::List { option: "stages", .. }));
        assert!(err.to_string().contains("staging"));
    }
}
