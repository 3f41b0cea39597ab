use crate::data::value::CellValue;
use std::cmp::Ordering;

/// Case folding shared by the text and natural comparators.
///
/// Full Unicode lowercase mapping, then code point order. There is no locale
/// collation: "é" sorts after "z", as it does in the grid's search matching.
fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Case-insensitive comparison of the stringified values
pub fn compare_text(a: &CellValue, b: &CellValue) -> Ordering {
    fold_case(&a.to_string()).cmp(&fold_case(&b.to_string()))
}

/// Case-insensitive natural ordering: embedded digit runs compare by numeric
/// value, so "item2" sorts before "item10"
pub fn compare_alphanumeric(a: &CellValue, b: &CellValue) -> Ordering {
    natural_cmp(&a.to_string(), &b.to_string())
}

/// Compare two parsed timestamps. None marks an unparsable value.
pub fn compare_timestamps(a: Option<i64>, b: Option<i64>) -> Ordering {
    compare_optional(a, b, |a, b| a.cmp(&b))
}

/// Compare two numeric views. None marks a NaN (non-numeric) value.
pub fn compare_numbers(a: Option<f64>, b: Option<f64>) -> Ordering {
    compare_optional(a, b, |a, b| a.partial_cmp(&b).unwrap_or(Ordering::Equal))
}

/// Missing values order after present ones; two missing values tie
fn compare_optional<V, F>(a: Option<V>, b: Option<V>, cmp: F) -> Ordering
where
    F: FnOnce(V, V) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Natural string comparison over alternating digit / non-digit runs
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x, y) {
                    (Chunk::Digits(x), Chunk::Digits(y)) => compare_digit_runs(x, y),
                    (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
                    (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
                    (Chunk::Text(x), Chunk::Text(y)) => fold_case(x).cmp(&fold_case(y)),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Compare digit runs by value without overflowing on long runs
fn compare_digit_runs(x: &str, y: &str) -> Ordering {
    let xs = x.trim_start_matches('0');
    let ys = y.trim_start_matches('0');
    xs.len()
        .cmp(&ys.len())
        .then_with(|| xs.cmp(ys))
        // "007" after "7" so equal values still order deterministically
        .then_with(|| x.len().cmp(&y.len()))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());

        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        Some(if digits {
            Chunk::Digits(head)
        } else {
            Chunk::Text(head)
        })
    }
}
