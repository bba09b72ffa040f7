//! Porter-style suffix stripping.
//!
//! Every step works on an uppercased copy of the term and is described by an
//! ordered table of `(suffix, gate, replacement)` rules. The first rule whose
//! suffix matches and whose gate holds rewrites the term and ends the step.

use crate::cleanup::remove_symbols;
use crate::Document;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref QUERY_WORD: Regex = Regex::new(r"[\p{Alphabetic}']+").expect("valid regex");
}

#[derive(Clone, Copy)]
enum Gate {
    Always,
    /// measure(stem) > n
    MeasureAbove(usize),
}

impl Gate {
    fn holds(self, stem: &[char]) -> bool {
        match self {
            Gate::Always => true,
            Gate::MeasureAbove(n) => measure_chars(stem) > n,
        }
    }
}

type Rule = (&'static str, Gate, &'static str);

const STEP_1A: &[Rule] = &[
    ("SSES", Gate::Always, "SS"),
    ("IES", Gate::Always, "I"),
    ("SS", Gate::Always, "SS"),
    ("S", Gate::Always, ""),
];

const STEP_2: &[Rule] = &[
    ("ATIONAL", Gate::MeasureAbove(0), "ATE"),
    ("TIONAL", Gate::MeasureAbove(0), "TION"),
    ("ENCI", Gate::MeasureAbove(0), "ENCE"),
    ("ANCI", Gate::MeasureAbove(0), "ANCE"),
    ("IZER", Gate::MeasureAbove(0), "IZE"),
    ("ABLI", Gate::MeasureAbove(0), "ABLE"),
    ("ALLI", Gate::MeasureAbove(0), "AL"),
    ("ENTLI", Gate::MeasureAbove(0), "ENT"),
    ("ELI", Gate::MeasureAbove(0), "E"),
    ("OUSLI", Gate::MeasureAbove(0), "OUS"),
    ("IZATION", Gate::MeasureAbove(0), "IZE"),
    ("ATION", Gate::MeasureAbove(0), "ATE"),
    ("ATOR", Gate::MeasureAbove(0), "ATE"),
    ("ALISM", Gate::MeasureAbove(0), "AL"),
    ("IVENESS", Gate::MeasureAbove(0), "IVE"),
    ("FULNESS", Gate::MeasureAbove(0), "FUL"),
    ("OUSNESS", Gate::MeasureAbove(0), "OUS"),
    ("ALITI", Gate::MeasureAbove(0), "AL"),
    ("IVITI", Gate::MeasureAbove(0), "IVE"),
    ("BILITI", Gate::MeasureAbove(0), "BLE"),
];

const STEP_3: &[Rule] = &[
    ("ICATE", Gate::MeasureAbove(0), "IC"),
    ("ATIVE", Gate::MeasureAbove(0), ""),
    ("ALIZE", Gate::MeasureAbove(0), "AL"),
    ("ICITI", Gate::MeasureAbove(0), "IC"),
    ("ICAL", Gate::MeasureAbove(0), "IC"),
    ("FUL", Gate::MeasureAbove(0), ""),
    ("NESS", Gate::MeasureAbove(0), ""),
];

const STEP_4: &[Rule] = &[
    ("AL", Gate::MeasureAbove(1), ""),
    ("ANCE", Gate::MeasureAbove(1), ""),
    ("ENCE", Gate::MeasureAbove(1), ""),
    ("ER", Gate::MeasureAbove(1), ""),
    ("IC", Gate::MeasureAbove(1), ""),
    ("ABLE", Gate::MeasureAbove(1), ""),
    ("IBLE", Gate::MeasureAbove(1), ""),
    ("ANT", Gate::MeasureAbove(1), ""),
    ("EMENT", Gate::MeasureAbove(1), ""),
    ("MENT", Gate::MeasureAbove(1), ""),
    ("ENT", Gate::MeasureAbove(1), ""),
    ("OU", Gate::MeasureAbove(1), ""),
    ("ISM", Gate::MeasureAbove(1), ""),
    ("ATE", Gate::MeasureAbove(1), ""),
    ("ITI", Gate::MeasureAbove(1), ""),
    ("OUS", Gate::MeasureAbove(1), ""),
    ("IVE", Gate::MeasureAbove(1), ""),
    ("IZE", Gate::MeasureAbove(1), ""),
];

fn is_plain_vowel(c: char) -> bool {
    matches!(c, 'A' | 'E' | 'I' | 'O' | 'U')
}

/// Vowel/consonant classification of each letter. `Y` is a vowel unless it
/// is the first letter or follows a vowel.
fn vowel_flags(word: &[char]) -> Vec<bool> {
    let mut flags = Vec::with_capacity(word.len());
    let mut vowel = false;
    for (i, &c) in word.iter().enumerate() {
        if is_plain_vowel(c) {
            vowel = true;
        } else if c == 'Y' {
            if i > 0 {
                vowel = !(is_plain_vowel(word[i - 1]) && vowel);
            }
        } else {
            vowel = false;
        }
        flags.push(vowel);
    }
    flags
}

fn measure_chars(word: &[char]) -> usize {
    vowel_flags(word)
        .windows(2)
        .filter(|pair| pair[0] && !pair[1])
        .count()
}

fn has_vowel(stem: &[char]) -> bool {
    vowel_flags(stem).into_iter().any(|v| v)
}

fn ends_double_consonant(stem: &[char]) -> bool {
    match stem {
        [.., a, b] => a == b && !is_plain_vowel(*a),
        _ => false,
    }
}

fn ends_cvc(stem: &[char]) -> bool {
    let flags = vowel_flags(stem);
    match (flags.as_slice(), stem.last()) {
        ([.., false, true, false], Some(last)) => !matches!(last, 'W' | 'X' | 'Y'),
        _ => false,
    }
}

fn to_upper_chars(word: &str) -> Vec<char> {
    word.to_uppercase().chars().collect()
}

/// Number of consonant-sequence to vowel-sequence transitions, `[C](VC){m}[V]`.
pub fn measure(word: &str) -> usize {
    measure_chars(&to_upper_chars(word))
}

/// `*v*`: the stem contains a vowel.
pub fn condition_v(stem: &str) -> bool {
    has_vowel(&to_upper_chars(stem))
}

/// `*d`: the stem ends with a double consonant.
pub fn condition_d(stem: &str) -> bool {
    ends_double_consonant(&to_upper_chars(stem))
}

/// `*o`: the stem ends consonant-vowel-consonant and the last consonant is not W, X or Y.
pub fn condition_o(stem: &str) -> bool {
    ends_cvc(&to_upper_chars(stem))
}

fn strip_suffix<'a>(word: &'a [char], suffix: &str) -> Option<&'a [char]> {
    let suffix: Vec<char> = suffix.chars().collect();
    if word.len() >= suffix.len() && word[word.len() - suffix.len()..] == suffix[..] {
        Some(&word[..word.len() - suffix.len()])
    } else {
        None
    }
}

fn find_rule(word: &[char], rules: &[Rule]) -> Option<Vec<char>> {
    rules.iter().find_map(|&(suffix, gate, replacement)| {
        strip_suffix(word, suffix)
            .filter(|stem| gate.holds(stem))
            .map(|stem| stem.iter().copied().chain(replacement.chars()).collect())
    })
}

fn apply_rules(word: Vec<char>, rules: &[Rule]) -> Vec<char> {
    find_rule(&word, rules).unwrap_or(word)
}

pub(crate) fn step_1a(word: Vec<char>) -> Vec<char> {
    apply_rules(word, STEP_1A)
}

pub(crate) fn step_1b(word: Vec<char>) -> Vec<char> {
    // A matching EED ends the step whether or not its gate holds.
    if let Some(stem) = strip_suffix(&word, "EED") {
        if measure_chars(stem) > 0 {
            let mut out = stem.to_vec();
            out.extend(['E', 'E']);
            return out;
        }
        return word;
    }
    let stripped = ["ED", "ING"].iter().find_map(|suffix| {
        strip_suffix(&word, suffix)
            .filter(|stem| has_vowel(stem))
            .map(|stem| stem.to_vec())
    });
    match stripped {
        Some(stem) => step_1b_tidy(stem),
        None => word,
    }
}

fn step_1b_tidy(mut stem: Vec<char>) -> Vec<char> {
    for ending in ["AT", "BL", "IZ"] {
        if strip_suffix(&stem, ending).is_some() {
            stem.push('E');
            return stem;
        }
    }
    if ends_double_consonant(&stem) && !matches!(stem.last(), Some('L' | 'S' | 'Z')) {
        stem.pop();
        return stem;
    }
    if measure_chars(&stem) == 1 && ends_cvc(&stem) {
        stem.push('E');
    }
    stem
}

pub(crate) fn step_1c(word: Vec<char>) -> Vec<char> {
    match strip_suffix(&word, "Y") {
        Some(stem) if has_vowel(stem) => {
            let mut out = stem.to_vec();
            out.push('I');
            out
        }
        _ => word,
    }
}

pub(crate) fn step_2(word: Vec<char>) -> Vec<char> {
    apply_rules(word, STEP_2)
}

pub(crate) fn step_3(word: Vec<char>) -> Vec<char> {
    apply_rules(word, STEP_3)
}

pub(crate) fn step_4(word: Vec<char>) -> Vec<char> {
    if let Some(out) = find_rule(&word, STEP_4) {
        return out;
    }
    match strip_suffix(&word, "ION") {
        Some(stem) if matches!(stem.last(), Some('S' | 'T')) && measure_chars(stem) > 1 => {
            stem.to_vec()
        }
        _ => word,
    }
}

pub(crate) fn step_5a(word: Vec<char>) -> Vec<char> {
    match strip_suffix(&word, "E") {
        Some(stem) => {
            let m = measure_chars(stem);
            if m > 1 || (m == 1 && !ends_cvc(stem)) {
                stem.to_vec()
            } else {
                word
            }
        }
        None => word,
    }
}

pub(crate) fn step_5b(mut word: Vec<char>) -> Vec<char> {
    if word.last() == Some(&'L') && ends_double_consonant(&word) && measure_chars(&word) > 1 {
        word.pop();
    }
    word
}

/// Stems a single term. Total: unmatched rules pass the term through, and the
/// result is always lowercase.
pub fn stem(term: &str) -> String {
    let word = to_upper_chars(term);
    let word = step_1a(word);
    let word = step_1b(word);
    let word = step_1c(word);
    let word = step_2(word);
    let word = step_3(word);
    let word = step_4(word);
    let word = step_5a(word);
    let word = step_5b(word);
    word.into_iter().collect::<String>().to_lowercase()
}

/// Fills `stemmed_terms` of every document from its `terms`. Existing stems are replaced.
pub fn stem_all(collection: &mut [Document]) {
    for doc in collection.iter_mut() {
        doc.stemmed_terms = doc.terms.iter().map(|t| stem(t)).collect();
    }
    tracing::debug!(docs = collection.len(), "stemmed collection");
}

/// Replaces every word of a raw query with its stem; operators and spacing are kept.
pub fn stem_query(query: &str) -> String {
    QUERY_WORD
        .replace_all(query, |caps: &Captures| stem(&remove_symbols(&caps[0])))
        .into_owned()
}
