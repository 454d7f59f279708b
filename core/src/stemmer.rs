//! Stemming algorithms behind a single trait so the preprocessor does not care
//! which language it is reducing.

use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer as Snowball};
use std::collections::HashSet;

pub trait Stemmer: Send + Sync {
    fn stem(&self, token: &str) -> String;
}

/// Snowball (Porter2 family) stemmer from `rust-stemmers`.
pub struct SnowballStemmer {
    inner: Snowball,
}

impl SnowballStemmer {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { inner: Snowball::create(algorithm) }
    }

    pub fn english() -> Self {
        Self::new(Algorithm::English)
    }
}

impl Stemmer for SnowballStemmer {
    fn stem(&self, token: &str) -> String {
        self.inner.stem(token).into_owned()
    }
}

lazy_static! {
    static ref ROOT_WORDS: HashSet<&'static str> = include_str!("../data/root_words.txt")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();
}

const PARTICLES: &[&str] = &["kah", "lah", "tah", "pun"];
const POSSESSIVES: &[&str] = &["nya", "ku", "mu"];
const DERIVATIONAL_SUFFIXES: &[&str] = &["kan", "an", "i"];
const MAX_PREFIXES: usize = 3;

/// A prefix and the ways its remainder can be read back into a root.
struct PrefixRule {
    prefix: &'static str,
    /// Letters that may have been swallowed when the remainder starts with a
    /// vowel, tried in order (`""` keeps the remainder as is).
    before_vowel: &'static [&'static str],
    before_consonant: bool,
}

const fn rule(prefix: &'static str, before_vowel: &'static [&'static str], before_consonant: bool) -> PrefixRule {
    PrefixRule { prefix, before_vowel, before_consonant }
}

const PREFIXES: &[PrefixRule] = &[
    rule("meng", &["", "k"], true),
    rule("meny", &["s"], false),
    rule("mem", &["m", "p"], true),
    rule("men", &["n", "t"], true),
    rule("me", &[""], true),
    rule("peng", &["", "k"], true),
    rule("peny", &["s"], false),
    rule("pem", &["m", "p"], true),
    rule("pen", &["n", "t"], true),
    rule("pel", &[""], false),
    rule("per", &[""], true),
    rule("pe", &[""], true),
    rule("ber", &[""], true),
    rule("bel", &[""], false),
    rule("be", &[], true),
    rule("ter", &[""], true),
    rule("di", &[""], true),
    rule("ke", &[""], true),
    rule("se", &[""], true),
];

impl PrefixRule {
    fn readings(&self, rest: &str) -> Vec<String> {
        match rest.chars().next() {
            Some(c) if is_vowel(c) => self.before_vowel.iter().map(|l| format!("{l}{rest}")).collect(),
            Some(_) if self.before_consonant => vec![rest.to_string()],
            _ => Vec::new(),
        }
    }
}

/// Dictionary-backed Indonesian stemmer in the Nazief-Adriani style.
///
/// Inflectional suffixes come off first, then derivational ones, then up to
/// three prefixes. Every candidate is checked against the root word list and
/// the first hit wins, with the more stripped readings tried before the less
/// stripped ones. Nasal prefixes try each swallowed consonant (`memakan` reads
/// as `makan` before `pakan`). A word with no root in reach is returned as is.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndonesianStemmer;

impl IndonesianStemmer {
    pub fn new() -> Self {
        Self
    }

    pub fn is_root(word: &str) -> bool {
        ROOT_WORDS.contains(word)
    }
}

impl Stemmer for IndonesianStemmer {
    fn stem(&self, token: &str) -> String {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_lowercase()) {
            return token.to_string();
        }
        find_root(token).unwrap_or_else(|| token.to_string())
    }
}

fn find_root(word: &str) -> Option<String> {
    if IndonesianStemmer::is_root(word) {
        return Some(word.to_string());
    }
    inflection_candidates(word).into_iter().find_map(|base| {
        derivation_candidates(&base).into_iter().find_map(|candidate| {
            if IndonesianStemmer::is_root(&candidate) {
                Some(candidate)
            } else {
                strip_prefixes(&candidate, MAX_PREFIXES)
            }
        })
    })
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn strip_any(word: &str, suffixes: &[&str]) -> Option<String> {
    suffixes
        .iter()
        .find_map(|suffix| word.strip_suffix(suffix).filter(|rest| rest.len() >= 2))
        .map(str::to_string)
}

/// `word` with particle and possessive removed, most stripped first.
fn inflection_candidates(word: &str) -> Vec<String> {
    let without_particle = strip_any(word, PARTICLES);
    let mut out = Vec::new();
    for base in without_particle.as_deref().into_iter().chain(std::iter::once(word)) {
        if let Some(w) = strip_any(base, POSSESSIVES) {
            out.push(w);
        }
        out.push(base.to_string());
    }
    out
}

fn derivation_candidates(word: &str) -> Vec<String> {
    let mut out: Vec<String> = DERIVATIONAL_SUFFIXES
        .iter()
        .filter_map(|suffix| word.strip_suffix(suffix))
        .filter(|rest| rest.len() >= 2)
        .map(str::to_string)
        .collect();
    out.push(word.to_string());
    out
}

fn strip_prefixes(word: &str, depth: usize) -> Option<String> {
    if depth == 0 {
        return None;
    }
    PREFIXES.iter().find_map(|rule| {
        let rest = word.strip_prefix(rule.prefix)?;
        let readings: Vec<String> = rule.readings(rest).into_iter().filter(|r| r.len() >= 2).collect();
        readings
            .iter()
            .find(|r| IndonesianStemmer::is_root(r))
            .cloned()
            .or_else(|| readings.iter().find_map(|r| strip_prefixes(r, depth - 1)))
    })
}
