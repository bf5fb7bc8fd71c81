use phf::{Map, Set, phf_map, phf_set};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The textual form a molecule identifier is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    Cid,      // PubChem compound ID, e.g. "440917"
    Cas,      // CAS registry number, e.g. "98-86-2"
    InChIKey, // Hashed InChI, e.g. "GXANMBISFKBPEX-ARJAWSKDSA-N"
    InChI,    // Full InChI string, "InChI=1S/..."
    Smiles,   // Structural notation, e.g. "CCCCCC=O"
    Name,     // Common, trade or IUPAC name
}

static KIND_NAMES: Map<&'static str, IdentifierKind> = phf_map! {
    "cid" => IdentifierKind::Cid,
    "cas" => IdentifierKind::Cas,
    "inchikey" => IdentifierKind::InChIKey,
    "inchi-key" => IdentifierKind::InChIKey,
    "inchi" => IdentifierKind::InChI,
    "smiles" => IdentifierKind::Smiles,
    "name" => IdentifierKind::Name,
};

// Atoms that may appear outside brackets in a SMILES string.
static ORGANIC_SUBSET: Set<&'static str> = phf_set! {
    "B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I",
    "b", "c", "n", "o", "p", "s", "*",
};

const SMILES_BOND_CHARS: &str = "=#$:/\\-.()%";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Unknown identifier kind '{0}'. Expected one of: cid, cas, inchikey, inchi, smiles, name.")]
pub struct UnknownKindError(pub String);

impl FromStr for IdentifierKind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KIND_NAMES
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| UnknownKindError(s.to_string()))
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IdentifierKind::Cid => "cid",
            IdentifierKind::Cas => "cas",
            IdentifierKind::InChIKey => "inchikey",
            IdentifierKind::InChI => "inchi",
            IdentifierKind::Smiles => "smiles",
            IdentifierKind::Name => "name",
        };
        write!(f, "{s}")
    }
}

/// Trims the identifier and collapses internal runs of whitespace to a single space.
///
/// Only the spelling changes: stereo descriptors, prefixes and case are kept, so the
/// normalized form always names the same compound as the input.
pub fn normalize_identifier(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Guesses the kind of an already-normalized identifier.
pub fn classify(identifier: &str) -> IdentifierKind {
    if identifier.starts_with("InChI=") {
        IdentifierKind::InChI
    } else if is_inchikey(identifier) {
        IdentifierKind::InChIKey
    } else if is_cas_number(identifier) {
        IdentifierKind::Cas
    } else if is_cid(identifier) {
        IdentifierKind::Cid
    } else if looks_like_smiles(identifier) {
        IdentifierKind::Smiles
    } else {
        IdentifierKind::Name
    }
}

pub fn is_cid(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && s.bytes().any(|b| b != b'0')
}

pub fn is_inchikey(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    matches!(parts.as_slice(), [a, b, c]
        if a.len() == 14 && b.len() == 10 && c.len() == 1
            && s.bytes().all(|ch| ch == b'-' || ch.is_ascii_uppercase()))
}

/// Checks the `NNNNNNN-NN-N` shape and the trailing check digit of a CAS number.
pub fn is_cas_number(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    let [first, second, check] = parts.as_slice() else {
        return false;
    };
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !(2..=7).contains(&first.len())
        || second.len() != 2
        || check.len() != 1
        || !all_digits(*first)
        || !all_digits(*second)
        || !all_digits(*check)
    {
        return false;
    }

    let body: Vec<u32> = first
        .bytes()
        .chain(second.bytes())
        .map(|b| u32::from(b - b'0'))
        .collect();
    let checksum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| (i as u32 + 1) * d)
        .sum();
    checksum % 10 == u32::from(check.as_bytes()[0] - b'0')
}

/// Heuristic SMILES detection.
///
/// The string must tokenize as SMILES (organic-subset atoms, bracket atoms, bonds, branches
/// and ring closures), must start with an atom, and aromatic lowercase atoms must come with
/// at least one ring closure digit. The last rule keeps ordinary lowercase words such as
/// "cocoon" classified as names.
pub fn looks_like_smiles(s: &str) -> bool {
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return false;
    }
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    let mut saw_atom = false;
    let mut saw_aromatic = false;
    let mut saw_digit = false;

    while i < chars.len() {
        let c = chars[i];
        if c == '[' {
            let Some(end) = chars[i..].iter().position(|&ch| ch == ']') else {
                return false;
            };
            let inner = &chars[i + 1..i + end];
            if inner.is_empty()
                || !inner
                    .iter()
                    .all(|ch| ch.is_ascii_alphanumeric() || "+-@#:".contains(*ch))
            {
                return false;
            }
            saw_atom = true;
            i += end + 1;
            continue;
        }

        if i + 1 < chars.len() {
            let pair: String = chars[i..i + 2].iter().collect();
            if ORGANIC_SUBSET.contains(pair.as_str()) {
                saw_atom = true;
                i += 2;
                continue;
            }
        }

        let single = c.to_string();
        if ORGANIC_SUBSET.contains(single.as_str()) {
            saw_atom = true;
            saw_aromatic |= c.is_ascii_lowercase();
        } else if c.is_ascii_digit() {
            if !saw_atom {
                return false;
            }
            saw_digit = true;
        } else if SMILES_BOND_CHARS.contains(c) {
            if !saw_atom {
                return false;
            }
        } else {
            return false;
        }
        i += 1;
    }

    saw_atom && (!saw_aromatic || saw_digit)
}
