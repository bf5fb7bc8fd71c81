use super::lookup::{CompoundLookup, LookupError, Namespace};
use super::progress::{Progress, ProgressReporter};
use crate::core::models::ids::Cid;
use crate::core::models::table::{Table, TableError};
use crate::core::utils::identifiers::{IdentifierKind, classify, normalize_identifier};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, trace};

pub const IDENTIFIER_COLUMN: &str = "identifier";
pub const RESOLUTION_COLUMNS: [&str; 4] = ["kind", "CID", "status", "candidates"];

/// Why an identifier could not be mapped to a single CID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    NoMatch,
    MultipleMatches(Vec<Cid>), // candidates in service order, never empty
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Cid),
    Unresolved(Unresolved),
}

impl Resolution {
    fn from_candidates(mut candidates: Vec<Cid>) -> Self {
        match candidates.len() {
            0 => Resolution::Unresolved(Unresolved::NoMatch),
            1 => Resolution::Resolved(candidates.remove(0)),
            _ => Resolution::Unresolved(Unresolved::MultipleMatches(candidates)),
        }
    }

    pub fn cid(&self) -> Option<Cid> {
        match self {
            Resolution::Resolved(cid) => Some(*cid),
            Resolution::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn status(&self) -> &'static str {
        match self {
            Resolution::Resolved(_) => "resolved",
            Resolution::Unresolved(Unresolved::NoMatch) => "no-match",
            Resolution::Unresolved(Unresolved::MultipleMatches(_)) => "multiple-matches",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Resolved(cid) => write!(f, "CID {cid}"),
            Resolution::Unresolved(Unresolved::NoMatch) => write!(f, "no match"),
            Resolution::Unresolved(Unresolved::MultipleMatches(candidates)) => {
                write!(f, "{} candidates: {}", candidates.len(), join_cids(candidates))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionEntry {
    pub identifier: String, // as given by the caller
    pub kind: IdentifierKind,
    pub resolution: Resolution,
}

/// The outcome of resolving a list of identifiers, one entry per input in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    pub entries: Vec<ResolutionEntry>,
}

impl ResolutionReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Original identifier → CID for every resolved entry.
    pub fn resolved(&self) -> HashMap<&str, Cid> {
        self.entries
            .iter()
            .filter_map(|e| e.resolution.cid().map(|cid| (e.identifier.as_str(), cid)))
            .collect()
    }

    pub fn unresolved(&self) -> Vec<&ResolutionEntry> {
        self.entries
            .iter()
            .filter(|e| !e.resolution.is_resolved())
            .collect()
    }

    /// Resolved CIDs in input order, repeated CIDs included.
    pub fn cids(&self) -> Vec<Cid> {
        self.entries
            .iter()
            .filter_map(|e| e.resolution.cid())
            .collect()
    }

    pub fn resolved_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.resolution.is_resolved())
            .count()
    }

    pub fn ambiguous_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.resolution,
                    Resolution::Unresolved(Unresolved::MultipleMatches(_))
                )
            })
            .count()
    }

    pub fn unmatched_count(&self) -> usize {
        self.len() - self.resolved_count() - self.ambiguous_count()
    }

    /// Tabulates the report, indexed by identifier. Repeated identifiers appear once.
    pub fn to_table(&self) -> Result<Table, TableError> {
        let mut table = Table::with_index(IDENTIFIER_COLUMN, &RESOLUTION_COLUMNS)?;
        for entry in &self.entries {
            let key = entry.identifier.as_str();
            if table.contains_key(&key.into()) {
                continue;
            }
            let candidates = match &entry.resolution {
                Resolution::Unresolved(Unresolved::MultipleMatches(c)) => join_cids(c),
                _ => String::new(),
            };
            table.push_row(
                key,
                vec![
                    entry.kind.to_string(),
                    entry
                        .resolution
                        .cid()
                        .map(|c| c.to_string())
                        .unwrap_or_default(),
                    entry.resolution.status().to_string(),
                    candidates,
                ],
            )?;
        }
        Ok(table)
    }
}

fn join_cids(cids: &[Cid]) -> String {
    cids.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

/// Maps identifiers to CIDs through a [`CompoundLookup`].
pub struct Resolver<'a, L: CompoundLookup + ?Sized> {
    lookup: &'a L,
    forced_kind: Option<IdentifierKind>,
}

impl<'a, L: CompoundLookup + ?Sized> Resolver<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self {
            lookup,
            forced_kind: None,
        }
    }

    /// Skips classification and treats every identifier as `kind`.
    pub fn with_kind(mut self, kind: Option<IdentifierKind>) -> Self {
        self.forced_kind = kind;
        self
    }

    /// Resolves a single identifier.
    ///
    /// SMILES that were only guessed as such get a second chance as names, since short
    /// strings like `CCO` read as both.
    pub fn resolve_one(&self, identifier: &str) -> Result<(IdentifierKind, Resolution), LookupError> {
        let normalized = normalize_identifier(identifier);
        let kind = self.forced_kind.unwrap_or_else(|| classify(&normalized));
        if normalized.is_empty() {
            return Ok((kind, Resolution::Unresolved(Unresolved::NoMatch)));
        }

        let namespace = Namespace::from(kind);
        let mut candidates = self.lookup.lookup_cids(namespace, &normalized)?;
        trace!(%namespace, query = %normalized, found = candidates.len(), "Lookup finished.");

        if candidates.is_empty() && kind == IdentifierKind::Smiles && self.forced_kind.is_none() {
            debug!("No SMILES match for '{}'; retrying as a name.", normalized);
            candidates = self.lookup.lookup_cids(Namespace::Name, &normalized)?;
        }
        dedup_in_place(&mut candidates);
        Ok((kind, Resolution::from_candidates(candidates)))
    }

    /// Resolves every identifier, looking each distinct normalized form up once.
    ///
    /// The first lookup failure aborts the run; ambiguous and unknown identifiers do not.
    pub fn resolve<S: AsRef<str>>(
        &self,
        identifiers: &[S],
        reporter: &ProgressReporter,
    ) -> Result<ResolutionReport, LookupError> {
        let mut cache: HashMap<String, (IdentifierKind, Resolution)> = HashMap::new();
        let mut entries = Vec::with_capacity(identifiers.len());

        reporter.report(Progress::TaskStart {
            total_steps: identifiers.len() as u64,
        });
        for identifier in identifiers {
            let identifier = identifier.as_ref();
            let normalized = normalize_identifier(identifier);
            let (kind, resolution) = match cache.get(&normalized) {
                Some(hit) => hit.clone(),
                None => {
                    let outcome = self.resolve_one(identifier)?;
                    cache.insert(normalized, outcome.clone());
                    outcome
                }
            };
            entries.push(ResolutionEntry {
                identifier: identifier.to_string(),
                kind,
                resolution,
            });
            reporter.report(Progress::TaskIncrement);
        }
        reporter.report(Progress::TaskFinish);

        let report = ResolutionReport { entries };
        info!(
            resolved = report.resolved_count(),
            ambiguous = report.ambiguous_count(),
            unmatched = report.unmatched_count(),
            lookups = cache.len(),
            "Identifier resolution complete."
        );
        Ok(report)
    }
}

fn dedup_in_place(cids: &mut Vec<Cid>) {
    let mut seen = std::collections::HashSet::with_capacity(cids.len());
    cids.retain(|c| seen.insert(*c));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lookup::testing::{FakeLookup, cid};

    fn fake() -> FakeLookup {
        FakeLookup::new()
            .with(Namespace::Name, "d-Limonene", &[440917])
            .with(Namespace::Name, "Limonene", &[22311, 440917, 439250])
            .with(Namespace::Name, "98-86-2", &[7410])
            .with(Namespace::InChIKey, "XMGQYMWWDOXHJM-JTQLQIEISA-N", &[440917])
            .with(Namespace::Smiles, "CCCCCC=O", &[6184])
            .with(Namespace::Name, "CCO", &[702])
            .with_record(7410, "Acetophenone")
    }

    #[test]
    fn exact_identifiers_resolve_to_exactly_one_cid() {
        let lookup = fake();
        let resolver = Resolver::new(&lookup);
        let cases = [
            ("d-Limonene", IdentifierKind::Name, 440917),
            ("98-86-2", IdentifierKind::Cas, 7410),
            ("XMGQYMWWDOXHJM-JTQLQIEISA-N", IdentifierKind::InChIKey, 440917),
            ("CCCCCC=O", IdentifierKind::Smiles, 6184),
            ("7410", IdentifierKind::Cid, 7410),
        ];
        for (input, kind, expected) in cases {
            let (found_kind, resolution) = resolver.resolve_one(input).unwrap();
            assert_eq!(found_kind, kind, "{input}");
            assert_eq!(resolution, Resolution::Resolved(cid(expected)), "{input}");
        }
    }

    #[test]
    fn unknown_and_ambiguous_inputs_are_explicitly_unresolved() {
        let lookup = fake();
        let resolver = Resolver::new(&lookup);

        let (_, unknown) = resolver.resolve_one("unobtainium").unwrap();
        assert_eq!(unknown, Resolution::Unresolved(Unresolved::NoMatch));

        let (_, ambiguous) = resolver.resolve_one("Limonene").unwrap();
        assert_eq!(
            ambiguous,
            Resolution::Unresolved(Unresolved::MultipleMatches(vec![
                cid(22311),
                cid(440917),
                cid(439250)
            ]))
        );
        assert_eq!(ambiguous.cid(), None);

        let (_, missing_cid) = resolver.resolve_one("123456789").unwrap();
        assert_eq!(missing_cid, Resolution::Unresolved(Unresolved::NoMatch));

        let (_, blank) = resolver.resolve_one("   ").unwrap();
        assert_eq!(blank, Resolution::Unresolved(Unresolved::NoMatch));
    }

    #[test]
    fn guessed_smiles_fall_back_to_the_name_namespace() {
        let lookup = fake();
        let (kind, resolution) = Resolver::new(&lookup).resolve_one("CCO").unwrap();
        assert_eq!(kind, IdentifierKind::Smiles);
        assert_eq!(resolution, Resolution::Resolved(cid(702)));
        assert_eq!(
            *lookup.lookups.borrow(),
            vec![
                (Namespace::Smiles, "CCO".to_string()),
                (Namespace::Name, "CCO".to_string())
            ]
        );
    }

    #[test]
    fn forced_kind_skips_classification_and_fallback() {
        let lookup = fake();
        let resolver = Resolver::new(&lookup).with_kind(Some(IdentifierKind::Smiles));
        let (kind, resolution) = resolver.resolve_one("CCO").unwrap();
        assert_eq!(kind, IdentifierKind::Smiles);
        assert_eq!(resolution, Resolution::Unresolved(Unresolved::NoMatch));
        assert_eq!(lookup.lookups.borrow().len(), 1);
    }

    #[test]
    fn resolve_preserves_order_and_looks_duplicates_up_once() {
        let lookup = fake();
        let inputs = ["Limonene", "d-Limonene", " d-Limonene ", "unobtainium", "d-Limonene"];
        let report = Resolver::new(&lookup)
            .resolve(&inputs, &ProgressReporter::new())
            .unwrap();

        let identifiers: Vec<&str> = report.entries.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(identifiers, inputs);
        assert_eq!(lookup.lookups.borrow().len(), 3);
        assert_eq!(report.resolved_count(), 3);
        assert_eq!(report.ambiguous_count(), 1);
        assert_eq!(report.unmatched_count(), 1);
        assert_eq!(report.resolved().get("d-Limonene"), Some(&cid(440917)));
        assert_eq!(report.cids(), vec![cid(440917); 3]);
        assert_eq!(report.unresolved().len(), 2);
    }

    #[test]
    fn lookup_failures_abort_resolution() {
        let lookup = fake().failing_on("d-Limonene");
        let result = Resolver::new(&lookup).resolve(&["98-86-2", "d-Limonene"], &ProgressReporter::new());
        assert!(matches!(result, Err(LookupError::Status { status: 503, .. })));
    }

    #[test]
    fn report_table_lists_each_identifier_once() {
        let lookup = fake();
        let report = Resolver::new(&lookup)
            .resolve(&["Limonene", "98-86-2", "Limonene"], &ProgressReporter::new())
            .unwrap();
        let table = report.to_table().unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(&"98-86-2".into(), "CID"), Some("7410"));
        assert_eq!(table.cell(&"98-86-2".into(), "kind"), Some("cas"));
        assert_eq!(table.cell(&"Limonene".into(), "status"), Some("multiple-matches"));
        assert_eq!(
            table.cell(&"Limonene".into(), "candidates"),
            Some("22311;440917;439250")
        );
    }
}
