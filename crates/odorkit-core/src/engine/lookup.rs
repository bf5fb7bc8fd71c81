use crate::core::models::ids::Cid;
use crate::core::models::molecule::MoleculeRecord;
use crate::core::utils::identifiers::IdentifierKind;
use std::fmt;
use thiserror::Error;

/// The identifier namespace a query is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Cid,
    Name,
    Smiles,
    InChIKey,
    InChI,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Cid => "cid",
            Namespace::Name => "name",
            Namespace::Smiles => "smiles",
            Namespace::InChIKey => "inchikey",
            Namespace::InChI => "inchi",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CAS numbers have no namespace of their own; they are registered as synonyms.
impl From<IdentifierKind> for Namespace {
    fn from(kind: IdentifierKind) -> Self {
        match kind {
            IdentifierKind::Cid => Namespace::Cid,
            IdentifierKind::Cas | IdentifierKind::Name => Namespace::Name,
            IdentifierKind::InChIKey => Namespace::InChIKey,
            IdentifierKind::InChI => Namespace::InChI,
            IdentifierKind::Smiles => Namespace::Smiles,
        }
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to '{url}' failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("'{url}' responded with HTTP {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// A chemical database that maps identifiers to CIDs and CIDs to records.
///
/// "Not found" is not an error for either operation: `lookup_cids` returns an empty list and
/// `fetch_records` simply omits the CIDs it has no record for. Errors are reserved for
/// transport failures and responses that cannot be understood.
pub trait CompoundLookup {
    /// Every CID the database associates with `query` in `namespace`, in service order.
    fn lookup_cids(&self, namespace: Namespace, query: &str) -> Result<Vec<Cid>, LookupError>;

    /// Records for one batch of CIDs, in a single request.
    fn fetch_records(&self, cids: &[Cid]) -> Result<Vec<MoleculeRecord>, LookupError>;
}

impl<L: CompoundLookup + ?Sized> CompoundLookup for &L {
    fn lookup_cids(&self, namespace: Namespace, query: &str) -> Result<Vec<Cid>, LookupError> {
        (**self).lookup_cids(namespace, query)
    }

    fn fetch_records(&self, cids: &[Cid]) -> Result<Vec<MoleculeRecord>, LookupError> {
        (**self).fetch_records(cids)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// An in-memory database that records every call made to it.
    #[derive(Default)]
    pub(crate) struct FakeLookup {
        entries: HashMap<(Namespace, String), Vec<Cid>>,
        records: HashMap<Cid, MoleculeRecord>,
        pub(crate) lookups: RefCell<Vec<(Namespace, String)>>,
        pub(crate) fetches: RefCell<Vec<Vec<Cid>>>,
        fail_on: Option<String>,
    }

    pub(crate) fn cid(value: u64) -> Cid {
        Cid::new(value).unwrap()
    }

    impl FakeLookup {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with(mut self, namespace: Namespace, query: &str, cids: &[u64]) -> Self {
            self.entries.insert(
                (namespace, query.to_string()),
                cids.iter().map(|&c| cid(c)).collect(),
            );
            self
        }

        /// Registers a record and makes its CID verifiable through the `cid` namespace.
        pub(crate) fn with_record(mut self, value: u64, name: &str) -> Self {
            let mut record = MoleculeRecord::new(cid(value));
            record.name = Some(name.to_string());
            record.molecular_weight = Some(100.0 + value as f64 / 1000.0);
            self.records.insert(record.cid, record);
            self.with(Namespace::Cid, &value.to_string(), &[value])
        }

        pub(crate) fn failing_on(mut self, query: &str) -> Self {
            self.fail_on = Some(query.to_string());
            self
        }
    }

    impl CompoundLookup for FakeLookup {
        fn lookup_cids(&self, namespace: Namespace, query: &str) -> Result<Vec<Cid>, LookupError> {
            self.lookups
                .borrow_mut()
                .push((namespace, query.to_string()));
            if self.fail_on.as_deref() == Some(query) {
                return Err(LookupError::Status {
                    url: format!("fake://{namespace}"),
                    status: 503,
                    message: "service unavailable".to_string(),
                });
            }
            Ok(self
                .entries
                .get(&(namespace, query.to_string()))
                .cloned()
                .unwrap_or_default())
        }

        fn fetch_records(&self, cids: &[Cid]) -> Result<Vec<MoleculeRecord>, LookupError> {
            self.fetches.borrow_mut().push(cids.to_vec());
            Ok(cids
                .iter()
                .filter_map(|c| self.records.get(c).cloned())
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_kinds_map_to_lookup_namespaces() {
        assert_eq!(Namespace::from(IdentifierKind::Cas), Namespace::Name);
        assert_eq!(Namespace::from(IdentifierKind::Name), Namespace::Name);
        assert_eq!(Namespace::from(IdentifierKind::Smiles), Namespace::Smiles);
        assert_eq!(Namespace::from(IdentifierKind::InChIKey).as_str(), "inchikey");
        assert_eq!(Namespace::from(IdentifierKind::Cid).to_string(), "cid");
    }
}
