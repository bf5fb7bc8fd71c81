use super::ids::Cid;
use super::table::{Table, TableError};

pub const CID_COLUMN: &str = "CID";
pub const MOLECULE_COLUMNS: [&str; 4] = ["MolecularWeight", "IsomericSMILES", "IUPACName", "name"];

/// Descriptive record for one compound, as stored in an archive's `molecules.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeRecord {
    pub cid: Cid,                        // Canonical compound identifier
    pub name: Option<String>,            // Most common name (may be a trade name)
    pub isomeric_smiles: Option<String>, // Standardized structural notation
    pub iupac_name: Option<String>,      // Systematic nomenclature string
    pub molecular_weight: Option<f64>,   // g/mol
}

impl MoleculeRecord {
    pub fn new(cid: Cid) -> Self {
        Self {
            cid,
            name: None,
            isomeric_smiles: None,
            iupac_name: None,
            molecular_weight: None,
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.molecular_weight
                .map(|w| w.to_string())
                .unwrap_or_default(),
            self.isomeric_smiles.clone().unwrap_or_default(),
            self.iupac_name.clone().unwrap_or_default(),
            self.name.clone().unwrap_or_default(),
        ]
    }
}

/// Builds a molecules table indexed by `CID`, in the order the records are given.
///
/// Fails with [`TableError::DuplicateIndex`] if two records share a CID.
pub fn molecules_table<'a>(
    records: impl IntoIterator<Item = &'a MoleculeRecord>,
) -> Result<Table, TableError> {
    let mut table = Table::with_index(CID_COLUMN, &MOLECULE_COLUMNS)?;
    for record in records {
        table.push_row(record.cid, record.cells())?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::table::RowKey;

    fn limonene() -> MoleculeRecord {
        MoleculeRecord {
            cid: Cid::new(440917).unwrap(),
            name: Some("d-Limonene".into()),
            isomeric_smiles: Some("CC1=CC[C@@H](CC1)C(=C)C".into()),
            iupac_name: Some("(4R)-1-methyl-4-prop-1-en-2-ylcyclohexene".into()),
            molecular_weight: Some(136.23),
        }
    }

    #[test]
    fn molecules_table_uses_archive_column_convention() {
        let table = molecules_table([limonene()].iter()).unwrap();
        assert_eq!(table.index_names(), &["CID"]);
        assert_eq!(table.columns(), &MOLECULE_COLUMNS);
        let key = RowKey::single("440917");
        assert_eq!(table.cell(&key, "name"), Some("d-Limonene"));
        assert_eq!(table.cell(&key, "MolecularWeight"), Some("136.23"));
    }

    #[test]
    fn missing_fields_become_empty_cells() {
        let record = MoleculeRecord::new(Cid::new(7410).unwrap());
        let table = molecules_table([record].iter()).unwrap();
        assert_eq!(table.cell(&RowKey::single("7410"), "IUPACName"), Some(""));
    }

    #[test]
    fn duplicate_records_are_rejected() {
        let records = [limonene(), limonene()];
        assert!(matches!(
            molecules_table(records.iter()),
            Err(TableError::DuplicateIndex { .. })
        ));
    }
}
