use crate::cli::JoinArgs;
use crate::error::Result;
use crate::utils::output::{emit_table, read_input};
use odorkit::core::models::table::Table;
use odorkit::workflows;
use tracing::info;

pub async fn run(args: JoinArgs) -> Result<()> {
    let index: Vec<&str> = args.index.iter().map(String::as_str).collect();
    let tables = args
        .tables
        .iter()
        .map(|path| read_input(path, &index))
        .collect::<Result<Vec<Table>>>()?;

    info!("Joining {} table(s) ({:?}).", tables.len(), args.how);
    let merged = workflows::join::run(&tables, args.how.into())?;

    eprintln!(
        "Merged table: {} row(s), {} column(s).",
        merged.len(),
        merged.columns().len()
    );
    emit_table(&merged, args.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::JoinHow;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn join_writes_the_merged_table() {
        let dir = tempdir().unwrap();
        let left = dir.path().join("molecules.csv");
        let right = dir.path().join("physics.csv");
        let output = dir.path().join("merged.csv");
        fs::write(&left, "CID,name\n7410,acetophenone\n1183,vanillin\n").unwrap();
        fs::write(&right, "CID,vapor_pressure\n1183,0.0001\n702,59.0\n").unwrap();

        run(JoinArgs {
            tables: vec![left, right],
            how: JoinHow::Left,
            index: Some("CID".to_string()),
            output: Some(output.clone()),
        })
        .await
        .unwrap();

        let merged = read_input(&output, &["CID"]).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.cell(&"1183".into(), "vapor_pressure"), Some("0.0001"));
        assert_eq!(merged.cell(&"7410".into(), "vapor_pressure"), Some(""));
    }
}
