use clap::{Args, Parser, Subcommand, ValueEnum};
use odorkit::core::models::ids::Cid;
use odorkit::core::models::table::JoinKind;
use odorkit::core::utils::identifiers::IdentifierKind;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "odorkit contributors",
    version,
    about = "odorkit - Curate olfaction datasets: resolve molecule identifiers to PubChem CIDs, fetch molecule records and merge CID-indexed tables.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a TOML configuration file.
    /// Defaults to `config.toml` in the odorkit configuration directory, if present.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S pubchem.batch-size=50
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve names, CAS numbers, SMILES, InChIKeys or InChIs to PubChem CIDs.
    Resolve(ResolveArgs),
    /// Fetch molecule records (weight, SMILES, IUPAC name, common name) for CIDs.
    Molecules(MoleculesArgs),
    /// Resolve a table's identifier column and save the molecules of a new archive.
    Standardize(StandardizeArgs),
    /// Merge tables that share an index (e.g. CID) into one.
    Join(JoinArgs),
    /// Inspect and validate archives in the local data directory.
    Archive(ArchiveArgs),
    /// Manage the local data directory.
    Data(DataArgs),
}

/// Arguments for the `resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Identifiers to resolve.
    #[arg(value_name = "IDENTIFIER", required_unless_present = "input")]
    pub identifiers: Vec<String>,

    /// Read identifiers from a column of a CSV file.
    #[arg(short, long, value_name = "PATH", requires = "column")]
    pub input: Option<PathBuf>,

    /// Column of the input file holding the identifiers.
    #[arg(long, value_name = "NAME", requires = "input")]
    pub column: Option<String>,

    /// Treat every identifier as this kind instead of detecting it
    /// (cid, cas, inchikey, inchi, smiles, name).
    #[arg(short, long, value_name = "KIND")]
    pub kind: Option<IdentifierKind>,

    /// Write the resolution table to this CSV file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `molecules` subcommand.
#[derive(Args, Debug)]
pub struct MoleculesArgs {
    /// PubChem compound IDs.
    #[arg(value_name = "CID", required_unless_present = "input")]
    pub cids: Vec<Cid>,

    /// Read CIDs from a CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Column of the input file holding the CIDs.
    #[arg(long, value_name = "NAME", default_value = "CID")]
    pub column: String,

    /// Write the molecules table to this CSV file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `standardize` subcommand.
#[derive(Args, Debug)]
pub struct StandardizeArgs {
    /// CSV file with one row per stimulus or molecule.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Column holding the molecule identifiers.
    #[arg(long, required = true, value_name = "NAME")]
    pub column: String,

    /// Index column of the input file. Defaults to the first column.
    #[arg(long, value_name = "NAME")]
    pub index: Option<String>,

    /// Name of the archive to create in the data directory.
    #[arg(short, long, required = true, value_name = "NAME")]
    pub archive: String,

    /// Also write the input table with a CID column appended.
    #[arg(long, value_name = "PATH")]
    pub annotated: Option<PathBuf>,

    /// Overwrite an existing molecules file.
    #[arg(long)]
    pub force: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinHow {
    #[default]
    Inner,
    Left,
}

impl From<JoinHow> for JoinKind {
    fn from(how: JoinHow) -> Self {
        match how {
            JoinHow::Inner => JoinKind::Inner,
            JoinHow::Left => JoinKind::Left,
        }
    }
}

/// Arguments for the `join` subcommand.
#[derive(Args, Debug)]
pub struct JoinArgs {
    /// CSV files to merge, left to right.
    #[arg(value_name = "TABLE", num_args = 2.., required = true)]
    pub tables: Vec<PathBuf>,

    /// Which rows to keep.
    #[arg(long, value_enum, default_value_t = JoinHow::Inner)]
    pub how: JoinHow,

    /// Index column shared by all tables. Defaults to each table's first column.
    #[arg(long, value_name = "NAME")]
    pub index: Option<String>,

    /// Write the merged table to this CSV file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `archive` subcommand.
#[derive(Args, Debug)]
pub struct ArchiveArgs {
    #[command(subcommand)]
    pub command: ArchiveCommands,
}

#[derive(Subcommand, Debug)]
pub enum ArchiveCommands {
    /// List the archives in the data directory.
    List,
    /// Show an archive's source and processed files.
    Show {
        /// Archive name, e.g. 'burton_2022'.
        name: String,
    },
    /// Check an archive against the layout conventions.
    Validate {
        /// Archive name, e.g. 'burton_2022'.
        name: String,
    },
    /// Print the first rows of an archive table.
    Head {
        /// Table path relative to the data directory, e.g. 'burton_2022/molecules.csv'.
        file: String,
        /// Number of rows to print.
        #[arg(short = 'n', long, default_value_t = 5)]
        rows: usize,
        /// Index column(s) to key rows by, comma separated. Defaults to the file's convention.
        #[arg(long, value_name = "NAME", value_delimiter = ',')]
        index: Vec<String>,
    },
}

/// Arguments for the `data` subcommand.
#[derive(Args, Debug)]
pub struct DataArgs {
    #[command(subcommand)]
    pub command: DataCommands,
}

/// Available commands for data management.
#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Show the absolute path to the local data directory.
    Path,
    /// Set a custom absolute path for the local data directory.
    SetPath {
        /// The absolute path to use for storing data.
        path: PathBuf,
    },
    /// Reset the data directory path to the default location.
    ResetPath,
    /// Download one archive file from the remote archive repository.
    Fetch {
        /// File path relative to the repository root, e.g. 'burton_2022/molecules.csv'.
        file: String,
        /// Overwrite the local copy if it already exists.
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::parse_from([
            "odorkit",
            "resolve",
            "d-limonene",
            "98-86-2",
            "-vv",
            "-S",
            "pubchem.batch-size=50",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.set_values, vec!["pubchem.batch-size=50"]);
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.identifiers, vec!["d-limonene", "98-86-2"]);
                assert!(args.kind.is_none());
            }
            other => panic!("Expected 'resolve', got {other:?}"),
        }
    }

    #[test]
    fn typed_arguments_are_parsed() {
        let cli = Cli::parse_from(["odorkit", "resolve", "CCO", "--kind", "smiles"]);
        let Commands::Resolve(args) = cli.command else {
            panic!("Expected 'resolve'");
        };
        assert_eq!(args.kind, Some(IdentifierKind::Smiles));

        let cli = Cli::parse_from(["odorkit", "molecules", "7410", "440917"]);
        let Commands::Molecules(args) = cli.command else {
            panic!("Expected 'molecules'");
        };
        assert_eq!(args.cids.len(), 2);
        assert_eq!(args.column, "CID");

        assert!(Cli::try_parse_from(["odorkit", "molecules", "0"]).is_err());
        assert!(Cli::try_parse_from(["odorkit", "resolve", "x", "--kind", "formula"]).is_err());
    }

    #[test]
    fn join_requires_two_tables() {
        assert!(Cli::try_parse_from(["odorkit", "join", "a.csv"]).is_err());
        let cli = Cli::parse_from(["odorkit", "join", "a.csv", "b.csv", "--how", "left"]);
        let Commands::Join(args) = cli.command else {
            panic!("Expected 'join'");
        };
        assert_eq!(JoinKind::from(args.how), JoinKind::Left);
    }

    #[test]
    fn resolve_input_requires_column() {
        assert!(Cli::try_parse_from(["odorkit", "resolve", "--input", "ids.csv"]).is_err());
        assert!(
            Cli::try_parse_from(["odorkit", "resolve", "--input", "ids.csv", "--column", "name"])
                .is_ok()
        );
        assert!(Cli::try_parse_from(["odorkit", "resolve"]).is_err());
    }

    #[test]
    fn archive_head_splits_index_columns() {
        let cli = Cli::parse_from([
            "odorkit",
            "archive",
            "head",
            "burton_2022/behavior_1.csv",
            "--index",
            "Stimulus,Subject",
        ]);
        let Commands::Archive(ArchiveArgs {
            command: ArchiveCommands::Head { file, rows, index },
        }) = cli.command
        else {
            panic!("Expected 'archive head'");
        };
        assert_eq!(file, "burton_2022/behavior_1.csv");
        assert_eq!(rows, 5);
        assert_eq!(index, vec!["Stimulus", "Subject"]);
    }
}
