use clap::{Parser, Subcommand};

/// This is a pairwise name-voting tabulation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, global = true, takes_value = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Creates a new list file from a file of candidate names.
    Import {
        /// (file path) The file containing the candidate names.
        #[clap(short, long, value_parser)]
        input: String,

        /// (default txt) The type of the input: txt, csv or xlsx. See documentation for the formats.
        #[clap(long, value_parser)]
        input_type: Option<String>,

        /// When using an Excel file, indicates the name of the worksheet to use (default: first worksheet).
        #[clap(long, value_parser)]
        excel_worksheet_name: Option<String>,

        /// (file path) Where the list file will be written.
        #[clap(short, long, value_parser)]
        data: String,

        /// The title of the list.
        #[clap(short, long, value_parser)]
        title: String,

        /// An optional description of the list.
        #[clap(long, value_parser)]
        description: Option<String>,

        /// The family name, used by the --full-names display option.
        #[clap(long, value_parser)]
        last_name: Option<String>,
    },

    /// Picks the next pair of names to compare.
    Next {
        /// (file path) The list file.
        #[clap(short, long, value_parser)]
        data: String,

        /// Seed for the pair draw. If not provided, the seed is taken from the clock.
        #[clap(short, long, value_parser)]
        seed: Option<u64>,

        /// If passed as an argument, names are printed with the list's last name appended.
        #[clap(long, takes_value = false)]
        full_names: bool,
    },

    /// Appends one comparison outcome to the list file.
    Record {
        /// (file path) The list file.
        #[clap(short, long, value_parser)]
        data: String,

        /// The name shown on the A side.
        #[clap(long, value_parser)]
        name_a: String,

        /// The name shown on the B side.
        #[clap(long, value_parser)]
        name_b: String,

        /// The outcome: a, b, both or skip.
        #[clap(short, long, value_parser)]
        chosen: String,

        /// An optional preset reason label (must match one of the list's feedback options).
        #[clap(long, value_parser)]
        reason: Option<String>,

        /// An optional free-text reason.
        #[clap(long, value_parser)]
        note: Option<String>,

        /// The acting user, recorded with the comparison.
        #[clap(long, value_parser)]
        voter: Option<String>,
    },

    /// Tabulates the comparison log into a leaderboard.
    Rank {
        /// (file path) The list file.
        #[clap(short, long, value_parser)]
        data: String,

        /// (file path or empty) If specified, the summary of the ranking will be written in JSON format to the given location.
        #[clap(short, long, value_parser)]
        out: Option<String>,

        /// (file path) A reference file containing a ranking summary in JSON format. If provided, namerank will
        /// check that the tabulated output matches the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },

    /// Prints the aggregated feedback per name.
    Feedback {
        /// (file path) The list file.
        #[clap(short, long, value_parser)]
        data: String,

        /// If specified, only the feedback for this name is printed.
        #[clap(short, long, value_parser)]
        name: Option<String>,
    },
}
