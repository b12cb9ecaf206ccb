use clap::Parser;

/// Reshapes wide course feedback surveys into long-format rating tables.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file describing the inputs and outputs.
    /// The other options override what is set in this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The survey export to process (CSV or Excel). Setting this option overrides
    /// the input sources of the configuration file.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or excel) The type of the input. If not provided, it is guessed from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default 1) The row that holds the column names. The rows above it are skipped.
    #[clap(long, value_parser)]
    pub header_row: Option<usize>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (directory path, default '.') Where the output tables are written.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, optional) A CSV or Excel file with the 'Course' and 'Course Code' columns,
    /// used in the faculty report.
    #[clap(long, value_parser)]
    pub course_codes: Option<String>,

    /// If passed as an argument, the average ratings are also grouped by section.
    #[clap(long, takes_value = false)]
    pub by_section: bool,

    /// (file path) A reference file containing the expected average ratings in CSV format.
    /// If provided, fbreshape will check that the computed averages match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
