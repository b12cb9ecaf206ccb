use log::{debug, info, warn};

use course_feedback::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::Args;
use crate::reshape::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_output;

#[derive(Debug, Snafu)]
pub enum ReshapeError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error reading row {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error writing {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error writing {path}"))]
    Writing {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading file {path}"))]
    Reading {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration file"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Invalid number for {field} in the configuration"))]
    ParsingJsonNumber { field: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("No header found at row {header_row} of {path}"))]
    MissingHeader { path: String, header_row: usize },
    #[snafu(display("Column {column} not found in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Unknown input type {provider:?} for {path}"))]
    UnknownProvider { provider: String, path: String },
    #[snafu(display("No input: use --input or a configuration file with input sources"))]
    MissingInput {},
    #[snafu(display("Could not process {path}"))]
    Transform {
        source: FeedbackError,
        path: String,
    },
    #[snafu(display("Difference detected between the computed averages and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReshapeResult<T> = Result<T, ReshapeError>;

/// Everything needed for one run, once the configuration file and the command line
/// have been merged.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub sources: Vec<FileSource>,
    pub layout: SurveyLayout,
    pub output_directory: PathBuf,
    pub grouping: Grouping,
    pub course_codes: Option<String>,
}

/// Merges the configuration file (if any) with the command line. The command line wins.
pub fn resolve_settings(args: &Args) -> ReshapeResult<RunSettings> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (config, root)
        }
        None => (ReshapeConfig::default(), PathBuf::new()),
    };
    debug!("resolve_settings: config: {:?} root: {:?}", config, root);

    let resolve = |p: &str| -> String { root.join(p).display().to_string() };

    let sources: Vec<FileSource> = match &args.input {
        Some(input) => vec![FileSource::new(
            input,
            args.input_type.clone(),
            args.header_row,
            args.excel_worksheet_name.clone(),
        )],
        None => config
            .input_sources
            .iter()
            .map(|cfs| {
                let mut cfs = cfs.clone();
                cfs.file_path = resolve(&cfs.file_path);
                cfs
            })
            .collect(),
    };
    if sources.is_empty() {
        return MissingInputSnafu {}.fail();
    }

    let output_directory: PathBuf = match (&args.out, &config.output_settings.output_directory) {
        (Some(out), _) => PathBuf::from(out),
        (None, Some(out)) => root.join(out),
        (None, None) => root.clone(),
    };

    let by_section = args.by_section || config.output_settings.group_by_section.unwrap_or(false);
    let grouping = if by_section {
        Grouping::SectionAndFaculty
    } else {
        Grouping::Faculty
    };

    let course_codes = match (&args.course_codes, &config.course_codes) {
        (Some(p), _) => Some(p.clone()),
        (None, Some(p)) => Some(resolve(p)),
        (None, None) => None,
    };

    Ok(RunSettings {
        sources,
        layout: config.columns.map(|c| c.layout()).unwrap_or_default(),
        output_directory,
        grouping,
        course_codes,
    })
}

/// Reads and reshapes all the sources, in order.
pub fn reshape_sources(sources: &[FileSource], layout: &SurveyLayout) -> ReshapeResult<TransformOutput> {
    let mut output = TransformOutput::default();
    for cfs in sources.iter() {
        info!("Attempting to read survey file {:?}", cfs.file_path);
        let table = io_common::read_table(cfs)?;
        let res = transform(&table, layout).context(TransformSnafu {
            path: cfs.file_path.clone(),
        })?;
        output.extend(res);
    }
    Ok(output)
}

pub fn run_reshape(args: &Args) -> ReshapeResult<()> {
    let settings = resolve_settings(args)?;
    info!("run_reshape: settings: {:?}", settings);

    let output = reshape_sources(&settings.sources, &settings.layout)?;
    let averages = aggregate_ratings(&output.ratings, settings.grouping);

    let course_codes: HashMap<String, String> = match &settings.course_codes {
        Some(p) => io_common::read_course_codes(p)?,
        None => HashMap::new(),
    };
    let reports = faculty_reports(&output.ratings, &course_codes);

    io_output::write_outputs(
        &settings.output_directory,
        &output,
        &averages,
        settings.grouping,
        &reports,
    )?;

    info!(
        "run_reshape: faculty ratings: {}, student comments: {}, course feedback ratings: {}, averages: {}",
        output.ratings.len(),
        output.comments.len(),
        output.course_feedback.len(),
        averages.len()
    );
    println!("Transformation complete!");
    println!("- Faculty ratings: {} records", output.ratings.len());
    println!("- Student comments: {} records", output.comments.len());
    println!(
        "- Course feedback ratings: {} records",
        output.course_feedback.len()
    );

    // The reference averages, if provided for comparison
    if let Some(reference_p) = &args.reference {
        check_reference(reference_p, &averages, settings.grouping)?;
    }
    Ok(())
}

/// Compares the averages with a reference CSV file, ignoring line ending differences.
pub fn check_reference(path: &str, averages: &[AggregateRow], grouping: Grouping) -> ReshapeResult<()> {
    let reference = fs::read_to_string(path).context(ReadingSnafu { path })?;
    let computed = io_output::averages_to_string(averages, grouping)?;
    let reference = normalize_text(&reference);
    let computed = normalize_text(&computed);
    if reference != computed {
        warn!("Found differences with the reference file {}", path);
        print_diff(reference.as_str(), computed.as_str(), "\n");
        return ReferenceMismatchSnafu { path }.fail();
    }
    info!("check_reference: averages match {}", path);
    Ok(())
}

fn normalize_text(s: &str) -> String {
    s.replace("\r\n", "\n").trim_end().to_string()
}
