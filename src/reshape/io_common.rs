use crate::reshape::{
    io_csv::read_csv_table,
    io_excel::read_excel_table,
    *,
};

const COURSE_COLUMN: &str = "Course";
const COURSE_CODE_COLUMN: &str = "Course Code";

/// Reads a survey file into a table, with the reader matching its provider.
pub fn read_table(cfs: &FileSource) -> ReshapeResult<RawTable> {
    let table = match cfs.provider()? {
        Provider::Csv => read_csv_table(&cfs.file_path, cfs),
        Provider::Excel => read_excel_table(&cfs.file_path, cfs),
    }?;
    info!(
        "read_table: {}: {} columns, {} rows",
        cfs.file_path,
        table.columns().len(),
        table.num_rows()
    );
    Ok(table)
}

/// Some content, if the text is not blank.
pub fn cell_text(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Reads the mapping from course names to course codes.
///
/// Course names may be written with or without the `Feedback on ` prefix of the
/// survey columns.
pub fn read_course_codes(path: &str) -> ReshapeResult<HashMap<String, String>> {
    let cfs = FileSource::new(path, None, None, None);
    let table = read_table(&cfs)?;
    let course_idx = table
        .column_index(COURSE_COLUMN)
        .context(MissingColumnSnafu {
            column: COURSE_COLUMN,
            path,
        })?;
    let code_idx = table
        .column_index(COURSE_CODE_COLUMN)
        .context(MissingColumnSnafu {
            column: COURSE_CODE_COLUMN,
            path,
        })?;

    let mut res: HashMap<String, String> = HashMap::new();
    for row in table.rows() {
        match (row.get(course_idx), row.get(code_idx)) {
            (Some(course), Some(code)) => {
                res.insert(blocks::course_label(course), code.to_string());
            }
            _ => {
                debug!("read_course_codes: line {}: incomplete, skipping", row.lineno());
            }
        }
    }
    debug!("read_course_codes: {:?}", res);
    Ok(res)
}
