// Primitives for reading CSV files.

use course_feedback::builder::TableBuilder;

use crate::reshape::{io_common::cell_text, *};

type Records<'a> = csv::StringRecordsIntoIter<&'a [u8]>;

pub fn read_csv_table(path: &str, cfs: &FileSource) -> ReshapeResult<RawTable> {
    let header_row = cfs.header_row_index()?;
    let contents = fs::read(path).context(ReadingSnafu { path })?;
    let mut records = get_records(&contents);
    let mut lines = LineCounter::new(&contents);

    // The index starts at 1 to respect most conventions in the excel world.
    // It is a line of the file: the csv reader skips blank lines, so the lines
    // are counted separately.
    let header = loop {
        let record = next_record(&mut records, &mut lines, path)?
            .context(MissingHeaderSnafu { path, header_row })?;
        let lineno = lines.line_of(&record);
        if lineno == header_row {
            break record;
        }
        if lineno > header_row {
            debug!(
                "read_csv_table: line {} is blank, next record on line {}",
                header_row, lineno
            );
            return MissingHeaderSnafu { path, header_row }.fail();
        }
    };
    let header_cells: Vec<Option<String>> = header
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            // Excel adds a byte order mark to its CSV exports.
            let s = if idx == 0 { s.trim_start_matches('\u{feff}') } else { s };
            cell_text(s)
        })
        .collect();
    debug!("read_csv_table: header: {:?}", header_cells);

    let mut builder = TableBuilder::new(&header_cells).context(TransformSnafu { path })?;
    while let Some(line) = next_record(&mut records, &mut lines, path)? {
        let lineno = lines.line_of(&line);
        let cells: Vec<Option<String>> = line.iter().map(cell_text).collect();
        builder
            .add_row_at(lineno, &cells)
            .context(TransformSnafu { path })?;
    }
    Ok(builder.build())
}

fn get_records(contents: &[u8]) -> Records<'_> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(contents)
        .into_records()
}

fn next_record(
    records: &mut Records,
    lines: &mut LineCounter,
    path: &str,
) -> ReshapeResult<Option<csv::StringRecord>> {
    match records.next() {
        None => Ok(None),
        Some(Ok(record)) => Ok(Some(record)),
        Some(Err(e)) => {
            let lineno = match e.position() {
                Some(p) => lines.line_at(p.byte()),
                None => lines.line,
            };
            Err(e).context(CsvLineParseSnafu { path, lineno })
        }
    }
}

// Maps the byte offsets reported by the csv reader to 1-based line numbers.
// Offsets only move forward.
struct LineCounter<'a> {
    text: &'a [u8],
    byte: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(text: &'a [u8]) -> LineCounter<'a> {
        LineCounter {
            text,
            byte: 0,
            line: 1,
        }
    }

    /// The line of the first content at or after the offset, past any blank lines.
    fn line_at(&mut self, byte: u64) -> usize {
        let mut start = (byte as usize).min(self.text.len());
        if start < self.byte {
            return self.line;
        }
        while start < self.text.len() && matches!(self.text[start], b'\n' | b'\r') {
            start += 1;
        }
        self.line += self.text[self.byte..start]
            .iter()
            .filter(|b| **b == b'\n')
            .count();
        self.byte = start;
        self.line
    }

    fn line_of(&mut self, record: &csv::StringRecord) -> usize {
        match record.position() {
            Some(p) => self.line_at(p.byte()),
            None => self.line,
        }
    }
}
