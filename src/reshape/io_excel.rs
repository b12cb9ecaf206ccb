use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use course_feedback::builder::TableBuilder;

use crate::reshape::{io_common::cell_text, *};

pub fn read_excel_table(path: &str, cfs: &FileSource) -> ReshapeResult<RawTable> {
    let wrange = get_range(path, cfs)?;
    let header_row = cfs.header_row_index()?;

    // The range starts at the first non-empty cell, which is not always A1.
    let first_row = wrange.start().map(|(r, _)| r as usize).unwrap_or(0);
    let skip = (header_row - 1).saturating_sub(first_row);
    debug!(
        "read_excel_table: path: {:?} first_row: {:?} skip: {:?}",
        path, first_row, skip
    );

    let mut iter = wrange.rows().skip(skip);
    let header = iter
        .next()
        .context(MissingHeaderSnafu { path, header_row })?;
    let header_cells: Vec<Option<String>> = header.iter().map(cell_to_text).collect();
    debug!("read_excel_table: header: {:?}", header_cells);

    let header_line = first_row + skip + 1;
    let mut builder = TableBuilder::new(&header_cells)
        .context(TransformSnafu { path })?
        .first_data_line(header_line + 1);
    for row in iter {
        let cells: Vec<Option<String>> = row.iter().map(cell_to_text).collect();
        builder.add_row(&cells).context(TransformSnafu { path })?;
    }
    Ok(builder.build())
}

/// The text of a cell. Whole numbers are written without decimals.
pub fn cell_to_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => cell_text(s),
        DataType::Float(f) => Some(f.to_string()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Bool(b) => Some(b.to_string()),
        DataType::DateTime(f) => Some(f.to_string()),
        DataType::Empty => None,
        DataType::Error(e) => {
            warn!("cell_to_text: error cell {:?}, treated as empty", e);
            None
        }
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn get_range(path: &str, cfs: &FileSource) -> ReshapeResult<Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name.clone(),
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let sheet_names = workbook.sheet_names().to_owned();
        if sheet_names.len() > 1 {
            warn!(
                "get_range: {} has {} worksheets, using the first one {:?}. Set the worksheet name to pick another one.",
                path,
                sheet_names.len(),
                sheet_names.first()
            );
        }
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}
