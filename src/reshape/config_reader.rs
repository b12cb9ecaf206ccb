use crate::reshape::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "groupBySection")]
    pub group_by_section: Option<bool>,
}

/// The kinds of files that can be read.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Excel,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "headerRowIndex")]
    _header_row_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    pub fn new(
        file_path: &str,
        provider: Option<String>,
        header_row_index: Option<usize>,
        excel_worksheet_name: Option<String>,
    ) -> FileSource {
        FileSource {
            provider,
            file_path: file_path.to_string(),
            _header_row_index: header_row_index.map(JSValue::from),
            excel_worksheet_name,
        }
    }

    /// The row of the column names, starting at 1. Defaults to the first row.
    pub fn header_row_index(&self) -> ReshapeResult<usize> {
        match read_js_int(&self._header_row_index, "headerRowIndex")? {
            Some(0) => whatever!("headerRowIndex starts at 1 (first row of the file)"),
            Some(x) => Ok(x),
            None => Ok(1),
        }
    }

    /// The provider, as configured or guessed from the file extension.
    pub fn provider(&self) -> ReshapeResult<Provider> {
        match self.provider.as_deref() {
            Some("csv") => Ok(Provider::Csv),
            Some("excel") | Some("xlsx") => Ok(Provider::Excel),
            Some(x) => UnknownProviderSnafu {
                provider: x,
                path: self.file_path.clone(),
            }
            .fail(),
            None => {
                let extension = Path::new(self.file_path.as_str())
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_lowercase());
                match extension.as_deref() {
                    Some("csv") | Some("txt") => Ok(Provider::Csv),
                    Some("xlsx") | Some("xlsm") => Ok(Provider::Excel),
                    x => UnknownProviderSnafu {
                        provider: x.unwrap_or(""),
                        path: self.file_path.clone(),
                    }
                    .fail(),
                }
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ColumnSettings {
    #[serde(rename = "studentNameColumn")]
    pub student_name_column: Option<String>,
    #[serde(rename = "studentIdColumn")]
    pub student_id_column: Option<String>,
    /// An empty name disables the section column.
    #[serde(rename = "sectionColumn")]
    pub section_column: Option<String>,
}

impl ColumnSettings {
    pub fn layout(&self) -> SurveyLayout {
        let default = SurveyLayout::default();
        SurveyLayout {
            student_name_column: self
                .student_name_column
                .clone()
                .unwrap_or(default.student_name_column),
            student_id_column: self
                .student_id_column
                .clone()
                .unwrap_or(default.student_id_column),
            section_column: match self.section_column.as_deref() {
                Some("") => None,
                Some(s) => Some(s.to_string()),
                None => default.section_column,
            },
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReshapeConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "inputSources", default)]
    pub input_sources: Vec<FileSource>,
    pub columns: Option<ColumnSettings>,
    #[serde(rename = "courseCodes")]
    pub course_codes: Option<String>,
}

pub fn read_config(path: &str) -> ReshapeResult<ReshapeConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> ReshapeResult<ReshapeConfig> {
    let config: ReshapeConfig = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    debug!("parse_config: {:?}", config);
    Ok(config)
}

// Accepts both numbers and strings holding numbers.
fn read_js_int(x: &Option<JSValue>, field: &str) -> ReshapeResult<Option<usize>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| Some(x as usize))
            .context(ParsingJsonNumberSnafu { field }),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .map(Some)
            .context(ParsingJsonNumberSnafu { field }),
        _ => None.context(ParsingJsonNumberSnafu { field }),
    }
}
