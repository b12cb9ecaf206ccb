// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A decoded survey sheet: unique column names and rows of optional cells.
///
/// Tables are built with [`crate::builder::TableBuilder`], which takes care of
/// making column names unique while keeping the original header text around
/// as the column label.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawTable {
    pub(crate) columns: Vec<String>,
    pub(crate) labels: Vec<String>,
    pub(crate) rows: Vec<(usize, Vec<Option<String>>)>,
}

impl RawTable {
    /// The unique column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The header text as written in the file. Unlike the column names, labels
    /// may repeat (every course block usually has its own `Comments` column).
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows.iter().map(move |(lineno, cells)| RawRow {
            lineno: *lineno,
            table: self,
            cells,
        })
    }
}

/// A borrowed view over one row of a [`RawTable`].
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    lineno: usize,
    table: &'a RawTable,
    cells: &'a [Option<String>],
}

impl<'a> RawRow<'a> {
    /// The line of this row in the original file (1-based).
    pub fn lineno(&self) -> usize {
        self.lineno
    }

    /// The trimmed content of a cell. Empty and blank cells are absent.
    pub fn get(&self, idx: usize) -> Option<&'a str> {
        self.cells
            .get(idx)
            .and_then(|c| c.as_deref())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&'a str> {
        self.table.column_index(name).and_then(|idx| self.get(idx))
    }
}

/// Where the student identity lives in the sheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyLayout {
    pub student_name_column: String,
    pub student_id_column: String,
    /// A standalone section column. Sections embedded in the faculty name
    /// take precedence over it.
    pub section_column: Option<String>,
}

impl Default for SurveyLayout {
    fn default() -> SurveyLayout {
        SurveyLayout {
            student_name_column: "Name of the Student".to_string(),
            student_id_column: "SRN".to_string(),
            section_column: Some("Section".to_string()),
        }
    }
}

// ********* Column structure ***********

/// The columns following one `Feedback on ...` marker, up to the next marker.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CourseBlock {
    pub course_label: String,
    /// Position of the marker column itself. It is not part of the block.
    pub marker_index: usize,
    pub column_indices: Vec<usize>,
}

/// The part of a course block that evaluates one faculty member.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FacultySubBlock {
    pub faculty_column_index: usize,
    pub member_column_indices: Vec<usize>,
}

/// A course block with its faculty sub-blocks resolved.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BlockLayout {
    pub block: CourseBlock,
    /// Empty when the block has no faculty-identifying column.
    pub sub_blocks: Vec<FacultySubBlock>,
    /// Course-level questions, evaluated once per block.
    pub course_feedback_columns: Vec<usize>,
}

/// A section code and a faculty name, as found in a free-text cell.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Identity {
    pub section: Option<String>,
    pub name: String,
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct RatingRecord {
    pub student_name: String,
    pub student_id: String,
    pub section: Option<String>,
    pub faculty_name: String,
    pub course: String,
    pub rating_category: String,
    pub rating: f64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CommentRecord {
    pub student_name: String,
    pub student_id: String,
    pub faculty_name: String,
    pub course: String,
    pub comment: String,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CourseFeedbackRecord {
    pub student_name: String,
    pub student_id: String,
    pub course: String,
    pub question: String,
    pub rating: f64,
}

/// Everything extracted from one table.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct TransformOutput {
    pub ratings: Vec<RatingRecord>,
    pub comments: Vec<CommentRecord>,
    pub course_feedback: Vec<CourseFeedbackRecord>,
}

impl TransformOutput {
    /// Appends the records of another output, keeping the order.
    pub fn extend(&mut self, other: TransformOutput) {
        self.ratings.extend(other.ratings);
        self.comments.extend(other.comments);
        self.course_feedback.extend(other.course_feedback);
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct AggregateRow {
    pub faculty_name: String,
    /// Only filled when aggregating by section.
    pub section: Option<String>,
    pub rating_category: String,
    pub mean_rating: f64,
}

/// The grouping keys used by the aggregator.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Grouping {
    /// (faculty, category)
    Faculty,
    /// (section, faculty, category)
    SectionAndFaculty,
}

/// A summary of the ratings received by one faculty member.
#[derive(PartialEq, Debug, Clone)]
pub struct FacultyReport {
    pub faculty_name: String,
    pub courses: Vec<String>,
    pub course_codes: Vec<String>,
    /// Mean rating per category, rounded to 4 decimals.
    pub categories: Vec<(String, f64)>,
    pub total_average: f64,
}

// ********* Errors ***********

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FeedbackError {
    /// The header row has no usable cell.
    EmptyHeader,
    /// A row has non-blank cells past the end of the header.
    RowTooLong {
        lineno: usize,
        width: usize,
        found: usize,
    },
    /// No column starts with the course marker.
    NoCourseBlock,
    /// None of the course blocks names a faculty member.
    NoFacultyColumn,
    /// None of the course blocks holds a rating question.
    NoRatingColumn,
    /// A student identity column is missing from the header.
    MissingIdentityColumn { column: String },
}

impl Error for FeedbackError {}

impl Display for FeedbackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackError::EmptyHeader => write!(f, "the header row is empty"),
            FeedbackError::RowTooLong {
                lineno,
                width,
                found,
            } => write!(
                f,
                "line {}: found {} cells but the header only has {} columns",
                lineno, found, width
            ),
            FeedbackError::NoCourseBlock => write!(
                f,
                "no course found: no column starts with '{}'",
                crate::blocks::COURSE_MARKER_PREFIX
            ),
            FeedbackError::NoFacultyColumn => {
                write!(f, "no faculty name column found in any course block")
            }
            FeedbackError::NoRatingColumn => {
                write!(f, "no rating column found in any course block")
            }
            FeedbackError::MissingIdentityColumn { column } => {
                write!(f, "missing student column '{}'", column)
            }
        }
    }
}
