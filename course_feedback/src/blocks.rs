//! Column classification and block partitioning.
//!
//! All the assumptions about how survey headers are worded live in the
//! classifier predicates at the top of this module.

use log::{debug, warn};

use crate::config::*;
use crate::identity::collapse_whitespace;

pub const COURSE_MARKER_PREFIX: &str = "Feedback on ";

const FACULTY_PHRASES: [&str; 3] = ["name of the faculty", "faculty name", "name of faculty"];
const RATING_QUESTION_PHRASE: &str = "Please give a rating";
const COMMENT_LABEL: &str = "Comments";
const COURSE_FEEDBACK_PHRASE: &str = "The course";

// **** Classifiers ****

pub fn is_course_marker(label: &str) -> bool {
    label.starts_with(COURSE_MARKER_PREFIX)
}

pub fn is_faculty_column(label: &str) -> bool {
    let l = label.to_lowercase();
    FACULTY_PHRASES.iter().any(|p| l.contains(p))
}

pub fn is_rating_question_column(label: &str) -> bool {
    label.contains(RATING_QUESTION_PHRASE)
}

pub fn is_comment_column(label: &str) -> bool {
    label == COMMENT_LABEL
}

pub fn is_course_feedback_column(label: &str) -> bool {
    label.contains(COURSE_FEEDBACK_PHRASE)
}

/// The role of a column inside a course block. Each column gets at most one.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColumnRole {
    Faculty,
    RatingQuestion,
    Comment,
    CourseFeedback,
    Other,
}

pub fn column_role(label: &str) -> ColumnRole {
    if is_faculty_column(label) {
        ColumnRole::Faculty
    } else if is_rating_question_column(label) {
        ColumnRole::RatingQuestion
    } else if is_comment_column(label) {
        ColumnRole::Comment
    } else if is_course_feedback_column(label) {
        ColumnRole::CourseFeedback
    } else {
        ColumnRole::Other
    }
}

/// `Feedback on Math` -> `Math`
pub fn course_label(marker: &str) -> String {
    let s = marker.strip_prefix(COURSE_MARKER_PREFIX).unwrap_or(marker);
    collapse_whitespace(s)
}

// **** Blocks ****

/// Splits the header into course blocks.
///
/// A block starts after each marker column and runs until the next marker or the
/// end of the header. Columns before the first marker belong to no block. A marker
/// directly followed by another marker still produces an (empty) block.
pub fn identify_course_blocks(labels: &[String]) -> Vec<CourseBlock> {
    let mut blocks: Vec<CourseBlock> = Vec::new();
    for (idx, label) in labels.iter().enumerate() {
        if is_course_marker(label) {
            blocks.push(CourseBlock {
                course_label: course_label(label),
                marker_index: idx,
                column_indices: Vec::new(),
            });
        } else if let Some(current) = blocks.last_mut() {
            current.column_indices.push(idx);
        }
    }
    debug!(
        "identify_course_blocks: {} blocks: {:?}",
        blocks.len(),
        blocks
            .iter()
            .map(|b| (b.course_label.as_str(), b.column_indices.len()))
            .collect::<Vec<_>>()
    );
    blocks
}

/// Partitions a course block between its faculty-identifying columns.
///
/// Every faculty column opens its own sub-block, which runs until the next faculty
/// column. The columns that precede the first faculty column go to the first
/// sub-block, so that the sub-blocks cover the whole block. A block without faculty
/// column has no sub-block.
pub fn resolve_faculty_sub_blocks(labels: &[String], block: &CourseBlock) -> Vec<FacultySubBlock> {
    let mut faculty_cols: Vec<usize> = block
        .column_indices
        .iter()
        .cloned()
        .filter(|idx| labels.get(*idx).map(|l| is_faculty_column(l)).unwrap_or(false))
        .collect();
    faculty_cols.sort_unstable();

    let mut res: Vec<FacultySubBlock> = Vec::with_capacity(faculty_cols.len());
    for (i, faculty_idx) in faculty_cols.iter().enumerate() {
        let lower = if i == 0 { usize::MIN } else { *faculty_idx };
        let upper = faculty_cols.get(i + 1).cloned().unwrap_or(usize::MAX);
        let members: Vec<usize> = block
            .column_indices
            .iter()
            .cloned()
            .filter(|idx| *idx >= lower && *idx < upper)
            .collect();
        res.push(FacultySubBlock {
            faculty_column_index: *faculty_idx,
            member_column_indices: members,
        });
    }
    res
}

/// Resolves the block structure of a table and checks that it can be processed.
pub fn plan_blocks(table: &RawTable) -> Result<Vec<BlockLayout>, FeedbackError> {
    let labels = table.labels();
    let blocks = identify_course_blocks(labels);
    if blocks.is_empty() {
        return Err(FeedbackError::NoCourseBlock);
    }

    let mut res: Vec<BlockLayout> = Vec::with_capacity(blocks.len());
    for block in blocks {
        let sub_blocks = resolve_faculty_sub_blocks(labels, &block);
        if sub_blocks.is_empty() {
            warn!(
                "plan_blocks: course {:?} (column {}) has no faculty name column, only course feedback is read",
                block.course_label, block.marker_index
            );
        }
        let course_feedback_columns: Vec<usize> = block
            .column_indices
            .iter()
            .cloned()
            .filter(|idx| column_role(&labels[*idx]) == ColumnRole::CourseFeedback)
            .collect();
        debug!(
            "plan_blocks: course {:?}: {} faculty sub-blocks, {} course feedback columns",
            block.course_label,
            sub_blocks.len(),
            course_feedback_columns.len()
        );
        res.push(BlockLayout {
            block,
            sub_blocks,
            course_feedback_columns,
        });
    }

    if res.iter().all(|bl| bl.sub_blocks.is_empty()) {
        return Err(FeedbackError::NoFacultyColumn);
    }
    let has_rating = res.iter().any(|bl| {
        bl.block
            .column_indices
            .iter()
            .any(|idx| column_role(&labels[*idx]) == ColumnRole::RatingQuestion)
    });
    if !has_rating {
        return Err(FeedbackError::NoRatingColumn);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TableBuilder;
    use std::collections::HashSet;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn classifiers() {
        assert!(is_faculty_column("Name of the Faculty"));
        assert!(is_faculty_column("FACULTY NAME (as on the timetable)"));
        assert!(is_faculty_column("Enter name of faculty"));
        assert!(!is_faculty_column("Faculty"));
        assert!(is_rating_question_column("Please give a rating (Clarity)"));
        assert!(!is_rating_question_column("please give a rating (Clarity)"));
        assert!(is_comment_column("Comments"));
        assert!(!is_comment_column("Comments on the faculty"));
        assert!(is_course_feedback_column("The course was well structured"));
        assert_eq!(
            column_role("Please give a rating: The course pace"),
            ColumnRole::RatingQuestion
        );
        assert_eq!(column_role("Timestamp"), ColumnRole::Other);
    }

    #[test]
    fn course_labels() {
        assert_eq!(course_label("Feedback on Math"), "Math");
        assert_eq!(course_label("Feedback on  Data   Structures "), "Data Structures");
    }

    #[test]
    fn blocks_follow_markers() {
        let l = labels(&[
            "Timestamp",
            "SRN",
            "Feedback on Math",
            "Name of the Faculty",
            "Please give a rating (Clarity)",
            "Feedback on Physics",
            "Feedback on Chemistry",
            "Name of the Faculty",
            "Comments",
        ]);
        let blocks = identify_course_blocks(&l);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].course_label, "Math");
        assert_eq!(blocks[0].marker_index, 2);
        assert_eq!(blocks[0].column_indices, vec![3, 4]);
        assert_eq!(blocks[1].course_label, "Physics");
        assert!(blocks[1].column_indices.is_empty());
        assert_eq!(blocks[2].column_indices, vec![7, 8]);

        // Disjoint, and covering every non-marker column after the first marker.
        let all: Vec<usize> = blocks
            .iter()
            .flat_map(|b| b.column_indices.iter().cloned())
            .collect();
        let unique: HashSet<usize> = all.iter().cloned().collect();
        assert_eq!(all.len(), unique.len());
        let expected: HashSet<usize> = (2..l.len()).filter(|i| !is_course_marker(&l[*i])).collect();
        assert_eq!(unique, expected);
    }

    #[test]
    fn no_marker_no_block() {
        let l = labels(&["Name of the Student", "SRN", "Name of the Faculty"]);
        assert!(identify_course_blocks(&l).is_empty());
    }

    #[test]
    fn single_faculty_covers_block() {
        let l = labels(&[
            "Feedback on Math",
            "The course was useful",
            "Name of the Faculty",
            "Please give a rating (Clarity)",
        ]);
        let blocks = identify_course_blocks(&l);
        let subs = resolve_faculty_sub_blocks(&l, &blocks[0]);
        assert_eq!(
            subs,
            vec![FacultySubBlock {
                faculty_column_index: 2,
                member_column_indices: vec![1, 2, 3],
            }]
        );
    }

    #[test]
    fn sub_blocks_partition_block() {
        let l = labels(&[
            "Feedback on Math",
            "The course was useful",
            "Name of the Faculty",
            "Please give a rating (Clarity)",
            "Comments",
            "Faculty name",
            "Please give a rating (Clarity)",
            "Please give a rating (Pace)",
            "Name of faculty",
            "Comments",
        ]);
        let blocks = identify_course_blocks(&l);
        let subs = resolve_faculty_sub_blocks(&l, &blocks[0]);
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[0].faculty_column_index, 2);
        assert_eq!(subs[0].member_column_indices, vec![1, 2, 3, 4]);
        // A faculty column opens its own sub-block.
        assert_eq!(subs[1].member_column_indices, vec![5, 6, 7]);
        assert_eq!(subs[2].member_column_indices, vec![8, 9]);

        let mut union: Vec<usize> = subs
            .iter()
            .flat_map(|s| s.member_column_indices.iter().cloned())
            .collect();
        union.sort_unstable();
        assert_eq!(union, blocks[0].column_indices);
    }

    #[test]
    fn plan_structural_errors() {
        let t = TableBuilder::new_simple(&["Name of the Student", "SRN"])
            .unwrap()
            .build();
        assert_eq!(plan_blocks(&t).err(), Some(FeedbackError::NoCourseBlock));

        let t = TableBuilder::new_simple(&[
            "Name of the Student",
            "SRN",
            "Feedback on Math",
            "Please give a rating (Clarity)",
        ])
        .unwrap()
        .build();
        assert_eq!(plan_blocks(&t).err(), Some(FeedbackError::NoFacultyColumn));

        let t = TableBuilder::new_simple(&[
            "Name of the Student",
            "SRN",
            "Feedback on Math",
            "Name of the Faculty",
            "Comments",
        ])
        .unwrap()
        .build();
        assert_eq!(plan_blocks(&t).err(), Some(FeedbackError::NoRatingColumn));
    }

    #[test]
    fn plan_keeps_blocks_without_faculty() {
        let t = TableBuilder::new_simple(&[
            "Feedback on Math",
            "Name of the Faculty",
            "Please give a rating (Clarity)",
            "Feedback on Lab",
            "The course had enough lab hours",
        ])
        .unwrap()
        .build();
        let plan = plan_blocks(&t).unwrap();
        assert_eq!(plan.len(), 2);
        assert!(plan[1].sub_blocks.is_empty());
        assert_eq!(plan[1].course_feedback_columns, vec![4]);
    }
}
