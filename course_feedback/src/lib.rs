mod config;
use log::{debug, info};

use std::collections::HashMap;

pub use crate::config::*;

pub mod aggregate;
pub mod blocks;
pub mod builder;
pub mod identity;
pub mod manual;

pub use crate::aggregate::{aggregate_ratings, faculty_reports};
pub use crate::blocks::plan_blocks;

use crate::blocks::{column_role, ColumnRole};
use crate::identity::{collapse_whitespace, extract_identity, normalize_faculty_name, rating_category};

// The student identity of a row, once checked.
struct Student<'a> {
    name: &'a str,
    id: &'a str,
    section: Option<&'a str>,
}

/// Reshapes a wide survey table into rating, comment and course feedback records.
///
/// Arguments:
/// * `table` the decoded survey sheet
/// * `layout` where the student name, id and section columns are
///
/// Fails only when the table has no processable structure (no course, no faculty
/// column, no rating column, or a missing student column). Incomplete rows and
/// cells are skipped.
pub fn transform(table: &RawTable, layout: &SurveyLayout) -> Result<TransformOutput, FeedbackError> {
    let plan = plan_blocks(table)?;
    let name_idx = required_column(table, &layout.student_name_column)?;
    let id_idx = required_column(table, &layout.student_id_column)?;
    let section_idx = layout
        .section_column
        .as_ref()
        .and_then(|c| table.column_index(c));
    if section_idx.is_none() {
        debug!("transform: no section column {:?}", layout.section_column);
    }
    Ok(transform_rows(table, &plan, name_idx, id_idx, section_idx))
}

/// Runs the row transformation over an already resolved block plan.
pub fn transform_rows(
    table: &RawTable,
    plan: &[BlockLayout],
    name_idx: usize,
    id_idx: usize,
    section_idx: Option<usize>,
) -> TransformOutput {
    let labels = table.labels();
    // The category of every rating question, computed once per table.
    let categories: HashMap<usize, String> = plan
        .iter()
        .flat_map(|bl| bl.block.column_indices.iter())
        .filter(|idx| column_role(&labels[**idx]) == ColumnRole::RatingQuestion)
        .map(|idx| (*idx, rating_category(&labels[*idx])))
        .collect();

    let mut res = TransformOutput::default();
    let mut skipped_rows = 0;
    for row in table.rows() {
        let student = match (row.get(name_idx), row.get(id_idx)) {
            (Some(name), Some(id)) => Student {
                name,
                id,
                section: section_idx.and_then(|idx| row.get(idx)),
            },
            _ => {
                debug!("transform: line {}: missing student name or id, skipping", row.lineno());
                skipped_rows += 1;
                continue;
            }
        };

        for bl in plan.iter() {
            let course = bl.block.course_label.as_str();
            for sub in bl.sub_blocks.iter() {
                transform_sub_block(&row, &student, course, sub, labels, &categories, &mut res);
            }
            for col in bl.course_feedback_columns.iter() {
                if let Some(rating) = row.get(*col).and_then(parse_rating) {
                    res.course_feedback.push(CourseFeedbackRecord {
                        student_name: student.name.to_string(),
                        student_id: student.id.to_string(),
                        course: course.to_string(),
                        question: collapse_whitespace(&labels[*col]),
                        rating,
                    });
                }
            }
        }
    }

    info!(
        "transform: {} rows ({} skipped): {} ratings, {} comments, {} course feedback ratings",
        table.num_rows(),
        skipped_rows,
        res.ratings.len(),
        res.comments.len(),
        res.course_feedback.len()
    );
    res
}

fn transform_sub_block(
    row: &RawRow,
    student: &Student,
    course: &str,
    sub: &FacultySubBlock,
    labels: &[String],
    categories: &HashMap<usize, String>,
    res: &mut TransformOutput,
) {
    let faculty_text = match row.get(sub.faculty_column_index) {
        Some(s) => s,
        None => {
            debug!(
                "transform: line {}: course {:?}: empty faculty cell in column {}",
                row.lineno(),
                course,
                sub.faculty_column_index
            );
            return;
        }
    };
    let identity = extract_identity(faculty_text);
    let faculty_name = normalize_faculty_name(&identity.name);
    // The section written next to the faculty name wins over the section column.
    let section: Option<String> = identity
        .section
        .or_else(|| student.section.map(|s| s.to_string()));

    for col in sub.member_column_indices.iter() {
        match column_role(&labels[*col]) {
            ColumnRole::RatingQuestion => {
                let cell = row.get(*col);
                match cell.and_then(parse_rating) {
                    Some(rating) => res.ratings.push(RatingRecord {
                        student_name: student.name.to_string(),
                        student_id: student.id.to_string(),
                        section: section.clone(),
                        faculty_name: faculty_name.clone(),
                        course: course.to_string(),
                        rating_category: categories
                            .get(col)
                            .cloned()
                            .unwrap_or_else(|| rating_category(&labels[*col])),
                        rating,
                    }),
                    None if cell.is_some() => {
                        debug!(
                            "transform: line {}: column {}: not a rating: {:?}",
                            row.lineno(),
                            col,
                            cell
                        );
                    }
                    None => {}
                }
            }
            ColumnRole::Comment => {
                if let Some(comment) = row.get(*col) {
                    res.comments.push(CommentRecord {
                        student_name: student.name.to_string(),
                        student_id: student.id.to_string(),
                        faculty_name: faculty_name.clone(),
                        course: course.to_string(),
                        comment: comment.to_string(),
                    });
                }
            }
            // Course feedback is read once per course block, not per faculty.
            _ => {}
        }
    }
}

/// Reads a rating. Only finite numbers are accepted.
pub fn parse_rating(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}

fn required_column(table: &RawTable, name: &str) -> Result<usize, FeedbackError> {
    table
        .column_index(name)
        .ok_or_else(|| FeedbackError::MissingIdentityColumn {
            column: name.to_string(),
        })
}
