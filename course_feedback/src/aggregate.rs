use log::debug;
use std::collections::{BTreeMap, HashMap};

use crate::config::*;

type GroupKey = (Option<String>, String, String);

#[derive(Debug, Clone, Copy, Default)]
struct MeanAcc {
    sum: f64,
    count: u64,
}

impl MeanAcc {
    fn add(&mut self, x: f64) {
        self.sum += x;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Averages the ratings per (faculty, category), and optionally per section.
///
/// The rows come out sorted by their key: (faculty, category), or
/// (section, faculty, category) when grouping by section. Records without a
/// section are grouped together and sort first.
pub fn aggregate_ratings(records: &[RatingRecord], grouping: Grouping) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<GroupKey, MeanAcc> = BTreeMap::new();
    for r in records.iter() {
        let section = match grouping {
            Grouping::Faculty => None,
            Grouping::SectionAndFaculty => r.section.clone(),
        };
        groups
            .entry((section, r.faculty_name.clone(), r.rating_category.clone()))
            .or_default()
            .add(r.rating);
    }
    debug!(
        "aggregate_ratings: {} records in {} groups",
        records.len(),
        groups.len()
    );
    groups
        .into_iter()
        .map(|((section, faculty_name, rating_category), acc)| AggregateRow {
            faculty_name,
            section,
            rating_category,
            mean_rating: acc.mean(),
        })
        .collect()
}

pub const TOTAL_AVERAGE_LABEL: &str = "Total Average";
pub const MISSING_COURSE_CODE: &str = "N/A";

/// Builds one report per faculty member, sorted by name.
///
/// `course_codes` maps a course label to its code. Courses without a code are
/// reported as `N/A`.
pub fn faculty_reports(
    records: &[RatingRecord],
    course_codes: &HashMap<String, String>,
) -> Vec<FacultyReport> {
    let mut courses: HashMap<&str, Vec<&str>> = HashMap::new();
    for r in records.iter() {
        let l = courses.entry(r.faculty_name.as_str()).or_default();
        if !l.contains(&r.course.as_str()) {
            l.push(r.course.as_str());
        }
    }

    let rows = aggregate_ratings(records, Grouping::Faculty);
    let mut by_faculty: BTreeMap<&str, Vec<(String, f64)>> = BTreeMap::new();
    for row in rows.iter() {
        by_faculty
            .entry(row.faculty_name.as_str())
            .or_default()
            .push((row.rating_category.clone(), round4(row.mean_rating)));
    }

    by_faculty
        .into_iter()
        .map(|(faculty_name, categories)| {
            let taught: Vec<String> = courses
                .get(faculty_name)
                .map(|l| l.iter().map(|s| s.to_string()).collect())
                .unwrap_or_default();
            let mut codes: Vec<String> = Vec::new();
            for c in taught.iter() {
                let code = course_codes
                    .get(c)
                    .cloned()
                    .unwrap_or_else(|| MISSING_COURSE_CODE.to_string());
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
            let total = categories.iter().map(|p| p.1).sum::<f64>() / categories.len() as f64;
            FacultyReport {
                faculty_name: faculty_name.to_string(),
                courses: taught,
                course_codes: codes,
                categories,
                total_average: round4(total),
            }
        })
        .collect()
}

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}
