// Writers for the reshaped tables.
// The column names are read by existing spreadsheets and must not change.

use std::io::Write;

use course_feedback::aggregate::TOTAL_AVERAGE_LABEL;
use serde_json::json;
use serde_json::Value as JSValue;

use crate::reshape::*;

pub const FACULTY_RATINGS_FILE: &str = "faculty_ratings.csv";
pub const STUDENT_COMMENTS_FILE: &str = "student_comments.csv";
pub const COURSE_FEEDBACK_FILE: &str = "course_feedback_ratings.csv";
pub const AVERAGE_RATINGS_FILE: &str = "average_ratings.csv";
pub const FACULTY_REPORT_FILE: &str = "faculty_report.json";

pub fn write_ratings<W: Write>(wtr: &mut csv::Writer<W>, records: &[RatingRecord]) -> csv::Result<()> {
    wtr.write_record([
        "Student Name",
        "SRN",
        "Section",
        "Faculty Name",
        "Course",
        "Rating Category",
        "Rating",
    ])?;
    for r in records.iter() {
        wtr.write_record([
            r.student_name.as_str(),
            r.student_id.as_str(),
            r.section.as_deref().unwrap_or(""),
            r.faculty_name.as_str(),
            r.course.as_str(),
            r.rating_category.as_str(),
            format_number(r.rating).as_str(),
        ])?;
    }
    Ok(())
}

pub fn write_comments<W: Write>(wtr: &mut csv::Writer<W>, records: &[CommentRecord]) -> csv::Result<()> {
    wtr.write_record(["Student", "SRN", "Faculty", "Course", "Comment"])?;
    for r in records.iter() {
        wtr.write_record([
            r.student_name.as_str(),
            r.student_id.as_str(),
            r.faculty_name.as_str(),
            r.course.as_str(),
            r.comment.as_str(),
        ])?;
    }
    Ok(())
}

pub fn write_course_feedback<W: Write>(
    wtr: &mut csv::Writer<W>,
    records: &[CourseFeedbackRecord],
) -> csv::Result<()> {
    wtr.write_record(["Student", "SRN", "Course", "Question", "Rating"])?;
    for r in records.iter() {
        wtr.write_record([
            r.student_name.as_str(),
            r.student_id.as_str(),
            r.course.as_str(),
            r.question.as_str(),
            format_number(r.rating).as_str(),
        ])?;
    }
    Ok(())
}

/// The section column is only written when grouping by section.
pub fn write_averages<W: Write>(
    wtr: &mut csv::Writer<W>,
    rows: &[AggregateRow],
    grouping: Grouping,
) -> csv::Result<()> {
    let with_section = grouping == Grouping::SectionAndFaculty;
    let mut header: Vec<&str> = vec!["Faculty Name", "Rating Category", "Rating"];
    if with_section {
        header.insert(0, "Section");
    }
    wtr.write_record(&header)?;
    for r in rows.iter() {
        let mean = format_number(r.mean_rating);
        let mut record: Vec<&str> = vec![
            r.faculty_name.as_str(),
            r.rating_category.as_str(),
            mean.as_str(),
        ];
        if with_section {
            record.insert(0, r.section.as_deref().unwrap_or(""));
        }
        wtr.write_record(&record)?;
    }
    Ok(())
}

pub fn averages_to_string(rows: &[AggregateRow], grouping: Grouping) -> ReshapeResult<String> {
    let mut buffer: Vec<u8> = Vec::new();
    {
        let mut wtr = csv::Writer::from_writer(&mut buffer);
        write_averages(&mut wtr, rows, grouping).context(CsvWriteSnafu { path: "<memory>" })?;
        wtr.flush().context(WritingSnafu { path: "<memory>" })?;
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn reports_to_json(reports: &[FacultyReport]) -> JSValue {
    let l: Vec<JSValue> = reports
        .iter()
        .map(|r| {
            let mut ratings: Vec<JSValue> = r
                .categories
                .iter()
                .map(|(category, rating)| json!({"ratingCategory": category, "averageRating": rating}))
                .collect();
            ratings.push(json!({"ratingCategory": TOTAL_AVERAGE_LABEL, "averageRating": r.total_average}));
            json!({
                "facultyName": r.faculty_name,
                "coursesTaught": r.courses,
                "courseCodes": r.course_codes,
                "ratings": ratings,
            })
        })
        .collect();
    json!({ "faculty": l })
}

/// Writes all the output files in the given directory, creating it if needed.
pub fn write_outputs(
    dir: &Path,
    output: &TransformOutput,
    averages: &[AggregateRow],
    grouping: Grouping,
    reports: &[FacultyReport],
) -> ReshapeResult<()> {
    fs::create_dir_all(dir).context(WritingSnafu {
        path: dir.display().to_string(),
    })?;

    write_csv(&dir.join(FACULTY_RATINGS_FILE), |w| {
        write_ratings(w, &output.ratings)
    })?;
    write_csv(&dir.join(STUDENT_COMMENTS_FILE), |w| {
        write_comments(w, &output.comments)
    })?;
    write_csv(&dir.join(COURSE_FEEDBACK_FILE), |w| {
        write_course_feedback(w, &output.course_feedback)
    })?;
    write_csv(&dir.join(AVERAGE_RATINGS_FILE), |w| {
        write_averages(w, averages, grouping)
    })?;

    let report_p = dir.join(FACULTY_REPORT_FILE).display().to_string();
    let pretty_js = serde_json::to_string_pretty(&reports_to_json(reports)).context(ParsingJsonSnafu {})?;
    fs::write(&report_p, pretty_js).context(WritingSnafu { path: report_p.clone() })?;
    info!("write_outputs: wrote {}", report_p);
    Ok(())
}

fn write_csv<F>(path: &Path, f: F) -> ReshapeResult<()>
where
    F: FnOnce(&mut csv::Writer<fs::File>) -> csv::Result<()>,
{
    let p = path.display().to_string();
    let mut wtr = csv::Writer::from_path(path).context(CsvWriteSnafu { path: p.clone() })?;
    f(&mut wtr).context(CsvWriteSnafu { path: p.clone() })?;
    wtr.flush().context(WritingSnafu { path: p.clone() })?;
    info!("write_outputs: wrote {}", p);
    Ok(())
}

// Shortest representation that reads back to the same number: 4.0 is written `4`.
fn format_number(x: f64) -> String {
    x.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string<F>(f: F) -> String
    where
        F: FnOnce(&mut csv::Writer<&mut Vec<u8>>) -> csv::Result<()>,
    {
        let mut buffer: Vec<u8> = Vec::new();
        {
            let mut wtr = csv::Writer::from_writer(&mut buffer);
            f(&mut wtr).unwrap();
            wtr.flush().unwrap();
        }
        String::from_utf8(buffer).unwrap()
    }

    fn average(faculty: &str, section: Option<&str>, category: &str, mean: f64) -> AggregateRow {
        AggregateRow {
            faculty_name: faculty.to_string(),
            section: section.map(|s| s.to_string()),
            rating_category: category.to_string(),
            mean_rating: mean,
        }
    }

    #[test]
    fn ratings_table() {
        let records = vec![RatingRecord {
            student_name: "Alice".to_string(),
            student_id: "S1".to_string(),
            section: None,
            faculty_name: "Dr. X".to_string(),
            course: "Math".to_string(),
            rating_category: "clarity".to_string(),
            rating: 4.0,
        }];
        assert_eq!(
            to_string(|w| write_ratings(w, &records)),
            "Student Name,SRN,Section,Faculty Name,Course,Rating Category,Rating\nAlice,S1,,Dr. X,Math,clarity,4\n"
        );
    }

    #[test]
    fn comments_are_quoted() {
        let records = vec![CommentRecord {
            student_name: "Alice".to_string(),
            student_id: "S1".to_string(),
            faculty_name: "Dr. X".to_string(),
            course: "Math".to_string(),
            comment: "Slow, but thorough".to_string(),
        }];
        assert_eq!(
            to_string(|w| write_comments(w, &records)),
            "Student,SRN,Faculty,Course,Comment\nAlice,S1,Dr. X,Math,\"Slow, but thorough\"\n"
        );
    }

    #[test]
    fn averages_with_and_without_section() {
        let rows = vec![average("Dr. X", Some("A"), "clarity", 3.5)];
        assert_eq!(
            averages_to_string(&rows, Grouping::Faculty).unwrap(),
            "Faculty Name,Rating Category,Rating\nDr. X,clarity,3.5\n"
        );
        assert_eq!(
            averages_to_string(&rows, Grouping::SectionAndFaculty).unwrap(),
            "Section,Faculty Name,Rating Category,Rating\nA,Dr. X,clarity,3.5\n"
        );
    }

    #[test]
    fn report_json() {
        let reports = vec![FacultyReport {
            faculty_name: "Dr. X".to_string(),
            courses: vec!["Math".to_string()],
            course_codes: vec!["N/A".to_string()],
            categories: vec![("clarity".to_string(), 4.5)],
            total_average: 4.5,
        }];
        let js = reports_to_json(&reports);
        let fac = &js["faculty"][0];
        assert_eq!(fac["facultyName"], json!("Dr. X"));
        assert_eq!(fac["courseCodes"], json!(["N/A"]));
        assert_eq!(
            fac["ratings"],
            json!([
                {"ratingCategory": "clarity", "averageRating": 4.5},
                {"ratingCategory": "Total Average", "averageRating": 4.5}
            ])
        );
    }
}
