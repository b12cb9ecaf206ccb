/*!

This is the long-form manual for `course_feedback` and `fbreshape`.

## Input layout

The input is a wide survey export: one row per student, one header row. The
columns are read as follows:

* the student columns (by default `Name of the Student`, `SRN` and `Section`) can
  appear anywhere in the header;
* every column starting with `Feedback on ` opens a course block. The course is the
  rest of the column name (`Feedback on Math` is the course `Math`). The marker column
  itself holds no data;
* all the columns after a marker belong to that course, up to the next marker.
  Columns before the first marker are ignored.

Inside a course block:

* a column whose name contains `Name of the Faculty`, `Faculty Name` or
  `Name of Faculty` (in any case) holds the name of a faculty member. When a course
  has several of them, each faculty column starts a new sub-block that lasts until
  the next faculty column;
* a column whose name contains `Please give a rating` is a rating question about the
  faculty member of its sub-block;
* a column named exactly `Comments` is a free-text comment about that faculty
  member;
* a column whose name contains `The course` is a rating question about the course
  itself. It is read once per course, whatever the number of faculty members.

### Faculty names and sections

Faculty cells may carry the section they were taught in, as `Section A - Dr. Smith`
or `Dr. Smith - Section A` (a colon or a long dash also works as a separator, and the
section can be put in parentheses at the end). `Section` has to be a word of its own.
The section is then taken from the cell. Otherwise the `Section` column of the
student is used.

### Rating categories

The category of a rating question is the label between brackets when there is one
(`Please give a rating [Clarity]`), otherwise the text that follows the rating phrase
(`Please give a rating (Clarity)`). Anything from the first parenthesis on is dropped
and the category is lower-cased, so both examples give `clarity`.

### Skipped content

Rows without a student name or id are skipped. Empty faculty cells skip the
corresponding faculty sub-block for that student. Ratings that are not numbers (for
instance `N/A`) are dropped. None of these stop the processing.

A file in which no course, no faculty column or no rating question can be found is
rejected.

## Outputs

| File                          | Columns                                                                  |
|-------------------------------|--------------------------------------------------------------------------|
| `faculty_ratings.csv`         | `Student Name, SRN, Section, Faculty Name, Course, Rating Category, Rating` |
| `student_comments.csv`        | `Student, SRN, Faculty, Course, Comment`                                 |
| `course_feedback_ratings.csv` | `Student, SRN, Course, Question, Rating`                                 |
| `average_ratings.csv`         | `[Section,] Faculty Name, Rating Category, Rating`                       |
| `faculty_report.json`         | courses, course codes and average ratings for each faculty member        |

## Command line

```bash
fbreshape -i 'feedback-raw data.csv' -o out/
fbreshape -i feedback.xlsx --excel-worksheet-name 'Form Responses 1' --header-row 2 --by-section
fbreshape -c feedback_config.json --reference expected_average_ratings.csv
```

The configuration file is a JSON file:

```json
{
  "outputSettings": { "outputDirectory": "out", "groupBySection": false },
  "inputSources": [
    { "provider": "csv", "filePath": "feedback-raw data.csv", "headerRowIndex": 1 }
  ],
  "columns": { "studentNameColumn": "Name of the Student", "studentIdColumn": "SRN" },
  "courseCodes": "course_codes.csv"
}
```

The course codes file has two columns, `Course` and `Course Code`.

*/
