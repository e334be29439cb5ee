use serde::Serialize;

use crate::marks::repo_types::{MarkSheet, Subject};

/// One labelled value on a bar or line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub subject: Subject,
    pub marks: u8,
}

/// One pie slice; `share` is in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub subject: Subject,
    pub marks: u8,
    pub share: f64,
    pub label: String,
}

/// Everything the reports page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub average: Option<f64>,
    pub bar: Vec<SeriesPoint>,
    pub line: Vec<SeriesPoint>,
    pub pie: Vec<PieSlice>,
}

/// Mean of the Marks column, `None` for an empty table.
pub fn average(sheet: &MarkSheet) -> Option<f64> {
    if sheet.is_empty() {
        return None;
    }
    let total: u32 = sheet.rows().iter().map(|r| u32::from(r.marks)).sum();
    Some(f64::from(total) / sheet.rows().len() as f64)
}

fn series(sheet: &MarkSheet) -> Vec<SeriesPoint> {
    sheet
        .rows()
        .iter()
        .map(|r| SeriesPoint {
            subject: r.subject,
            marks: r.marks,
        })
        .collect()
}

pub fn to_bar_series(sheet: &MarkSheet) -> Vec<SeriesPoint> {
    series(sheet)
}

pub fn to_line_series(sheet: &MarkSheet) -> Vec<SeriesPoint> {
    series(sheet)
}

pub fn to_pie_shares(sheet: &MarkSheet) -> Vec<PieSlice> {
    let total: u32 = sheet.rows().iter().map(|r| u32::from(r.marks)).sum();
    sheet
        .rows()
        .iter()
        .map(|r| {
            let share = if total == 0 {
                0.0
            } else {
                f64::from(r.marks) / f64::from(total)
            };
            PieSlice {
                subject: r.subject,
                marks: r.marks,
                share,
                label: format!("{:.1}%", share * 100.0),
            }
        })
        .collect()
}

pub fn build_report(sheet: &MarkSheet) -> Report {
    Report {
        average: average(sheet),
        bar: to_bar_series(sheet),
        line: to_line_series(sheet),
        pie: to_pie_shares(sheet),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::repo_types::MarkRow;

    fn sheet(pairs: &[(Subject, u8)]) -> MarkSheet {
        MarkSheet::new(
            pairs
                .iter()
                .map(|&(subject, marks)| MarkRow { subject, marks })
                .collect(),
        )
    }

    #[test]
    fn test_average_all_equal_is_exact() {
        let s = sheet(&Subject::ALL.map(|subject| (subject, 70)));
        assert_eq!(average(&s), Some(70.0));
    }

    #[test]
    fn test_average_mixed_and_empty() {
        let s = sheet(&[(Subject::Maths, 100), (Subject::Hindi, 0), (Subject::Civics, 50)]);
        assert_eq!(average(&s), Some(50.0));
        assert_eq!(average(&MarkSheet::default()), None);
    }

    #[test]
    fn test_bar_and_line_follow_table_order() {
        let s = sheet(&[(Subject::History, 33), (Subject::Maths, 44)]);
        let expected = vec![
            SeriesPoint {
                subject: Subject::History,
                marks: 33,
            },
            SeriesPoint {
                subject: Subject::Maths,
                marks: 44,
            },
        ];
        assert_eq!(to_bar_series(&s), expected);
        assert_eq!(to_line_series(&s), expected);
    }

    #[test]
    fn test_pie_shares_sum_to_one_with_labels() {
        let s = sheet(&[(Subject::Maths, 50), (Subject::Science, 30), (Subject::English, 20)]);
        let pie = to_pie_shares(&s);
        let labels: Vec<&str> = pie.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["50.0%", "30.0%", "20.0%"]);
        let sum: f64 = pie.iter().map(|p| p.share).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pie_all_zero() {
        let s = sheet(&[(Subject::Maths, 0), (Subject::Science, 0)]);
        for slice in to_pie_shares(&s) {
            assert_eq!(slice.share, 0.0);
            assert_eq!(slice.label, "0.0%");
        }
    }

    #[test]
    fn test_pie_one_decimal_rounding() {
        let s = sheet(&[(Subject::Maths, 1), (Subject::Science, 2)]);
        let pie = to_pie_shares(&s);
        assert_eq!(pie[0].label, "33.3%");
        assert_eq!(pie[1].label, "66.7%");
    }

    #[test]
    fn test_build_report_bundles_views() {
        let s = sheet(&[(Subject::Maths, 80), (Subject::Science, 60)]);
        let report = build_report(&s);
        assert_eq!(report.average, Some(70.0));
        assert_eq!(report.bar.len(), 2);
        assert_eq!(report.line.len(), 2);
        assert_eq!(report.pie.len(), 2);
    }
}
