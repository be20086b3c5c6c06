//! Pediatric waist circumference percentiles
//!
//! Static reference table of 10th/50th/90th percentile waist circumference
//! (cm) per gender and integer age from 2 to 18 years. The table is looked up,
//! never interpolated between ages.
//!
//! Values are the European-American percentiles of Fernández JR, Redden DT,
//! Pietrobelli A, Allison DB. "Waist circumference percentiles in nationally
//! representative samples of African-American, European-American, and
//! Mexican-American children and adolescents." J Pediatr 2004;145(4):439-444
//! (NHANES III). The published percentiles come from quantile regression on
//! age, so each column grows by a near-constant step per year.

use crate::types::{Gender, PediatricWaistReference};

pub const MIN_AGE_YEARS: u8 = 2;
pub const MAX_AGE_YEARS: u8 = 18;

/// (age, p10, p50, p90)
type PercentileRow = (u8, f64, f64, f64);

static BOYS: [PercentileRow; 17] = [
    (2, 43.2, 47.1, 50.8),
    (3, 44.9, 49.1, 54.2),
    (4, 46.6, 51.1, 57.6),
    (5, 48.4, 53.2, 61.0),
    (6, 50.1, 55.2, 64.4),
    (7, 51.8, 57.2, 67.8),
    (8, 53.5, 59.3, 71.2),
    (9, 55.3, 61.3, 74.6),
    (10, 57.0, 63.3, 78.0),
    (11, 58.7, 65.4, 81.4),
    (12, 60.5, 67.4, 84.8),
    (13, 62.2, 69.5, 88.2),
    (14, 63.9, 71.5, 91.6),
    (15, 65.6, 73.5, 95.0),
    (16, 67.4, 75.6, 98.4),
    (17, 69.1, 77.6, 101.8),
    (18, 70.8, 79.6, 105.2),
];

static GIRLS: [PercentileRow; 17] = [
    (2, 43.3, 47.1, 52.2),
    (3, 44.7, 48.6, 55.3),
    (4, 46.1, 50.1, 58.3),
    (5, 47.5, 51.6, 61.4),
    (6, 48.9, 53.1, 64.4),
    (7, 50.3, 54.6, 67.5),
    (8, 51.7, 56.1, 70.5),
    (9, 53.1, 57.6, 73.6),
    (10, 54.5, 59.1, 76.6),
    (11, 55.9, 60.6, 79.7),
    (12, 57.3, 62.1, 82.7),
    (13, 58.7, 63.6, 85.8),
    (14, 60.1, 65.1, 88.8),
    (15, 61.5, 66.6, 91.9),
    (16, 62.9, 68.1, 94.9),
    (17, 64.3, 69.6, 98.0),
    (18, 65.7, 71.1, 101.0),
];

fn table(gender: Gender) -> &'static [PercentileRow; 17] {
    match gender {
        Gender::Male => &BOYS,
        Gender::Female => &GIRLS,
    }
}

/// Percentile row for a child, or `None` outside ages 2-18.
///
/// Fractional ages are truncated to whole years. A positive waist above the
/// 90th percentile is marked as elevated cardiometabolic risk.
pub fn waist_reference(
    gender: Gender,
    age_years: f64,
    waist_cm: f64,
) -> Option<PediatricWaistReference> {
    if !(age_years >= f64::from(MIN_AGE_YEARS) && age_years < f64::from(MAX_AGE_YEARS) + 1.0) {
        return None;
    }
    let age = age_years.trunc() as u8;

    table(gender)
        .iter()
        .find(|row| row.0 == age)
        .map(|&(age_years, p10_cm, p50_cm, p90_cm)| PediatricWaistReference {
            age_years,
            p10_cm,
            p50_cm,
            p90_cm,
            elevated: waist_cm > 0.0 && waist_cm > p90_cm,
        })
}

/// Consistency check used by diagnostics: ages contiguous and percentiles ordered
pub fn tables_consistent() -> bool {
    [Gender::Male, Gender::Female].iter().all(|&gender| {
        table(gender).iter().enumerate().all(|(i, &(age, p10, p50, p90))| {
            usize::from(age) == usize::from(MIN_AGE_YEARS) + i && p10 < p50 && p50 < p90
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_integer_age() {
        let row = waist_reference(Gender::Male, 10.0, 70.0).unwrap();
        assert_eq!(row.age_years, 10);
        assert_eq!(row.p90_cm, 78.0);
        assert!(!row.elevated);

        // No interpolation: 10.9 years reads the age-10 row
        let row = waist_reference(Gender::Male, 10.9, 70.0).unwrap();
        assert_eq!(row.age_years, 10);
        assert_eq!(row.p50_cm, 63.3);
    }

    #[test]
    fn test_separate_girl_table() {
        let row = waist_reference(Gender::Female, 14.0, 0.0).unwrap();
        assert_eq!((row.p10_cm, row.p50_cm, row.p90_cm), (60.1, 65.1, 88.8));
    }

    #[test]
    fn test_published_table_cells() {
        let cells = [
            (Gender::Male, 2.0, (43.2, 47.1, 50.8)),
            (Gender::Male, 10.0, (57.0, 63.3, 78.0)),
            (Gender::Male, 18.0, (70.8, 79.6, 105.2)),
            (Gender::Female, 2.0, (43.3, 47.1, 52.2)),
            (Gender::Female, 10.0, (54.5, 59.1, 76.6)),
            (Gender::Female, 18.0, (65.7, 71.1, 101.0)),
        ];
        for (gender, age, expected) in cells {
            let row = waist_reference(gender, age, 0.0).unwrap();
            assert_eq!((row.p10_cm, row.p50_cm, row.p90_cm), expected, "{gender:?} age {age}");
        }
    }

    #[test]
    fn test_above_90th_percentile_is_elevated() {
        let row = waist_reference(Gender::Female, 8.0, 71.0).unwrap();
        assert!(row.elevated);

        // Exactly the 90th percentile is not above it
        let row = waist_reference(Gender::Female, 8.0, 70.5).unwrap();
        assert!(!row.elevated);
    }

    #[test]
    fn test_missing_waist_is_not_elevated() {
        let row = waist_reference(Gender::Male, 5.0, 0.0).unwrap();
        assert!(!row.elevated);
    }

    #[test]
    fn test_outside_age_range() {
        assert!(waist_reference(Gender::Male, 1.9, 50.0).is_none());
        assert!(waist_reference(Gender::Male, 19.0, 50.0).is_none());
        assert!(waist_reference(Gender::Female, 0.0, 50.0).is_none());
        assert!(waist_reference(Gender::Female, 18.5, 50.0).is_some());
    }

    #[test]
    fn test_tables_consistent() {
        assert!(tables_consistent());
    }
}
