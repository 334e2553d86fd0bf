//! Promotion evaluation scores.
//!
//! The total score is made of five weighted parts:
//! individual PMS (25%), total experience (20%), experience since the last
//! promotion (10%), manager recommendation (20%) and district
//! recommendation (15%).

use chrono::{Datelike, NaiveDate};

use crate::model::employee::Employee;

pub const PMS_WEIGHT: f64 = 0.25;
pub const TOTAL_EXPERIENCE_WEIGHT: f64 = 20.0;
pub const RELATED_EXPERIENCE_WEIGHT: f64 = 10.0;
pub const MANAGER_RECOMMENDATION_WEIGHT: f64 = 0.20;
pub const DISTRICT_RECOMMENDATION_WEIGHT: f64 = 0.15;

/// Whole years between `since` and `current_year`, never negative.
pub fn years_since(since: NaiveDate, current_year: i32) -> i32 {
    (current_year - since.year()).max(0)
}

pub fn total_experience(employee: &Employee, current_year: i32) -> i32 {
    years_since(employee.employment_date, current_year)
}

pub fn related_experience(employee: &Employee, current_year: i32) -> i32 {
    employee
        .last_dop
        .map(|x| years_since(x, current_year))
        .unwrap_or(0)
}

/// `value / max * weight`, zero when there is nothing to rank against.
pub fn ranked(value: i32, max: i32, weight: f64) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    value as f64 / max as f64 * weight
}

pub fn pms_score(individual_pms: f64) -> f64 {
    individual_pms * PMS_WEIGHT
}

pub fn manager_recommendation_score(score: f64) -> f64 {
    score * MANAGER_RECOMMENDATION_WEIGHT
}

pub fn district_recommendation_score(score: f64) -> f64 {
    score * DISTRICT_RECOMMENDATION_WEIGHT
}

/// Sum of every score part, absent parts count as zero.
pub fn recalculate_total(employee: &mut Employee) {
    let total = [
        employee.indpms25,
        employee.totalexp20,
        employee.expafterpromo,
        employee.tmdrec20,
        employee.disrec15,
    ]
    .iter()
    .map(|x| x.unwrap_or(0.0))
    .sum();
    employee.total = Some(total);
}

/// Recomputes experience and PMS derived columns plus the total.
///
/// `max_totalexp` and `max_relatedexp` are the largest values stored for
/// other employees; the employee's own values take part in the ranking.
pub fn evaluate(employee: &mut Employee, current_year: i32, max_totalexp: i32, max_relatedexp: i32) {
    let totalexp = total_experience(employee, current_year);
    let relatedexp = related_experience(employee, current_year);
    employee.totalexp = Some(totalexp);
    employee.relatedexp = Some(relatedexp);
    employee.totalexp20 = Some(ranked(
        totalexp,
        max_totalexp.max(totalexp),
        TOTAL_EXPERIENCE_WEIGHT,
    ));
    employee.expafterpromo = Some(ranked(
        relatedexp,
        max_relatedexp.max(relatedexp),
        RELATED_EXPERIENCE_WEIGHT,
    ));
    employee.indpms25 = Some(employee.individual_pms.map(pms_score).unwrap_or(0.0));
    if employee.tmdrec20.is_none() {
        employee.tmdrec20 = Some(0.0);
    }
    if employee.disrec15.is_none() {
        employee.disrec15 = Some(0.0);
    }
    recalculate_total(employee);
}
