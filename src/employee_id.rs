//! Department-scoped employee ID generation.
//!
//! Format: `<CODE>-<SEQ>` where `CODE` is the upper-cased first three characters of the
//! department and `SEQ` is one past the highest sequence already issued under that code,
//! zero-padded to three digits (e.g. `ENG-003`).

use crate::types::BasicInfo;

/// Separator between department code and sequence
pub const SEPARATOR: char = '-';

/// Upper-cased first (up to) three characters of a department name
pub fn department_code(department: &str) -> String {
    department.chars().take(3).collect::<String>().to_uppercase()
}

/// Numeric suffix of an employee ID; leading digits after the first separator, 0 when absent
fn sequence_of(employee_id: &str) -> u32 {
    let suffix = employee_id.split(SEPARATOR).nth(1).unwrap_or("");
    let digits: String = suffix.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Next employee ID for `department` given the records already persisted
pub fn next_id(department: &str, existing: &[BasicInfo]) -> String {
    let code = department_code(department);
    let max_sequence = existing
        .iter()
        .filter(|record| record.employee_id.starts_with(&code))
        .map(|record| sequence_of(&record.employee_id))
        .max()
        .unwrap_or(0);

    format!("{}{}{:03}", code, SEPARATOR, max_sequence + 1)
}
