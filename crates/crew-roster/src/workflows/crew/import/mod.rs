//! Personnel directory import from the administration CSV export.

mod parser;

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{Person, PersonRole};

#[derive(Debug)]
pub enum PersonnelImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for PersonnelImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersonnelImportError::Io(err) => write!(f, "failed to read personnel export: {}", err),
            PersonnelImportError::Csv(err) => write!(f, "invalid personnel CSV data: {}", err),
        }
    }
}

impl std::error::Error for PersonnelImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersonnelImportError::Io(err) => Some(err),
            PersonnelImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for PersonnelImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for PersonnelImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Persons read from an export. Rows repeating an earlier username are skipped; rows that
/// cannot be used are listed in `errors` without failing the import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub personnel: Vec<Person>,
    pub skipped: usize,
    pub errors: Vec<String>,
}

pub struct PersonnelImporter;

impl PersonnelImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ImportReport, PersonnelImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<ImportReport, PersonnelImportError> {
        let mut report = ImportReport::default();
        let mut seen: HashSet<String> = HashSet::new();

        for (line, row) in parser::parse_rows(reader)? {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    report.errors.push(format!("line {line}: {err}"));
                    continue;
                }
            };

            if row.username.is_empty() {
                report.errors.push(format!("line {line}: missing username"));
                continue;
            }

            let role = match row.role.as_deref() {
                None => PersonRole::Member,
                Some(raw) => match PersonRole::parse(raw) {
                    Some(role) => role,
                    None => {
                        report
                            .errors
                            .push(format!("line {line}: unknown role '{raw}' for {}", row.username));
                        continue;
                    }
                },
            };

            if !seen.insert(row.username.clone()) {
                report.skipped += 1;
                continue;
            }

            report.personnel.push(Person::new(
                row.username.clone(),
                row.display_name(),
                role,
                row.qualification_codes(),
            ));
        }

        if !report.errors.is_empty() {
            warn!(errors = report.errors.len(), "personnel import had invalid rows");
        }
        debug!(
            imported = report.personnel.len(),
            skipped = report.skipped,
            "personnel import finished"
        );
        Ok(report)
    }
}
