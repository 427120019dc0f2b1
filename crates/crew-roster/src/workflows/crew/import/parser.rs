use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One directory row as exported by the personnel administration.
#[derive(Debug, Deserialize)]
pub(crate) struct PersonnelRow {
    #[serde(rename = "Username")]
    pub(crate) username: String,
    #[serde(rename = "Vorname", default)]
    pub(crate) first_name: String,
    #[serde(rename = "Nachname", default)]
    pub(crate) last_name: String,
    #[serde(rename = "Rolle", default, deserialize_with = "empty_string_as_none")]
    pub(crate) role: Option<String>,
    #[serde(rename = "Qualifikationen", default)]
    pub(crate) qualifications: String,
}

impl PersonnelRow {
    pub(crate) fn display_name(&self) -> String {
        [self.first_name.as_str(), self.last_name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn qualification_codes(&self) -> Vec<String> {
        self.qualifications
            .split(';')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Rows in file order, each either parsed or carrying its csv error. Line numbers are
/// 1-based and count the header.
pub(crate) fn parse_rows<R: Read>(
    reader: R,
) -> Result<Vec<(u64, Result<PersonnelRow, csv::Error>)>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let _ = csv_reader.headers()?;

    let mut rows = Vec::new();
    for (index, record) in csv_reader.deserialize::<PersonnelRow>().enumerate() {
        rows.push((index as u64 + 2, record));
    }
    Ok(rows)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn qualification_list_splits_on_semicolons() {
        let rows = parse_rows(Cursor::new(
            "Username,Vorname,Nachname,Rolle,Qualifikationen\nmmuster,Max,Muster,member, AGT ;MASCH;;\n",
        ))
        .expect("header parses");

        let (line, row) = rows.into_iter().next().expect("one row");
        let row = row.expect("row parses");
        assert_eq!(line, 2);
        assert_eq!(row.display_name(), "Max Muster");
        assert_eq!(row.qualification_codes(), vec!["AGT", "MASCH"]);
    }
}
