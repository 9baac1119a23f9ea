use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::{read_file, ReferenceError};

/// CAL expenditure code to its description, from `expenditure_codes.csv`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenditureCodes(BTreeMap<String, String>);

impl ExpenditureCodes {
    pub fn get(&self, code: &str) -> Option<&str> {
        self.0.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Deserialize)]
struct CodeRow {
    expn_code: String,
    description: String,
}

pub fn parse_expenditure_codes(content: &str) -> Result<ExpenditureCodes, ReferenceError> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut codes = BTreeMap::new();
    for record in reader.deserialize::<CodeRow>() {
        let row = record?;
        codes.insert(row.expn_code.trim().to_string(), row.description.trim().to_string());
    }
    Ok(ExpenditureCodes(codes))
}

pub fn load_expenditure_codes(path: &Path) -> Result<ExpenditureCodes, ReferenceError> {
    parse_expenditure_codes(&read_file(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_code() {
        let codes = parse_expenditure_codes(
            "expn_code,description\nCMP,campaign paraphernalia/misc.\nLIT,campaign literature and mailings\n",
        )
        .unwrap();
        assert_eq!(codes.len(), 2);
        assert_eq!(codes.get("LIT"), Some("campaign literature and mailings"));
        assert_eq!(codes.get("XXX"), None);
    }
}
