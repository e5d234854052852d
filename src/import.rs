// 📂 CSV Import - display_name,phone_number[,phone_type,photo_uri]

use crate::contact::NewContact;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    display_name: Option<String>,

    #[serde(default)]
    phone_number: Option<String>,

    #[serde(default)]
    phone_type: Option<String>,

    #[serde(default)]
    photo_uri: Option<String>,
}

impl From<CsvRow> for NewContact {
    fn from(row: CsvRow) -> Self {
        NewContact {
            display_name: row.display_name.unwrap_or_default(),
            phone_number: row.phone_number.unwrap_or_default(),
            phone_type: row.phone_type.filter(|s| !s.is_empty()),
            photo_uri: row.photo_uri.filter(|s| !s.is_empty()),
        }
    }
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<NewContact>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    read_contacts(file)
}

/// Parse contacts from any CSV reader (header row required)
pub fn read_contacts<R: Read>(reader: R) -> Result<Vec<NewContact>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let mut contacts = Vec::new();
    for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
        // +2: header row and 1-based numbering
        let row = result.with_context(|| format!("Failed to parse contact on line {}", line + 2))?;
        contacts.push(row.into());
    }

    Ok(contacts)
}
