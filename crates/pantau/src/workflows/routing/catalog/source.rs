use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use super::{CatalogError, DepartmentSource};
use crate::workflows::routing::domain::{DepartmentId, DepartmentProfile};

/// Fixed in-memory department rows, used for demos and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticDepartmentSource {
    departments: Vec<DepartmentProfile>,
}

impl StaticDepartmentSource {
    pub fn new(departments: Vec<DepartmentProfile>) -> Self {
        Self { departments }
    }
}

#[async_trait]
impl DepartmentSource for StaticDepartmentSource {
    async fn fetch_departments(&self) -> Result<Vec<DepartmentProfile>, CatalogError> {
        Ok(self.departments.clone())
    }
}

/// Department table exported as CSV. The file is re-read on every refresh.
#[derive(Debug, Clone)]
pub struct CsvDepartmentSource {
    path: PathBuf,
}

impl CsvDepartmentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DepartmentSource for CsvDepartmentSource {
    async fn fetch_departments(&self) -> Result<Vec<DepartmentProfile>, CatalogError> {
        let bytes = tokio::fs::read(&self.path).await?;
        parse_catalog(bytes.as_slice())
    }
}

/// Parse a department export with columns
/// `id,name,email,category,keywords,priority_keywords,weight`.
/// Keyword columns hold `;`-separated lists.
pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<DepartmentProfile>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut departments = Vec::new();

    for record in csv_reader.deserialize::<DepartmentRow>() {
        let row = record?;
        if row.id.is_empty() {
            warn!(name = %row.name, "skipping department row without an id");
            continue;
        }
        departments.push(row.into_profile());
    }

    Ok(departments)
}

#[derive(Debug, Deserialize)]
struct DepartmentRow {
    id: String,
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    category: String,
    #[serde(default, deserialize_with = "keyword_list")]
    keywords: Vec<String>,
    #[serde(default, deserialize_with = "keyword_list")]
    priority_keywords: Vec<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    weight: Option<String>,
}

impl DepartmentRow {
    fn into_profile(self) -> DepartmentProfile {
        let weight = match self.weight.as_deref().map(str::parse::<f64>) {
            Some(Ok(weight)) => weight,
            Some(Err(_)) => {
                warn!(department = %self.id, "unparseable department weight, using 1.0");
                1.0
            }
            None => 1.0,
        };

        DepartmentProfile {
            id: DepartmentId(self.id),
            name: self.name,
            email: self.email,
            category: self.category,
            keywords: self.keywords,
            priority_keywords: self.priority_keywords,
            weight,
        }
    }
}

fn keyword_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
