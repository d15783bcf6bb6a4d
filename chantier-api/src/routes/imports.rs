//! CSV import endpoints.
//!
//! # Endpoints
//!
//! - `POST /v1/libraries/:id/import` - Import articles into a library
//! - `POST /v1/projects/import` - Import projects
//!
//! The request body is the raw CSV text with a header row. Malformed rows
//! are skipped and reported in the `errors` array with their line number;
//! row errors never fail the batch.
//!
//! Article columns: `designation, lot, sous_categorie, unite,
//! prix_unitaire, statut` (first four required).
//! Project columns: `nom_projet, client, typologie, reference_interne,
//! adresse, date_livraison_prevue, statut, surface_totale` (first three
//! required).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chantier_shared::{
    access::{self, Action},
    auth::middleware::AuthContext,
    models::{
        article::{Article, CreateArticle},
        folder::{ProjectFolder, SystemFolder},
        project::{CreateProject, Project, ProjectStatus},
    },
};
use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;
use uuid::Uuid;

/// Import response
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Rows successfully imported
    pub created: usize,

    /// Data rows in the file
    pub total_rows: usize,

    /// One entry per skipped row
    pub errors: Vec<ImportError>,
}

/// A skipped row
#[derive(Debug, Serialize)]
pub struct ImportError {
    /// 1-based line number in the file (header is line 1)
    pub line: usize,

    pub message: String,
}

/// Parsed article row, ready for insertion
#[derive(Debug, PartialEq)]
struct ArticleRow {
    designation: String,
    lot: String,
    sub_category: Option<String>,
    unit: String,
    unit_price: f64,
    status: Option<String>,
}

/// Parsed project row, ready for insertion
#[derive(Debug, PartialEq)]
struct ProjectRow {
    name: String,
    client: Option<String>,
    typology: Option<String>,
    internal_reference: Option<String>,
    address: Option<String>,
    expected_delivery: Option<NaiveDate>,
    status: ProjectStatus,
    total_surface: Option<f64>,
}

/// Column value by header name, trimmed; empty cells become None
fn column<'a>(headers: &StringRecord, record: &'a StringRecord, name: &str) -> Option<&'a str> {
    let index = headers.iter().position(|h| h.trim() == name)?;
    let value = record.get(index)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parses a decimal that may use a French comma separator
fn parse_decimal(value: &str) -> Option<f64> {
    value.replace(',', ".").parse::<f64>().ok()
}

/// Parses a date in ISO or French day-first form
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
}

fn parse_article_row(headers: &StringRecord, record: &StringRecord) -> Result<ArticleRow, String> {
    let designation = column(headers, record, "designation")
        .ok_or("Missing required column: designation")?
        .to_string();
    let lot = column(headers, record, "lot")
        .ok_or("Missing required column: lot")?
        .to_string();
    let unit = column(headers, record, "unite")
        .ok_or("Missing required column: unite")?
        .to_string();
    let unit_price = column(headers, record, "prix_unitaire")
        .ok_or("Missing required column: prix_unitaire")
        .and_then(|v| parse_decimal(v).ok_or("Invalid prix_unitaire"))?;

    Ok(ArticleRow {
        designation,
        lot,
        sub_category: column(headers, record, "sous_categorie").map(String::from),
        unit,
        unit_price,
        status: column(headers, record, "statut").map(String::from),
    })
}

fn parse_project_row(headers: &StringRecord, record: &StringRecord) -> Result<ProjectRow, String> {
    let name = column(headers, record, "nom_projet")
        .ok_or("Missing required column: nom_projet")?
        .to_string();
    let client = column(headers, record, "client")
        .ok_or("Missing required column: client")?
        .to_string();
    let typology = column(headers, record, "typologie")
        .ok_or("Missing required column: typologie")?
        .to_string();

    let expected_delivery = match column(headers, record, "date_livraison_prevue") {
        Some(value) => Some(parse_date(value).ok_or("Invalid date_livraison_prevue")?),
        None => None,
    };

    let status = match column(headers, record, "statut") {
        Some(value) => ProjectStatus::parse(value).ok_or("Invalid statut")?,
        None => ProjectStatus::Draft,
    };

    let total_surface = match column(headers, record, "surface_totale") {
        Some(value) => Some(parse_decimal(value).ok_or("Invalid surface_totale")?),
        None => None,
    };

    Ok(ProjectRow {
        name,
        client: Some(client),
        typology: Some(typology),
        internal_reference: column(headers, record, "reference_interne").map(String::from),
        address: column(headers, record, "adresse").map(String::from),
        expected_delivery,
        status,
        total_surface,
    })
}

/// Imports articles into a library (editor or owner)
pub async fn import_articles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(library_id): Path<Uuid>,
    body: String,
) -> ApiResult<Json<ImportResponse>> {
    access::require_library(&state.db, library_id, auth.user_id, Action::Write).await?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ApiError::BadRequest(format!("Invalid CSV: {}", e)))?
        .clone();

    let mut created = 0usize;
    let mut total_rows = 0usize;
    let mut errors = Vec::new();

    for (index, result) in reader.records().enumerate() {
        total_rows += 1;
        // Header is line 1, first data row line 2
        let line = index + 2;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                errors.push(ImportError {
                    line,
                    message: format!("Unreadable row: {}", e),
                });
                continue;
            }
        };

        let row = match parse_article_row(&headers, &record) {
            Ok(row) => row,
            Err(message) => {
                errors.push(ImportError {
                    line,
                    message: message.to_string(),
                });
                continue;
            }
        };

        Article::create(
            &state.db,
            CreateArticle {
                library_id,
                designation: row.designation,
                lot: row.lot,
                sub_category: row.sub_category,
                unit: row.unit,
                unit_price: row.unit_price,
                status: row.status,
            },
        )
        .await?;
        created += 1;
    }

    tracing::info!(
        library_id = %library_id,
        created,
        skipped = errors.len(),
        "Article import finished"
    );

    Ok(Json(ImportResponse {
        created,
        total_rows,
        errors,
    }))
}

/// Imports projects owned by the caller
///
/// Imported projects are filed by status, the same rule as manual
/// creation.
pub async fn import_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    body: String,
) -> ApiResult<Json<ImportResponse>> {
    let my_projects = ProjectFolder::system(&state.db, auth.user_id, SystemFolder::MyProjects)
        .await?
        .ok_or_else(|| ApiError::InternalError("Missing system folder for user".to_string()))?;
    let archived = ProjectFolder::system(&state.db, auth.user_id, SystemFolder::Archived)
        .await?
        .ok_or_else(|| ApiError::InternalError("Missing system folder for user".to_string()))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ApiError::BadRequest(format!("Invalid CSV: {}", e)))?
        .clone();

    let mut created = 0usize;
    let mut total_rows = 0usize;
    let mut errors = Vec::new();

    for (index, result) in reader.records().enumerate() {
        total_rows += 1;
        let line = index + 2;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                errors.push(ImportError {
                    line,
                    message: format!("Unreadable row: {}", e),
                });
                continue;
            }
        };

        let row = match parse_project_row(&headers, &record) {
            Ok(row) => row,
            Err(message) => {
                errors.push(ImportError {
                    line,
                    message: message.to_string(),
                });
                continue;
            }
        };

        let folder_id = match row.status {
            ProjectStatus::Archived => archived.id,
            _ => my_projects.id,
        };

        Project::create(
            &state.db,
            CreateProject {
                owner_id: auth.user_id,
                folder_id: Some(folder_id),
                name: row.name,
                client: row.client,
                typology: row.typology,
                internal_reference: row.internal_reference,
                address: row.address,
                expected_delivery: row.expected_delivery,
                total_surface: row.total_surface,
                status: row.status,
            },
        )
        .await?;
        created += 1;
    }

    tracing::info!(created, skipped = errors.len(), "Project import finished");

    Ok(Json(ImportResponse {
        created,
        total_rows,
        errors,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_from(csv_line: &[&str]) -> StringRecord {
        StringRecord::from(csv_line.to_vec())
    }

    fn article_headers() -> StringRecord {
        record_from(&[
            "designation",
            "lot",
            "sous_categorie",
            "unite",
            "prix_unitaire",
            "statut",
        ])
    }

    #[test]
    fn test_parse_article_row_complete() {
        let headers = article_headers();
        let record = record_from(&[
            "Cloison placo BA13",
            "Plâtrerie",
            "Cloisons",
            "m²",
            "38,50",
            "actif",
        ]);

        let row = parse_article_row(&headers, &record).unwrap();
        assert_eq!(row.designation, "Cloison placo BA13");
        assert_eq!(row.lot, "Plâtrerie");
        assert_eq!(row.sub_category.as_deref(), Some("Cloisons"));
        assert_eq!(row.unit, "m²");
        assert_eq!(row.unit_price, 38.50);
        assert_eq!(row.status.as_deref(), Some("actif"));
    }

    #[test]
    fn test_parse_article_row_optional_columns_empty() {
        let headers = article_headers();
        let record = record_from(&["Peinture mate", "Peinture", "", "m²", "12.00", ""]);

        let row = parse_article_row(&headers, &record).unwrap();
        assert_eq!(row.sub_category, None);
        assert_eq!(row.status, None);
    }

    #[test]
    fn test_parse_article_row_missing_required() {
        let headers = article_headers();
        let record = record_from(&["", "Plâtrerie", "", "m²", "38.50", ""]);

        let err = parse_article_row(&headers, &record).unwrap_err();
        assert!(err.contains("designation"));
    }

    #[test]
    fn test_parse_article_row_bad_price() {
        let headers = article_headers();
        let record = record_from(&["Cloison", "Plâtrerie", "", "m²", "gratuit", ""]);

        let err = parse_article_row(&headers, &record).unwrap_err();
        assert!(err.contains("prix_unitaire"));
    }

    fn project_headers() -> StringRecord {
        record_from(&[
            "nom_projet",
            "client",
            "typologie",
            "reference_interne",
            "adresse",
            "date_livraison_prevue",
            "statut",
            "surface_totale",
        ])
    }

    #[test]
    fn test_parse_project_row_complete() {
        let headers = project_headers();
        let record = record_from(&[
            "Résidence Les Tilleuls",
            "SCI Bellevue",
            "Logement collectif",
            "REF-2024-017",
            "12 rue des Tilleuls, Nantes",
            "15/09/2025",
            "en cours",
            "1250,5",
        ]);

        let row = parse_project_row(&headers, &record).unwrap();
        assert_eq!(row.name, "Résidence Les Tilleuls");
        assert_eq!(row.status, ProjectStatus::InProgress);
        assert_eq!(
            row.expected_delivery,
            Some(NaiveDate::from_ymd_opt(2025, 9, 15).unwrap())
        );
        assert_eq!(row.total_surface, Some(1250.5));
    }

    #[test]
    fn test_parse_project_row_iso_date() {
        let headers = project_headers();
        let record = record_from(&[
            "Extension école",
            "Mairie de Rezé",
            "ERP",
            "",
            "",
            "2026-03-01",
            "",
            "",
        ]);

        let row = parse_project_row(&headers, &record).unwrap();
        assert_eq!(
            row.expected_delivery,
            Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
        );
        // Missing statut defaults to draft
        assert_eq!(row.status, ProjectStatus::Draft);
    }

    #[test]
    fn test_parse_project_row_missing_required() {
        let headers = project_headers();
        let record = record_from(&["Maison", "", "Individuel", "", "", "", "", ""]);

        let err = parse_project_row(&headers, &record).unwrap_err();
        assert!(err.contains("client"));
    }

    #[test]
    fn test_parse_project_row_invalid_status() {
        let headers = project_headers();
        let record = record_from(&[
            "Maison", "Client", "Individuel", "", "", "", "suspendu", "",
        ]);

        let err = parse_project_row(&headers, &record).unwrap_err();
        assert!(err.contains("statut"));
    }
}
