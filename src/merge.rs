//! Post-hoc merge of analysis artifacts into an existing summary CSV.
//!
//! Repair/backfill tool: given a directory of `<stem>.analysis.json`
//! artifacts and a CSV that already has a `Filename` column, overwrite the
//! description/question columns of each row whose `Filename` equals
//! `<artifact-base-name>.csv`. Rows with no matching artifact are left
//! untouched. The pipeline's own summary remains authoritative for a run;
//! this exists for summaries produced before annotation or edited by hand.

use crate::annotate::{AnalysisResult, RawQuestions, parse};
use crate::error::{Result, ResultExt as _, ScribeError};
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

/// Columns written (and created if absent) by the merge.
const MERGE_COLUMNS: [&str; 5] = [
    "Description",
    "Questions",
    "Full_Description",
    "Full_Questions",
    "Raw_JSON",
];

/// Outcome of one merge invocation.
#[derive(Debug)]
pub struct MergeReport {
    pub artifacts_found: usize,
    pub rows_updated: usize,
}

/// Merge every artifact under `artifacts_dir` into `csv_path`, writing the
/// result to `output_path`.
///
/// # Errors
///
/// Fails fast (no partial output) when the CSV cannot be read or lacks a
/// `Filename` column; individual unreadable artifacts are logged and
/// skipped.
pub fn merge_artifacts(
    artifacts_dir: &Path,
    csv_path: &Path,
    output_path: &Path,
) -> Result<MergeReport> {
    if !artifacts_dir.is_dir() {
        return Err(ScribeError::InvalidPath(format!(
            "not a directory: {}",
            artifacts_dir.display()
        )));
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to read CSV: {}", csv_path.display()))?;

    let mut headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(str::to_owned)
        .collect();

    let filename_idx = headers
        .iter()
        .position(|h| h == "Filename")
        .ok_or_else(|| {
            ScribeError::Config("CSV file does not have a 'Filename' column".to_owned())
        })?;

    // Ensure the merge target columns exist, appending any that are missing.
    for col in MERGE_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            headers.push(col.to_owned());
        }
    }
    let column_idx: HashMap<&str, usize> = MERGE_COLUMNS
        .iter()
        .map(|&c| (c, headers.iter().position(|h| h == c).expect("appended above")))
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read CSV row")?;
        let mut row: Vec<String> = record.iter().map(str::to_owned).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    let mut artifacts_found = 0;
    let mut rows_updated = 0;

    for entry in WalkDir::new(artifacts_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        artifacts_found += 1;

        let (base_name, result, raw_json) = match load_artifact(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!("Error processing {}: {e}", path.display());
                continue;
            }
        };

        let target = format!("{base_name}.csv");
        tracing::info!("Processing: {} (looking for {target})", path.display());

        let questions_display = questions_display(&result);
        let full_questions = serde_json::json!({
            "administrative_questions": result.administrative_questions,
            "research_questions": result.research_questions,
            "clinical_questions": result.clinical_questions,
        })
        .to_string();

        let mut matched = false;
        for row in rows.iter_mut().filter(|r| r[filename_idx] == target) {
            row[column_idx["Description"]] = result.description.clone();
            row[column_idx["Questions"]] = questions_display.clone();
            row[column_idx["Full_Description"]] = result.description.clone();
            row[column_idx["Full_Questions"]] = full_questions.clone();
            row[column_idx["Raw_JSON"]] = raw_json.clone();
            rows_updated += 1;
            matched = true;
        }

        if !matched {
            tracing::info!("No matching row found for {target}");
        }
    }

    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("Failed to create output CSV: {}", output_path.display()))?;
    writer.write_record(&headers).context("Failed to write header")?;
    for row in &rows {
        writer.write_record(row).context("Failed to write row")?;
    }
    writer.flush().context("Failed to flush output CSV")?;

    Ok(MergeReport {
        artifacts_found,
        rows_updated,
    })
}

/// Read one artifact, returning its base name (stem up to the first dot),
/// the parsed result, and the compact raw JSON.
fn load_artifact(path: &Path) -> Result<(String, AnalysisResult, String)> {
    let stem = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    // 'admissions.analysis.json' -> 'admissions'
    let base_name = stem.split('.').next().unwrap_or(&stem).to_owned();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse artifact: {}", path.display()))?;
    let raw_json = value.to_string();

    let description = value
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_owned();
    let questions = parse(RawQuestions::from(value));

    let result = AnalysisResult {
        description,
        administrative_questions: questions.administrative,
        research_questions: questions.research,
        clinical_questions: questions.clinical,
    };

    Ok((base_name, result, raw_json))
}

fn questions_display(result: &AnalysisResult) -> String {
    parse(RawQuestions::from(serde_json::json!({
        "administrative_questions": result.administrative_questions,
        "research_questions": result.research_questions,
        "clinical_questions": result.clinical_questions,
    })))
    .display
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_artifact(dir: &Path, name: &str, json: &str) {
        std::fs::write(dir.join(name), json).unwrap();
    }

    fn read_rows(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let headers = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_owned)
            .collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_owned).collect())
            .collect();
        (headers, rows)
    }

    #[test]
    fn test_merge_updates_matching_rows_only() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(
            dir.path(),
            "admissions.analysis.json",
            r#"{"description":"Admissions data.","administrative_questions":["A?"],"research_questions":[],"clinical_questions":["C?"]}"#,
        );

        let csv_path = dir.path().join("summary.csv");
        std::fs::write(
            &csv_path,
            "Filename,Description\nadmissions.csv,old\nlabs.csv,untouched\n",
        )
        .unwrap();

        let out_path = dir.path().join("merged.csv");
        let report = merge_artifacts(dir.path(), &csv_path, &out_path).unwrap();
        assert_eq!(report.artifacts_found, 1);
        assert_eq!(report.rows_updated, 1);

        let (headers, rows) = read_rows(&out_path);
        assert!(headers.contains(&"Full_Questions".to_owned()));

        let desc_idx = headers.iter().position(|h| h == "Description").unwrap();
        assert_eq!(rows[0][desc_idx], "Admissions data.");
        assert_eq!(rows[1][desc_idx], "untouched");

        let q_idx = headers.iter().position(|h| h == "Questions").unwrap();
        assert!(rows[0][q_idx].contains("- A?"));
        assert!(rows[0][q_idx].contains("Clinical Questions:"));
        assert!(rows[1][q_idx].is_empty());
    }

    #[test]
    fn test_merge_requires_filename_column() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("summary.csv");
        std::fs::write(&csv_path, "Name,Description\nx.csv,d\n").unwrap();

        let err = merge_artifacts(dir.path(), &csv_path, &dir.path().join("out.csv"))
            .unwrap_err();
        assert!(matches!(err, ScribeError::Config(_)));
    }

    #[test]
    fn test_unreadable_artifact_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "broken.analysis.json", "{not json");

        let csv_path = dir.path().join("summary.csv");
        std::fs::write(&csv_path, "Filename\nbroken.csv\n").unwrap();

        let out_path = dir.path().join("merged.csv");
        let report = merge_artifacts(dir.path(), &csv_path, &out_path).unwrap();
        assert_eq!(report.artifacts_found, 1);
        assert_eq!(report.rows_updated, 0);
        assert!(out_path.exists());
    }
}
