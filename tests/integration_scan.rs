//! Integration tests for the full scan pipeline.
//!
//! These drive the scanner end to end over fixture trees built in temp
//! directories, with a scripted chat service standing in for the generation
//! API.

use anyhow::Result;
use flate2::{Compression, write::GzEncoder};
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tablescribe::ai::ChatService;
use tablescribe::annotate::{AnalysisResult, Annotator};
use tablescribe::config::GenerationConfig;
use tablescribe::pipeline::{DirectoryScanner, FileKind, FileHandler, SummaryTable, create_run_folder};

const FENCED_QUESTIONS: &str = "```json\n{\"administrative_questions\":[\"Q1?\"],\"research_questions\":[],\"clinical_questions\":[\"Q2?\"]}\n```";

/// Scripted generation service. Distinguishes the two stages by their system
/// prompts; optionally fails the description stage.
struct ScriptedChat {
    description: &'static str,
    questions: &'static str,
    fail_describe: bool,
}

impl ScriptedChat {
    fn happy() -> Self {
        Self {
            description: "One row per hospital admission.",
            questions: FENCED_QUESTIONS,
            fail_describe: false,
        }
    }
}

impl ChatService for ScriptedChat {
    async fn complete(
        &self,
        system_prompt: &str,
        _user_prompt: &str,
        _temperature: f32,
    ) -> Result<String> {
        if system_prompt.contains("comprehensive description") {
            if self.fail_describe {
                anyhow::bail!("service unavailable");
            }
            Ok(self.description.to_owned())
        } else {
            Ok(self.questions.to_owned())
        }
    }
}

fn scanner_with(chat: ScriptedChat, run_folder: PathBuf) -> DirectoryScanner<ScriptedChat> {
    let config = GenerationConfig::default();
    let annotator = Annotator::new(chat, config.clone());
    DirectoryScanner::new(FileHandler::new(annotator, run_folder, config.sample_rows))
}

fn write_gz(path: &Path, contents: &[u8]) {
    let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    encoder.write_all(contents).unwrap();
    encoder.finish().unwrap();
}

/// admissions.csv (3 columns, 25 rows) + labs.csv.gz (2 columns, 5 rows)
/// + readme.txt.
fn build_fixture_tree(dir: &Path) {
    let mut admissions = String::from("subject_id,hadm_id,diagnosis\n");
    for i in 0..25 {
        admissions.push_str(&format!("{i},{},sepsis\n", 1000 + i));
    }
    std::fs::write(dir.join("admissions.csv"), admissions).unwrap();

    let labs = "itemid,value\n1,7.4\n2,140\n3,4.1\n4,98\n5,1.2\n";
    write_gz(&dir.join("labs.csv.gz"), labs.as_bytes());

    std::fs::write(dir.join("readme.txt"), "documentation, not data").unwrap();
}

async fn scan_fixture(input: &Path, runs_base: &Path) -> (SummaryTable, PathBuf) {
    let run_folder = create_run_folder(runs_base).unwrap();
    let scanner = scanner_with(ScriptedChat::happy(), run_folder.clone());
    let table = scanner.scan(input).await.unwrap();
    (table, run_folder)
}

#[tokio::test]
async fn test_mixed_directory_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir(&input).unwrap();
    build_fixture_tree(&input);

    let (table, run_folder) = scan_fixture(&input, dir.path()).await;

    // readme.txt silently skipped
    assert_eq!(table.len(), 2);
    assert_eq!(table.analyzed_count(), 2);

    let records = table.records();
    assert_eq!(records[0].filename, "admissions.csv");
    assert_eq!(records[0].kind, FileKind::Csv);
    assert_eq!(records[1].filename, "labs.csv");
    assert_eq!(records[1].kind, FileKind::CsvFromArchive);

    // Both artifacts exist and parse back to the expected partition
    assert!(run_folder.join("admissions.analysis.json").exists());
    let artifact = std::fs::read_to_string(run_folder.join("labs.analysis.json")).unwrap();
    let result: AnalysisResult = serde_json::from_str(&artifact).unwrap();
    assert_eq!(result.administrative_questions, vec!["Q1?"]);
    assert!(result.research_questions.is_empty());
    assert_eq!(result.clinical_questions, vec!["Q2?"]);

    // Question count is the sum of the three category lengths
    assert_eq!(records[0].question_count, Some(2));

    // Inputs are co-located with outputs in the run folder
    assert!(run_folder.join("admissions.csv").exists());
    assert!(run_folder.join("labs.csv").exists());
}

#[tokio::test]
async fn test_scan_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir_all(input.join("ward_a")).unwrap();
    std::fs::create_dir_all(input.join("ward_b")).unwrap();
    build_fixture_tree(&input);
    // Duplicate filename in a subdirectory is preserved, not merged
    std::fs::write(input.join("ward_a/admissions.csv"), "a,b\n1,2\n").unwrap();
    std::fs::write(input.join("ward_b/vitals.csv"), "hr,bp\n80,120\n").unwrap();

    let runs_a = dir.path().join("runs_a");
    let runs_b = dir.path().join("runs_b");
    let (first, _) = scan_fixture(&input, &runs_a).await;
    let (second, _) = scan_fixture(&input, &runs_b).await;

    let order = |t: &SummaryTable| -> Vec<(String, &'static str)> {
        t.records()
            .iter()
            .map(|r| (r.filename.clone(), r.kind.label()))
            .collect()
    };
    assert_eq!(order(&first), order(&second));
    assert_eq!(first.len(), 4);

    let names: Vec<String> = first.records().iter().map(|r| r.filename.clone()).collect();
    assert_eq!(names.iter().filter(|n| *n == "admissions.csv").count(), 2);
}

#[tokio::test]
async fn test_archive_with_non_table_contents() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir(&input).unwrap();
    write_gz(&input.join("notes.txt.gz"), b"free-text discharge notes");

    let (table, _) = scan_fixture(&input, dir.path()).await;

    assert_eq!(table.len(), 1);
    let record = &table.records()[0];
    assert_eq!(record.kind, FileKind::ExtractedNonCsv);
    assert_eq!(record.filename, "notes.txt");
    assert!(record.description.is_empty());
    assert!(record.administrative_questions.is_empty());
    assert_eq!(record.analysis_path, "N/A");
    assert_eq!(table.analyzed_count(), 0);
}

#[tokio::test]
async fn test_malformed_table_degrades_to_error_record() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir(&input).unwrap();
    // Ragged row: more fields than the header declares
    std::fs::write(input.join("broken.csv"), "a,b\n1,2,3,4,5\n").unwrap();
    std::fs::write(input.join("fine.csv"), "a,b\n1,2\n").unwrap();

    let (table, _) = scan_fixture(&input, dir.path()).await;

    // The bad file degrades to one error record; the scan continues
    assert_eq!(table.len(), 2);
    assert_eq!(table.records()[0].kind, FileKind::CsvError);
    assert!(table.records()[0].description.is_empty());
    assert_eq!(table.records()[1].kind, FileKind::Csv);
    assert_eq!(table.analyzed_count(), 1);
}

#[tokio::test]
async fn test_describe_failure_still_yields_csv_record() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir(&input).unwrap();
    std::fs::write(input.join("vitals.csv"), "hr,bp\n80,120\n").unwrap();

    let run_folder = create_run_folder(dir.path()).unwrap();
    let scanner = scanner_with(
        ScriptedChat {
            description: "",
            questions: FENCED_QUESTIONS,
            fail_describe: true,
        },
        run_folder.clone(),
    );
    let table = scanner.scan(&input).await.unwrap();

    let record = &table.records()[0];
    assert_eq!(record.kind, FileKind::Csv);
    assert!(record.description.starts_with("Error generating description:"));
    // Stage two still ran against the error-marker description
    assert_eq!(record.question_count, Some(2));
    assert!(run_folder.join("vitals.analysis.json").exists());
}

#[tokio::test]
async fn test_summary_csv_written_once_at_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir(&input).unwrap();
    build_fixture_tree(&input);

    let (table, run_folder) = scan_fixture(&input, dir.path()).await;
    let summary_path = run_folder.join("analysis_summary.csv");
    table.write_csv(&summary_path).unwrap();

    let mut reader = csv::Reader::from_path(&summary_path).unwrap();
    let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][1], "CSV");
    assert_eq!(&rows[1][1], "CSV from GZ");
}

#[tokio::test]
async fn test_scan_of_missing_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let run_folder = create_run_folder(dir.path()).unwrap();
    let scanner = scanner_with(ScriptedChat::happy(), run_folder);

    let result = scanner.scan(&dir.path().join("absent")).await;
    assert!(result.is_err());
}
