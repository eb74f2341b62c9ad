//! Credential export after a full import run

use cell_import::adapters::identity::InMemoryIdentityProvisioner;
use cell_import::adapters::store::InMemoryStore;
use cell_import::core::export::{discard_passwords, export_credentials, CREDENTIALS_HEADER};
use cell_import::core::import::{ImportReport, ImportSettings};
use cell_import::core::pipeline::ImportPipeline;
use cell_import::core::progress::ProgressReporter;
use cell_import::domain::OrganizationId;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const FILE: &str = "geracao,celula,dia_semana,horario,lider_nome,lider_email,senha\n\
                    Azul,Esperança,quarta,19:30,Ana,ana@example.com,Segura@2024\n\
                    Azul,Vida Nova,sabado,16:00,Bruno,bruno@example.com,123\n\
                    Verde,Caminho,domingo,10:00,Carla,carla@example.com,\n";

fn created_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

async fn import(store: InMemoryStore, org: OrganizationId, text: &str) -> ImportReport {
    let pipeline = ImportPipeline::new(
        Arc::new(store),
        Arc::new(InMemoryIdentityProvisioner::new()),
        ImportSettings::default(),
    );
    pipeline
        .import(&org, text, Arc::new(ProgressReporter::new()))
        .await
        .unwrap()
}

fn read_records(path: &Path) -> Vec<csv::StringRecord> {
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);

    let mut reader = csv::Reader::from_reader(&bytes[3..]);
    let headers: Vec<String> = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(headers, CREDENTIALS_HEADER);

    reader.records().map(|r| r.unwrap()).collect()
}

#[tokio::test]
async fn test_export_after_import() {
    let org = OrganizationId::generate();
    let store = InMemoryStore::new().with_leader_email(org, "carla@example.com");
    let mut report = import(store, org, FILE).await;
    assert_eq!(report.credentials_pending(), 2);

    let export = export_credentials(&report.results, created_at()).unwrap();
    assert_eq!(export.rows, 3);
    assert_eq!(export.passwords, 2);
    assert_eq!(report.credentials_pending(), 2);

    let dir = TempDir::new().unwrap();
    let path = export.write_to_dir(dir.path()).unwrap();
    assert!(path.ends_with("credenciais_lideres_2024-03-09_093000.csv"));

    assert_eq!(discard_passwords(&mut report.results), 2);
    assert_eq!(report.credentials_pending(), 0);

    let records = read_records(&path);
    assert_eq!(records.len(), 3);

    // Ana's own password, Bruno's too short so the default, Carla failed
    assert_eq!(&records[0][2], "Segura@2024");
    assert_eq!(&records[1][2], "Celula@2024");
    assert_eq!(&records[2][2], "");
    assert_eq!(&records[2][5], "error");
    assert!(records[2][6].contains("already registered"));
}

#[tokio::test]
async fn test_two_runs_on_the_same_day_keep_both_exports() {
    let dir = TempDir::new().unwrap();
    let org = OrganizationId::generate();

    let first_file = "geracao,celula,dia_semana,horario,lider_nome,lider_email,senha\n\
                      Azul,Esperança,quarta,19:30,Ana,ana@example.com,Primeira@1\n";
    let second_file = "geracao,celula,dia_semana,horario,lider_nome,lider_email,senha\n\
                       Azul,Vida Nova,sabado,16:00,Bruno,bruno@example.com,Segunda@2\n";

    let mut paths = Vec::new();
    for text in [first_file, second_file] {
        let mut report = import(InMemoryStore::new(), org, text).await;
        let export = export_credentials(&report.results, created_at()).unwrap();
        paths.push(export.write_to_dir(dir.path()).unwrap());
        assert_eq!(discard_passwords(&mut report.results), 1);
    }

    assert_ne!(paths[0], paths[1]);
    assert_eq!(&read_records(&paths[0])[0][2], "Primeira@1");
    assert_eq!(&read_records(&paths[1])[0][2], "Segunda@2");
}

#[tokio::test]
async fn test_failed_cell_batch_exports_no_passwords() {
    let org = OrganizationId::generate();
    let store = InMemoryStore::new().fail_cell_batch("disk full");
    let report = import(store, org, FILE).await;

    let export = export_credentials(&report.results, created_at()).unwrap();
    assert_eq!(export.passwords, 0);

    let dir = TempDir::new().unwrap();
    let records = read_records(&export.write_to_dir(dir.path()).unwrap());
    for record in &records {
        assert_eq!(&record[2], "");
        assert_eq!(&record[5], "error");
    }
    assert!(!export.content().contains("Segura@2024"));
}
