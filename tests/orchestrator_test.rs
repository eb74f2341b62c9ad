//! End-to-end import runs against the in-memory store and identity provider

use cell_import::adapters::identity::{IdentityProvisioner, InMemoryIdentityProvisioner};
use cell_import::adapters::store::{InMemoryStore, OrganizationStore};
use cell_import::core::import::{ImportOrchestrator, ImportSettings, RunContext, Stage};
use cell_import::core::ingest::validate_csv;
use cell_import::core::pipeline::{run_token, ImportPipeline};
use cell_import::core::progress::ProgressReporter;
use cell_import::core::reconcile::summarize;
use async_trait::async_trait;
use cell_import::adapters::identity::ProvisionedAccount;
use cell_import::domain::{
    CellImportError, GenerationId, GenerationRef, ImportStatus, LeaderAccountRequest,
    OrganizationId,
};
use secrecy::ExposeSecret;
use std::sync::Arc;

const HEADER: &str = "geracao,cor_geracao,celula,dia_semana,horario,endereco,publico_alvo,lider_nome,lider_email,lider_telefone,senha";

fn csv(rows: &[&str]) -> String {
    let mut text = format!("{HEADER}\n");
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

fn pipeline(
    store: &Arc<InMemoryStore>,
    identity: &Arc<InMemoryIdentityProvisioner>,
) -> ImportPipeline {
    ImportPipeline::new(
        Arc::clone(store) as Arc<dyn OrganizationStore>,
        Arc::clone(identity) as Arc<dyn IdentityProvisioner>,
        ImportSettings::default(),
    )
}

async fn run(
    store: &Arc<InMemoryStore>,
    identity: &Arc<InMemoryIdentityProvisioner>,
    org: &OrganizationId,
    text: &str,
) -> cell_import::domain::Result<cell_import::core::import::ImportReport> {
    pipeline(store, identity)
        .import(org, text, Arc::new(ProgressReporter::new()))
        .await
}

#[tokio::test]
async fn test_two_rows_same_new_generation() {
    let org = OrganizationId::generate();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(InMemoryIdentityProvisioner::new());
    let text = csv(&[
        "Azul,#1D4ED8,Esperança,quarta,19:30,,,Ana,ana@example.com,,",
        "Azul,#1D4ED8,Vida Nova,sabado,16:00,,,Bruno,bruno@example.com,,",
    ]);

    let report = run(&store, &identity, &org, &text).await.unwrap();

    assert_eq!(store.inserted_generations().len(), 1);
    assert_eq!(identity.created().len(), 2);
    assert_eq!(identity.calls(), 1);
    assert_eq!(store.inserted_cells().len(), 2);
    assert_eq!(store.cell_batches(), 1);
    assert_eq!(store.inserted_links().len(), 2);

    assert_eq!(report.total_rows, 2);
    assert_eq!(report.successful_rows, 2);
    assert!(report.is_successful());
    assert!(report.stage_errors.is_empty());
    assert!(report
        .results
        .iter()
        .all(|r| r.status == ImportStatus::Success && r.password.is_present()));
    assert_eq!(report.counters.generations_created, 1);
    assert_eq!(report.counters.accounts_provisioned, 2);
    assert_eq!(report.counters.cells_created, 2);
    assert_eq!(report.counters.links_created, 2);
}

#[tokio::test]
async fn test_existing_email_is_reported_and_skipped() {
    let org = OrganizationId::generate();
    let store = Arc::new(InMemoryStore::new().with_leader_email(org, "ana@example.com"));
    let identity = Arc::new(InMemoryIdentityProvisioner::new());
    let text = csv(&["Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,"]);

    let report = run(&store, &identity, &org, &text).await.unwrap();

    assert!(identity.created().is_empty());
    assert!(store.inserted_cells().is_empty());
    assert_eq!(report.results.len(), 1);

    let result = &report.results[0];
    assert_eq!(result.status, ImportStatus::Error);
    assert!(result
        .message
        .as_deref()
        .unwrap()
        .contains("already registered"));
    assert!(!result.password.is_present());
}

#[tokio::test]
async fn test_provisioning_failure_for_one_email() {
    let org = OrganizationId::generate();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(
        InMemoryIdentityProvisioner::new().fail_email("bruno@example.com", "weak password"),
    );
    let text = csv(&[
        "Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,",
        "Azul,,Vida Nova,sabado,16:00,,,Bruno,bruno@example.com,,",
    ]);

    let report = run(&store, &identity, &org, &text).await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].status, ImportStatus::Success);
    assert_eq!(report.results[1].status, ImportStatus::Error);
    assert!(report.results[1]
        .message
        .as_deref()
        .unwrap()
        .contains("weak password"));

    let cells = store.inserted_cells();
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].name, "Esperança");
    assert_eq!(store.inserted_links().len(), 1);
    assert!(report
        .stage_errors
        .iter()
        .any(|e| e.stage == Stage::Provisioning));
}

#[tokio::test]
async fn test_header_only_file_never_starts() {
    let org = OrganizationId::generate();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(InMemoryIdentityProvisioner::new());
    let text = csv(&[]);

    let validated = validate_csv(&text);
    assert_eq!(validated.errors.len(), 1);
    assert!(validated.errors[0].is_file_level());
    assert!(validated.rows.is_empty());

    let result = run(&store, &identity, &org, &text).await;
    assert!(matches!(result, Err(CellImportError::Validation(_))));
    assert_eq!(identity.calls(), 0);
    assert!(!store.is_locked(&org));
}

#[tokio::test]
async fn test_invalid_rows_block_the_import() {
    let org = OrganizationId::generate();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(InMemoryIdentityProvisioner::new());
    let text = csv(&[
        "Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,",
        "Azul,,Vida Nova,feriado,16:00,,,Bruno,bruno@example.com,,",
    ]);

    let result = run(&store, &identity, &org, &text).await;
    assert!(matches!(result, Err(CellImportError::Validation(_))));
    assert!(store.inserted_generations().is_empty());
    assert_eq!(identity.calls(), 0);
}

#[tokio::test]
async fn test_every_row_yields_exactly_one_result() {
    let org = OrganizationId::generate();
    let store = Arc::new(
        InMemoryStore::new()
            .with_leader_email(org, "carla@example.com")
            .fail_link("Vida Nova"),
    );
    let identity = Arc::new(
        InMemoryIdentityProvisioner::new()
            .fail_email("davi@example.com", "rejected")
            .omit_email("eva@example.com"),
    );
    let text = csv(&[
        "Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,",
        "Azul,,Vida Nova,sabado,16:00,,,Bruno,bruno@example.com,,",
        "Verde,,Caminho,domingo,10:00,,,Carla,carla@example.com,,",
        "Verde,,Luz,segunda,20:00,,,Davi,davi@example.com,,",
        "Verde,,Fonte,terca,20:00,,,Eva,eva@example.com,,",
    ]);

    let report = run(&store, &identity, &org, &text).await.unwrap();

    assert_eq!(report.results.len(), 5);
    let rows: Vec<usize> = report.results.iter().map(|r| r.row).collect();
    let mut sorted = rows.clone();
    sorted.sort_unstable();
    assert_eq!(rows, sorted);
    assert_eq!(report.successful_rows, 1);
    assert_eq!(report.failed_rows, 4);
    assert_eq!(report.successful_rows + report.failed_rows, report.total_rows);
}

#[tokio::test]
async fn test_existing_generation_is_reused() {
    let org = OrganizationId::generate();
    let existing = GenerationRef {
        id: GenerationId::generate(),
        name: "Azul".to_string(),
    };
    let store = Arc::new(InMemoryStore::new().with_generation(org, existing.clone()));
    let identity = Arc::new(InMemoryIdentityProvisioner::new());
    let text = csv(&[
        "Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,",
        "Verde,,Vida Nova,sabado,16:00,,,Bruno,bruno@example.com,,",
    ]);

    let report = run(&store, &identity, &org, &text).await.unwrap();
    assert!(report.is_successful());

    let generations = store.inserted_generations();
    assert_eq!(generations.len(), 1);
    assert_eq!(generations[0].name, "Verde");

    let cells = store.inserted_cells();
    let esperanca = cells.iter().find(|c| c.name == "Esperança").unwrap();
    assert_eq!(esperanca.generation_id, existing.id);
}

#[tokio::test]
async fn test_generation_failure_aborts_the_run() {
    let org = OrganizationId::generate();
    let store = Arc::new(InMemoryStore::new().fail_generation("Verde"));
    let identity = Arc::new(InMemoryIdentityProvisioner::new());
    let text = csv(&[
        "Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,",
        "Verde,,Vida Nova,sabado,16:00,,,Bruno,bruno@example.com,,",
    ]);

    let result = run(&store, &identity, &org, &text).await;

    match result {
        Err(CellImportError::Import(message)) => assert!(message.contains("Verde")),
        other => panic!("expected import error, got {other:?}"),
    }
    assert_eq!(identity.calls(), 0);
    assert!(store.inserted_cells().is_empty());
    assert!(!store.is_locked(&org), "lock must be released after an abort");
}

#[tokio::test]
async fn test_cell_batch_failure_marks_rows_failed() {
    let org = OrganizationId::generate();
    let store = Arc::new(InMemoryStore::new().fail_cell_batch("disk full"));
    let identity = Arc::new(InMemoryIdentityProvisioner::new());
    let text = csv(&[
        "Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,",
        "Azul,,Vida Nova,sabado,16:00,,,Bruno,bruno@example.com,,",
    ]);

    let report = run(&store, &identity, &org, &text).await.unwrap();

    assert_eq!(report.failed_rows, 2);
    for result in &report.results {
        assert_eq!(result.status, ImportStatus::Error);
        assert!(result
            .message
            .as_deref()
            .unwrap()
            .contains("cell creation failed"));
        // The account exists but only successful rows hand out a password
        assert!(result.leader_id.is_some());
        assert!(!result.password.is_present());
    }
    assert!(store.inserted_links().is_empty());
    assert!(report.stage_errors.iter().any(|e| e.stage == Stage::Cells));
}

#[tokio::test]
async fn test_link_failure_is_reflected_in_the_row() {
    let org = OrganizationId::generate();
    let store = Arc::new(InMemoryStore::new().fail_profile_update("Vida Nova"));
    let identity = Arc::new(InMemoryIdentityProvisioner::new());
    let text = csv(&[
        "Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,",
        "Azul,,Vida Nova,sabado,16:00,,,Bruno,bruno@example.com,,",
    ]);

    let report = run(&store, &identity, &org, &text).await.unwrap();

    assert_eq!(store.inserted_cells().len(), 2);
    assert_eq!(report.results[0].status, ImportStatus::Success);
    let failed = &report.results[1];
    assert_eq!(failed.status, ImportStatus::Error);
    assert!(failed
        .message
        .as_deref()
        .unwrap()
        .contains("leader link failed"));
    assert!(failed.leader_id.is_some());
    assert!(!failed.password.is_present());
    assert!(report.results[0].password.is_present());
    assert!(report.stage_errors.iter().any(|e| e.stage == Stage::Links));
}

#[tokio::test]
async fn test_identity_call_failure_fails_new_rows_only() {
    let org = OrganizationId::generate();
    let store = Arc::new(InMemoryStore::new().with_leader_email(org, "ana@example.com"));
    let identity = Arc::new(InMemoryIdentityProvisioner::new().fail_call("connection refused"));
    let text = csv(&[
        "Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,",
        "Azul,,Vida Nova,sabado,16:00,,,Bruno,bruno@example.com,,",
    ]);

    let report = run(&store, &identity, &org, &text).await.unwrap();

    assert_eq!(report.failed_rows, 2);
    assert!(report.results[0]
        .message
        .as_deref()
        .unwrap()
        .contains("already registered"));
    assert!(report.results[1]
        .message
        .as_deref()
        .unwrap()
        .contains("connection refused"));
    assert!(store.inserted_cells().is_empty());
    // Generations were created before provisioning and are not rolled back
    assert_eq!(store.inserted_generations().len(), 1);
}

#[tokio::test]
async fn test_concurrent_import_is_rejected_and_lock_released() {
    let org = OrganizationId::generate();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(InMemoryIdentityProvisioner::new());
    let text = csv(&["Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,"]);

    assert!(store
        .try_acquire_import_lock(&org, "another-run", 600)
        .await
        .unwrap());
    let result = run(&store, &identity, &org, &text).await;
    assert!(matches!(result, Err(CellImportError::ImportInProgress(_))));
    assert_eq!(identity.calls(), 0);

    store.release_import_lock(&org, "another-run").await.unwrap();
    let report = run(&store, &identity, &org, &text).await.unwrap();
    assert!(report.is_successful());
    assert_eq!(report.run_token, run_token(&text));
    assert!(!store.is_locked(&org));
}

/// Provider that lets a second run of the same file take over the lock mid-run
struct TakeoverDuringProvisioning {
    store: Arc<InMemoryStore>,
    token: String,
    inner: InMemoryIdentityProvisioner,
}

#[async_trait]
impl IdentityProvisioner for TakeoverDuringProvisioning {
    async fn provision_leaders(
        &self,
        organization: &OrganizationId,
        accounts: &[LeaderAccountRequest],
    ) -> cell_import::domain::Result<Vec<ProvisionedAccount>> {
        assert!(self
            .store
            .try_acquire_import_lock(organization, &self.token, 0)
            .await?);
        self.inner.provision_leaders(organization, accounts).await
    }
}

#[tokio::test]
async fn test_finished_run_does_not_release_a_lock_taken_over_by_another() {
    let org = OrganizationId::generate();
    let store = Arc::new(InMemoryStore::new());
    let text = csv(&["Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,"]);
    let identity = Arc::new(TakeoverDuringProvisioning {
        store: Arc::clone(&store),
        token: run_token(&text),
        inner: InMemoryIdentityProvisioner::new(),
    });

    let pipeline = ImportPipeline::new(
        Arc::clone(&store) as Arc<dyn OrganizationStore>,
        identity as Arc<dyn IdentityProvisioner>,
        ImportSettings::default(),
    );
    let report = pipeline
        .import(&org, &text, Arc::new(ProgressReporter::new()))
        .await
        .unwrap();

    assert!(report.is_successful());
    assert_eq!(report.run_token, run_token(&text));
    assert!(store.is_locked(&org), "the other run still holds its lock");

    store
        .release_import_lock(&org, &run_token(&text))
        .await
        .unwrap();
    assert!(!store.is_locked(&org));
}

#[tokio::test]
async fn test_progress_reaches_each_stage_boundary() {
    let org = OrganizationId::generate();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(InMemoryIdentityProvisioner::new());
    let text = csv(&["Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,"]);
    let progress = Arc::new(ProgressReporter::new());
    let mut percent = progress.subscribe();

    pipeline(&store, &identity)
        .import(&org, &text, Arc::clone(&progress))
        .await
        .unwrap();

    assert_eq!(progress.percent(), 100);
    assert_eq!(*percent.borrow_and_update(), 100);
    assert!(progress.len() >= 4);
}

#[tokio::test]
async fn test_orchestrator_can_run_without_pipeline() {
    let org = OrganizationId::generate();
    let store: Arc<dyn OrganizationStore> = Arc::new(InMemoryStore::new());
    let text = csv(&["Azul,,Esperança,quarta,19:30,,,Ana,ana@example.com,,Segura@2024"]);
    let rows = validate_csv(&text).rows;
    let summary = summarize(store.as_ref(), &org, &rows).await.unwrap();

    let orchestrator = ImportOrchestrator::new(RunContext {
        organization: org,
        store,
        identity: Arc::new(InMemoryIdentityProvisioner::new()),
        settings: ImportSettings::default(),
        progress: Arc::new(ProgressReporter::new()),
    });
    let mut report = orchestrator.run(rows, summary, "token").await.unwrap();

    assert_eq!(report.run_token, "token");
    let password = report.results[0].password.take().unwrap();
    assert_eq!(password.expose_secret().as_str(), "Segura@2024");
    assert_eq!(report.credentials_pending(), 0);
}
