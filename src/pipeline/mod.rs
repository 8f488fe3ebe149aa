//! Pipeline Orchestrator
//!
//! Sequences the analysis stages for one project: structural analysis,
//! palette extraction, documentation generation, then background
//! enrichment (security scan, quality scan, retrieval indexing).
//!
//! ## Lifecycle
//!
//! `submit` atomically claims the project (at most one in-flight run per
//! project), spawns a detached task, and returns immediately. The task
//! walks the critical path; once documentation exists the project flips
//! to `completed` and stays externally visible while enrichment continues.
//!
//! ## Fault isolation
//!
//! Each non-critical stage is wrapped so its error is logged and the next
//! stage still runs. A critical-stage failure marks the project `failed`
//! with progress 0 and a bounded error message; background failures never
//! revert a `completed` project.

pub mod stage;

pub use stage::{PipelineStage, STAGES};

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::ai::{SharedEmbedder, SharedGenerator};
use crate::analyzer::{QualityScanner, SecurityScanner, StructureAnalyzer, extract_palette};
use crate::config::Config;
use crate::docs::{DocumentationBuilder, GeneratedDocs};
use crate::rag::RagIndexer;
use crate::storage::{
    ChunkStore, DocumentationStore, FindingStore, ImprovementStore, ObjectStore, ProjectStore,
    SharedDatabase,
};
use crate::types::{FileSet, Result, ScopeError};

/// Stage label written at the completed checkpoint
const LABEL_DOCS_READY: &str = "Documentation ready";
/// Final label when every background stage succeeded
const LABEL_ALL_COMPLETE: &str = "All analysis complete - chat ready";
/// Final label when indexing failed: documentation stays readable
const LABEL_CHAT_UNAVAILABLE: &str = "Documentation ready (chat unavailable)";

/// Orchestrates pipeline runs across projects.
///
/// Runs for different projects are independent; the only shared state is
/// the persisted project record, updated by primary key.
pub struct PipelineRunner {
    projects: ProjectStore,
    documentation: DocumentationStore,
    findings: FindingStore,
    improvements: ImprovementStore,
    doc_builder: DocumentationBuilder,
    security: SecurityScanner,
    quality: QualityScanner,
    indexer: RagIndexer,
    objects: Arc<dyn ObjectStore>,
    /// In-flight runs by project id, so callers can await completion
    runs: DashMap<Uuid, JoinHandle<()>>,
}

impl PipelineRunner {
    pub fn new(
        db: SharedDatabase,
        generator: SharedGenerator,
        embedder: SharedEmbedder,
        objects: Arc<dyn ObjectStore>,
        config: &Config,
    ) -> Arc<Self> {
        Arc::new(Self {
            projects: ProjectStore::new(db.clone()),
            documentation: DocumentationStore::new(db.clone()),
            findings: FindingStore::new(db.clone()),
            improvements: ImprovementStore::new(db.clone()),
            doc_builder: DocumentationBuilder::new(generator.clone()),
            security: SecurityScanner::new(generator.clone(), &config.scan),
            quality: QualityScanner::new(generator, &config.scan),
            indexer: RagIndexer::new(embedder, ChunkStore::new(db.clone())),
            objects,
            runs: DashMap::new(),
        })
    }

    /// Submit a project's FileSet for processing.
    ///
    /// Claims the run atomically (a second submission while the project
    /// is `processing` is refused with `AlreadyProcessing`), then spawns
    /// a detached task and returns without blocking on any stage.
    pub fn submit(self: &Arc<Self>, project_id: Uuid, files: FileSet) -> Result<()> {
        if files.is_empty() {
            return Err(ScopeError::InvalidInput(
                "No valid code files to process".to_string(),
            ));
        }

        self.projects.claim_processing(project_id)?;

        let runner = Arc::clone(self);
        let handle = tokio::spawn(async move {
            runner.run(project_id, files).await;
        });
        self.runs.insert(project_id, handle);

        info!("Pipeline started for project {}", project_id);
        Ok(())
    }

    /// Await the full run (including background stages) for a project.
    pub async fn wait(&self, project_id: Uuid) {
        if let Some((_, handle)) = self.runs.remove(&project_id)
            && let Err(e) = handle.await
        {
            error!("Pipeline task for {} panicked: {}", project_id, e);
        }
    }

    /// One complete run: critical path, checkpoint, then enrichment.
    async fn run(&self, project_id: Uuid, files: FileSet) {
        let docs = match self.critical_path(project_id, &files).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!("Pipeline failed for project {}: {}", project_id, e);
                if let Err(persist) = self.projects.fail(project_id, &e.to_string()) {
                    error!(
                        "Failed to record failure for project {}: {} (original error: {})",
                        project_id, persist, e
                    );
                }
                return;
            }
        };

        self.enrich(project_id, &files, &docs).await;
        info!("Project {} fully processed", project_id);
    }

    /// The hard dependencies: structural analysis and documentation
    /// generation. Any error here aborts the run. Ends by flipping the
    /// project to `completed`, the checkpoint after which consumers can
    /// read the documentation.
    async fn critical_path(&self, project_id: Uuid, files: &FileSet) -> Result<GeneratedDocs> {
        self.enter_stage(project_id, PipelineStage::Structure)?;
        let stats = StructureAnalyzer::analyze(files);
        self.projects.record_stats(project_id, &stats)?;

        self.enter_stage(project_id, PipelineStage::Palette)?;
        if let Err(e) = self.run_palette(project_id, files) {
            warn!("Color analysis failed for project {}: {}", project_id, e);
        }

        self.enter_stage(project_id, PipelineStage::Documentation)?;
        let project = self
            .projects
            .find(project_id)?
            .ok_or(ScopeError::ProjectNotFound(project_id))?;
        let docs = self.doc_builder.build(&project.name, files, &stats).await?;

        let generation_secs = (Utc::now() - project.created_at).num_seconds().max(0);
        self.documentation.create(
            project_id,
            &docs.markdown,
            &docs.sections,
            docs.word_count,
            Some(generation_secs),
        )?;
        self.objects
            .put(docs.markdown.as_bytes(), &documentation_key(project_id))?;

        self.projects.update_status(
            project_id,
            crate::types::ProjectStatus::Completed,
            100,
            LABEL_DOCS_READY,
        )?;
        info!(
            "Documentation ready for project {} - visible to consumers while enrichment continues",
            project_id
        );

        Ok(docs)
    }

    /// Best-effort background stages. Each is independently
    /// fault-isolated: one stage's error is logged and does not prevent
    /// the next stage from running, and none can revert `completed`.
    async fn enrich(&self, project_id: Uuid, files: &FileSet, docs: &GeneratedDocs) {
        if let Err(e) = self.run_security(project_id, files).await {
            warn!("Security analysis failed for project {}: {}", project_id, e);
        }

        if let Err(e) = self.run_quality(project_id, files).await {
            warn!("Quality analysis failed for project {}: {}", project_id, e);
        }

        let final_label = match self.indexer.reindex(project_id, files, &docs.sections).await {
            Ok(count) => {
                info!("Indexed {} chunks for project {}", count, project_id);
                LABEL_ALL_COMPLETE
            }
            Err(e) => {
                warn!("Embedding creation failed for project {}: {}", project_id, e);
                LABEL_CHAT_UNAVAILABLE
            }
        };

        if let Err(e) = self.projects.update_status(
            project_id,
            crate::types::ProjectStatus::Completed,
            100,
            final_label,
        ) {
            error!("Failed to write final status for project {}: {}", project_id, e);
        }
    }

    /// Write the stage's progress checkpoint and polling label.
    fn enter_stage(&self, project_id: Uuid, stage: PipelineStage) -> Result<()> {
        if let (Some(progress), Some(label)) = (stage.progress(), stage.label()) {
            self.projects.update_status(
                project_id,
                crate::types::ProjectStatus::Processing,
                progress,
                label,
            )?;
        }
        Ok(())
    }

    fn run_palette(&self, project_id: Uuid, files: &FileSet) -> Result<()> {
        let palette = extract_palette(files);
        if palette.colors.is_empty() {
            return Ok(());
        }
        info!(
            "Color palette analyzed for project {}: {} colors found",
            project_id,
            palette.colors.len()
        );
        self.projects
            .set_palette(project_id, &serde_json::to_value(&palette)?)
    }

    async fn run_security(&self, project_id: Uuid, files: &FileSet) -> Result<()> {
        // The full pipeline scans everything; caps apply to cheap paths only
        let findings = self.security.scan(project_id, files, None).await;
        self.findings.insert_many(&findings)?;

        let score = SecurityScanner::score(&findings);
        let vulnerability_count = SecurityScanner::vulnerability_count(&findings);
        self.projects
            .set_security(project_id, score, vulnerability_count)?;

        let snapshot = serde_json::json!({
            "findings": &findings,
            "security_score": score,
            "vulnerabilities_count": vulnerability_count,
            "analyzed_at": Utc::now().to_rfc3339(),
        });
        self.objects.put(
            snapshot.to_string().as_bytes(),
            &analysis_key(project_id, "security_findings.json"),
        )?;

        info!(
            "Security analysis completed for project {}: {} findings, score {}",
            project_id,
            findings.len(),
            score
        );
        Ok(())
    }

    async fn run_quality(&self, project_id: Uuid, files: &FileSet) -> Result<()> {
        let improvements = self.quality.scan(project_id, files, None).await;
        self.improvements.insert_many(&improvements)?;

        let snapshot = serde_json::json!({
            "improvements": &improvements,
            "total_improvements": improvements.len(),
            "analyzed_at": Utc::now().to_rfc3339(),
        });
        self.objects.put(
            snapshot.to_string().as_bytes(),
            &analysis_key(project_id, "code_improvements.json"),
        )?;

        info!(
            "Quality analysis completed for project {}: {} suggestions",
            project_id,
            improvements.len()
        );
        Ok(())
    }
}

fn documentation_key(project_id: Uuid) -> String {
    format!("projects/{}/documentation/generated_doc.md", project_id)
}

fn analysis_key(project_id: Uuid, filename: &str) -> String {
    format!("projects/{}/analysis/{}", project_id, filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{CompletionRequest, EmbeddingClient, TextGenerator};
    use crate::storage::{Database, LocalObjectStore};
    use crate::types::{ErrorCategory, ProjectStatus, SourceKind};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    const DOC_MARKDOWN: &str = "## Purpose and Objectives\nA small demo project that exists to \
        exercise the processing pipeline end to end.\n## Setup and Installation\nInstall nothing; \
        run everything. These sections are long enough to be indexed as chunks.\n";

    /// Routes prompts to canned responses by stage, optionally gating the
    /// security response behind a notification.
    struct RoutingGenerator {
        doc_fails: bool,
        security_gate: Option<Arc<Notify>>,
    }

    impl RoutingGenerator {
        fn happy() -> Self {
            Self {
                doc_fails: false,
                security_gate: None,
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                doc_fails: false,
                security_gate: Some(gate),
            }
        }

        fn failing_docs() -> Self {
            Self {
                doc_fails: true,
                security_gate: None,
            }
        }
    }

    #[async_trait]
    impl TextGenerator for RoutingGenerator {
        async fn complete(&self, request: &CompletionRequest) -> crate::types::Result<String> {
            if request.prompt.contains("security vulnerabilities") {
                if let Some(gate) = &self.security_gate {
                    gate.notified().await;
                }
                return Ok(r#"[{
                    "file_path": "src/auth.py",
                    "severity": "high",
                    "category": "auth",
                    "title": "Hardcoded secret",
                    "description": "A credential is embedded in source",
                    "recommendation": "Move it to configuration"
                }]"#
                .to_string());
            }
            if request.prompt.contains("quality improvements") {
                return Ok(r#"[{
                    "file_path": "src/auth.py",
                    "category": "readability",
                    "title": "Long function",
                    "description": "Function does too much",
                    "suggestion": "Split it",
                    "impact_level": "medium"
                }]"#
                .to_string());
            }
            if self.doc_fails {
                return Err(ScopeError::Generation {
                    category: ErrorCategory::Unknown,
                    message: "model unavailable".to_string(),
                });
            }
            Ok(DOC_MARKDOWN.to_string())
        }

        fn name(&self) -> &str {
            "routing"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    struct FakeEmbedder;

    #[async_trait]
    impl EmbeddingClient for FakeEmbedder {
        async fn embed(&self, text: &str) -> crate::types::Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> crate::types::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl EmbeddingClient for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> crate::types::Result<Vec<f32>> {
            Err(ScopeError::Embedding {
                category: ErrorCategory::Unknown,
                message: "embedding service down".to_string(),
            })
        }

        async fn embed_batch(&self, _texts: &[String]) -> crate::types::Result<Vec<Vec<f32>>> {
            Err(ScopeError::Embedding {
                category: ErrorCategory::Unknown,
                message: "embedding service down".to_string(),
            })
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct Harness {
        runner: Arc<PipelineRunner>,
        db: SharedDatabase,
        project_id: Uuid,
        _objects_dir: tempfile::TempDir,
    }

    fn harness(generator: SharedGenerator, embedder: SharedEmbedder) -> Harness {
        let db: SharedDatabase = Arc::new(Database::open_in_memory().unwrap());
        db.initialize().unwrap();
        let objects_dir = tempfile::tempdir().unwrap();
        let objects: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(objects_dir.path()));

        let runner = PipelineRunner::new(
            db.clone(),
            generator,
            embedder,
            objects,
            &Config::default(),
        );
        let project = ProjectStore::new(db.clone())
            .create("pipeline demo", SourceKind::Upload)
            .unwrap();

        Harness {
            runner,
            db,
            project_id: project.id,
            _objects_dir: objects_dir,
        }
    }

    fn small_fileset() -> FileSet {
        // Two plain text files: no README/config/entry-point matches
        [
            ("alpha.txt", "first plain file with some words in it"),
            ("beta.txt", "second plain file, also with words"),
        ]
        .into_iter()
        .collect()
    }

    fn project(h: &Harness) -> crate::types::Project {
        ProjectStore::new(h.db.clone())
            .find(h.project_id)
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_happy_path_end_to_end() {
        let h = harness(Arc::new(RoutingGenerator::happy()), Arc::new(FakeEmbedder));

        h.runner.submit(h.project_id, small_fileset()).unwrap();
        h.runner.wait(h.project_id).await;

        let p = project(&h);
        assert_eq!(p.status, ProjectStatus::Completed);
        assert_eq!(p.progress_percentage, 100);
        assert_eq!(p.progress_stage, LABEL_ALL_COMPLETE);
        assert_eq!(p.file_count, Some(2));
        assert!(p.processed_at.is_some());
        // Security scan persisted its aggregate: 100 - 10 for one high finding
        assert_eq!(p.security_score, Some(90));
        assert_eq!(p.vulnerabilities_count, Some(1));

        let doc = DocumentationStore::new(h.db.clone())
            .find_by_project(h.project_id)
            .unwrap()
            .unwrap();
        assert!(doc.markdown.contains("Project Statistics"));
        assert_eq!(doc.sections.len(), 2);

        let findings = FindingStore::new(h.db.clone())
            .list_by_project(h.project_id)
            .unwrap();
        assert_eq!(findings.len(), 1);

        let improvements = ImprovementStore::new(h.db.clone())
            .list_by_project(h.project_id)
            .unwrap();
        assert_eq!(improvements.len(), 1);

        let chunks = ChunkStore::new(h.db.clone());
        assert!(chunks.count_by_project(h.project_id).unwrap() > 0);
    }

    #[tokio::test]
    async fn test_completed_before_background_stages_finish() {
        let gate = Arc::new(Notify::new());
        let h = harness(
            Arc::new(RoutingGenerator::gated(gate.clone())),
            Arc::new(FakeEmbedder),
        );

        h.runner.submit(h.project_id, small_fileset()).unwrap();

        // Poll until the documentation checkpoint flips the project to
        // completed; the security scan is still parked on the gate.
        let mut completed = false;
        for _ in 0..500 {
            let p = project(&h);
            if p.status == ProjectStatus::Completed {
                assert_eq!(p.progress_percentage, 100);
                assert_eq!(p.progress_stage, LABEL_DOCS_READY);
                completed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(completed, "project never reached completed");

        // Documentation is readable now, before enrichment finished
        assert!(
            DocumentationStore::new(h.db.clone())
                .find_by_project(h.project_id)
                .unwrap()
                .is_some()
        );
        assert!(
            FindingStore::new(h.db.clone())
                .list_by_project(h.project_id)
                .unwrap()
                .is_empty()
        );

        gate.notify_one();
        h.runner.wait(h.project_id).await;

        let p = project(&h);
        assert_eq!(p.status, ProjectStatus::Completed);
        assert_eq!(p.progress_stage, LABEL_ALL_COMPLETE);
        assert_eq!(
            FindingStore::new(h.db.clone())
                .list_by_project(h.project_id)
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_documentation_failure_fails_project() {
        let h = harness(
            Arc::new(RoutingGenerator::failing_docs()),
            Arc::new(FakeEmbedder),
        );

        h.runner.submit(h.project_id, small_fileset()).unwrap();
        h.runner.wait(h.project_id).await;

        let p = project(&h);
        assert_eq!(p.status, ProjectStatus::Failed);
        assert_eq!(p.progress_percentage, 0);
        assert!(p.error_message.as_deref().unwrap_or("").contains("model unavailable"));
        assert!(p.processed_at.is_none());

        // No documentation row exists
        assert!(
            DocumentationStore::new(h.db.clone())
                .find_by_project(h.project_id)
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_indexing_failure_degrades_to_chat_unavailable() {
        let h = harness(Arc::new(RoutingGenerator::happy()), Arc::new(BrokenEmbedder));

        h.runner.submit(h.project_id, small_fileset()).unwrap();
        h.runner.wait(h.project_id).await;

        let p = project(&h);
        assert_eq!(p.status, ProjectStatus::Completed);
        assert_eq!(p.progress_stage, LABEL_CHAT_UNAVAILABLE);

        // Documentation is still retrievable
        assert!(
            DocumentationStore::new(h.db.clone())
                .find_by_project(h.project_id)
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_second_submission_refused_while_processing() {
        let gate = Arc::new(Notify::new());
        let h = harness(
            Arc::new(RoutingGenerator::gated(gate.clone())),
            Arc::new(FakeEmbedder),
        );

        h.runner.submit(h.project_id, small_fileset()).unwrap();
        // The run is in flight (parked on the gate at the latest)
        let second = h.runner.submit(h.project_id, small_fileset());
        assert!(matches!(
            second,
            Err(ScopeError::AlreadyProcessing(_)) | Err(ScopeError::InvalidInput(_))
        ));

        gate.notify_one();
        h.runner.wait(h.project_id).await;
    }

    #[tokio::test]
    async fn test_empty_fileset_rejected() {
        let h = harness(Arc::new(RoutingGenerator::happy()), Arc::new(FakeEmbedder));
        let result = h.runner.submit(h.project_id, FileSet::new());
        assert!(matches!(result, Err(ScopeError::InvalidInput(_))));
    }
}
