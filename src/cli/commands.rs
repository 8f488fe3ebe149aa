//! CLI Command Handlers

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::output;
use crate::ai::{OpenAiEmbeddings, SharedEmbedder, SharedGenerator, create_generator};
use crate::config::Config;
use crate::pipeline::PipelineRunner;
use crate::rag::RagQuery;
use crate::source::load_dir;
use crate::storage::{
    ChunkStore, Database, DocumentationStore, FindingStore, ImprovementStore, LocalObjectStore,
    ObjectStore, ProjectStore, SharedDatabase,
};
use crate::types::{ProjectStatus, Result, ScopeError, SourceKind};

/// Shared command context: config plus an initialized database
pub struct AppContext {
    pub config: Config,
    pub db: SharedDatabase,
}

impl AppContext {
    pub fn open(config: Config) -> Result<Self> {
        let db: SharedDatabase = Arc::new(Database::open(&config.storage.db_path)?);
        db.initialize()?;
        Ok(Self { config, db })
    }

    fn projects(&self) -> ProjectStore {
        ProjectStore::new(self.db.clone())
    }

    fn generator(&self) -> Result<SharedGenerator> {
        create_generator(&self.config.generation)
    }

    fn embedder(&self) -> Result<SharedEmbedder> {
        Ok(Arc::new(OpenAiEmbeddings::new(self.config.embedding.clone())?))
    }

    fn objects(&self) -> Arc<dyn ObjectStore> {
        Arc::new(LocalObjectStore::new(&self.config.storage.object_root))
    }
}

/// Ingest a directory and run the full pipeline, reporting progress.
pub async fn process(ctx: &AppContext, path: &Path, name: Option<String>) -> Result<()> {
    let files = load_dir(path)?;
    if files.is_empty() {
        return Err(ScopeError::InvalidInput(
            "No valid code files found in directory".to_string(),
        ));
    }

    let name = name.unwrap_or_else(|| {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string()
    });

    let projects = ctx.projects();
    let project = projects.create(&name, SourceKind::Upload)?;
    output::info(&format!(
        "Created project {} ({} files)",
        project.id,
        files.len()
    ));

    let runner = PipelineRunner::new(
        ctx.db.clone(),
        ctx.generator()?,
        ctx.embedder()?,
        ctx.objects(),
        &ctx.config,
    );
    runner.submit(project.id, files)?;

    // Poll the status tuple the way an external consumer would
    let mut last_stage = String::new();
    loop {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let current = projects
            .find(project.id)?
            .ok_or(ScopeError::ProjectNotFound(project.id))?;

        if current.progress_stage != last_stage {
            output::progress(current.progress_percentage, &current.progress_stage);
            last_stage = current.progress_stage.clone();
        }

        match current.status {
            ProjectStatus::Completed => {
                output::success("Documentation ready; enrichment continues in background");
                break;
            }
            ProjectStatus::Failed => {
                output::error(&format!(
                    "Processing failed: {}",
                    current.error_message.as_deref().unwrap_or("unknown error")
                ));
                return Ok(());
            }
            _ => {}
        }
    }

    // Let the background stages finish before exiting the process
    runner.wait(project.id).await;
    let finished = projects
        .find(project.id)?
        .ok_or(ScopeError::ProjectNotFound(project.id))?;
    output::project_summary(&finished);
    Ok(())
}

/// List all projects.
pub fn list(ctx: &AppContext) -> Result<()> {
    let projects = ctx.projects().list()?;
    if projects.is_empty() {
        output::info("No projects yet");
        return Ok(());
    }

    for project in projects {
        println!(
            "{}  {:<12} {:>4}%  {}",
            project.id, project.status, project.progress_percentage, project.name
        );
    }
    Ok(())
}

/// Show the polling status tuple for a project.
pub fn status(ctx: &AppContext, project_id: Uuid) -> Result<()> {
    let project = ctx
        .projects()
        .find(project_id)?
        .ok_or(ScopeError::ProjectNotFound(project_id))?;
    output::project_summary(&project);
    Ok(())
}

/// Print a project's documentation markdown.
pub fn doc(ctx: &AppContext, project_id: Uuid) -> Result<()> {
    let documentation = DocumentationStore::new(ctx.db.clone())
        .find_by_project(project_id)?
        .ok_or(ScopeError::DocumentationNotFound(project_id))?;
    println!("{}", documentation.markdown);
    Ok(())
}

/// List security findings for a project.
pub fn findings(ctx: &AppContext, project_id: Uuid) -> Result<()> {
    let findings = FindingStore::new(ctx.db.clone()).list_by_project(project_id)?;
    if findings.is_empty() {
        output::info("No security findings");
        return Ok(());
    }

    for finding in findings {
        println!(
            "[{:>8}] {} in {} ({})",
            finding.severity, finding.title, finding.file_path, finding.category
        );
        println!("           {}", finding.recommendation);
    }
    Ok(())
}

/// List improvement suggestions for a project.
pub fn improvements(ctx: &AppContext, project_id: Uuid) -> Result<()> {
    let improvements = ImprovementStore::new(ctx.db.clone()).list_by_project(project_id)?;
    if improvements.is_empty() {
        output::info("No improvement suggestions");
        return Ok(());
    }

    for improvement in improvements {
        println!(
            "[{:>6}] {} in {} ({})",
            improvement.impact_level, improvement.title, improvement.file_path,
            improvement.category
        );
        println!("         {}", improvement.suggestion);
    }
    Ok(())
}

/// One-off capped security scan of a directory, without persisting.
///
/// The interactive cap keeps this path cheap; priority ordering makes
/// sure the riskiest files are the ones that fit under it.
pub async fn scan(ctx: &AppContext, path: &Path, max_files: Option<usize>) -> Result<()> {
    let files = load_dir(path)?;
    if files.is_empty() {
        return Err(ScopeError::InvalidInput(
            "No valid code files found in directory".to_string(),
        ));
    }

    let cap = max_files.unwrap_or(ctx.config.scan.interactive_max_files);
    output::info(&format!(
        "Scanning up to {} of {} files for security issues",
        cap.min(files.len()),
        files.len()
    ));

    let scanner = crate::analyzer::SecurityScanner::new(ctx.generator()?, &ctx.config.scan);
    let found = scanner.scan(Uuid::new_v4(), &files, Some(cap)).await;

    if found.is_empty() {
        output::success("No security issues found");
        return Ok(());
    }

    for finding in &found {
        println!(
            "[{:>8}] {} in {} ({})",
            finding.severity, finding.title, finding.file_path, finding.category
        );
    }
    output::info(&format!(
        "Score: {}/100, {} critical/high",
        crate::analyzer::SecurityScanner::score(&found),
        crate::analyzer::SecurityScanner::vulnerability_count(&found),
    ));
    Ok(())
}

/// Ask a question about a project via the retrieval index.
pub async fn chat(ctx: &AppContext, project_id: Uuid, message: &str) -> Result<()> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ScopeError::InvalidInput("Message is required".to_string()));
    }

    let query = RagQuery::new(
        ctx.embedder()?,
        ctx.generator()?,
        ChunkStore::new(ctx.db.clone()),
        ctx.config.retrieval.top_k,
    );
    let answer = query.answer(project_id, message).await?;

    println!("{}", answer.message);
    if !answer.sources.is_empty() {
        println!();
        output::info(&format!("Sources: {}", answer.sources.join(", ")));
    }
    Ok(())
}

/// Delete a project, its stored artifacts, and all derived rows.
pub fn delete(ctx: &AppContext, project_id: Uuid) -> Result<()> {
    let objects = ctx.objects();
    match objects.delete_prefix(&format!("projects/{}/", project_id)) {
        Ok(removed) if removed > 0 => {
            output::info(&format!("Removed {} stored artifacts", removed));
        }
        Ok(_) => {}
        Err(e) => output::warn(&format!("Failed to clear stored artifacts: {}", e)),
    }

    if ctx.projects().delete(project_id)? {
        output::success("Project deleted");
        Ok(())
    } else {
        Err(ScopeError::ProjectNotFound(project_id))
    }
}
