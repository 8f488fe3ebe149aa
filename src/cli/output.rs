//! Terminal output helpers

use console::style;

use crate::types::Project;

pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub fn warn(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

pub fn info(message: &str) {
    println!("{} {}", style("•").cyan(), message);
}

/// One-line progress update for the polling loop
pub fn progress(progress: u8, stage: &str) {
    println!(
        "  {} {}",
        style(format!("[{:>3}%]", progress)).dim(),
        stage
    );
}

/// Project summary block
pub fn project_summary(project: &Project) {
    println!();
    println!("{}", style(&project.name).bold());
    println!("  id:       {}", project.id);
    println!("  status:   {}", project.status);
    println!(
        "  progress: {}% ({})",
        project.progress_percentage, project.progress_stage
    );

    if let Some(count) = project.file_count {
        println!("  files:    {}", count);
    }
    if let Some(lines) = project.total_lines {
        println!("  lines:    {}", lines);
    }
    if let Some(language) = &project.primary_language {
        println!("  language: {}", language);
    }
    if !project.technologies.is_empty() {
        println!("  stack:    {}", project.technologies.join(", "));
    }
    if let Some(score) = project.security_score {
        println!(
            "  security: {}/100 ({} vulnerabilities)",
            score,
            project.vulnerabilities_count.unwrap_or(0)
        );
    }
    if let Some(message) = &project.error_message {
        println!("  error:    {}", style(message).red());
    }
}
