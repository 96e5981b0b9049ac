//! Content commands: validate, post, schedule, cancel.

use {
    crier_dispatch::{DispatchEntry, DispatchOutcome, DispatchReport},
    crier_platforms::{MediaKind, PostContent},
    crier_validate::Verdict,
};

use crate::app::{App, descriptor_for};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum MediaKindArg {
    Image,
    Video,
}

impl From<MediaKindArg> for MediaKind {
    fn from(kind: MediaKindArg) -> Self {
        match kind {
            MediaKindArg::Image => Self::Image,
            MediaKindArg::Video => Self::Video,
        }
    }
}

/// Shared arguments of `validate`, `post`, and `schedule`.
#[derive(clap::Args)]
pub struct ContentArgs {
    /// Post text.
    pub text: String,

    /// Comma-separated platform ids to target.
    #[arg(long, value_delimiter = ',', required = true)]
    pub platforms: Vec<String>,

    /// URL of an image or video to attach.
    #[arg(long)]
    pub media: Option<String>,

    /// Kind of the attached media; defaults to image when --media is set.
    #[arg(long, value_enum, requires = "media")]
    pub media_kind: Option<MediaKindArg>,
}

impl ContentArgs {
    fn content(&self) -> PostContent {
        let media_kind = match (&self.media, self.media_kind) {
            (Some(_), Some(kind)) => Some(kind.into()),
            (Some(_), None) => Some(MediaKind::Image),
            (None, _) => None,
        };
        PostContent::new(self.text.clone(), self.media.clone(), media_kind)
    }
}

/// Validate locally against each platform's constraints. No credentials or
/// network involved.
pub fn validate(args: &ContentArgs, json: bool) -> anyhow::Result<()> {
    let content = args.content();
    let mut verdicts = Vec::new();
    for platform_id in &args.platforms {
        let descriptor = descriptor_for(platform_id)
            .ok_or_else(|| anyhow::anyhow!("unknown platform: {platform_id}"))?;
        verdicts.push((
            platform_id.as_str(),
            crier_validate::validate(descriptor, &content),
        ));
    }

    if json {
        let mut map = serde_json::Map::new();
        for (platform_id, verdict) in &verdicts {
            map.insert((*platform_id).to_string(), serde_json::to_value(verdict)?);
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::Value::Object(map))?
        );
    } else {
        for (platform_id, verdict) in &verdicts {
            for line in verdict_lines(platform_id, verdict) {
                println!("{line}");
            }
        }
    }

    let invalid = verdicts.iter().filter(|(_, v)| !v.valid).count();
    if invalid > 0 {
        anyhow::bail!("content is invalid for {invalid} platform(s)");
    }
    Ok(())
}

pub async fn post(app: &App, args: &ContentArgs, json: bool) -> anyhow::Result<()> {
    let content = args.content();
    let report = app.dispatcher.post(&args.platforms, &content).await?;
    render_report(&report, json)?;
    finish(&report)
}

pub async fn schedule(app: &App, args: &ContentArgs, at: u64, json: bool) -> anyhow::Result<()> {
    let content = args.content();
    let report = app.dispatcher.schedule(&args.platforms, &content, at).await?;
    render_report(&report, json)?;
    if app.config.scheduler.url.is_none() {
        println!("note: no scheduler.url is configured; scheduled jobs do not outlive this process");
    }
    finish(&report)
}

pub async fn cancel(app: &App, job_id: &str) -> anyhow::Result<()> {
    app.dispatcher.cancel(job_id).await?;
    println!("Cancelled scheduled post {job_id}");
    Ok(())
}

fn render_report(report: &DispatchReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        for line in report_lines(report) {
            println!("{line}");
        }
    }
    Ok(())
}

fn finish(report: &DispatchReport) -> anyhow::Result<()> {
    let failed = report.failure_count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} platform(s) failed", report.entries.len());
    }
    Ok(())
}

fn report_lines(report: &DispatchReport) -> Vec<String> {
    report.entries.iter().flat_map(entry_lines).collect()
}

fn entry_lines(entry: &DispatchEntry) -> Vec<String> {
    let id = &entry.platform_id;
    match &entry.outcome {
        DispatchOutcome::Published { post_id } => {
            vec![format!("{id:<12} published (post {post_id})")]
        },
        DispatchOutcome::Scheduled { job_id } => {
            vec![format!("{id:<12} scheduled (job {job_id})")]
        },
        DispatchOutcome::ValidationFailed { errors } => {
            let mut lines = vec![format!("{id:<12} validation failed:")];
            lines.extend(errors.iter().map(|e| format!("{:<12}   {e}", "")));
            lines
        },
        DispatchOutcome::ConnectionMissing => {
            vec![format!("{id:<12} not connected (run: crier connect {id})")]
        },
        DispatchOutcome::ProviderError { detail } => {
            vec![format!("{id:<12} provider error: {detail}")]
        },
    }
}

fn verdict_lines(platform_id: &str, verdict: &Verdict) -> Vec<String> {
    let mut lines = Vec::new();
    if verdict.valid {
        let note = if verdict.warnings.is_empty() {
            String::new()
        } else {
            format!(" ({} warning(s))", verdict.warnings.len())
        };
        lines.push(format!("{platform_id:<12} ok{note}"));
    } else {
        lines.push(format!("{platform_id:<12} invalid:"));
        lines.extend(verdict.errors.iter().map(|e| format!("{:<12}   {e}", "")));
    }
    lines.extend(
        verdict
            .warnings
            .iter()
            .map(|w| format!("{:<12}   warning: {w}", "")),
    );
    lines
}
