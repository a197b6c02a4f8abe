// `hgnotify payload` — show what `commit` would send for a revision.

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use hgnotify_common::payload::{NotificationPayload, FORM_CONTENT_TYPE};
use hgnotify_hook::notifier::CommitNotifier;

use super::TargetArgs;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct PayloadArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Revision to describe
    #[arg(short = 'r', long, default_value = ".")]
    rev: String,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

impl PayloadArgs {
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::detect(self.json)
    }
}

#[derive(Debug, Serialize)]
pub struct PayloadPreview {
    pub endpoint: String,
    pub content_type: &'static str,
    pub body: String,
    pub payload: NotificationPayload,
}

pub fn run(args: PayloadArgs) -> anyhow::Result<()> {
    let format = args.output_format();
    let (worker, settings) = args.target.resolve(None)?;

    let node = worker
        .resolve_node(&args.rev)
        .with_context(|| format!("cannot resolve revision `{}`", args.rev))?;
    let notifier = CommitNotifier::new(&settings.base_url, settings.repo_url)?;
    let payload = notifier.payload(&worker, &node)?;

    let preview = preview(&notifier, payload);
    output::print_output(format, &preview, format_human)?;
    Ok(())
}

fn preview(notifier: &CommitNotifier, payload: NotificationPayload) -> PayloadPreview {
    PayloadPreview {
        endpoint: notifier.endpoint().to_string(),
        content_type: FORM_CONTENT_TYPE,
        body: payload.to_form_body(),
        payload,
    }
}

fn format_human(preview: &PayloadPreview) -> String {
    format!(
        "POST {}\nContent-Type: {}\n\n{}",
        preview.endpoint, preview.content_type, preview.body
    )
}
