//! highlight-words command-line front end

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;

use highlight_words::buffer::TextBuffer;
use highlight_words::cli::{CliArgs, OutputFormat, RunConfig};
use highlight_words::config::{ConfigHandle, HighlightConfig};
use highlight_words::config_paths;
use highlight_words::host::{BufferId, WindowId};
use highlight_words::navigation::Direction;
use highlight_words::session::{HighlightOutcome, HighlightReport};
use highlight_words::span::Span;
use highlight_words::HighlightService;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    highlight_words::tracing::init("warn");

    if args.log_path {
        match config_paths::log_file() {
            Some(path) => println!("{}", path.display()),
            None => bail!("No config directory available"),
        }
        return Ok(());
    }

    let run = args.into_config().map_err(anyhow::Error::msg)?;
    let base = match &run.config_path {
        Some(path) => HighlightConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => HighlightConfig::load(),
    };
    let config = run.overrides.apply(base);

    let service = HighlightService::new(ConfigHandle::new(config))
        .context("Failed to start the highlight worker")?;
    let mut buffer = TextBuffer::from_file(BufferId(1), WindowId(1), run.file.clone())
        .with_context(|| format!("Failed to read {}", run.file.display()))?;
    buffer.set_caret(run.caret);

    let report = highlight(&service, &mut buffer, &run)?;

    let mut landed = Vec::with_capacity(run.moves.len());
    for direction in &run.moves {
        let span = match direction {
            Direction::Next => service.select_next(&mut buffer),
            Direction::Previous => service.select_previous(&mut buffer),
        };
        landed.push(span);
    }

    for diagnostic in &report.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    match run.output {
        OutputFormat::Text => print_text(&service, &buffer, &report, &landed),
        OutputFormat::Json => print_json(&service, &buffer, &report, &landed)?,
    }
    Ok(())
}

/// Store the specification, then run the full pass (spec + keywords)
fn highlight(
    service: &HighlightService,
    buffer: &mut TextBuffer,
    run: &RunConfig,
) -> Result<HighlightReport> {
    service.highlight_now(buffer, &run.spec);

    if run.toggle_cursor_word {
        let seed = service.open_editor(&*buffer);
        tracing::debug!("{} {}", seed.prompt, seed.text);
        service.highlight_now(buffer, &seed.text);
    }

    match service.run_ambient_pass(buffer) {
        HighlightOutcome::Applied(report) => Ok(report),
        HighlightOutcome::Stale => bail!("Highlight pass was superseded"),
    }
}

fn describe(buffer: &TextBuffer, span: Span) -> String {
    let (line, col) = buffer.line_col(span.start);
    format!("{}..{} ({}:{})", span.start, span.end, line + 1, col + 1)
}

fn print_text(
    service: &HighlightService,
    buffer: &TextBuffer,
    report: &HighlightReport,
    landed: &[Option<Span>],
) {
    let config = service.config();
    println!("{}", service.effective_spec(buffer));

    for group in &report.groups {
        let spans: Vec<String> = group
            .spans()
            .into_iter()
            .map(|span| describe(buffer, span))
            .collect();
        println!(
            "[{}] {} ({}): {}",
            group.index,
            group.label(),
            config.color_for(group.color_class),
            spans.join(", ")
        );
    }
    println!("{} distinct matches", report.spans.len());

    for span in landed {
        match span {
            Some(span) => println!("-> {}", describe(buffer, *span)),
            None => println!("-> no match"),
        }
    }
}

fn print_json(
    service: &HighlightService,
    buffer: &TextBuffer,
    report: &HighlightReport,
    landed: &[Option<Span>],
) -> Result<()> {
    let diagnostics: Vec<String> = report.diagnostics.iter().map(|d| d.to_string()).collect();
    let output = json!({
        "spec": service.effective_spec(buffer),
        "groups": report.groups,
        "spans": report.spans.as_slice(),
        "decorations": buffer.decorations(),
        "moves": landed,
        "diagnostics": diagnostics,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
