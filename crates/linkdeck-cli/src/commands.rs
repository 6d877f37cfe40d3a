use std::io::Read;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use linkdeck_format::{parse_offset, DateFormatter, DisplayConfig, INVALID_DATE};
use linkdeck_store::{
    CommitEvent, CommitStream, InMemoryStore, Mutation, MutationFilter, StateStore, StoreConfig,
    StoreState, TryRecvError,
};

use crate::cli::*;
use crate::config::AppConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::resolve(cli.config.as_deref())?;
    match cli.command {
        Command::Replay(args) => cmd_replay(args, &config, &cli.format),
        Command::FormatDate(args) => cmd_format_date(args, &config, &cli.format),
        Command::Config => cmd_config(&config, &cli.format),
    }
}

/// Outcome of replaying a mutation script against a fresh store.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    /// Mutations in the script.
    pub submitted: usize,
    /// Mutations the store applied; the rest were ignored as out of range.
    pub applied: u64,
    pub state: StoreState<Value>,
    #[serde(skip)]
    pub events: Vec<CommitEvent<Value>>,
}

/// Hydrate a store with `links` (if any), then commit every mutation in
/// `script` in order. Stops at the first rejected mutation.
pub fn replay(
    script: &str,
    links: Option<&str>,
    config: &StoreConfig,
    trace: bool,
) -> anyhow::Result<ReplayReport> {
    let mutations: Vec<Mutation<Value>> =
        serde_json::from_str(script).context("parsing mutation script")?;
    let store = InMemoryStore::with_config(config.clone());

    if let Some(text) = links {
        let links: Vec<Value> = serde_json::from_str(text).context("parsing links")?;
        store.hydrate_links(links)?;
    }
    let base = store.commit_count()?;

    let mut stream = if trace {
        Some(store.subscribe(MutationFilter::all())?)
    } else {
        None
    };
    let mut events = Vec::new();

    let submitted = mutations.len();
    for (i, mutation) in mutations.into_iter().enumerate() {
        let kind = mutation.kind();
        store
            .commit(mutation)
            .with_context(|| format!("mutation #{i} ({kind})"))?;
        if let Some(stream) = stream.as_mut() {
            drain_events(stream, &mut events);
        }
    }

    Ok(ReplayReport {
        submitted,
        applied: store.commit_count()? - base,
        state: store.snapshot()?,
        events,
    })
}

fn drain_events(stream: &mut CommitStream<Value>, out: &mut Vec<CommitEvent<Value>>) {
    loop {
        match stream.try_recv() {
            Ok(event) => out.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "commit trace fell behind");
            }
            Err(_) => break,
        }
    }
}

/// Replace timestamp-like string fields of a link object with their display
/// form. Other values pass through unchanged.
pub fn render_link(link: &Value, formatter: &DateFormatter) -> Value {
    match link {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| {
                    let shown = match value {
                        Value::String(s) => formatter
                            .format(s)
                            .map(Value::String)
                            .unwrap_or_else(|_| value.clone()),
                        other => other.clone(),
                    };
                    (key.clone(), shown)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn read_script(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading script from stdin")?;
        Ok(text)
    } else {
        read_file(Path::new(source))
    }
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn cmd_replay(args: ReplayArgs, config: &AppConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let script = read_script(&args.script)?;
    let links = args.links.as_deref().map(read_file).transpose()?;
    let report = replay(&script, links.as_deref(), &config.store, args.trace)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            let formatter = DateFormatter::from_config(&config.display)?;
            for event in &report.events {
                println!(
                    "  {} {:<12} authorized={} links={}",
                    format!("#{}", event.seq).dimmed(),
                    event.kind.to_string().cyan(),
                    event.authorized,
                    event.link_count
                );
            }
            let ignored = report.submitted as u64 - report.applied;
            print!("{} Applied {} mutation(s)", "✓".green().bold(), report.applied);
            if ignored > 0 {
                print!(", {} ignored", ignored.to_string().yellow());
            }
            println!();

            let session = if report.state.authorized() {
                "authorized".green()
            } else {
                "not authorized".red()
            };
            println!("Session: {session}");
            println!("Links ({}):", report.state.links().len().to_string().bold());
            for (i, link) in report.state.links().iter().enumerate() {
                println!("  [{}] {}", i.to_string().yellow(), render_link(link, &formatter));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct FormattedValue<'a> {
    pub input: &'a str,
    pub output: Option<String>,
    pub error: Option<String>,
}

/// An `--offset` flag wins over the `[display]` section of the config.
pub fn select_formatter(offset: Option<&str>, display: &DisplayConfig) -> anyhow::Result<DateFormatter> {
    match offset {
        Some(raw) => Ok(DateFormatter::with_offset(parse_offset(raw)?)),
        None => Ok(DateFormatter::from_config(display)?),
    }
}

pub fn format_values<'a>(formatter: &DateFormatter, values: &'a [String]) -> Vec<FormattedValue<'a>> {
    values
        .iter()
        .map(|input| match formatter.format(input) {
            Ok(output) => FormattedValue { input, output: Some(output), error: None },
            Err(e) => FormattedValue { input, output: None, error: Some(e.to_string()) },
        })
        .collect()
}

fn cmd_format_date(
    args: FormatDateArgs,
    config: &AppConfig,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let formatter = select_formatter(args.offset.as_deref(), &config.display)?;
    let results = format_values(&formatter, &args.values);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => {
            for r in &results {
                match &r.output {
                    Some(out) => println!("{} → {}", r.input, out.green()),
                    None => println!("{} → {}", r.input, INVALID_DATE.red()),
                }
            }
        }
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!("{failed} value(s) could not be parsed");
    }
    Ok(())
}

fn cmd_config(config: &AppConfig, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", config.to_toml()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkdeck_store::{IndexPolicy, MutationKind};
    use serde_json::json;

    const SCRIPT: &str = r#"[
        {"type": "removeLink", "payload": 1},
        {"type": "updateLink", "payload": {"link": {"slug": "z"}, "ind": 0}},
        {"type": "addLink", "payload": {"slug": "d"}},
        {"type": "authorize"}
    ]"#;
    const LINKS: &str = r#"[{"slug": "a"}, {"slug": "b"}, {"slug": "c"}]"#;

    #[test]
    fn replay_scenario() {
        let report = replay(SCRIPT, Some(LINKS), &StoreConfig::default(), false).unwrap();
        assert_eq!(report.submitted, 4);
        assert_eq!(report.applied, 4);
        assert!(report.state.authorized());
        assert_eq!(
            report.state.links(),
            [json!({"slug": "z"}), json!({"slug": "c"}), json!({"slug": "d"})]
        );
        assert!(report.events.is_empty());
    }

    #[test]
    fn replay_trace_excludes_hydration() {
        let report = replay(SCRIPT, Some(LINKS), &StoreConfig::default(), true).unwrap();
        let kinds: Vec<MutationKind> = report.events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MutationKind::RemoveLink,
                MutationKind::UpdateLink,
                MutationKind::AddLink,
                MutationKind::Authorize
            ]
        );
        assert_eq!(report.events[0].seq, 2);
    }

    #[test]
    fn replay_rejects_out_of_range() {
        let err = replay(SCRIPT, None, &StoreConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("mutation #0 (removeLink)"));
    }

    #[test]
    fn replay_ignores_out_of_range_when_lenient() {
        let config = StoreConfig {
            index_policy: IndexPolicy::Ignore,
            ..Default::default()
        };
        let report = replay(SCRIPT, None, &config, false).unwrap();
        assert_eq!(report.submitted, 4);
        assert_eq!(report.applied, 2);
        assert_eq!(report.state.links(), [json!({"slug": "d"})]);
    }

    #[test]
    fn replay_rejects_malformed_script() {
        let err = replay("{not json", None, &StoreConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("parsing mutation script"));
    }

    #[test]
    fn render_link_formats_timestamps() {
        let link = json!({
            "slug": "docs",
            "created": "10/Oct/2023:13:55:36 +0000",
            "hits": 3
        });
        let shown = render_link(&link, &DateFormatter::new());
        assert_eq!(
            shown,
            json!({"slug": "docs", "created": "2023-10-10 13:55:36 PM", "hits": 3})
        );
    }

    fn display_at(offset: &str) -> AppConfig {
        AppConfig {
            display: DisplayConfig {
                offset: Some(offset.into()),
            },
            ..Default::default()
        }
    }

    #[test]
    fn offset_flag_overrides_display_config() {
        let config = display_at("+0100");
        let formatter = select_formatter(Some("-0500"), &config.display).unwrap();
        assert_eq!(
            formatter.format("01/Jan/2024:02:00:00 +0000").unwrap(),
            "2023-12-31 21:00:00 PM"
        );
    }

    #[test]
    fn display_config_used_without_flag() {
        let config = display_at("+0100");
        let formatter = select_formatter(None, &config.display).unwrap();
        assert_eq!(
            formatter.format("01/Jan/2024:02:00:00 +0000").unwrap(),
            "2024-01-01 03:00:00 AM"
        );
    }

    #[test]
    fn bad_offset_flag_is_an_error() {
        assert!(select_formatter(Some("noon"), &DisplayConfig::default()).is_err());
    }

    #[test]
    fn format_values_marks_failures() {
        let values = vec!["10/Oct/2023:13:55:36 +0000".to_string(), "soon".to_string()];
        let results = format_values(&DateFormatter::new(), &values);
        assert_eq!(results[0].output.as_deref(), Some("2023-10-10 13:55:36 PM"));
        assert!(results[0].error.is_none());
        assert!(results[1].output.is_none());
        assert!(results[1].error.is_some());
    }

    #[test]
    fn format_date_fails_when_any_value_is_invalid() {
        let args = FormatDateArgs {
            values: vec!["10/Oct/2023:13:55:36 +0000".into(), "soon".into()],
            offset: None,
        };
        let err = cmd_format_date(args, &AppConfig::default(), &OutputFormat::Json).unwrap_err();
        assert_eq!(err.to_string(), "1 value(s) could not be parsed");
    }

    #[test]
    fn format_date_succeeds_when_all_values_parse() {
        let args = FormatDateArgs {
            values: vec!["10/Oct/2023:13:55:36 +0000".into()],
            offset: Some("+0200".into()),
        };
        cmd_format_date(args, &display_at("+0100"), &OutputFormat::Text).unwrap();
    }

    #[test]
    fn render_link_passes_non_objects_through() {
        let link = json!("10/Oct/2023:13:55:36 +0000");
        assert_eq!(render_link(&link, &DateFormatter::new()), link);
    }
}
