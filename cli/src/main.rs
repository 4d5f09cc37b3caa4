//! Command-line entry point. Single-threaded and synchronous: one
//! `Orchestrator` per requested format walks that format's discovered
//! roots, feeding every entry through the nine-step export pipeline in
//! `export::orchestrate` and reporting a per-format, then overall,
//! summary on exit.

mod args;
mod discover;
mod error;
mod logging;

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use export::{Batch, FormatFlag, FormatState, Orchestrator};
use labels::Matcher;

use args::Cli;
use discover::Discovered;
use error::Result;

struct Job {
    format: FormatFlag,
    root: PathBuf,
    subdirectory_prefix: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init(cli.log_level.into(), &cli.log_file) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "export aborted");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let run = cli.build_run_base().build()?;

    let matcher = match &cli.labels {
        Some(dir) => labels::load_directory(dir)?,
        None => Matcher::new(Vec::new()),
    };

    let jobs = collect_jobs(&run)?;

    let arenas = arena::Arenas::new();
    let mut sinks: HashMap<FormatFlag, export::csv::Sink> = HashMap::new();
    let mut totals = HashMap::new();

    // `export_next` always takes a manifest sink to write to, even when
    // `create_manifest` is off (it simply skips the write); give it one
    // harmless shared placeholder rather than reopening a file per entry.
    let mut discard_sink = if run.create_manifest {
        None
    } else {
        std::fs::create_dir_all(&run.temporary_path).ok();
        Some(export::csv::Sink::open(&run.temporary_path.join("discard.csv"))?)
    };

    let mut jobs_by_format: Vec<(FormatFlag, Vec<&Job>)> = Vec::new();
    for job in &jobs {
        match jobs_by_format.iter_mut().find(|(f, _)| *f == job.format) {
            Some((_, list)) => list.push(job),
            None => jobs_by_format.push((job.format, vec![job])),
        }
    }

    for (format, format_jobs) in jobs_by_format {
        let format_short = discover::format_short(format);
        let mut state = FormatState::begin(format, PathBuf::from(format_short));
        let mut orchestrator = Orchestrator::new(&run, &matcher, arenas.transient());

        let mut entries_for_format: Vec<Discovered> = Vec::new();
        for job in &format_jobs {
            let mut found_entries = discover::discover(job.format, &job.root);
            if let Some(prefix) = &job.subdirectory_prefix {
                for discovered in &mut found_entries {
                    discovered.subdirectory = Some(match &discovered.subdirectory {
                        Some(existing) => format!("{prefix}/{existing}"),
                        None => prefix.clone(),
                    });
                }
            }
            entries_for_format.extend(found_entries);
        }

        if entries_for_format.is_empty() {
            tracing::warn!(format = ?format, "no files found for this format");
        }

        for discovered in entries_for_format {
            let subdirectory = discovered.subdirectory;
            if run.create_manifest && !sinks.contains_key(&format) {
                let manifest_path = run.output_path.join(format_short).join("Manifest.csv");
                let sink = export::csv::Sink::open(&manifest_path)?;
                sinks.insert(format, sink);
            }

            let sink = match sinks.get_mut(&format) {
                Some(sink) => sink,
                None => discard_sink.as_mut().expect("discard sink present when manifest disabled"),
            };

            let outcome = orchestrator.export_next(
                discovered.entry,
                format,
                format_short,
                subdirectory.as_deref(),
                &mut state,
                sink,
            );

            if let Err(err) = outcome {
                tracing::warn!(format = ?format, error = %err, "failed to export entry, skipping");
            }
        }

        if let Some(sink) = sinks.get_mut(&format) {
            sink.flush()?;
        }

        totals.insert(format, (state.found, state.exported, state.excluded));
        state.end();
    }

    print_summary(&totals);
    Ok(())
}

fn collect_jobs(run: &export::ExportRun) -> Result<Vec<Job>> {
    let mut jobs = Vec::new();

    if let Some(input_path) = &run.input_path {
        let format = *run.formats.iter().next().expect("builder enforces exactly one format");
        jobs.push(Job {
            format,
            root: input_path.clone(),
            subdirectory_prefix: None,
        });
        return Ok(jobs);
    }

    let batch_path = run.batch_path.as_ref().expect("builder enforces input_path or batch_path");
    let source = std::fs::read_to_string(batch_path).map_err(|source| error::Error::ReadBatch {
        path: batch_path.to_string_lossy().into_owned(),
        source,
    })?;
    let batch: Batch = export::batch::parse(&source)?;

    for task in batch.tasks {
        jobs.push(Job {
            format: task.format,
            root: task.path,
            subdirectory_prefix: None,
        });
    }

    // Profile-scoped discovery is currently implemented for Mozilla only:
    // its root-finding already understands AppData/LocalAppData-shaped
    // bases. Other plugin formats under a BEGIN_PROFILE block are not
    // yet walked from a profile's key paths.
    if run.formats.contains(&FormatFlag::Mozilla) {
        for profile in &batch.profiles {
            let mut bases = Vec::new();
            if let Some(appdata) = &profile.key_paths.appdata {
                bases.push(appdata.clone());
            }
            if let Some(local_appdata) = &profile.key_paths.local_appdata {
                bases.push(local_appdata.clone());
            }
            for base in bases {
                jobs.push(Job {
                    format: FormatFlag::Mozilla,
                    root: base,
                    subdirectory_prefix: Some(profile.name.clone()),
                });
            }
        }
    }

    Ok(jobs)
}

fn print_summary(totals: &HashMap<FormatFlag, (u64, u64, u64)>) {
    let (mut found, mut exported, mut excluded) = (0u64, 0u64, 0u64);
    for (format, (f, e, x)) in totals {
        println!("{}: found {f}, exported {e}, excluded {x}", discover::format_short(*format));
        found += f;
        exported += e;
        excluded += x;
    }
    println!("total: found {found}, exported {exported}, excluded {excluded}");
}
