use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use rowkey_cli::logging::redact_value;
use rowkey_cli::paths::default_output_path;
use rowkey_cli::summary::{GenerateReport, print_summary, user_table};
use rowkey_core::{Method, RunOptions, UserIndex, run_with};

use crate::cli::{GenerateArgs, LookupArgs};

pub fn run_generate(args: &GenerateArgs) -> Result<GenerateReport> {
    let input = args.input.clone();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&input));
    let method = Method::from(args.method);
    let options = RunOptions::default()
        .with_method(method)
        .with_sample_size(args.sample_size)
        .with_progress_interval(args.progress_every);

    if !args.json {
        println!("Processing: {}", input.display());
        println!("Output: {}", output.display());
        println!("ID method: {method}");
        println!();
    }

    let mut progress = |rows: usize| println!("Processed {rows} rows...");
    let observer: Option<&mut dyn rowkey_core::ProgressObserver> = if args.json {
        None
    } else {
        Some(&mut progress)
    };
    let result = run_with(&input, &output, &options, observer)
        .with_context(|| format!("process {}", input.display()))?;

    for duplicate in result.duplicates() {
        warn!(
            row = duplicate.row,
            user_id = %duplicate.id,
            record_number = redact_value(&duplicate.record_number),
            client_code = redact_value(&duplicate.client_code),
            "duplicate USER_ID"
        );
    }

    Ok(GenerateReport {
        input,
        output,
        result,
    })
}

pub fn report_generate(report: &GenerateReport, args: &GenerateArgs) -> Result<()> {
    if args.json {
        let json = serde_json::to_string_pretty(&report.result).context("serialize result")?;
        println!("{json}");
    } else {
        println!("Processing complete.");
        print_summary(report, args.show_duplicates);
    }
    Ok(())
}

/// Returns `Ok(false)` when the user is not present.
pub fn run_lookup(args: &LookupArgs) -> Result<bool> {
    let span = info_span!("lookup", file = %args.file.display());
    let _guard = span.enter();

    let index = UserIndex::load(&args.file)
        .with_context(|| format!("load {}", args.file.display()))?;
    let Some(user) = index.get(&args.user_id) else {
        info!(user_id = %args.user_id, "user not found");
        eprintln!("USER_ID {} not found in {}", args.user_id, args.file.display());
        return Ok(false);
    };
    info!(
        user_id = %user.user_id,
        email = user.email.as_deref().map(redact_value),
        "user found"
    );

    if args.json {
        let json = serde_json::to_string_pretty(user).context("serialize user")?;
        println!("{json}");
    } else {
        println!("{}", user_table(user));
    }
    Ok(true)
}
