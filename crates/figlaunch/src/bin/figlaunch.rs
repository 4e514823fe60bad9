//! Figlaunch CLI
//!
//! Usage:
//!   figlaunch --app shop
//!   figlaunch --app shop --fig deploy/fig.yml --output scripts/
//!   figlaunch --app shop -H tcp://10.0.0.5:2375 --interactive
//!   figlaunch --app shop --dry-run

use figlaunch::{ArtifactWriter, BatchOutput, Definition, LaunchArgs, Translator};

#[tokio::main]
async fn main() {
    let args: LaunchArgs = argh::from_env();

    if args.version {
        println!("figlaunch {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    // Initialize logging
    let log_level = match args.log_level.to_lowercase().as_str() {
        "error" => "error",
        "warn" => "warn",
        "info" => "info",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    };
    let env = env_logger::Env::default().default_filter_or(log_level);
    env_logger::init_from_env(env);

    let ctx = match args.batch_context() {
        Ok(ctx) => ctx,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    // Load definition
    log::info!("Loading definition file: {}", args.fig);
    let definition = match Definition::from_file(&args.fig) {
        Ok(definition) => definition,
        Err(e) => {
            log::error!("Failed to load definition: {}", e);
            std::process::exit(1);
        }
    };

    let translator = Translator::new(definition, ctx);
    let output = match translator.translate() {
        Ok(output) => output,
        Err(e) => {
            log::error!("Translation failed: {}", e);
            std::process::exit(1);
        }
    };

    // Validate only mode
    if args.validate {
        if args.json {
            print_json(&output);
        } else {
            println!("Definition '{}' translated", args.fig);
            println!("  Services: {}", translator.definition().len());
            print!("{}", output);
        }
        exit_on_failures(&output);
        return;
    }

    // Dry run mode
    if args.dry_run {
        if args.json {
            print_json(&output);
        } else {
            for artifact in &output.artifacts {
                println!("# ==> {} <==", artifact.file_name);
                print!("{}", artifact.content);
                println!();
            }
        }
        exit_on_failures(&output);
        return;
    }

    let writer = ArtifactWriter::new(&args.output);
    if let Err(e) = writer.prepare().await {
        log::error!("Failed to prepare output directory: {}", e);
        std::process::exit(1);
    }

    let mut written = 0;
    let mut write_failures = 0;
    for outcome in writer.write_all(&output.artifacts).await {
        match outcome {
            Ok(path) => {
                log::info!("Wrote {}", path.display());
                written += 1;
            }
            Err(e) => {
                log::error!("{}", e);
                write_failures += 1;
            }
        }
    }

    log::info!(
        "Generated {} of {} launch scripts in {}",
        written,
        translator.definition().len(),
        writer.output_dir().display()
    );

    if write_failures > 0 {
        std::process::exit(1);
    }
    exit_on_failures(&output);
}

fn print_json(output: &BatchOutput) {
    match serde_json::to_string_pretty(output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Failed to serialize batch: {}", e);
            std::process::exit(1);
        }
    }
}

/// Exit non-zero when any service failed to translate
fn exit_on_failures(output: &BatchOutput) {
    if !output.is_complete() {
        log::error!(
            "{} of {} services could not be translated",
            output.failures.len(),
            output.failures.len() + output.artifacts.len()
        );
        std::process::exit(1);
    }
}
