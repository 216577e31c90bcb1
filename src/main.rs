use anyhow::Result;
use buildtasks::cli::{Cli, Commands};
use buildtasks::config::{Config, CONFIG_FILE};
use buildtasks::errors::TaskError;
use buildtasks::fxcop::{self, SystemRunner};
use buildtasks::grep::{self, GrepTask};
use buildtasks::stats::{self, StatsTask};
use buildtasks::tools::ToolLocator;

use clap::Parser;

fn main() {
    let cli = Cli::parse();
    buildtasks::logging::init_tracing(cli.verbose);

    if let Err(err) = execute(cli.command) {
        match err.downcast_ref::<TaskError>() {
            Some(task) => eprintln!("error[{}]: {task}", task.code()),
            None => eprintln!("error: {err:#}"),
        }
        std::process::exit(1);
    }
}

fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Grep {
            files,
            pattern,
            output,
            include,
            root,
            config,
        } => {
            let cfg = Config::load(config.as_deref(), &root)?;
            let mut grep_cfg = cfg.grep;
            if pattern.is_some() {
                grep_cfg.pattern = pattern;
            }
            if output.is_some() {
                grep_cfg.output_file = output;
            }
            grep_cfg.include.extend(include);

            // command-line files are relative to the working directory
            let mut task = GrepTask::from_config(&grep_cfg, &root)?;
            task.input_files.splice(0..0, files);
            let summary = grep::run(&task)?;
            println!(
                "Wrote {} matches from {} files to {}",
                summary.matches,
                summary.files,
                summary.output_file.display()
            );
        }
        Commands::Item {
            pattern,
            input,
            json,
        } => {
            let item = grep::create_item(&pattern, &input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&item)?);
            } else {
                println!("{}", item.identity);
                for (name, value) in &item.metadata {
                    println!("  {name} = {value}");
                }
            }
        }
        Commands::Stats {
            files,
            label,
            include,
            root,
            output,
            append,
            build_name,
            summarize,
            config,
        } => {
            let cfg = Config::load(config.as_deref(), &root)?;
            let mut stats_cfg = cfg.stats;
            if output.is_some() {
                stats_cfg.output_file = output;
            }
            if build_name.is_some() {
                stats_cfg.build_name = build_name;
            }
            stats_cfg.append |= append;
            stats_cfg.summarize |= summarize;

            let mut task = StatsTask::from_config(&stats_cfg, &root);
            let mut extra = files;
            extra.extend(grep::scanner::scan(&root, &include, &[]));
            if !extra.is_empty() {
                task.add_files(&label, extra);
            }

            let summary = stats::run(&task)?;
            for group in &summary.groups {
                println!(
                    "{}: {} lines, {} comment, {} empty ({} files)",
                    group.label,
                    group.counts.total,
                    group.counts.comment,
                    group.counts.empty,
                    group.files.len()
                );
            }
            if let Some(output) = &task.output_file {
                println!("Wrote code statistics to {}", output.display());
            }
        }
        Commands::Fxcop {
            assemblies,
            config,
            format,
            out,
            tool_path,
            treat_warnings_as_errors,
        } => {
            let project_root = std::env::current_dir()?;
            let cfg = Config::load(config.as_deref(), &project_root)?;
            let mut fx = cfg.fxcop;
            if !assemblies.is_empty() {
                fx.assemblies = assemblies;
            }
            if out.is_some() {
                fx.log_file = out;
            }
            if tool_path.is_some() {
                fx.tool_path = tool_path;
            }
            fx.treat_warnings_as_errors |= treat_warnings_as_errors;

            let outcome = fxcop::run(&fx, &ToolLocator::with_defaults(), &SystemRunner)?;
            let output_format = format.unwrap_or(cfg.format);
            buildtasks::cli::output::render(&outcome, &project_root, output_format);
            outcome.ensure_success()?;
        }
        Commands::Init => {
            let path = std::env::current_dir()?.join(CONFIG_FILE);
            if path.exists() {
                anyhow::bail!("{CONFIG_FILE} already exists");
            }
            std::fs::write(&path, Config::default_toml())?;
            println!("Created {CONFIG_FILE}");
        }
    }

    Ok(())
}
