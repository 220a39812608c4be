use clap::Parser;
use std::process;

use taskfocus::cli;
use taskfocus::cli::commands::{Cli, Commands};
use taskfocus::cli::task::{self, EditArgs};
use taskfocus::models::NewTask;

const LOG_ENV: &str = "TASKFOCUS_LOG";

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli_args = Cli::parse();
    let json_output = cli_args.json;

    let exit_code = match cli_args.command {
        Commands::Init => cli::init::run(json_output),
        Commands::Add { title, priority, due, notes } => task::report(
            task::run_add(
                NewTask { title, priority, due_date: due, notes },
                json_output,
            ),
            json_output,
        ),
        Commands::List => task::report(task::run_list(json_output), json_output),
        Commands::Completed => task::report(task::run_completed(json_output), json_output),
        Commands::Show { id } => task::report(task::run_show(&id, json_output), json_output),
        Commands::Edit { id, title, priority, due, clear_due, notes, clear_notes } => {
            let args = EditArgs { title, priority, due, clear_due, notes, clear_notes };
            task::report(task::run_edit(&id, args, json_output), json_output)
        }
        Commands::Done { id } => task::report(task::run_done(&id, json_output), json_output),
        Commands::Defer { id } => task::report(task::run_defer(&id, json_output), json_output),
        Commands::Reorder { ids, stdin } => {
            task::report(task::run_reorder(&ids, stdin, json_output), json_output)
        }
        Commands::Delete { id } => task::report(task::run_delete(&id, json_output), json_output),
        Commands::Focus { batch_size } => cli::focus::run(batch_size, json_output),
        Commands::Config(cmd) => cli::config::run(cmd, json_output),
    };

    process::exit(exit_code);
}
