use crate::cli::commands::{ConfigCommands, ConfigSetCommands};
use crate::config::Config;
use crate::db::connection;
use crate::error::FocusError;
use crate::output;

pub fn run(cmd: ConfigCommands, json_output: bool) -> i32 {
    match run_inner(cmd, json_output) {
        Ok(code) => code,
        Err(e) => output::fail(&e, json_output),
    }
}

fn run_inner(cmd: ConfigCommands, json_output: bool) -> Result<i32, FocusError> {
    let path = connection::config_path()?;
    let mut config = Config::load(&path)?;

    if let ConfigCommands::Set(setting) = cmd {
        match setting {
            ConfigSetCommands::BatchSize { size } => config.batch_size = size,
            ConfigSetCommands::CompletionPolicy { policy } => config.completion_policy = policy,
        }
        config.save(&path)?;
        tracing::info!(path = %path.display(), "config saved");
    }

    if json_output {
        output::json::emit(&output::json::success(output::json::config_json(&config)));
    } else {
        output::text::print_config(&config);
    }
    Ok(0)
}
