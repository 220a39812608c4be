use crate::cli::open_manager;
use crate::error::FocusError;
use crate::output;

pub fn run(batch_size: Option<usize>, json_output: bool) -> i32 {
    match run_inner(batch_size, json_output) {
        Ok(code) => code,
        Err(e) => output::fail(&e, json_output),
    }
}

fn run_inner(batch_size: Option<usize>, json_output: bool) -> Result<i32, FocusError> {
    let manager = open_manager()?;
    let batch = match batch_size {
        Some(size) => manager.batch_of(size)?,
        None => manager.current_batch()?,
    };

    if json_output {
        output::json::emit(&output::json::success(output::json::batch_json(&batch)));
    } else {
        output::text::print_batch(&batch);
    }
    Ok(0)
}
