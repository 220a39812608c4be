pub mod json;
pub mod text;

use crate::error::FocusError;

/// Report an error in the requested format and return the failure exit code.
pub fn fail(err: &FocusError, json_output: bool) -> i32 {
    if json_output {
        json::emit(&json::error(err));
    } else {
        eprintln!("Error: {}", err.message);
    }
    1
}
