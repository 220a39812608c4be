use serde_json::json;

use crate::db::connection;
use crate::output;

pub fn run(json_output: bool) -> i32 {
    match connection::init_db() {
        Ok(path) => {
            if json_output {
                output::json::emit(&output::json::success(json!({
                    "path": path.to_string_lossy()
                })));
            } else {
                println!("Initialized taskfocus at {}", path.display());
            }
            0
        }
        Err(e) => output::fail(&e, json_output),
    }
}
