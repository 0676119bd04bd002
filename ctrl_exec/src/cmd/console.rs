//! Operator console task
//!
//! Runs on its own thread, blocking on operator input while the control
//! loop keeps its cadence. The console is the sole writer of the shared
//! [`crate::param_store::ParamStore`]; the two tasks share nothing else.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;

// Internal
use super::parse_line;
use crate::cmd_processor;
use crate::param_store::ParamStore;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Prompt shown to the operator.
pub const PROMPT: &str = "standoff $ ";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the operator console until a stop is requested.
///
/// Commands are parsed token by token; every parsed command is executed
/// through the command processor and every malformed token is echoed back.
/// `Ctrl-C`/`Ctrl-D` at the prompt count as a stop request, so the loop can
/// always be shut down from the console.
pub fn console_task(store: Arc<ParamStore>, history_path: PathBuf) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            // Without a console the operator has no way to stop the loop,
            // so a console that cannot start stops the whole exec
            log::error!("Could not start the operator console: {}", e);
            store.request_stop();
            return;
        }
    };

    if rl.load_history(&history_path).is_err() {
        debug!("No console history found");
    }

    while store.is_running() {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                for parsed in parse_line(&line) {
                    match parsed {
                        Ok(op_cmd) => {
                            println!("{}", cmd_processor::exec(&store, &op_cmd));
                        }
                        Err(e) => println!("{}", e),
                    }

                    // Anything following a stop on the same line is a no-op
                    if !store.is_running() {
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Stopping execution");
                store.request_stop();
                break;
            }
            Err(e) => {
                warn!("Console read error: {}", e);
                store.request_stop();
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(&history_path) {
        debug!("Could not save console history: {}", e);
    }
}
