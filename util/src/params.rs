//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use thiserror::Error;
use toml;

use crate::host;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (STANDOFF_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parameter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the `params` directory under the software
/// root (see [`crate::host::get_sw_root`]).
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    // Get the params dir
    let mut path = host::get_sw_root().map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    // Load the file into a string
    let params_str = match read_to_string(path) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(e)),
    };

    // Parse the string into the parameter struct
    match toml::from_str(params_str.as_str()) {
        Ok(p) => Ok(p),
        Err(e) => Err(LoadError::DeserialiseError(e)),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct TestParams {
        period_s: f64,
        name: String,
    }

    #[test]
    fn test_load() {
        // Build a temporary software root with a params dir inside it
        let mut root = std::env::temp_dir();
        root.push(format!("standoff_sw_params_test_{}", std::process::id()));
        let mut params_dir = root.clone();
        params_dir.push("params");
        std::fs::create_dir_all(&params_dir).unwrap();

        let mut file = params_dir.clone();
        file.push("test.toml");
        std::fs::write(&file, "period_s = 0.02\nname = \"loop\"\n").unwrap();

        std::env::set_var(crate::host::SW_ROOT_ENV_VAR, &root);

        let params: TestParams = load("test.toml").unwrap();
        assert_eq!(params.period_s, 0.02);
        assert_eq!(params.name, "loop");

        assert!(load::<TestParams>("no_such_file.toml").is_err());

        std::fs::remove_dir_all(&root).ok();
    }
}
