pub mod config;
pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Request from `--input <file>` or piped stdin, in that order.
///
/// `Ok(None)` means neither was given and the caller builds the request from flags.
pub fn read_request<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    if let Some(data) = stdin::read_stdin()? {
        return Ok(Some(serde_json::from_value(data)?));
    }
    Ok(None)
}
