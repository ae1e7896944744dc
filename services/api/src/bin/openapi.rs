//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the studio API. The output path defaults to
//! `openapi.json` and can be given as the first argument.

use lumiere_api::web::rest::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let spec_json = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&output, spec_json)?;
    println!("OpenAPI document written to {}", output.display());
    Ok(())
}
