//! Writes the OpenAPI document to `openapi.json` next to this crate's manifest.
//!
//! Usage: `cargo run --bin generate_openapi`

use agentwire::server::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spec = ApiDoc::openapi().to_pretty_json()?;

    let out_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("openapi.json");
    std::fs::write(&out_path, &spec)?;

    println!("Wrote OpenAPI spec to {}", out_path.display());
    Ok(())
}
