//! Serve command - development server over the output directory

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use tokio::net::TcpListener;

use crate::server::create_router;

/// Run the serve command until Ctrl+C.
pub async fn run(output_dir: &Path, host: &str, port: u16) -> Result<()> {
    if !output_dir.is_dir() {
        tracing::warn!(
            dir = %output_dir.display(),
            "output directory does not exist yet, run `weft build` first"
        );
    }

    let app = create_router(output_dir);
    let addr = format!("{host}:{port}");

    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  Serving {} at http://{addr}", output_dir.display());
    println!("  Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
        .wrap_err("Server error")?;

    Ok(())
}
