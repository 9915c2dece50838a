//! Build command - regenerates the output directory

use std::time::Instant;

use color_eyre::eyre::{Result, WrapErr};
use weft_generator::{BuildContext, BuildStats, Site};

/// Run the build command.
///
/// The build runs on a blocking thread; Ctrl+C cancels it, which kills a
/// running build command.
pub async fn run(mut site: Site, cx: BuildContext) -> Result<()> {
    let start = Instant::now();
    let output = site.output_dir().to_path_buf();
    tracing::info!(output = %output.display(), "Starting build");

    let interrupt = cx.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling build");
            interrupt.cancel();
        }
    });

    let result = tokio::task::spawn_blocking(move || site.build(&cx))
        .await
        .wrap_err("Build task panicked")?;
    signal.abort();

    let stats = result.wrap_err("Build failed")?;
    let duration = start.elapsed();

    print_build_stats(&stats);
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Output:     {}", output.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed");

    Ok(())
}

/// Print build statistics in a user-friendly format.
fn print_build_stats(stats: &BuildStats) {
    println!();
    if stats.failed_pages.is_empty() {
        println!("  Build completed successfully!");
    } else {
        println!("  Build completed with {} failed page(s):", stats.failed_pages.len());
        for path in &stats.failed_pages {
            println!("  ✗ {path}");
        }
    }
    println!();
    println!("  Commands:   {}", stats.commands);
    println!("  Assets:     {}", stats.assets);
    println!("  Public:     {}", stats.public_files);
    println!("  Pages:      {}", stats.pages);
    println!();
}
