//! `pivotsql version`.

pub fn run() {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!();
    println!("Pivoted Query Synthesis for SQL engines.");
    println!();
    println!("Engines:");
    println!("  DuckDB (bundled, in-memory)");
    println!("Printer dialects:");
    println!("  duckdb, postgres");
    println!();
    println!("Build target: {}-{}", std::env::consts::ARCH, std::env::consts::OS);
}
