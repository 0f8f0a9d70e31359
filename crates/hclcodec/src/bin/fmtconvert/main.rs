mod cli;

use anyhow::Context;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("FMTCONVERT_LOG"))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = convert(&cli) {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

fn convert(cli: &cli::Cli) -> anyhow::Result<()> {
    anyhow::ensure!(
        cli.from != cli.to,
        "--from and --to are both {}, nothing to convert",
        cli.from
    );

    let input = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    tracing::info!(file = %cli.file.display(), from = %cli.from, to = %cli.to, "converting");

    let output = hclcodec::transcode::convert(&input, cli.from.into(), cli.to.into())
        .with_context(|| format!("Failed to convert {} from {} to {}", cli.file.display(), cli.from, cli.to))?;

    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}
