use clap::Parser;
use passvault::cli::{commands, output, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr so stdout stays clean for `get` and `generate`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            ref host,
            port,
            ref ca,
            kdf,
            force,
        } => commands::init::execute(&cli, host, port, ca, kdf, force),
        Commands::List { ref filter } => commands::list::execute(&cli, filter.as_deref()),
        Commands::Get {
            ref name,
            entry_type,
            ref output,
        } => commands::get::execute(&cli, name, entry_type, output.as_deref()),
        Commands::Set {
            ref name,
            entry_type,
            ref username,
            ref file,
            generate,
        } => commands::set::execute(
            &cli,
            name,
            entry_type,
            username.as_deref(),
            file.as_deref(),
            generate,
        ),
        Commands::Delete {
            ref name,
            entry_type,
            force,
        } => commands::delete::execute(&cli, name, entry_type, force),
        Commands::Rename {
            ref name,
            ref new_name,
            entry_type,
        } => commands::rename::execute(&cli, name, new_name, entry_type),
        Commands::Generate { length } => commands::generate::execute(length),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
