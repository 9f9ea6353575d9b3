mod cli;

use tsnode::loader::Loaded;
use tsnode::site_configs::SiteConfigs;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("TSNODE_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let command_result = match cli.command {
        cli::Command::App(app_cli) => app(app_cli),
        cli::Command::Sites(sites_cli) => sites(sites_cli),
        cli::Command::Lookup(lookup_cli) => lookup(lookup_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn app(cli: cli::AppCommand) -> anyhow::Result<()> {
    let loaded = load(&cli.input)?;
    output(&cli.output, &loaded.app_entry()?)
}

pub fn sites(cli: cli::SitesCommand) -> anyhow::Result<()> {
    let loaded = load(&cli.input)?;
    let site_configs = SiteConfigs::new();
    loaded.provision(&site_configs);

    output(&cli.output, &site_configs.snapshot())
}

pub fn lookup(cli: cli::LookupCommand) -> anyhow::Result<()> {
    let loaded = load(&cli.input)?;
    let site_configs = SiteConfigs::new();
    loaded.provision(&site_configs);

    let resolved = tsnode::resolve::lookup(&cli.node, &site_configs, &loaded.app);
    output(&cli.output, &resolved)
}

fn load(input: &cli::InputArgs) -> anyhow::Result<Loaded> {
    let Some(file) = &input.file else {
        let stdin = std::io::read_to_string(std::io::stdin())?;
        return Ok(Loaded::parse(&stdin, None)?);
    };

    Ok(tsnode::loader::load_file(file)?)
}

fn output(output: &cli::OutputArgs, value: &impl serde::Serialize) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}
