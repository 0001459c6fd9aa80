use clap::Parser;
use eyre::Result;
use scatter_cli::args::{Cli, Command, SampleArgs, UploadArgs};
use scatter_cli::{config, prompt, run, sample};
use scatter_core::config::Target;
use scatter_storage::local::LocalCloud;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = config::load(cli.config.as_deref())?;
    cli.overrides.apply(&mut config);

    match cli.command.unwrap_or(Command::Upload(UploadArgs::default())) {
        Command::Upload(args) => {
            let decider = prompt::decider(args.yes, args.non_interactive);
            let summary = run::upload(&config, decider.as_ref()).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                run::print_summary(&summary, &config.container_name);
            }
        }
        Command::Key { names } => {
            for key in run::keys_for(&config, &names)? {
                println!("{key}");
            }
        }
        Command::Path => match run::target_dir(&config)? {
            Some(path) => println!("{path}"),
            None => println!("(partition paths disabled)"),
        },
        Command::Config { write } => {
            config.validate()?;
            match write {
                Some(path) => config::save(&config, &path)?,
                None => println!("{}", serde_json::to_string_pretty(&config)?),
            }
        }
        Command::SetupLocal => {
            if config.target != Target::Local {
                return Err(eyre::eyre!("setup-local only applies to the local target"));
            }
            config.descriptor()?;
            let cloud = LocalCloud::new(&config.local_root);
            cloud.create_resource_group(&config.resource_group).await?;
            println!(
                "resource group {} ready under {}",
                config.resource_group,
                config.local_root.display()
            );
        }
        Command::Sample(SampleArgs {
            dir,
            count,
            rows,
            seed,
        }) => {
            let dir = dir.unwrap_or_else(|| config.source_directory.clone());
            let written = sample::generate(&dir, count, rows, seed)?;
            println!("wrote {} files to {}", written.len(), dir.display());
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
