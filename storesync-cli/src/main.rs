//! Command line update checker for the store delivery service.

mod args;

use args::Args;
use clap::Parser;
use std::process::ExitCode;
use storesync::config::ClientConfig;
use storesync::http::ReqwestClient;
use storesync::inventory::StaticInventory;
use storesync::logging::{default_log_dir, default_log_file, init_logging};
use storesync::store::Store;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "update resolution failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::new()
        .with_market(&args.market)
        .with_timeout_secs(args.timeout)
        .with_dependency_narrowing(args.narrow_dependencies);
    if let Some(arch) = args.arch {
        config = config.with_host_architecture(arch);
    }

    let http = ReqwestClient::with_timeout(config.timeout_secs())?;
    // Nothing is installed from the CLI's point of view, so every
    // published package of each product is reported.
    let store = Store::new(config, http, StaticInventory::new());

    let product_ids = if args.family_names {
        store.resolve_family_names(&args.product_ids).await?
    } else {
        args.product_ids.clone()
    };

    for product in store.get_products(&product_ids).await? {
        let identities = store.sync_updates(&product).await?;
        if identities.is_empty() {
            println!("{}: up to date (or unsupported on this host)", product.title);
            continue;
        }

        println!("{}: {} update(s)", product.title, identities.len());
        for identity in &identities {
            let kind = if identity.main_package { "main" } else { "dependency" };
            if args.urls {
                let url = store.get_url(identity).await?;
                println!("  [{kind}] {} r{}  {url}", identity.update_id, identity.revision_number);
            } else {
                println!("  [{kind}] {} r{}", identity.update_id, identity.revision_number);
            }
        }
    }

    Ok(())
}
