//! Stage protocol component addresses in the registry and commit them on Casper livenet/testnet.
//!
//! Usage:
//!   cargo odra build          # builds wasm/Registry.wasm via protocol_deployer_contracts_build_contract
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000
//!
//! Optional:
//!   DEPLOYMENT_MANIFEST=deployment.json   components, aliases and listeners to stage
//!   REGISTRY_ADDRESS=hash-...             reuse an existing registry for the next epoch
//!   REGISTRY_OPEN=true                    deploy a registry any account may stage into

use odra::host::{Deployer, HostRef, HostRefLoader};

use protocol_deployer_contracts::deployment::{
    commit_and_notify, parse_address, DeploymentError, DeploymentManifest,
};
use protocol_deployer_contracts::registry::{Registry, RegistryHostRef, RegistryInitArgs};

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();

    if let Err(err) = run() {
        eprintln!("Deployment failed: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), DeploymentError> {
    println!("=== Protocol Registry Deployment ===");
    println!();

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();

    // Configure payment amount for deployments/calls (required for Casper 2.0 txs)
    let payment_amount: u64 = std::env::var("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(200_000_000_000);
    env.set_gas(payment_amount);

    let deployer = env.caller();
    println!("Deployer: {:?}", deployer);
    println!();

    let manifest_path =
        std::env::var("DEPLOYMENT_MANIFEST").unwrap_or_else(|_| "deployment.json".to_string());
    let manifest = DeploymentManifest::from_file(&manifest_path)?;
    println!(
        "Manifest {}: {} contracts, {} aliases, {} listeners",
        manifest_path,
        manifest.contracts.len(),
        manifest.aliases.len(),
        manifest.listeners.len()
    );
    println!();

    // ==================== Phase 1: Registry ====================
    println!("=== Phase 1: Registry ===");
    println!();

    let mut registry = match std::env::var("REGISTRY_ADDRESS") {
        Ok(address) => {
            let address = parse_address(&address)?;
            println!("Loading Registry at: {:?}", address);
            Registry::load(&env, address)
        }
        Err(_) => {
            let open = std::env::var("REGISTRY_OPEN")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false);
            let owner = if open { None } else { Some(deployer) };

            println!("Deploying Registry...");
            let registry = Registry::deploy(&env, RegistryInitArgs { owner });
            println!("Registry deployed at: {:?}", registry.address().clone());
            registry
        }
    };
    println!("Current epoch: {}", registry.get_epoch());
    println!();

    // ==================== Phase 2: Staging ====================
    println!("=== Phase 2: Staging ===");
    println!();

    let staged = manifest.apply(&mut registry)?;
    for entry in registry.get_staged_entries() {
        let marker = if entry.notify { "" } else { " (silent)" };
        println!("  staged {:<28} {:?}{}", entry.name, entry.address, marker);
    }
    for alias in manifest.aliases.iter() {
        println!("  alias  {:<28} -> {}", alias.alias, alias.target);
    }
    println!("Staged {} contracts.", staged);
    println!();

    // ==================== Phase 3: Commit & Notify ====================
    println!("=== Phase 3: Commit & Notify ===");
    println!();

    let report = commit_and_notify(&mut registry)?;
    println!("Committed epoch {} ({} changed).", report.epoch, report.changed.len());
    for (listener, count) in report.delivered.iter() {
        println!("  refreshed {:?} with {} changes", listener, count);
    }
    for failure in report.failed.iter() {
        eprintln!(
            "  listener {:?} refused refresh: {:?} (changes stay queued)",
            failure.listener, failure.error
        );
    }

    println!();
    println!("=== Deployment Complete ===");
    println!();
    print_address_table(&registry);

    Ok(())
}

fn print_address_table(registry: &RegistryHostRef) {
    println!("Contract Addresses:");
    for name in registry.get_names() {
        let address = registry.resolve(name.clone());
        println!("  {:<28} {:?}", format!("{}:", name), address);
    }

    let aliases = registry.get_aliases();
    if aliases.is_empty() {
        return;
    }
    println!();
    println!("Aliases:");
    for alias in aliases {
        println!("  {:<28} -> {}", format!("{}:", alias.alias), alias.target);
    }
}
