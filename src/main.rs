use chrono::Utc;
use clap::Parser;
use dotenv::dotenv;
use log::info;
use std::path::PathBuf;
use uuid::Uuid;

use contract_pdf::{
    ContractComposer, ContractConfig, ContractStore, DisplayIdGenerator, FontCatalog, LayoutPlan,
    PageGeometry, Party, SignatureAmender, Signee, Trade,
    compose::header_height,
};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Generates a trade contract PDF and signs it for all three roles.")]
struct Args {
    #[clap(long, default_value = "config.toml")]
    config: PathBuf,
    #[clap(long, default_value = "Walmart")]
    buyer_company: String,
    #[clap(long, default_value = "John Doe")]
    buyer_name: String,
    #[clap(long, default_value = "Best Buy")]
    seller_company: String,
    #[clap(long, default_value = "Richard Roe")]
    seller_name: String,
    #[clap(long, default_value = "Brett Esbaum")]
    admin_signer: String,
    /// Upload the signed contract to the configured object store.
    #[clap(long)]
    upload: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let config = ContractConfig::load_or_default(&args.config);
    let fonts = FontCatalog::load(&config)?;
    let plan = LayoutPlan::new(PageGeometry::letter(), &fonts, header_height(&config, &fonts)?);

    let trade = Trade {
        id: Uuid::new_v4(),
        display_id: DisplayIdGenerator::default().execute(),
        created_at: Utc::now(),
        buyer: Party {
            external_id: "test1".to_string(),
            full_name: args.buyer_name.clone(),
            company_name: args.buyer_company.clone(),
        },
        seller: Party {
            external_id: "test2".to_string(),
            full_name: args.seller_name.clone(),
            company_name: args.seller_company.clone(),
        },
    };

    let composer = ContractComposer::new(&config, &fonts, &plan);
    let mut handle = composer.generate(&trade)?;

    let amender = SignatureAmender::new(&fonts, &plan);
    amender.add_signature(&mut handle, &args.buyer_name, Signee::Buyer)?;
    amender.add_signature(&mut handle, &args.seller_name, Signee::Seller)?;
    amender.add_signature(&mut handle, &args.admin_signer, Signee::Admin)?;
    info!("contract fully signed: {}", handle.path().display());

    if args.upload {
        let store = ContractStore::from_env()?;
        store.upload(handle.path(), trade.id)?;
        info!("uploaded {} as {}", handle.path().display(), trade.id);
    }

    println!("{}", handle.path().display());
    Ok(())
}
