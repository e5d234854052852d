// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::Parser;

// Use library instead of local modules
use contact_dedup::{
    group_by_initial, init_logging, load_csv, run_and_report, Cli, Command, Config, ContactSource,
    DuplicateResolver, SqliteContactStore, CLI_LOG_FILTER,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(CLI_LOG_FILTER);

    match cli.command.unwrap_or(Command::Ui) {
        Command::Import { csv } => run_import(&cli.config, &csv)?,
        Command::List => run_list(&cli.config)?,
        Command::Dedupe { dry_run } => run_dedupe(&cli.config, dry_run)?,
        Command::Ui => run_ui_mode(&cli.config)?,
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<SqliteContactStore> {
    SqliteContactStore::open(&config.db_path)
        .with_context(|| format!("Cannot open contact store at {}", config.db_path.display()))
}

fn run_import(config: &Config, csv_path: &std::path::Path) -> Result<()> {
    println!("📂 Loading CSV...");
    let contacts = load_csv(csv_path)?;
    println!("✓ Loaded {} contacts from CSV", contacts.len());

    let mut store = open_store(config)?;
    store.insert_contacts(&contacts)?;

    let count = store.count()?;
    println!("✓ Database contains {} contacts", count);

    Ok(())
}

fn run_list(config: &Config) -> Result<()> {
    let mut store = open_store(config)?;
    let contacts = store.list_all()?;

    if contacts.is_empty() {
        println!("No contacts");
        return Ok(());
    }

    for (letter, group) in group_by_initial(&contacts) {
        println!("── {} ──", letter);
        for contact in group {
            match &contact.phone_type {
                Some(kind) => println!(
                    "  [{}] {}  {} ({})",
                    contact.id, contact.display_name, contact.phone_number, kind
                ),
                None => println!(
                    "  [{}] {}  {}",
                    contact.id, contact.display_name, contact.phone_number
                ),
            }
        }
    }

    Ok(())
}

fn run_dedupe(config: &Config, dry_run: bool) -> Result<()> {
    let mut store = open_store(config)?;

    if dry_run {
        let contacts = store.list_all()?;
        let groups = DuplicateResolver::new().duplicate_groups(&contacts);

        if groups.is_empty() {
            println!("No duplicate contacts found");
            return Ok(());
        }

        for group in &groups {
            let ids: Vec<String> = group.duplicates.iter().map(|id| id.to_string()).collect();
            println!("🔍 {}  keep [{}]  delete [{}]", group.key, group.keeper, ids.join(", "));
        }
        return Ok(());
    }

    let report = run_and_report(&mut store);
    match report.status {
        0 => println!("✅ {}", report.message),
        1 => println!("✓ {}", report.message),
        _ => {
            eprintln!("❌ {}", report.message);
            std::process::exit(i32::from(report.status));
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    let store = open_store(config)?;

    let mut app = ui::App::new(store);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: contact-dedup list / contact-dedup dedupe");
    std::process::exit(1);
}
