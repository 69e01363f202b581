//! Perishables - demonstration driver
//!
//! Adds a handful of items, optionally takes some out again, and prints
//! notifications live as removals and expirations happen.

use anyhow::{bail, Context};
use perishables::{Inventory, Item};
use std::time::Duration;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// An item given on the command line.
#[derive(Debug, Clone)]
struct ItemArg {
    label: String,
    kind: String,
    ttl: Duration,
}

impl ItemArg {
    /// Parses `<label>:<type>:<seconds>`. The label may itself contain colons.
    fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut parts = raw.rsplitn(3, ':');
        let (Some(secs), Some(kind), Some(label)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("expected <label>:<type>:<seconds>, got {raw:?}");
        };

        let secs: f64 = secs
            .parse()
            .with_context(|| format!("invalid number of seconds in {raw:?}"))?;
        let ttl = Duration::try_from_secs_f64(secs)
            .with_context(|| format!("seconds must be non-negative in {raw:?}"))?;

        Ok(Self {
            label: label.to_string(),
            kind: kind.to_string(),
            ttl,
        })
    }

    fn into_item(self) -> Item {
        Item::expiring_in(self.label, self.kind, self.ttl)
    }
}

/// Demo configuration
struct Config {
    /// Items to add, in order
    items: Vec<ItemArg>,
    /// Labels to take out after adding
    removals: Vec<String>,
    /// How long to keep watching (default: until the last item expires)
    wait: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            items: vec![
                ItemArg {
                    label: "first item".to_string(),
                    kind: "first type".to_string(),
                    ttl: Duration::from_secs(1),
                },
                ItemArg {
                    label: "second item".to_string(),
                    kind: "first type".to_string(),
                    ttl: Duration::from_secs(4),
                },
            ],
            removals: Vec::new(),
            wait: None,
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let mut items = Vec::new();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--item" | "-i" => {
                    let Some(raw) = args.get(i + 1) else {
                        exit_with("--item requires a value");
                    };
                    match ItemArg::parse(raw) {
                        Ok(item) => items.push(item),
                        Err(e) => exit_with(&format!("{e:#}")),
                    }
                    i += 2;
                }
                "--remove" | "-r" => {
                    let Some(label) = args.get(i + 1) else {
                        exit_with("--remove requires a value");
                    };
                    config.removals.push(label.clone());
                    i += 2;
                }
                "--wait" | "-w" => {
                    let Some(raw) = args.get(i + 1) else {
                        exit_with("--wait requires a value");
                    };
                    let secs = raw
                        .parse::<f64>()
                        .ok()
                        .and_then(|s| Duration::try_from_secs_f64(s).ok())
                        .unwrap_or_else(|| exit_with("invalid number of seconds for --wait"));
                    config.wait = Some(secs);
                    i += 2;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("Perishables version {}", perishables::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        if !items.is_empty() {
            config.items = items;
        }
        config
    }

    /// How long to watch: the explicit wait, or a little past the last expiry.
    fn watch_for(&self) -> Duration {
        self.wait.unwrap_or_else(|| {
            let longest = self.items.iter().map(|item| item.ttl).max().unwrap_or_default();
            longest + Duration::from_millis(250)
        })
    }
}

fn exit_with(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn print_help() {
    println!(
        r#"
Perishables - An Expiring Inventory with Notifications

USAGE:
    perishables [OPTIONS]

OPTIONS:
    -i, --item <LABEL:TYPE:SECONDS>   Add an item expiring after SECONDS (repeatable)
    -r, --remove <LABEL>              Take an item out after adding (repeatable)
    -w, --wait <SECONDS>              How long to watch (default: until the last expiry)
    -v, --version                     Print version information
    -h, --help                        Print this help message

With no --item, two demo items are added, expiring after 1s and 4s.

EXAMPLES:
    perishables
    perishables -i "milk:dairy:2" -i "bread:bakery:5" -r bread
    RUST_LOG=perishables=debug perishables -i "eggs:dairy:1.5"
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    println!(
        "Perishables v{} - watching {} item(s) for {:.1}s\n",
        perishables::VERSION,
        config.items.len(),
        config.watch_for().as_secs_f64()
    );

    let inventory = Inventory::new()?;

    // Print notifications as they happen
    let mut events = inventory.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(notification) => println!("  {notification}"),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Notification printer fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let watch_for = config.watch_for();

    for item in config.items {
        let item = item.into_item();
        info!("Adding {}", item);
        inventory.add(item)?;
    }

    for label in &config.removals {
        match inventory.remove(label) {
            Some(item) => info!("Took out {}", item),
            None => warn!("No item labelled {:?} in the inventory", label),
        }
    }

    tokio::select! {
        _ = tokio::time::sleep(watch_for) => {}
        result = signal::ctrl_c() => {
            result.context("failed to listen for Ctrl+C")?;
            info!("Interrupted, stopping early...");
        }
    }

    printer.abort();

    let stats = inventory.stats();
    println!("\nNotification log:");
    for line in inventory.list_notifications() {
        println!("  {line}");
    }
    println!(
        "\n{} added, {} removed, {} expired, {} still in inventory",
        stats.added, stats.removed, stats.expired, stats.live_items
    );

    Ok(())
}
