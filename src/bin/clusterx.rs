// Native binary for clusterx - one-shot commands and an interactive shell

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::unbounded_channel;

use clusterx::{
    app::{self, App, AppEvent},
    config::{self, CliArgs, Command},
    gateway::{Gateway, HttpGateway},
    navigation::{self, NavigationIntent},
    router,
    util_text::{format_btc, short_id},
    views::{ViewSettings, ViewState},
};

#[tokio::main]
async fn main() {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = CliArgs::parse();
    let cfg = config::resolve(&args).context("Failed to load configuration")?;
    if args.verbose {
        cfg.print_summary();
    }

    let gw: Arc<dyn Gateway> = Arc::new(HttpGateway::from_config(&cfg)?);
    let settings = ViewSettings::from(&cfg);
    let mut app = App::new(settings);

    let command = args.command.unwrap_or(Command::Dashboard);
    let (intent, page) = match command {
        Command::Shell => return shell(app, gw).await,
        Command::Search { query } => (navigation::resolve_search_submit(&query.join(" "))?, None),
        Command::Address { address, page } => {
            (NavigationIntent::ShowAddressDetail { address }, page)
        }
        Command::Cluster { id } => (NavigationIntent::ShowClusterDetail { cluster_id: id }, None),
        Command::Clusters { page } => (NavigationIntent::ShowClustersList { page }, None),
        Command::Analytics => (NavigationIntent::ShowAnalytics, None),
        Command::Dashboard => (NavigationIntent::ShowDashboard, None),
        Command::Open { path } => {
            let intent = router::parse(&path)
                .with_context(|| format!("unrecognized route: {path}"))?;
            (intent, None)
        }
    };

    let ticket = app.navigate(intent);
    app.apply(app::execute_load(gw.as_ref(), ticket, settings).await);

    if let Some(page) = page.filter(|p| *p > 1) {
        let ticket = app
            .jump_to_page(page)
            .with_context(|| format!("page {page} is out of range"))?;
        app.apply(app::execute_page(gw.as_ref(), ticket).await);
    }

    if let Some(err) = app.error().or(app.page_error()) {
        return Err(err.clone().into());
    }
    let view = app.view().context("no view was loaded")?;
    println!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}

const SHELL_HELP: &str = "commands: n next page, p prev page, g <n> go to page, b back, \
d dashboard, a analytics, c clusters, /<route> open route, q quit; anything else searches";

async fn shell(mut app: App, gw: Arc<dyn Gateway>) -> Result<()> {
    let (tx, mut rx) = unbounded_channel::<AppEvent>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let settings = *app.settings();

    eprintln!("{SHELL_HELP}");
    let ticket = app.navigate(NavigationIntent::ShowDashboard);
    app::spawn_load(gw.clone(), ticket, settings, tx.clone());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                let mut parts = input.splitn(2, ' ');
                let head = parts.next().unwrap_or("");
                let rest = parts.next().unwrap_or("").trim();

                match head {
                    "q" | "quit" | "exit" => break,
                    "?" | "help" => eprintln!("{SHELL_HELP}"),
                    "n" | "p" | "g" => {
                        let ticket = match head {
                            "n" => app.next_page(),
                            "p" => app.prev_page(),
                            _ => rest.parse::<u64>().ok().and_then(|n| app.jump_to_page(n)),
                        };
                        match ticket {
                            Some(t) => {
                                app::spawn_page(gw.clone(), t, tx.clone());
                            }
                            None => eprintln!("no such page"),
                        }
                    }
                    "b" => match app.back() {
                        Some(t) => {
                            app::spawn_load(gw.clone(), t, settings, tx.clone());
                        }
                        None => eprintln!("nothing to go back to"),
                    },
                    _ => {
                        let intent = match head {
                            "d" => Some(NavigationIntent::ShowDashboard),
                            "a" => Some(NavigationIntent::ShowAnalytics),
                            "c" => Some(NavigationIntent::ShowClustersList { page: None }),
                            _ if input.starts_with('/') || input.starts_with('#') => {
                                let parsed = router::parse(input);
                                if parsed.is_none() {
                                    eprintln!("unrecognized route: {input}");
                                }
                                parsed
                            }
                            _ => None,
                        };
                        let ticket = match intent {
                            Some(intent) => Some(app.navigate(intent)),
                            None if input.starts_with('/') || input.starts_with('#') => None,
                            None => match app.submit_search(input) {
                                Ok(t) => Some(t),
                                Err(e) => {
                                    eprintln!("{}", e.user_message());
                                    None
                                }
                            },
                        };
                        if let Some(t) = ticket {
                            eprintln!("loading {}", router::to_path(&t.intent));
                            app::spawn_load(gw.clone(), t, settings, tx.clone());
                        }
                    }
                }
            }
            Some(ev) = rx.recv() => {
                if app.apply(ev) {
                    print_state(&app);
                }
            }
        }
    }

    Ok(())
}

fn print_state(app: &App) {
    if let Some(err) = app.error() {
        println!("error: {}", err.user_message());
        return;
    }
    if let Some(err) = app.page_error() {
        println!("page failed: {} (still on the previous page)", err.user_message());
    }
    let Some(view) = app.view() else { return };

    match view {
        ViewState::Dashboard(v) => {
            let s = &v.summary;
            println!(
                "{} addresses, {} clusters, {} transactions, {}",
                s.total_addresses,
                s.total_clusters,
                s.total_transactions,
                format_btc(s.total_balance)
            );
        }
        ViewState::Analytics(v) => {
            println!("avg cluster size {:.2}", v.summary.avg_cluster_size);
            for bucket in &v.distribution {
                println!("  {:>10}  {}", bucket.range, bucket.count);
            }
        }
        ViewState::Address(v) => {
            println!("{}  {}", v.address.address, format_btc(v.address.balance));
            match &v.cluster {
                Some(c) => println!("  cluster {} ({})", c.display_name(), c.id),
                None => println!("  not clustered"),
            }
            for t in &v.transactions.rows {
                println!("  {}", short_id(&t.txid, 8));
            }
        }
        ViewState::Cluster(v) => {
            println!(
                "{}  {} addresses  {}",
                v.detail.cluster.display_name(),
                v.detail.cluster.address_count,
                format_btc(v.detail.cluster.total_balance)
            );
            for m in &v.detail.addresses {
                println!("  {}  {}", short_id(&m.address, 10), format_btc(m.balance));
            }
        }
        ViewState::Clusters(v) => {
            for c in &v.clusters.rows {
                println!(
                    "  {:<24} {:>6}  {}",
                    c.display_name(),
                    c.address_count,
                    format_btc(c.total_balance)
                );
            }
        }
        ViewState::Search(v) => {
            if v.result.is_empty() {
                println!("no results for \"{}\"", v.query);
            }
            for a in &v.result.addresses {
                println!("  address  {}", a.address);
            }
            for c in &v.result.clusters {
                println!("  cluster  {} ({})", c.display_name(), c.id);
            }
            for t in &v.result.transactions {
                println!("  tx       {}", short_id(&t.txid, 10));
            }
        }
    }

    if !view_degraded(view).is_empty() {
        println!("  (unavailable: {})", view_degraded(view).join(", "));
    }
    if let Some(c) = view.cursor() {
        println!("page {}/{} ({} total)", c.page(), c.total_pages(), c.total());
    }
}

fn view_degraded(view: &ViewState) -> Vec<&'static str> {
    match view {
        ViewState::Address(v) => v.degraded.iter().copied().collect(),
        ViewState::Cluster(v) => v.degraded.iter().copied().collect(),
        ViewState::Analytics(v) => v.degraded.iter().copied().collect(),
        _ => Vec::new(),
    }
}
