use std::env;

use anyhow::{Context, bail};
use clap::Parser as _;
use tracing_subscriber::EnvFilter;

use mullvad_catalog::{
    RelayInventory, RelayList,
    catalog::{AppList, Catalog},
    cli::{AppSource, Args, Command},
    expansion::{ExpansionState, LocationId},
    split_tunneling::{self, FilterContext, StaticIndex, launch},
};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let catalog = Catalog::new();

    match args.command {
        Command::Relays {
            file,
            api,
            search,
            expand,
        } => {
            let inventory = RelayInventory::load(&file, api)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            let relay_list = catalog.refresh_relays(&inventory)?;

            let mut state = ExpansionState::new();
            for location in expand {
                state.expand(parse_location(&location)?);
            }
            let relay_list = match search {
                Some(query) => relay_list.search(&query),
                None => RelayList::clone(&relay_list),
            };
            let relay_list = relay_list.with_expansion(&state);

            if args.json {
                println!("{}", serde_json::to_string_pretty(&relay_list)?);
            } else {
                print_relay_list(&relay_list);
            }
        }
        Command::Apps { source, search } => {
            let apps = load_apps(&catalog, source)?;
            let apps = split_tunneling::filter_applications(&apps, search.as_deref().unwrap_or(""));

            if args.json {
                println!("{}", serde_json::to_string_pretty(&apps)?);
            } else {
                for app in apps {
                    let warning = if app.warning.is_some() { " (!)" } else { "" };
                    println!("{}{warning}\t{}", app.name, app.absolute_path);
                }
            }
        }
        Command::Launch { path, source } => {
            let apps = load_apps(&catalog, source)?;
            let Some(app) = apps.iter().find(|app| app.absolute_path == path) else {
                bail!("No app with path {path}");
            };
            let child = launch::launch(app)?;
            tracing::info!(pid = child.id(), "Launched {}", app.name);
        }
    }

    Ok(())
}

/// `se` is a country and `se-got` a city. Relays have nothing to expand.
fn parse_location(location: &str) -> anyhow::Result<LocationId> {
    let mut parts = location.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(country), Some(city), None) if !country.is_empty() && !city.is_empty() => {
            Ok(LocationId::city(country, city))
        }
        (Some(country), None, None) if !country.is_empty() => Ok(LocationId::country(country)),
        _ => bail!("'{location}' is not a country or city code, e.g. `se` or `se-got`"),
    }
}

fn load_apps(catalog: &Catalog, source: AppSource) -> anyhow::Result<AppList> {
    let mut ctx = FilterContext::from_env();
    if let Some(desktop) = &source.desktop {
        ctx.current_desktops = FilterContext::new(desktop, None, None).current_desktops;
    }
    if let Some(locale) = &source.locale {
        ctx.locale = FilterContext::new("", Some(locale), None).locale;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async {
        match source.apps_file {
            Some(path) => {
                let index = StaticIndex::load(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                catalog.refresh_apps(index, ctx).await
            }
            #[cfg(target_os = "linux")]
            None => {
                let index = split_tunneling::desktop::DesktopEntryIndex::new();
                catalog.refresh_apps(index, ctx).await
            }
            #[cfg(not(target_os = "linux"))]
            None => bail!("--apps-file is required on this platform"),
        }
    })
}

fn print_relay_list(relay_list: &RelayList) {
    let marker = |expanded: bool| if expanded { "-" } else { "+" };
    for country in &relay_list.countries {
        println!(
            "{} {} ({})",
            marker(country.expanded),
            country.name,
            country.country_code
        );
        if !country.expanded {
            continue;
        }
        for city in &country.cities {
            println!("  {} {} ({})", marker(city.expanded), city.name, city.city_code);
            if !city.expanded {
                continue;
            }
            for relay in &city.relays {
                println!("      {}", relay.hostname);
            }
        }
    }
}
