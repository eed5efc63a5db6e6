use anyhow::Result;
use nimbus_core::{AppError, Config};
use nimbus_ui::AppServices;

/// Headless run of the home screen.
///
/// `nimbus` shows the forecast for the last city (or the default one).
/// `nimbus <query>` also searches for `query` and switches to the first match.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    nimbus_core::init()?;

    if let Err(e) = run(std::env::args().nth(1)).await {
        eprintln!("{}", e.user_message());
        return Err(e.into());
    }
    Ok(())
}

async fn run(query: Option<String>) -> Result<(), AppError> {
    let (config, _warnings) = Config::load_validated()?;
    let services = AppServices::from_config(config)?;
    let mut screen = services.home_screen(tokio::runtime::Handle::current());

    tracing::info!("Nimbus started");

    screen.mount();
    screen.settle().await;
    print!("{}", screen.view());

    if let Some(query) = query {
        screen.toggle_search();
        screen.set_query(query.as_str());
        screen.settle().await;
        print!("{}", screen.view());

        if screen.select_candidate(0) {
            screen.settle().await;
            println!();
            print!("{}", screen.view());
        } else if screen.last_search_error().is_none() {
            println!("No places match {:?}", query);
        }
    }

    Ok(())
}
