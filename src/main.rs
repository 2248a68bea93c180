use avenue_auth::config::{config_schema, load_config};
use avenue_auth::utils::init_logging;
use tracing::info;

const USAGE: &str = "usage: avenue-auth [schema | check [CONFIG]]";

// -- Entrypoint

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("schema") => match config_schema() {
            Ok(schema) => println!("{}", schema),
            Err(e) => fail(&format!("Error rendering schema: {}", e)),
        },
        Some("check") | None => {
            let path = args.get(1).map(String::as_str).unwrap_or("./config.yaml");
            check(path);
        }
        Some(_) => fail(USAGE),
    }
}

/// Load the config at `path`, bring up logging with it, and report what the
/// auth context would be wired to.
fn check(path: &str) {
    let config = match load_config(path) {
        Ok(cfg) => cfg,
        Err(e) => fail(&format!("Error loading configuration: {}", e)),
    };
    if let Err(e) = init_logging(&config.logging) {
        fail(&format!("Error initialising logging: {}", e));
    }

    info!(
        event_name = "config.check.succeeded",
        event_domain = "config",
        graphql_uri = config.graphql.uri.as_str(),
        api_base_url = config.api.base_url.as_str(),
        permissions_path = config.api.permissions_path.as_str(),
        dashboard = config.routes.dashboard.as_str(),
        login = config.routes.login.as_str(),
        continue_param = config.routes.continue_param.as_str(),
        "configuration is valid"
    );
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}
