//! `atlus` command-line front end.

use anyhow::{bail, Context};
use atlus_client::{init_logging, AppState};
use atlus_core::NodeQuery;
use serde::Serialize;

const USAGE: &str = "usage: atlus <command>

commands:
  health                    check that the backend is reachable
  login <email> <password>  sign in and store the session token
  logout                    forget the session token
  brains                    list your brains
  nodes <brain-id> [page]   list nodes in a brain
  graph <brain-id>          print a brain's graph
  node <node-id>            print a single node";

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    if matches!(command, "help" | "--help" | "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let state = AppState::initialize().context("failed to load Atlus configuration")?;
    init_logging(&state.config().log_filter);

    let store = state.store();
    match (command, &args[1..]) {
        ("health", []) => {
            let health = state.api().health().await;
            print_json(&health)?;
            if !health.ok {
                std::process::exit(1);
            }
        }
        ("login", [email, password]) => {
            state.api().login(email, password).await?;
            println!("Logged in as {}", email);
        }
        ("logout", []) => {
            state.logout()?;
            println!("Logged out");
        }
        ("brains", []) => print_json(&store.fetch_brains().await?)?,
        ("nodes", [brain_id]) => {
            print_json(&store.fetch_nodes(brain_id, &NodeQuery::default()).await?)?
        }
        ("nodes", [brain_id, page]) => {
            let page: u32 = page.parse().context("page must be a positive number")?;
            let query = NodeQuery::default().page(page);
            print_json(&store.fetch_nodes(brain_id, &query).await?)?
        }
        ("graph", [brain_id]) => print_json(&store.fetch_graph(brain_id).await?)?,
        ("node", [node_id]) => print_json(&store.fetch_node(node_id).await?)?,
        _ => bail!("unrecognized arguments: {}\n\n{}", args.join(" "), USAGE),
    }

    Ok(())
}
