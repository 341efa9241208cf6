// Legend for various fix-this comments:
//   * "TODO" - bug or missing crucial feature.
//   * "Improvement potential" - missing nice-to-have feature or an opportunity
//       to make code better or faster.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod client_main;
mod console_config;
mod network;
mod tui;

use std::path::Path;

use anyhow::Context;
use clap::{Arg, ArgMatches, Command, arg};
use log::info;

use crate::client_main::RoomEntry;
use crate::console_config::ConsoleConfig;


fn string_arg(matches: &ArgMatches, name: &str) -> String {
    matches.get_one::<String>(name).cloned().unwrap_or_default()
}

fn server_arg() -> Arg { arg!(<server_address> "Game server address, e.g. localhost:5000") }

fn main() -> anyhow::Result<()> {
    // Logs share the terminal with the board, so only warnings and errors are shown by default.
    env_logger::Builder::new()
        .target(env_logger::Target::Stderr)
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let matches = Command::new("Ular")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about("Terminal client for the Ular snakes and ladders quiz game")
        .arg(arg!(--config <FILE> "YAML file with client settings").required(false))
        .subcommand_required(true)
        .subcommand(
            Command::new("create")
                .about("Create a new room and play in it")
                .arg(server_arg())
                .arg(arg!(<player> "Player name"))
                .arg(arg!(--color <COLOR> "Marker color").required(false))
                .arg(arg!(--topic <TOPIC> "Question topic").required(false)),
        )
        .subcommand(
            Command::new("join")
                .about("Join an existing room")
                .arg(server_arg())
                .arg(arg!(<code> "Room code"))
                .arg(arg!(<player> "Player name"))
                .arg(arg!(--color <COLOR> "Marker color").required(false)),
        )
        .subcommand(
            Command::new("spectate")
                .about("Watch a room without playing")
                .arg(server_arg())
                .arg(arg!(<code> "Room code"))
                .arg(arg!(<player> "Spectator name")),
        )
        .get_matches();

    let settings = match matches.get_one::<String>("config") {
        Some(path) => ConsoleConfig::load(Path::new(path))?,
        None => ConsoleConfig::default(),
    };
    info!(
        "Polling every {}, request timeout {}",
        humantime::format_duration(settings.client.poll_interval),
        humantime::format_duration(settings.request_timeout)
    );

    let (sub_matches, entry) = match matches.subcommand() {
        Some(("create", sub_matches)) => (sub_matches, RoomEntry::Create {
            player: string_arg(sub_matches, "player"),
            color: string_arg(sub_matches, "color"),
            topic: string_arg(sub_matches, "topic"),
        }),
        Some(("join", sub_matches)) => (sub_matches, RoomEntry::Join {
            code: string_arg(sub_matches, "code"),
            player: string_arg(sub_matches, "player"),
            color: string_arg(sub_matches, "color"),
        }),
        Some(("spectate", sub_matches)) => (sub_matches, RoomEntry::Spectate {
            code: string_arg(sub_matches, "code"),
            player: string_arg(sub_matches, "player"),
        }),
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    };
    let address = string_arg(sub_matches, "server_address");
    let server = network::parse_server_url(&address)
        .with_context(|| format!("invalid server address \"{}\"", address))?;
    client_main::run(client_main::ClientConfig { server, entry, settings })
}
