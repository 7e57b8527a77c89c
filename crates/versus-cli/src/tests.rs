use super::*;

#[test]
fn parses_compare_with_items() {
    let cli = Cli::try_parse_from(["versus-cli", "compare", "iPhone 15", "Galaxy S24"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Compare {
            ref items,
            ref params,
            custom_only: false,
            json: false,
        }) if items == &["iPhone 15", "Galaxy S24"] && params.is_empty()
    ));
}

#[test]
fn parses_repeated_params() {
    let cli = Cli::try_parse_from([
        "versus-cli",
        "compare",
        "Pixel 8",
        "iPhone 15",
        "--param",
        "battery life",
        "--param",
        "price",
        "--custom-only",
        "--json",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Compare {
            ref params,
            custom_only: true,
            json: true,
            ..
        }) if params == &["battery life", "price"]
    ));
}

#[test]
fn compare_requires_items() {
    assert!(Cli::try_parse_from(["versus-cli", "compare"]).is_err());
}

#[test]
fn item_count_is_not_checked_by_the_parser() {
    // The pipeline owns the 2-5 rule so the message matches every front end.
    let cli = Cli::try_parse_from(["versus-cli", "compare", "only-one"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Compare { .. })));
}

#[test]
fn parses_config_command() {
    let cli = Cli::try_parse_from(["versus-cli", "config"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Config)));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["versus-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["versus-cli", "collect"]).is_err());
}
