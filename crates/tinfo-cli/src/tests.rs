use super::*;

fn ingest_args(cli: Cli) -> IngestArgs {
    match cli.command {
        Some(Commands::Ingest(args)) => args,
        other => panic!("expected ingest command, got {other:?}"),
    }
}

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["tinfo-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["tinfo-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["tinfo-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn ingest_defaults() {
    let args = ingest_args(Cli::try_parse_from(["tinfo-cli", "ingest"]).unwrap());

    assert_eq!(args.country, "Toronto");
    assert_eq!(args.days, "14");
    assert_eq!(args.limit, "10");
    assert!(!args.no_skip_duplicates);
    assert!(args.targets.is_none());
    assert!(!args.drop_ignored);
    assert!(!args.passthrough);
}

#[test]
fn ingest_accepts_all_flags() {
    let args = ingest_args(
        Cli::try_parse_from([
            "tinfo-cli",
            "ingest",
            "--country",
            "Thailand",
            "--days",
            "30",
            "--limit",
            "25",
            "--no-skip-duplicates",
            "--targets",
            "#bangkokjobs, @bkkevents",
            "--drop-ignored",
            "--passthrough",
        ])
        .unwrap(),
    );

    assert_eq!(args.country, "Thailand");
    assert_eq!(args.days, "30");
    assert_eq!(args.limit, "25");
    assert!(args.no_skip_duplicates);
    assert_eq!(args.targets.as_deref(), Some("#bangkokjobs, @bkkevents"));
    assert!(args.drop_ignored);
    assert!(args.passthrough);
}

#[test]
fn ingest_accepts_negative_numbers_for_later_normalization() {
    let args = ingest_args(
        Cli::try_parse_from(["tinfo-cli", "ingest", "--days", "-5", "--limit", "-1"]).unwrap(),
    );
    assert_eq!(args.days, "-5");
    assert_eq!(args.limit, "-1");
}

#[test]
fn ingest_accepts_non_numeric_days_for_later_normalization() {
    let args = ingest_args(
        Cli::try_parse_from(["tinfo-cli", "ingest", "--days", "two", "--limit", "many"]).unwrap(),
    );
    assert_eq!(args.days, "two");
    assert_eq!(args.limit, "many");
}

#[test]
fn runs_limit_defaults_to_twenty() {
    let cli = Cli::try_parse_from(["tinfo-cli", "runs"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Runs { limit: 20 })));
}

#[test]
fn runs_limit_can_be_overridden() {
    let cli = Cli::try_parse_from(["tinfo-cli", "runs", "--limit", "5"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Runs { limit: 5 })));
}
