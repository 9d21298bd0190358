use super::*;

#[test]
fn parses_analyze_command() {
    let cli = Cli::try_parse_from([
        "marketscope",
        "analyze",
        "--city",
        "Austin",
        "--state",
        "TX",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Analyze {
            ref city,
            ref state,
            radius: None,
            skip_search: false,
        } if city == "Austin" && state == "TX"
    ));
}

#[test]
fn parses_analyze_with_radius_and_skip_search() {
    let cli = Cli::try_parse_from([
        "marketscope",
        "analyze",
        "--city",
        "San Antonio",
        "--state",
        "TX",
        "--radius",
        "75.5",
        "--skip-search",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Commands::Analyze {
            radius: Some(r),
            skip_search: true,
            ..
        } if (r - 75.5).abs() < f64::EPSILON
    ));
}

#[test]
fn parses_score_command() {
    let cli = Cli::try_parse_from([
        "marketscope",
        "score",
        "--city",
        "Austin",
        "--state",
        "TX",
        "--radius",
        "30",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Commands::Score { radius: Some(r), .. } if (r - 30.0).abs() < f64::EPSILON
    ));
}

#[test]
fn parses_seo_command() {
    let cli = Cli::try_parse_from(["marketscope", "seo", "--domain", "opendoor.com"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Seo { ref domain } if domain == "opendoor.com"
    ));
}

#[test]
fn analyze_requires_city_and_state() {
    assert!(Cli::try_parse_from(["marketscope", "analyze", "--city", "Austin"]).is_err());
    assert!(Cli::try_parse_from(["marketscope", "analyze", "--state", "TX"]).is_err());
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["marketscope"]).is_err());
}

#[test]
fn non_numeric_radius_is_rejected() {
    let result = Cli::try_parse_from([
        "marketscope",
        "score",
        "--city",
        "Austin",
        "--state",
        "TX",
        "--radius",
        "far",
    ]);
    assert!(result.is_err());
}
