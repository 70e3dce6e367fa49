//! Tests for Azure Repos URL dialect parsing.

use rstest::rstest;

use crate::repo::domain::{RepoTargetError, looks_like_url, parse_remote_identifier};

#[rstest]
#[case("https://dev.azure.com/myorg/_git/MyRepo", "myorg", None, "MyRepo")]
#[case(
    "https://dev.azure.com/myorg/MyProject/_git/MyRepo",
    "myorg",
    Some("MyProject"),
    "MyRepo"
)]
#[case(
    "https://myorg.visualstudio.com/MyProject/_git/MyRepo",
    "myorg",
    Some("MyProject"),
    "MyRepo"
)]
#[case("https://myorg.visualstudio.com/_git/MyRepo", "myorg", None, "MyRepo")]
#[case(
    "git@ssh.dev.azure.com:v3/myorg/MyProject/MyRepo",
    "myorg",
    Some("MyProject"),
    "MyRepo"
)]
#[case(
    "ssh://ssh.dev.azure.com/v3/myorg/MyProject/MyRepo",
    "myorg",
    Some("MyProject"),
    "MyRepo"
)]
fn parses_supported_dialects(
    #[case] input: &str,
    #[case] organization: &str,
    #[case] project: Option<&str>,
    #[case] repository: &str,
) {
    let parsed = parse_remote_identifier(input).expect("identifier should parse");
    assert_eq!(parsed.organization, organization);
    assert_eq!(parsed.project.as_deref(), project);
    assert_eq!(parsed.repository, repository);
}

#[rstest]
#[case("https://dev.azure.com/myorg/MyProject/_git/MyRepo.git")]
#[case("git@ssh.dev.azure.com:v3/myorg/MyProject/MyRepo.git")]
#[case("ssh://ssh.dev.azure.com/v3/myorg/MyProject/MyRepo.GIT")]
fn strips_trailing_git_suffix(#[case] input: &str) {
    let parsed = parse_remote_identifier(input).expect("identifier should parse");
    assert_eq!(parsed.repository, "MyRepo");
}

#[rstest]
fn percent_decodes_segments() {
    let parsed =
        parse_remote_identifier("https://dev.azure.com/myorg/My%20Project/_git/My%20Repo")
            .expect("identifier should parse");
    assert_eq!(parsed.project.as_deref(), Some("My Project"));
    assert_eq!(parsed.repository, "My Repo");
}

#[rstest]
fn host_matching_is_case_insensitive() {
    let parsed = parse_remote_identifier("https://Dev.Azure.Com/myorg/Proj/_GIT/Repo")
        .expect("identifier should parse");
    assert_eq!(parsed.organization, "myorg");
    assert_eq!(parsed.project.as_deref(), Some("Proj"));
    assert_eq!(parsed.repository, "Repo");
}

#[rstest]
fn rejects_empty_identifier() {
    assert_eq!(
        parse_remote_identifier("   "),
        Err(RepoTargetError::EmptyIdentifier)
    );
}

#[rstest]
fn rejects_unparseable_url() {
    let result = parse_remote_identifier("https://");
    assert!(matches!(result, Err(RepoTargetError::InvalidUrl(_))));
}

#[rstest]
#[case("https://github.com/owner/repo")]
#[case("https://dev.azure.com/myorg/onlyorg")]
#[case("https://dev.azure.com/myorg/project/notgit/repo")]
fn rejects_non_azure_repos_urls(#[case] input: &str) {
    let result = parse_remote_identifier(input);
    assert!(matches!(result, Err(RepoTargetError::UnsupportedRemote(_))));
}

#[rstest]
/// Re-deriving the triple from any dialect yields the original values.
fn round_trips_each_dialect_for_one_triple() {
    let dialects = [
        "https://dev.azure.com/acme/Platform/_git/billing",
        "https://acme.visualstudio.com/Platform/_git/billing",
        "git@ssh.dev.azure.com:v3/acme/Platform/billing",
        "ssh://ssh.dev.azure.com/v3/acme/Platform/billing",
        "https://dev.azure.com/acme/Platform/_git/billing.git",
    ];
    for dialect in dialects {
        let parsed = parse_remote_identifier(dialect).expect("identifier should parse");
        assert_eq!(parsed.organization, "acme", "dialect: {dialect}");
        assert_eq!(parsed.project.as_deref(), Some("Platform"), "dialect: {dialect}");
        assert_eq!(parsed.repository, "billing", "dialect: {dialect}");
    }
}

#[rstest]
#[case("https://dev.azure.com/org/_git/repo", true)]
#[case("git@ssh.dev.azure.com:v3/org/proj/repo", true)]
#[case("ssh://ssh.dev.azure.com/v3/org/proj/repo", true)]
#[case("../checkouts/repo", false)]
#[case("/home/dev/repo", false)]
#[case("repo-name", false)]
fn classifies_url_like_identifiers(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(looks_like_url(input), expected);
}
