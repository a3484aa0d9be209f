use std::env;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use daxko_core::auth::OAuthClient;
use daxko_core::rest::{ApiClient, RequestOptions};
use daxko_core::services::{MemberService, SsoService};
use daxko_core::{Method, PartnerCredentials};

#[derive(Parser, Debug)]
#[command(author, version, about = "Daxko Operations partner API CLI")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Token grants
    #[command(subcommand)]
    Token(TokenCommand),
    /// Raw API requests
    #[command(subcommand)]
    Api(ApiCommand),
    /// Single-sign-on configuration
    #[command(subcommand)]
    Sso(SsoCommand),
    /// Member-scoped endpoints
    #[command(subcommand)]
    Member(MemberCommand),
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Fetch a partner access token via the client-credentials grant
    Partner,
    /// Exchange an authorization code for a member access token
    Member(MemberTokenArgs),
}

#[derive(Args, Debug)]
struct MemberTokenArgs {
    /// Authorization code returned to the redirect URI
    code: String,
    /// Redirect URI the code was issued for
    #[arg(long = "redirect-uri")]
    redirect_uri: String,
}

#[derive(Subcommand, Debug)]
enum ApiCommand {
    /// GET a path relative to the base URI
    Get(ApiGetArgs),
    /// POST a JSON body to a path
    Post(ApiPostArgs),
    /// Dispatch a request with explicit method, headers, and body
    Call(ApiCallArgs),
}

#[derive(Args, Debug)]
struct ApiGetArgs {
    /// Path relative to the base URI (e.g. members/me)
    path: String,
}

#[derive(Args, Debug)]
struct ApiPostArgs {
    /// Path relative to the base URI
    path: String,
    /// JSON request body
    #[arg(long)]
    body: String,
}

#[derive(Args, Debug)]
struct ApiCallArgs {
    /// HTTP method (GET, POST, PUT, ...)
    method: String,
    /// Path relative to the base URI
    path: String,
    /// Extra header as name=value (repeatable)
    #[arg(long = "header")]
    headers: Vec<String>,
    /// Form field as name=value (repeatable, sent urlencoded)
    #[arg(long = "form")]
    form: Vec<String>,
    /// Raw request body
    #[arg(long)]
    body: Option<String>,
    /// Bearer token to use instead of fetching a partner token
    #[arg(long)]
    bearer: Option<String>,
}

#[derive(Subcommand, Debug)]
enum SsoCommand {
    /// Register the OAuth2 redirect link for this client
    Register(SsoRegisterArgs),
}

#[derive(Args, Debug)]
struct SsoRegisterArgs {
    /// Redirect URI members are sent back to after login
    link: String,
}

#[derive(Subcommand, Debug)]
enum MemberCommand {
    /// Show the member profile a token belongs to
    Me(MemberMeArgs),
}

#[derive(Args, Debug)]
struct MemberMeArgs {
    /// Member access token
    #[arg(long)]
    token: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Token(cmd) => match cmd {
            TokenCommand::Partner => token_partner().await?,
            TokenCommand::Member(args) => token_member(args).await?,
        },
        Commands::Api(cmd) => match cmd {
            ApiCommand::Get(args) => api_get(args).await?,
            ApiCommand::Post(args) => api_post(args).await?,
            ApiCommand::Call(args) => api_call(args).await?,
        },
        Commands::Sso(cmd) => match cmd {
            SsoCommand::Register(args) => sso_register(args).await?,
        },
        Commands::Member(cmd) => match cmd {
            MemberCommand::Me(args) => member_me(args).await?,
        },
    }
    Ok(())
}

async fn token_partner() -> Result<()> {
    let client =
        OAuthClient::new(credentials_from_env()?).context("failed to build OAuth client")?;
    let token = client
        .partner_token()
        .await
        .context("partner token request failed")?;
    println!("{token}");
    Ok(())
}

async fn token_member(args: MemberTokenArgs) -> Result<()> {
    let client =
        OAuthClient::new(credentials_from_env()?).context("failed to build OAuth client")?;
    let token = client
        .member_token(&args.code, &args.redirect_uri)
        .await
        .context("authorization code exchange failed")?;
    println!("{token}");
    Ok(())
}

async fn api_get(args: ApiGetArgs) -> Result<()> {
    let client = ApiClient::new(credentials_from_env()?).context("failed to build API client")?;
    let body = client.get(&args.path).await.context("API request failed")?;
    print_json(&body)
}

async fn api_post(args: ApiPostArgs) -> Result<()> {
    let client = ApiClient::new(credentials_from_env()?).context("failed to build API client")?;
    let payload: serde_json::Value =
        serde_json::from_str(&args.body).context("--body is not valid JSON")?;
    let body = client
        .post_json(&args.path, &payload)
        .await
        .context("API request failed")?;
    print_json(&body)
}

async fn api_call(args: ApiCallArgs) -> Result<()> {
    let client = ApiClient::new(credentials_from_env()?).context("failed to build API client")?;
    let method = args
        .method
        .to_uppercase()
        .parse::<Method>()
        .map_err(|_| anyhow!("unsupported HTTP method '{}'", args.method))?;

    let mut options = RequestOptions::new();
    if let Some(token) = &args.bearer {
        options = options.bearer(token);
    }
    for header in &args.headers {
        let (name, value) = split_pair(header).context("--header expects name=value")?;
        options = options.header(name, value);
    }
    for field in &args.form {
        let (name, value) = split_pair(field).context("--form expects name=value")?;
        options = options.form_field(name, value);
    }
    if let Some(body) = args.body {
        options = options.body(body);
    }

    let body = client
        .request(method, &args.path, options)
        .await
        .context("API request failed")?;
    print_json(&body)
}

async fn sso_register(args: SsoRegisterArgs) -> Result<()> {
    let service =
        SsoService::new(credentials_from_env()?).context("failed to build SSO service")?;
    let receipt = service
        .register_redirect_link(&args.link)
        .await
        .context("redirect link registration failed")?;
    println!("Registered redirect link ({}).", receipt.status);
    print_json(&receipt.body)
}

async fn member_me(args: MemberMeArgs) -> Result<()> {
    let service =
        MemberService::new(credentials_from_env()?).context("failed to build member service")?;
    let profile = service
        .my_info(&args.token)
        .await
        .context("profile request failed")?;
    print_json(&profile)
}

fn credentials_from_env() -> Result<PartnerCredentials> {
    let base_uri = require_env("DAXKO_BASE_URI")?;
    let user = require_env("DAXKO_USER")?;
    let secret = require_env("DAXKO_SECRET")?;
    let client_id = require_env("DAXKO_CLIENT_ID")?;
    let refresh_token = require_env("DAXKO_REFRESH_TOKEN")?;
    PartnerCredentials::new(base_uri, user, secret, client_id, refresh_token)
        .context("invalid DAXKO_BASE_URI")
}

fn require_env(name: &str) -> Result<String> {
    let value = env::var(name).with_context(|| format!("{name} is not set"))?;
    if value.trim().is_empty() {
        return Err(anyhow!("{name} is empty"));
    }
    Ok(value)
}

fn split_pair(raw: &str) -> Option<(&str, &str)> {
    raw.split_once('=')
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
