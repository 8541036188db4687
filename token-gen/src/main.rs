use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;
use tenant_identity::config::DEFAULT_ISSUER;
use tenant_identity::services::token::{JwtTokenProvider, TokenSubject};

/// Mint an HS256 access token for local development.
///
/// Prefer this over the reserved test token: the result goes through the same
/// verification path as a production token.
/// - Signs with the same shared secret the API verifies with (AUTH_JWT_SECRET)
/// - Outputs:
///   - the access token
///   - the decoded claims, for a quick sanity check
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Shared HS256 secret. Falls back to AUTH_JWT_SECRET.
    #[arg(long, env = "AUTH_JWT_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Read the secret from a file instead (takes precedence)
    #[arg(long, value_name = "FILE")]
    secret_file: Option<PathBuf>,

    /// Issuer and audience
    #[arg(long, env = "AUTH_ISSUER", default_value = DEFAULT_ISSUER)]
    issuer: String,

    /// Login name (email claim)
    #[arg(long)]
    login: String,

    #[arg(long)]
    user_id: i64,

    /// Tenant the token is scoped to
    #[arg(long)]
    client_id: i64,

    #[arg(long, default_value = "")]
    first_name: String,

    #[arg(long, default_value = "")]
    last_name: String,

    #[arg(long, default_value = "User")]
    role: String,

    /// Permission ids, comma-separated
    #[arg(long, value_delimiter = ',')]
    permission_ids: Vec<i64>,

    /// Lifetime in seconds
    #[arg(long, default_value_t = 86_400)]
    ttl: u64,

    /// Override iat (unix seconds). Default: now.
    #[arg(long)]
    iat: Option<i64>,

    /// Print only the token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let secret = match (&args.secret_file, &args.secret) {
        (Some(path), _) => fs::read_to_string(path)?.trim().to_string(),
        (None, Some(secret)) => secret.clone(),
        (None, None) => {
            return Err("no secret: pass --secret, --secret-file or set AUTH_JWT_SECRET".into());
        }
    };

    let provider = JwtTokenProvider::new(&secret, args.issuer.clone(), args.ttl, 0);

    let subject = TokenSubject {
        user_id: args.user_id,
        login_name: args.login.clone(),
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        role: args.role.clone(),
    };

    let now = match args.iat {
        Some(ts) => DateTime::<Utc>::from_timestamp(ts, 0).ok_or("iat out of range")?,
        None => Utc::now(),
    };

    let token = provider.generate_token_at(&subject, &args.permission_ids, args.client_id, now)?;

    if args.quiet {
        println!("{}", token);
        return Ok(());
    }

    println!("token: {}", token);
    match provider.claims(&token) {
        Ok(claims) => {
            println!("iss: {}", claims.iss);
            println!("exp: {}", claims.exp);
            println!("email: {}", claims.email.as_deref().unwrap_or("(none)"));
            println!(
                "userId: {}",
                claims.user_id.map(|v| v.to_string()).unwrap_or_default()
            );
            println!(
                "clientId: {}",
                claims.client_id.map(|v| v.to_string()).unwrap_or_default()
            );
            if let Ok(ids) = provider.permission_ids_from_token(&token) {
                println!("permissionIds: {:?}", ids);
            }
        }
        // A back-dated iat can produce an already expired token; still print it.
        Err(e) => println!("claims: (not verifiable now: {})", e),
    }

    Ok(())
}
