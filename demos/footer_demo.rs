//! Footer Demo - key ids in footers and implicit assertions
//!
//! A verifier that trusts several issuers reads the unauthenticated footer
//! to pick a public key, then verifies the token with that key. The tenant
//! id is bound as an implicit assertion, so a token issued for one tenant is
//! rejected when presented to another.
//!
//! Run with: cargo run --example footer_demo

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use paseto_v4::{
    ErrorKind, KeyPair, OsRng, ParsedToken, PasetoV4, PublicKey, SignOptions, VerifyOptions,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    println!("=== PASETO v4.public Footer Demo ===\n");

    let mut trusted: HashMap<String, PublicKey> = HashMap::new();
    let issuers: Vec<(String, KeyPair)> = (1..=3)
        .map(|n| (format!("signing-key-2024-0{n}"), KeyPair::generate(&mut OsRng)))
        .collect();
    for (kid, keypair) in &issuers {
        trusted.insert(kid.clone(), *keypair.public_key());
    }

    let (kid, keypair) = &issuers[1];
    let payload = serde_json::json!({
        "sub": "user123",
        "iss": "auth-service",
        "tenant_id": "org_abc123",
    });
    let options = SignOptions::new()
        .with_footer(serde_json::json!({ "kid": kid }).to_string())
        .with_assertion("org_abc123");
    let token = PasetoV4::sign_json(keypair.secret_key(), &payload, &options).await?;

    println!("Token: {token}");
    println!("Token parts: {}\n", token.split('.').count());

    // Key lookup from the footer happens before any signature check
    let parsed = ParsedToken::parse(&token)?;
    println!("Parsed: {}", parsed.format_summary());
    let footer: serde_json::Value = serde_json::from_str(parsed.untrusted_footer()?)?;
    let kid = footer["kid"].as_str().context("footer has no kid")?;
    let public_key = trusted.get(kid).context("unknown kid")?;
    println!("Selected key {kid}: {public_key}\n");

    let verified = PasetoV4::verify_with_key(
        public_key,
        &token,
        &VerifyOptions::new().with_assertion("org_abc123"),
    )?;
    println!("Verified subject: {}", verified.payload()["sub"]);
    println!("Verified footer: {}\n", verified.footer());

    // Same token presented on behalf of another tenant
    match PasetoV4::verify_with_key(
        public_key,
        &token,
        &VerifyOptions::new().with_assertion("org_other"),
    ) {
        Err(err) if err.kind() == ErrorKind::SignatureInvalid => {
            println!("Rejected for another tenant: {err}");
        }
        Err(err) => bail!("unexpected error: {err}"),
        Ok(_) => bail!("token accepted for the wrong tenant"),
    }

    // A footer pointing at a different trusted key does not help an attacker
    let (body, _) = token.rsplit_once('.').context("token has no footer")?;
    let (other_kid, _) = &issuers[0];
    let forged_footer = serde_json::json!({ "kid": other_kid }).to_string();
    let forged = format!("{body}.{}", paseto_v4::encoding::encode(forged_footer));
    match PasetoV4::verify_with_key(
        &trusted[other_kid.as_str()],
        &forged,
        &VerifyOptions::new().with_assertion("org_abc123"),
    ) {
        Err(err) => println!("Rejected forged footer: {err}"),
        Ok(_) => bail!("forged footer accepted"),
    }

    println!("\nFooter demo completed successfully!");
    Ok(())
}
