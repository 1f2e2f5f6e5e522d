use std::sync::Arc;

use anyhow::Result;
use profi_auth::{AccessClaims, AuthConfig, CredentialCodec, SystemClock};

use crate::cli::{InspectArgs, IssueArgs};
use crate::output::{print_json, print_success};

fn codec(config: &AuthConfig) -> CredentialCodec {
    CredentialCodec::from_config(config, Arc::new(SystemClock))
}

pub fn issue(config: &AuthConfig, args: &IssueArgs) -> Result<()> {
    let (token, claims) = mint(config, args)?;

    println!("{token}");
    print_success(&format!(
        "Session for user {} ({}) valid until {}",
        args.user_id,
        args.role,
        claims.expires_at()
    ));
    Ok(())
}

fn mint(config: &AuthConfig, args: &IssueArgs) -> Result<(String, AccessClaims)> {
    let codec = codec(config);
    let claims = codec.claims(args.user_id, args.role).build();
    let token = codec.encode(&claims)?;
    Ok((token, claims))
}

pub fn inspect(config: &AuthConfig, args: &InspectArgs) -> Result<()> {
    print_json(&decode(config, &args.token)?)
}

fn decode(config: &AuthConfig, token: &str) -> Result<AccessClaims> {
    codec(config).decode(token).map_err(|err| {
        tracing::debug!(error = %err, "Credential rejected");
        anyhow::anyhow!("credential rejected")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use profi_auth::Role;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn config() -> AuthConfig {
        AuthConfig::new("fit-profi-api", SECRET)
    }

    #[test]
    fn test_issued_session_decodes() {
        let args = IssueArgs {
            user_id: 42,
            role: Role::Admin,
        };
        let (token, issued) = mint(&config(), &args).unwrap();

        let claims = decode(&config(), &token).unwrap();
        assert_eq!(claims, issued);
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.user_role, Role::Admin);
        assert!(claims.jti.is_some());
    }

    #[test]
    fn test_rejections_share_one_message() {
        let args = IssueArgs {
            user_id: 42,
            role: Role::User,
        };
        let (token, _) = mint(&config(), &args).unwrap();

        let other = AuthConfig::new("fit-profi-api", "ffffffffffffffffffffffffffffffff");
        let wrong_key = decode(&other, &token).unwrap_err();
        let garbage = decode(&config(), "not-a-token").unwrap_err();
        let wrong_issuer = decode(
            &AuthConfig::new("someone-else", SECRET),
            &token,
        )
        .unwrap_err();

        assert_eq!(wrong_key.to_string(), "credential rejected");
        assert_eq!(garbage.to_string(), wrong_key.to_string());
        assert_eq!(wrong_issuer.to_string(), wrong_key.to_string());
    }
}
