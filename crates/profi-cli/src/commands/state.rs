use std::sync::Arc;

use anyhow::Result;
use profi_auth::{AuthConfig, StateSigner, SystemClock};

use crate::cli::{SignStateArgs, VerifyStateArgs};

fn signer(config: &AuthConfig) -> Result<StateSigner> {
    Ok(StateSigner::from_config(config, Arc::new(SystemClock))?)
}

pub fn sign(config: &AuthConfig, args: &SignStateArgs) -> Result<()> {
    println!("{}", signer(config)?.sign_state(args.user_id));
    Ok(())
}

pub fn verify(config: &AuthConfig, args: &VerifyStateArgs) -> Result<()> {
    println!("{}", check(config, args)?);
    Ok(())
}

fn check(config: &AuthConfig, args: &VerifyStateArgs) -> Result<i64> {
    let max_age = args.max_age.unwrap_or(config.state_max_age);
    signer(config)?
        .verify_state(&args.state, max_age)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "state rejected (malformed, forged or older than {})",
                humantime::format_duration(max_age)
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> AuthConfig {
        AuthConfig::new("fit-profi-api", "0123456789abcdef0123456789abcdef")
    }

    fn args(state: String, max_age: Option<Duration>) -> VerifyStateArgs {
        VerifyStateArgs { state, max_age }
    }

    #[test]
    fn test_signed_state_verifies() {
        let state = signer(&config()).unwrap().sign_state(42);
        assert_eq!(check(&config(), &args(state, None)).unwrap(), 42);
    }

    #[test]
    fn test_forged_state_is_rejected() {
        let other = AuthConfig::new("fit-profi-api", "ffffffffffffffffffffffffffffffff");
        let forged = signer(&other).unwrap().sign_state(42);

        let err = check(&config(), &args(forged, Some(Duration::from_secs(300)))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "state rejected (malformed, forged or older than 5m)"
        );
        assert!(verify(&config(), &args("garbage".to_string(), None)).is_err());
    }
}
