use anyhow::Result;
use profi_auth::{PasswordConfig, PasswordHasher};

use super::value_or_stdin;
use crate::cli::{HashPasswordArgs, VerifyPasswordArgs};
use crate::output::print_success;

fn hasher(config: &PasswordConfig) -> Result<PasswordHasher> {
    config.validate()?;
    Ok(PasswordHasher::new(config)?)
}

pub fn hash(config: &PasswordConfig, args: HashPasswordArgs) -> Result<()> {
    let password = value_or_stdin(args.password, "password")?;
    println!("{}", hasher(config)?.hash_password(&password)?);
    Ok(())
}

pub fn verify(config: &PasswordConfig, args: VerifyPasswordArgs) -> Result<()> {
    let password = value_or_stdin(args.password, "password")?;
    if hasher(config)?.verify_password(&password, &args.hash)? {
        print_success("Password matches");
        Ok(())
    } else {
        anyhow::bail!("password does not match")
    }
}
