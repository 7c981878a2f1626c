use smappee::SmappeeApi;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let username = std::env::var("SMAPPEE_USERNAME")?;
    let password = std::env::var("SMAPPEE_PASSWORD")?;

    let mut smappee = SmappeeApi::from_env_values()?;
    println!("smappee: {:?}", smappee);

    smappee.authenticate(&username, &password)?;

    println!("token expires at: {:?}", smappee.token_expiration_time());
    Ok(())
}
